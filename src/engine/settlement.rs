//! Settlement: the bankroll change for a terminal bet status.
//!
//! The stake was debited at placement, so the change credited here is the
//! gross return: the full payout on a win, the stake back on a void, and
//! nothing on a loss.

use crate::types::{BetStatus, OracleError, Result};

/// Amount to credit back to the bankroll when a bet settles with `status`.
pub fn bankroll_change(status: BetStatus, stake: f64, odds: f64) -> Result<f64> {
    let change = match status {
        BetStatus::Win => stake * odds,
        BetStatus::Void => stake,
        BetStatus::Loss => 0.0,
        BetStatus::Pending => {
            return Err(OracleError::Validation(
                "status must be one of win, loss, void".into(),
            ))
        }
    };
    if !change.is_finite() {
        return Err(OracleError::Validation(format!(
            "payout of {stake} at {odds} is not a finite amount"
        )));
    }
    Ok(change)
}

/// Net profit of a settled bet relative to the stake.
pub fn net_profit(status: BetStatus, stake: f64, odds: f64) -> Result<f64> {
    Ok(bankroll_change(status, stake, odds)? - stake)
}
