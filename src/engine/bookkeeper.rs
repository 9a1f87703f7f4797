//! Bookkeeper — the serialized ledger service.
//!
//! Owns the store and is the only writer of the bankroll and bet tables.
//! Each mutation holds the async lock for its whole duration and runs
//! inside one SQLite transaction, so the bet log and the balance never
//! disagree.

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::engine::settlement;
use crate::storage::{bankroll, bets, Store};
use crate::strategy::edge::PerformanceSummary;
use crate::types::{Bankroll, Bet, BetStatus, NewBet, OracleError, Resolution, Result};

pub struct Bookkeeper {
    store: Store,
    lock: Mutex<()>,
    allow_overdraft: bool,
}

impl Bookkeeper {
    pub fn new(store: Store, allow_overdraft: bool) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
            allow_overdraft,
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn bankroll(&self) -> Result<Bankroll> {
        let mut conn = self.store.acquire().await?;
        bankroll::read(&mut conn).await
    }

    /// All bets, most recent first.
    pub async fn list_bets(&self) -> Result<Vec<Bet>> {
        let mut conn = self.store.acquire().await?;
        bets::list(&mut conn).await
    }

    pub async fn stats(&self) -> Result<PerformanceSummary> {
        let mut conn = self.store.acquire().await?;
        let history = bets::list(&mut conn).await?;
        let bankroll = bankroll::read(&mut conn).await?;
        Ok(PerformanceSummary::from_history(
            &history,
            bankroll.amount,
            bankroll.initial_amount,
        ))
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Set both the balance and the ROI baseline to `amount`.
    pub async fn reset(&self, amount: f64) -> Result<Bankroll> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(OracleError::Validation(format!(
                "amount must be a non-negative number, got {amount}"
            )));
        }

        let _guard = self.lock.lock().await;
        let mut tx = self.store.begin().await?;
        bankroll::reset(&mut tx, amount).await?;
        let after = bankroll::read(&mut tx).await?;
        tx.commit().await?;

        info!(amount, "Bankroll reset");
        Ok(after)
    }

    /// Record a pending bet and debit its stake. Returns the new bet id.
    pub async fn place_bet(&self, bet: &NewBet) -> Result<i64> {
        bet.validate()?;

        let _guard = self.lock.lock().await;
        let mut tx = self.store.begin().await?;

        let current = bankroll::read(&mut tx).await?;
        if bet.stake > current.amount && !self.allow_overdraft {
            warn!(
                stake = bet.stake,
                available = current.amount,
                "Rejected bet larger than bankroll"
            );
            return Err(OracleError::InsufficientBankroll {
                needed: bet.stake,
                available: current.amount,
            });
        }

        let balance_after = current.amount - bet.stake;
        if !balance_after.is_finite() {
            return Err(OracleError::Validation(format!(
                "stake of {} would leave no finite balance",
                bet.stake
            )));
        }

        let id = bets::insert(&mut tx, bet, Utc::now()).await?;
        bankroll::debit(&mut tx, bet.stake).await?;
        tx.commit().await?;

        info!(
            bet_id = id,
            event = %bet.event,
            market = %bet.market,
            odds = bet.odds,
            stake = format!("${:.2}", bet.stake),
            bankroll = format!("${:.2}", balance_after),
            "Bet placed"
        );
        Ok(id)
    }

    /// Settle a pending bet and credit the payout.
    ///
    /// A missing bet and an already-settled bet are both rejected with
    /// `BetNotPending`; nothing is written in either case.
    pub async fn resolve_bet(&self, id: i64, status: BetStatus) -> Result<Resolution> {
        if !status.is_terminal() {
            return Err(OracleError::Validation(
                "status must be one of win, loss, void".into(),
            ));
        }

        let _guard = self.lock.lock().await;
        let mut tx = self.store.begin().await?;

        let bet = match bets::get(&mut tx, id).await? {
            Some(bet) if bet.status == BetStatus::Pending => bet,
            _ => return Err(OracleError::BetNotPending(id)),
        };

        let change = settlement::bankroll_change(status, bet.stake, bet.odds)?;
        if !bets::finalize(&mut tx, id, status).await? {
            return Err(OracleError::BetNotPending(id));
        }
        bankroll::credit(&mut tx, change).await?;
        let after = bankroll::read(&mut tx).await?;
        tx.commit().await?;

        let profit = settlement::net_profit(status, bet.stake, bet.odds)?;
        info!(
            bet_id = id,
            status = %status,
            change = format!("${:.2}", change),
            profit = format!("${:+.2}", profit),
            bankroll = format!("${:.2}", after.amount),
            "Bet resolved"
        );

        Ok(Resolution {
            bet_id: id,
            status,
            bankroll_change: change,
            bankroll_after: after.amount,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
