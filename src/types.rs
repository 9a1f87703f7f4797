//! Shared types for the ValueBet Oracle.
//!
//! These types form the data model used across all modules: the bankroll
//! singleton, bet records and their lifecycle, and the domain error enum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Bankroll
// ---------------------------------------------------------------------------

/// Row id of the singleton bankroll.
pub const BANKROLL_ID: i64 = 1;

/// The bettor's capital, tracked as a single evolving balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bankroll {
    pub id: i64,
    /// Current balance.
    pub amount: f64,
    /// Baseline for return-on-investment display.
    pub initial_amount: f64,
}

impl fmt::Display for Bankroll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${:.2} (initial ${:.2}, ROI {:+.1}%)",
            self.amount,
            self.initial_amount,
            self.roi_pct(),
        )
    }
}

impl Bankroll {
    /// Return on investment in percent relative to `initial_amount`.
    pub fn roi_pct(&self) -> f64 {
        crate::strategy::edge::roi_pct(self.amount, self.initial_amount)
    }
}

// ---------------------------------------------------------------------------
// Bets
// ---------------------------------------------------------------------------

/// Lifecycle status of a bet. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Pending,
    Win,
    Loss,
    Void,
}

impl BetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetStatus::Pending => "pending",
            BetStatus::Win => "win",
            BetStatus::Loss => "loss",
            BetStatus::Void => "void",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BetStatus::Pending)
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BetStatus {
    type Err = OracleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(BetStatus::Pending),
            "win" | "won" => Ok(BetStatus::Win),
            "loss" | "lost" => Ok(BetStatus::Loss),
            "void" => Ok(BetStatus::Void),
            other => Err(OracleError::Validation(format!("Unknown bet status: {other}"))),
        }
    }
}

/// A persisted bet record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    pub id: i64,
    /// Free-text event label, e.g. "Arsenal vs Chelsea".
    pub event: String,
    /// Market key and outcome name, e.g. "h2h: Arsenal".
    pub market: String,
    /// Decimal odds at placement.
    pub odds: f64,
    /// Estimator output at placement.
    pub fair_odds: f64,
    /// Edge in percent, as supplied by the caller.
    pub edge: f64,
    pub stake: f64,
    pub status: BetStatus,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Bet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} | {} @ {:.2} (fair {:.2}, edge {:+.2}%) stake ${:.2} [{}]",
            self.id,
            self.event,
            self.market,
            self.odds,
            self.fair_odds,
            self.edge,
            self.stake,
            self.status,
        )
    }
}

/// A bet the user has confirmed but which is not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBet {
    pub event: String,
    pub market: String,
    pub odds: f64,
    pub fair_odds: f64,
    pub edge: f64,
    pub stake: f64,
}

impl NewBet {
    /// Reject malformed placements before anything touches storage.
    pub fn validate(&self) -> Result<()> {
        if self.event.trim().is_empty() {
            return Err(OracleError::Validation("event must not be empty".into()));
        }
        if self.market.trim().is_empty() {
            return Err(OracleError::Validation("market must not be empty".into()));
        }
        validate_decimal_odds("odds", self.odds)?;
        validate_decimal_odds("fair_odds", self.fair_odds)?;
        if !self.edge.is_finite() {
            return Err(OracleError::Validation("edge must be a finite number".into()));
        }
        if !self.stake.is_finite() || self.stake <= 0.0 {
            return Err(OracleError::Validation(format!(
                "stake must be a positive amount, got {}",
                self.stake
            )));
        }
        Ok(())
    }
}

/// Longest price any bookmaker quotes (exchange ceiling).
pub const MAX_DECIMAL_ODDS: f64 = 1000.0;

/// Decimal odds must be finite, strictly greater than 1 and at most
/// `MAX_DECIMAL_ODDS`.
pub fn validate_decimal_odds(field: &str, odds: f64) -> Result<()> {
    if !odds.is_finite() || odds <= 1.0 || odds > MAX_DECIMAL_ODDS {
        return Err(OracleError::Validation(format!(
            "{field} must be decimal odds in (1, {MAX_DECIMAL_ODDS}], got {odds}"
        )));
    }
    Ok(())
}

/// Outcome of resolving a pending bet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub bet_id: i64,
    pub status: BetStatus,
    /// Amount credited back to the bankroll.
    pub bankroll_change: f64,
    pub bankroll_after: f64,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for the oracle.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid bet or already processed (bet {0})")]
    BetNotPending(i64),

    #[error("Insufficient bankroll: need ${needed:.2}, have ${available:.2}")]
    InsufficientBankroll { needed: f64, available: f64 },

    #[error("Upstream service unavailable ({service}): {message}")]
    Upstream { service: String, message: String },

    #[error("Malformed upstream response ({service}): {message}")]
    UpstreamPayload { service: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, OracleError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
