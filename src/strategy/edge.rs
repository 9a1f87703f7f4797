//! Edge and performance arithmetic.
//!
//! Offered-vs-fair edge, market-implied probability, ROI and the
//! performance figures shown on the dashboard.

use serde::Serialize;

use crate::types::{Bet, BetStatus};

/// Edge in percent: how far the offered odds exceed the fair odds.
/// `(odds / fair_odds - 1) * 100`.
pub fn edge_pct(odds: f64, fair_odds: f64) -> f64 {
    (odds / fair_odds - 1.0) * 100.0
}

/// Probability implied by decimal odds, ignoring the bookmaker margin.
pub fn implied_probability(odds: f64) -> f64 {
    1.0 / odds
}

/// Return on investment in percent. A non-positive baseline yields 0.
pub fn roi_pct(amount: f64, initial_amount: f64) -> f64 {
    if initial_amount > 0.0 {
        (amount / initial_amount - 1.0) * 100.0
    } else {
        0.0
    }
}

/// Aggregate performance over the bet history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub total_bets: usize,
    pub pending: usize,
    pub wins: usize,
    pub losses: usize,
    pub voids: usize,
    /// Wins over settled non-void bets, in percent.
    pub win_rate: f64,
    /// Mean recorded edge over all bets, in percent.
    pub avg_edge: f64,
    /// Stakes over every bet ever placed, settled or not.
    pub total_staked: f64,
    /// Stakes still at risk on pending bets.
    pub pending_stake: f64,
    pub roi_pct: f64,
}

impl PerformanceSummary {
    pub fn from_history(bets: &[Bet], amount: f64, initial_amount: f64) -> Self {
        let count = |s: BetStatus| bets.iter().filter(|b| b.status == s).count();
        let wins = count(BetStatus::Win);
        let losses = count(BetStatus::Loss);
        let decided = wins + losses;

        let avg_edge = if bets.is_empty() {
            0.0
        } else {
            bets.iter().map(|b| b.edge).sum::<f64>() / bets.len() as f64
        };

        Self {
            total_bets: bets.len(),
            pending: count(BetStatus::Pending),
            wins,
            losses,
            voids: count(BetStatus::Void),
            win_rate: if decided > 0 { wins as f64 / decided as f64 * 100.0 } else { 0.0 },
            avg_edge,
            total_staked: bets.iter().map(|b| b.stake).sum(),
            pending_stake: bets
                .iter()
                .filter(|b| b.status == BetStatus::Pending)
                .map(|b| b.stake)
                .sum(),
            roi_pct: roi_pct(amount, initial_amount),
        }
    }
}
