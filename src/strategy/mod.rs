//! Strategy — edge arithmetic and Kelly sizing.
//!
//! `evaluate` ties a fair-value assessment to the offered price and the
//! current bankroll, producing the recommendation shown before a bet is
//! confirmed.

pub mod edge;
pub mod kelly;

use serde::Serialize;
use tracing::debug;

use crate::llm::fair_value::Assessment;
use crate::types::{validate_decimal_odds, Result};
use kelly::{RiskModel, StakeRecommendation};

/// Fair value, edge and sized stake for one market outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub fair_odd: f64,
    pub probability: f64,
    pub notes: String,
    /// `"analyzed"` or `"fallback"`.
    pub source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Edge of the offered price over the fair price, in percent.
    pub edge: f64,
    pub risk_model: RiskModel,
    pub raw_fraction: f64,
    pub stake_fraction: f64,
    pub stake: f64,
}

/// Combine an assessment of `price` with Kelly sizing against `bankroll`.
///
/// A fallback assessment carries no information beyond the price itself,
/// so its edge and stake are exactly zero.
pub fn evaluate(
    assessment: &Assessment,
    price: f64,
    risk: RiskModel,
    bankroll: f64,
) -> Result<Evaluation> {
    validate_decimal_odds("odds", price)?;
    let value = assessment.value();

    let sizing = if assessment.is_fallback() {
        StakeRecommendation {
            risk_model: risk,
            raw_fraction: 0.0,
            stake_fraction: 0.0,
            stake_amount: 0.0,
        }
    } else {
        kelly::size_stake(value.probability, price, risk, bankroll)?
    };

    let edge = if assessment.is_fallback() {
        0.0
    } else {
        edge::edge_pct(price, value.fair_odd)
    };

    debug!(
        price,
        fair_odd = value.fair_odd,
        edge = format!("{:.2}%", edge),
        source = assessment.source(),
        "Opportunity evaluated"
    );

    Ok(Evaluation {
        fair_odd: value.fair_odd,
        probability: value.probability,
        notes: value.notes.clone(),
        source: assessment.source(),
        reason: assessment.fallback_reason().map(str::to_string),
        edge,
        risk_model: risk,
        raw_fraction: sizing.raw_fraction,
        stake_fraction: sizing.stake_fraction,
        stake: sizing.stake_amount,
    })
}
