//! Kelly criterion stake sizing.
//!
//! Computes a recommended stake for a binary win/lose outcome at given
//! decimal odds, scaled by a user-selected risk model.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::types::{validate_decimal_odds, OracleError, Result};

// ---------------------------------------------------------------------------
// Risk model
// ---------------------------------------------------------------------------

/// Fraction of the full-Kelly recommendation actually staked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskModel {
    /// 0.1x Kelly.
    #[serde(alias = "Safe")]
    Safe,
    /// Quarter-Kelly.
    #[default]
    #[serde(alias = "Fractional Kelly", alias = "fractional")]
    FractionalKelly,
    #[serde(alias = "Full Kelly", alias = "full")]
    FullKelly,
}

impl RiskModel {
    pub const ALL: &'static [RiskModel] =
        &[RiskModel::Safe, RiskModel::FractionalKelly, RiskModel::FullKelly];

    pub fn multiplier(&self) -> f64 {
        match self {
            RiskModel::Safe => 0.10,
            RiskModel::FractionalKelly => 0.25,
            RiskModel::FullKelly => 1.0,
        }
    }
}

impl fmt::Display for RiskModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskModel::Safe => write!(f, "Safe"),
            RiskModel::FractionalKelly => write!(f, "Fractional Kelly"),
            RiskModel::FullKelly => write!(f, "Full Kelly"),
        }
    }
}

impl std::str::FromStr for RiskModel {
    type Err = OracleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "safe" => Ok(RiskModel::Safe),
            "fractional_kelly" | "fractional" => Ok(RiskModel::FractionalKelly),
            "full_kelly" | "full" => Ok(RiskModel::FullKelly),
            _ => Err(OracleError::Validation(format!("Unknown risk model: {s}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Sizing
// ---------------------------------------------------------------------------

/// Sized stake recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StakeRecommendation {
    pub risk_model: RiskModel,
    /// Unclamped full-Kelly fraction; negative when there is no edge.
    pub raw_fraction: f64,
    /// `max(0, raw_fraction) * multiplier`.
    pub stake_fraction: f64,
    /// `stake_fraction * bankroll`.
    pub stake_amount: f64,
}

/// Full-Kelly fraction for a binary outcome: f* = (p·b − q) / b with b = o − 1.
///
/// Rejects odds outside (1, `MAX_DECIMAL_ODDS`] (the formula divides by
/// `o - 1`) and probabilities outside [0, 1].
pub fn raw_kelly_fraction(probability: f64, odds: f64) -> Result<f64> {
    validate_decimal_odds("odds", odds)?;
    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(OracleError::Validation(format!(
            "probability must be within [0, 1], got {probability}"
        )));
    }

    let net_odds = odds - 1.0;
    Ok((probability * net_odds - (1.0 - probability)) / net_odds)
}

/// Stake fraction after clamping negative edges to zero and applying the
/// risk multiplier. Never negative.
pub fn stake_fraction(probability: f64, odds: f64, risk: RiskModel) -> Result<f64> {
    let raw = raw_kelly_fraction(probability, odds)?;
    Ok(raw.max(0.0) * risk.multiplier())
}

/// Size a stake against the current bankroll balance.
pub fn size_stake(
    probability: f64,
    odds: f64,
    risk: RiskModel,
    bankroll: f64,
) -> Result<StakeRecommendation> {
    let raw_fraction = raw_kelly_fraction(probability, odds)?;
    let stake_fraction = raw_fraction.max(0.0) * risk.multiplier();
    let stake_amount = stake_fraction * bankroll.max(0.0);

    debug!(
        probability,
        odds,
        risk_model = %risk,
        raw_kelly = format!("{:.2}%", raw_fraction * 100.0),
        fraction = format!("{:.2}%", stake_fraction * 100.0),
        stake = format!("${:.2}", stake_amount),
        "Stake sized"
    );

    Ok(StakeRecommendation {
        risk_model: risk,
        raw_fraction,
        stake_fraction,
        stake_amount,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
