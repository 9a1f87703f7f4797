//! Fair-value estimation.
//!
//! Asks a reasoning service for a fair decimal price and true probability
//! of a market outcome. Any failure to obtain or validate a structured
//! answer degrades to the market-implied probability, so `assess` always
//! returns a usable value.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{strip_code_fence, FieldKind, OutputSchema, ReasoningService, SchemaField};
use crate::strategy::edge::implied_probability;

/// Notes attached to a degraded estimate.
pub const FALLBACK_NOTES: &str = "Analysis failed. Using market odds.";

/// Estimated no-edge price for an outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairValue {
    /// Fair decimal odds, > 1.
    pub fair_odd: f64,
    /// True probability in [0, 1].
    pub probability: f64,
    /// Short rationale.
    pub notes: String,
}

impl FairValue {
    /// Market-implied value: no information gained over the offered price.
    pub fn market_implied(price: f64) -> Self {
        Self {
            fair_odd: price,
            probability: implied_probability(price),
            notes: FALLBACK_NOTES.to_string(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if !self.fair_odd.is_finite() || self.fair_odd <= 1.0 {
            return Err(format!("fairOdd must be > 1, got {}", self.fair_odd));
        }
        if !self.probability.is_finite() || !(0.0..=1.0).contains(&self.probability) {
            return Err(format!("probability must be in [0, 1], got {}", self.probability));
        }
        Ok(())
    }
}

/// Result of an estimation: either the model's answer or the fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum Assessment {
    Analyzed(FairValue),
    Fallback { value: FairValue, reason: String },
}

impl Assessment {
    pub fn value(&self) -> &FairValue {
        match self {
            Assessment::Analyzed(v) => v,
            Assessment::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Assessment::Fallback { .. })
    }

    /// "analyzed" or "fallback", for API responses.
    pub fn source(&self) -> &'static str {
        match self {
            Assessment::Analyzed(_) => "analyzed",
            Assessment::Fallback { .. } => "fallback",
        }
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            Assessment::Analyzed(_) => None,
            Assessment::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// Inputs describing the outcome to price.
#[derive(Debug, Clone)]
pub struct EstimateRequest<'a> {
    pub event: &'a str,
    pub market: &'a str,
    /// Currently offered decimal odds.
    pub price: f64,
    /// Optional free-text context from the user.
    pub context: &'a str,
}

// ---------------------------------------------------------------------------
// Estimator
// ---------------------------------------------------------------------------

pub struct FairValueEstimator {
    service: Option<Box<dyn ReasoningService>>,
}

impl FairValueEstimator {
    pub fn new(service: Box<dyn ReasoningService>) -> Self {
        Self { service: Some(service) }
    }

    /// An estimator with no reasoning service: every assessment falls back.
    pub fn offline() -> Self {
        Self { service: None }
    }

    pub fn model_name(&self) -> Option<String> {
        self.service.as_ref().map(|s| s.model_name())
    }

    /// Structured-output schema: exactly three required fields.
    pub fn schema() -> OutputSchema {
        OutputSchema {
            name: "fair_value",
            fields: vec![
                SchemaField {
                    name: "fairOdd",
                    kind: FieldKind::Number,
                    description: "The calculated fair decimal odd",
                },
                SchemaField {
                    name: "probability",
                    kind: FieldKind::Number,
                    description: "The true probability (0-1)",
                },
                SchemaField {
                    name: "notes",
                    kind: FieldKind::String,
                    description: "2-sentence explanation",
                },
            ],
        }
    }

    pub fn build_prompt(req: &EstimateRequest<'_>) -> String {
        let context = if req.context.trim().is_empty() { "None" } else { req.context.trim() };
        format!(
            "You are a professional value-betting analyst.\n\
             Analyze the following sports event and market:\n\
             Event: {}\n\
             Market: {}\n\
             Current Market Odds: {}\n\
             Additional Context: {}\n\n\
             Calculate the \"True Probability\" and \"Fair Odds\" based on team form, injuries, \
             historical matchups, and advanced metrics.\n\
             Provide a brief 2-sentence explanation.\n\n\
             Return the result in JSON format.",
            req.event, req.market, req.price, context
        )
    }

    /// Parse and validate the model's reply.
    pub fn parse_response(text: &str) -> Result<FairValue, String> {
        let value: FairValue = serde_json::from_str(strip_code_fence(text))
            .map_err(|e| format!("unparseable response: {e}"))?;
        value.validate()?;
        Ok(value)
    }

    /// Estimate the fair value of an outcome. Never fails.
    pub async fn assess(&self, req: &EstimateRequest<'_>) -> Assessment {
        let Some(service) = &self.service else {
            return Self::fallback(req, "no reasoning service configured".into());
        };

        let prompt = Self::build_prompt(req);
        debug!(event = req.event, market = req.market, model = %service.model_name(), "Requesting fair value");

        let text = match service.generate_structured(&prompt, &Self::schema()).await {
            Ok(t) => t,
            Err(e) => return Self::fallback(req, format!("reasoning service error: {e:#}")),
        };

        match Self::parse_response(&text) {
            Ok(value) => {
                info!(
                    event = req.event,
                    market = req.market,
                    price = req.price,
                    fair_odd = format!("{:.3}", value.fair_odd),
                    probability = format!("{:.1}%", value.probability * 100.0),
                    "Fair value estimated"
                );
                Assessment::Analyzed(value)
            }
            Err(reason) => Self::fallback(req, reason),
        }
    }

    fn fallback(req: &EstimateRequest<'_>, reason: String) -> Assessment {
        warn!(event = req.event, market = req.market, price = req.price, reason = %reason, "Falling back to market odds");
        Assessment::Fallback {
            value: FairValue::market_implied(req.price),
            reason,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
