//! Odds data providers.
//!
//! Defines the `OddsProvider` trait. Providers are thin pass-throughs:
//! payloads are returned exactly as the upstream supplied them.

pub mod odds_api;

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{OracleError, Result};

/// Abstraction over upstream odds feeds.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OddsProvider: Send + Sync {
    /// List of supported sports.
    async fn sports(&self) -> Result<Value>;

    /// Current events with nested bookmaker/market/outcome prices.
    async fn odds(&self, sport: &str) -> Result<Value>;

    /// Provider name for logging and error reporting.
    fn name(&self) -> &'static str;
}

/// Sport keys look like `soccer_epl` or `basketball_nba`.
pub fn validate_sport_key(sport: &str) -> Result<&str> {
    let sport = sport.trim();
    let valid = !sport.is_empty()
        && sport.len() <= 64
        && sport.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(sport)
    } else {
        Err(OracleError::Validation(format!("Invalid sport key: {sport:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sport_key() {
        assert_eq!(validate_sport_key("soccer_epl").unwrap(), "soccer_epl");
        assert_eq!(validate_sport_key(" basketball_nba ").unwrap(), "basketball_nba");
        assert!(validate_sport_key("").is_err());
        assert!(validate_sport_key("../admin").is_err());
        assert!(validate_sport_key("nfl?apiKey=x").is_err());
    }
}
