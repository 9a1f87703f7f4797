//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` (or the file named by `VALUEBET_CONFIG`) and
//! deserializes into strongly-typed structs. Every section and field has a
//! default, so a partial file or no file at all still yields a runnable
//! configuration. API keys are referenced by env-var name and resolved at
//! runtime into `SecretString`s; no key is ever stored in the file.

use anyhow::{Context, Result};
use secrecy::{Secret, SecretString};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::data::odds_api::{OddsApiSettings, DEFAULT_BASE_URL};
use crate::storage::DEFAULT_DB_FILE;
use crate::strategy::kelly::RiskModel;

/// Env var naming the config file.
pub const CONFIG_PATH_ENV: &str = "VALUEBET_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
/// When set, logs are emitted as JSON lines.
pub const LOG_JSON_ENV: &str = "VALUEBET_LOG_JSON";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub bankroll: BankrollConfig,
    pub odds: OddsConfig,
    pub llm: LlmConfig,
    pub staking: StakingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_DB_FILE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BankrollConfig {
    /// Seed balance used only when the bankroll table is empty.
    pub initial_amount: f64,
    /// Accept stakes larger than the current balance.
    pub allow_overdraft: bool,
}

impl Default for BankrollConfig {
    fn default() -> Self {
        Self {
            initial_amount: 1000.0,
            allow_overdraft: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OddsConfig {
    pub base_url: String,
    pub regions: String,
    pub markets: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for OddsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            regions: "us,eu".to_string(),
            markets: "h2h,totals".to_string(),
            api_key_env: "ODDS_API_KEY".to_string(),
            timeout_secs: 15,
        }
    }
}

impl OddsConfig {
    pub fn settings(&self) -> OddsApiSettings {
        OddsApiSettings {
            base_url: self.base_url.clone(),
            regions: self.regions.clone(),
            markets: self.markets.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    /// `gemini` or `openrouter`.
    pub provider: String,
    pub model: String,
    pub api_key_env: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Override the provider endpoint (self-hosted proxies, tests).
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            max_tokens: 1024,
            timeout_secs: 30,
            base_url: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct StakingConfig {
    pub default_risk_model: RiskModel,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or fall back to defaults if the file does not exist.
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            warn!(path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Config path from `VALUEBET_CONFIG`, defaulting to `config.toml`.
    pub fn path_from_env() -> String {
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    fn validate(&self) -> Result<()> {
        let initial = self.bankroll.initial_amount;
        if !initial.is_finite() || initial < 0.0 {
            anyhow::bail!("bankroll.initial_amount must be a non-negative number, got {initial}");
        }
        match self.llm.provider.as_str() {
            "gemini" | "openrouter" => Ok(()),
            other => anyhow::bail!("llm.provider must be \"gemini\" or \"openrouter\", got {other:?}"),
        }
    }

    /// Resolve an environment variable name to its value as a secret.
    /// Unset and empty variables both resolve to `None`.
    pub fn resolve_secret(env_name: &str) -> Option<SecretString> {
        std::env::var(env_name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(Secret::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.database.path, "oracle.db");
        assert_eq!(cfg.bankroll.initial_amount, 1000.0);
        assert!(!cfg.bankroll.allow_overdraft);
        assert_eq!(cfg.odds.regions, "us,eu");
        assert_eq!(cfg.odds.markets, "h2h,totals");
        assert_eq!(cfg.llm.provider, "gemini");
        assert_eq!(cfg.staking.default_risk_model, RiskModel::FractionalKelly);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg = AppConfig::parse(
            r#"
            [server]
            port = 8080

            [bankroll]
            initial_amount = 250.0

            [staking]
            default_risk_model = "Safe"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.bankroll.initial_amount, 250.0);
        assert_eq!(cfg.staking.default_risk_model, RiskModel::Safe);
        assert_eq!(cfg.odds.api_key_env, "ODDS_API_KEY");
    }

    #[test]
    fn test_full_file() {
        let cfg = AppConfig::parse(
            r#"
            [database]
            path = "/tmp/bets.db"

            [odds]
            base_url = "http://localhost:9000"
            regions = "uk"
            markets = "h2h"
            api_key_env = "MY_ODDS_KEY"
            timeout_secs = 5

            [llm]
            provider = "openrouter"
            model = "google/gemini-2.0-flash-001"
            api_key_env = "OPENROUTER_API_KEY"
            max_tokens = 512
            timeout_secs = 20
            base_url = "http://localhost:9001/api/v1"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.database.path, "/tmp/bets.db");
        let settings = cfg.odds.settings();
        assert_eq!(settings.base_url, "http://localhost:9000");
        assert_eq!(settings.regions, "uk");
        assert_eq!(settings.timeout_secs, 5);
        assert_eq!(cfg.llm.provider, "openrouter");
        assert_eq!(cfg.llm.base_url.as_deref(), Some("http://localhost:9001/api/v1"));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(AppConfig::parse("[llm]\nprovider = \"grok\"").is_err());
        assert!(AppConfig::parse("[bankroll]\ninitial_amount = -5.0").is_err());
        assert!(AppConfig::parse("[staking]\ndefault_risk_model = \"yolo\"").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let cfg = AppConfig::load_or_default("/nonexistent/valuebet.toml").unwrap();
        assert_eq!(cfg.server.port, 3000);
    }

    #[test]
    fn test_resolve_secret() {
        std::env::set_var("VALUEBET_TEST_SECRET", "abc123");
        let secret = AppConfig::resolve_secret("VALUEBET_TEST_SECRET").unwrap();
        assert_eq!(secret.expose_secret(), "abc123");

        std::env::set_var("VALUEBET_TEST_EMPTY", "  ");
        assert!(AppConfig::resolve_secret("VALUEBET_TEST_EMPTY").is_none());
        assert!(AppConfig::resolve_secret("VALUEBET_TEST_UNSET_9f2c").is_none());
    }
}
