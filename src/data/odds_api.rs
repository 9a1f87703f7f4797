//! The Odds API (v4) client.
//!
//! API: `https://api.the-odds-api.com/v4/`
//! Auth: `apiKey` query parameter.
//!
//! No retries and no caching: every call is a live pass-through. Transport
//! failures and non-2xx statuses surface as `OracleError::Upstream`; a body
//! that is not JSON surfaces as `OracleError::UpstreamPayload`.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, warn};

use super::{validate_sport_key, OddsProvider};
use crate::types::{OracleError, Result};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://api.the-odds-api.com";
const PROVIDER_NAME: &str = "the-odds-api";

#[derive(Debug, Clone)]
pub struct OddsApiSettings {
    pub base_url: String,
    /// Comma-separated bookmaker regions, e.g. "us,eu".
    pub regions: String,
    /// Comma-separated market keys, e.g. "h2h,totals".
    pub markets: String,
    pub timeout_secs: u64,
}

impl Default for OddsApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            regions: "us,eu".to_string(),
            markets: "h2h,totals".to_string(),
            timeout_secs: 15,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct OddsApiClient {
    http: Client,
    /// `None` when no key is configured; every call then fails as unavailable.
    api_key: Option<SecretString>,
    settings: OddsApiSettings,
}

impl OddsApiClient {
    pub fn new(api_key: Option<SecretString>, settings: OddsApiSettings) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("valuebet/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build odds HTTP client")?;
        Ok(Self { http, api_key, settings })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret().as_str())
            .ok_or_else(|| upstream("API key not configured"))
    }

    /// GET `path` with the given query and decode the body as JSON.
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}{}", self.settings.base_url.trim_end_matches('/'), path);
        debug!(url = %url, "Fetching upstream odds data");

        let response = self.http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                warn!(error = %e, "Odds request failed");
                upstream(format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Odds provider returned an error status");
            return Err(upstream(format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| upstream(format!("failed to read body: {}", e.without_url())))?;

        serde_json::from_slice(&bytes).map_err(|e| OracleError::UpstreamPayload {
            service: PROVIDER_NAME.to_string(),
            message: e.to_string(),
        })
    }
}

fn upstream(message: impl Into<String>) -> OracleError {
    OracleError::Upstream {
        service: PROVIDER_NAME.to_string(),
        message: message.into(),
    }
}

#[async_trait]
impl OddsProvider for OddsApiClient {
    async fn sports(&self) -> Result<Value> {
        let key = self.api_key()?;
        self.get_json("/v4/sports/", &[("apiKey", key)]).await
    }

    async fn odds(&self, sport: &str) -> Result<Value> {
        let sport = validate_sport_key(sport)?;
        let key = self.api_key()?;
        let path = format!("/v4/sports/{}/odds/", urlencoding::encode(sport));
        self.get_json(
            &path,
            &[
                ("apiKey", key),
                ("regions", self.settings.regions.as_str()),
                ("markets", self.settings.markets.as_str()),
                ("oddsFormat", "decimal"),
            ],
        )
        .await
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
