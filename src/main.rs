//! ValueBet Oracle
//!
//! Entry point. Loads configuration, initialises structured logging,
//! opens the ledger database, wires the odds and reasoning clients, and
//! serves the dashboard until Ctrl+C.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use valuebet::config::{self, AppConfig, LlmConfig};
use valuebet::dashboard::{self, DashboardState};
use valuebet::data::odds_api::OddsApiClient;
use valuebet::data::OddsProvider;
use valuebet::engine::Bookkeeper;
use valuebet::llm::fair_value::FairValueEstimator;
use valuebet::llm::gemini::GeminiClient;
use valuebet::llm::openrouter::OpenRouterClient;
use valuebet::llm::ReasoningService;
use valuebet::storage::Store;

const BANNER: &str = r#"
 __   __    _          ___      _
 \ \ / /_ _| |_  _ ___| _ ) ___| |_
  \ V / _` | | || / -_) _ \/ -_)  _|
   \_/\__,_|_|\_,_\___|___/\___|\__|
             O R A C L E
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path = AppConfig::path_from_env();
    let cfg = AppConfig::load_or_default(&config_path)?;

    println!("{BANNER}");
    info!(
        config = %config_path,
        database = %cfg.database.path,
        llm_provider = %cfg.llm.provider,
        risk_model = %cfg.staking.default_risk_model,
        "ValueBet Oracle starting up"
    );

    // -- Ledger ----------------------------------------------------------

    let store = Store::open(&cfg.database.path, cfg.bankroll.initial_amount)
        .await
        .with_context(|| format!("Failed to open database {}", cfg.database.path))?;
    let bookkeeper = Bookkeeper::new(store.clone(), cfg.bankroll.allow_overdraft);
    info!(bankroll = %bookkeeper.bankroll().await?, "Ledger loaded");

    // -- Upstream clients ------------------------------------------------

    let odds_key = AppConfig::resolve_secret(&cfg.odds.api_key_env);
    if odds_key.is_none() {
        warn!(env = %cfg.odds.api_key_env, "No odds API key configured; odds endpoints will return 503");
    }
    let odds = OddsApiClient::new(odds_key, cfg.odds.settings())?;
    info!(provider = odds.name(), regions = %cfg.odds.regions, "Odds provider ready");

    let estimator = match build_reasoning_service(&cfg.llm)? {
        Some(service) => {
            info!(provider = %cfg.llm.provider, model = %service.model_name(), "Fair-value estimator ready");
            FairValueEstimator::new(service)
        }
        None => {
            warn!(
                env = %cfg.llm.api_key_env,
                "No LLM API key configured; analysis will fall back to market odds"
            );
            FairValueEstimator::offline()
        }
    };

    // -- Serve -----------------------------------------------------------

    let state = Arc::new(DashboardState::new(
        bookkeeper,
        Arc::new(odds),
        estimator,
        cfg.staking.default_risk_model,
    ));

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .with_context(|| format!("Invalid server address {}:{}", cfg.server.host, cfg.server.port))?;

    dashboard::serve(state, addr, shutdown_signal()).await?;

    store.close().await;
    info!("ValueBet Oracle shut down cleanly.");
    Ok(())
}

/// Build the configured reasoning client, or `None` when no key is set.
fn build_reasoning_service(llm: &LlmConfig) -> Result<Option<Box<dyn ReasoningService>>> {
    let Some(api_key) = AppConfig::resolve_secret(&llm.api_key_env) else {
        return Ok(None);
    };
    let model = Some(llm.model.clone());
    let max_tokens = Some(llm.max_tokens);
    let timeout = Some(llm.timeout_secs);

    let service: Box<dyn ReasoningService> = match llm.provider.as_str() {
        "openrouter" => {
            let mut client = OpenRouterClient::new(api_key, model, max_tokens, timeout)?;
            if let Some(url) = &llm.base_url {
                client = client.with_base_url(url.clone());
            }
            Box::new(client)
        }
        _ => {
            let mut client = GeminiClient::new(api_key, model, max_tokens, timeout)?;
            if let Some(url) = &llm.base_url {
                client = client.with_base_url(url.clone());
            }
            Box::new(client)
        }
    };
    Ok(Some(service))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("valuebet=info,tower_http=info"));

    let json_logging = std::env::var(config::LOG_JSON_ENV).is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
