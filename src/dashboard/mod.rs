//! Dashboard — Axum web server for the bettor's console.
//!
//! Serves the JSON API and a self-contained HTML page that drives it.
//! Same-origin only: no CORS headers are emitted.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    response::Html,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use routes::{AppState, DashboardState};

/// The embedded dashboard HTML (compiled into the binary).
const DASHBOARD_HTML: &str = include_str!("templates/index.html");

/// Bind `addr` and serve until `shutdown` resolves.
pub async fn serve(
    state: AppState,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard address {addr}"))?;

    info!(%addr, "Dashboard server listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Dashboard server error")
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // API routes
        .route("/api/bankroll", get(routes::get_bankroll))
        .route("/api/bankroll/reset", post(routes::reset_bankroll))
        .route("/api/sports", get(routes::get_sports))
        .route("/api/odds", get(routes::get_odds))
        .route("/api/analyze", post(routes::analyze))
        .route("/api/bets", get(routes::list_bets).post(routes::create_bet))
        .route("/api/bets/:id/result", post(routes::resolve_bet))
        .route("/api/stats", get(routes::get_stats))
        .route("/health", get(routes::health))
        // Dashboard HTML
        .route("/", get(serve_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the embedded HTML dashboard.
async fn serve_dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
