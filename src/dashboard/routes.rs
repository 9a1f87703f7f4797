//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.
//! Errors are rendered as `{"error": "<message>"}` with a status code
//! chosen by `ApiError`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, warn};

use crate::data::OddsProvider;
use crate::engine::Bookkeeper;
use crate::llm::fair_value::{EstimateRequest, FairValueEstimator};
use crate::strategy::edge::PerformanceSummary;
use crate::strategy::kelly::RiskModel;
use crate::strategy::{self, Evaluation};
use crate::types::{validate_decimal_odds, Bankroll, Bet, BetStatus, NewBet, OracleError};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub bookkeeper: Bookkeeper,
    pub odds: Arc<dyn OddsProvider>,
    pub estimator: FairValueEstimator,
    /// Used by `/api/analyze` when the request names no risk model.
    pub default_risk_model: RiskModel,
}

impl DashboardState {
    pub fn new(
        bookkeeper: Bookkeeper,
        odds: Arc<dyn OddsProvider>,
        estimator: FairValueEstimator,
        default_risk_model: RiskModel,
    ) -> Self {
        Self {
            bookkeeper,
            odds,
            estimator,
            default_risk_model,
        }
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// `OracleError` rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub OracleError);

impl From<OracleError> for ApiError {
    fn from(e: OracleError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            OracleError::Validation(_)
            | OracleError::BetNotPending(_)
            | OracleError::InsufficientBankroll { .. } => StatusCode::BAD_REQUEST,
            OracleError::Upstream { .. } => StatusCode::SERVICE_UNAVAILABLE,
            OracleError::UpstreamPayload { .. } => StatusCode::BAD_GATEWAY,
            OracleError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, error = %self.0, "Request failed");
        } else {
            warn!(status = %status, error = %self.0, "Request rejected");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct OddsQuery {
    pub sport: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub event: String,
    pub market: String,
    /// Offered decimal odds (possibly a manual override).
    pub odds: f64,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub risk_model: Option<RiskModel>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    pub success: bool,
    pub bankroll_change: f64,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/bankroll
pub async fn get_bankroll(State(state): State<AppState>) -> ApiResult<Bankroll> {
    Ok(Json(state.bookkeeper.bankroll().await?))
}

/// POST /api/bankroll/reset
pub async fn reset_bankroll(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> ApiResult<SuccessResponse> {
    state.bookkeeper.reset(req.amount).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/sports
pub async fn get_sports(State(state): State<AppState>) -> ApiResult<Value> {
    Ok(Json(state.odds.sports().await?))
}

/// GET /api/odds?sport=<key>
///
/// Without a sport key this returns the sports list.
pub async fn get_odds(
    State(state): State<AppState>,
    Query(query): Query<OddsQuery>,
) -> ApiResult<Value> {
    let payload = match query.sport.as_deref() {
        Some(sport) if !sport.trim().is_empty() => state.odds.odds(sport).await?,
        _ => state.odds.sports().await?,
    };
    Ok(Json(payload))
}

/// POST /api/analyze
pub async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> ApiResult<Evaluation> {
    if req.event.trim().is_empty() || req.market.trim().is_empty() {
        return Err(OracleError::Validation("event and market must not be empty".into()).into());
    }
    validate_decimal_odds("odds", req.odds)?;

    let assessment = state
        .estimator
        .assess(&EstimateRequest {
            event: req.event.trim(),
            market: req.market.trim(),
            price: req.odds,
            context: req.context.as_deref().unwrap_or(""),
        })
        .await;

    let bankroll = state.bookkeeper.bankroll().await?;
    let risk = req.risk_model.unwrap_or(state.default_risk_model);
    Ok(Json(strategy::evaluate(&assessment, req.odds, risk, bankroll.amount)?))
}

/// POST /api/bets
pub async fn create_bet(
    State(state): State<AppState>,
    Json(bet): Json<NewBet>,
) -> ApiResult<CreatedResponse> {
    let id = state.bookkeeper.place_bet(&bet).await?;
    Ok(Json(CreatedResponse { id }))
}

/// GET /api/bets
pub async fn list_bets(State(state): State<AppState>) -> ApiResult<Vec<Bet>> {
    Ok(Json(state.bookkeeper.list_bets().await?))
}

/// POST /api/bets/:id/result
pub async fn resolve_bet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ResolveRequest>,
) -> ApiResult<ResolveResponse> {
    let status: BetStatus = req.status.parse()?;
    let resolution = state.bookkeeper.resolve_bet(id, status).await?;
    Ok(Json(ResolveResponse {
        success: true,
        bankroll_change: resolution.bankroll_change,
    }))
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<PerformanceSummary> {
    Ok(Json(state.bookkeeper.stats().await?))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
