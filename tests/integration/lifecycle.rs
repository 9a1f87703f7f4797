//! End-to-end flows through the HTTP router.
//!
//! Each test wires a fresh in-memory ledger, the mock odds feed and a
//! scripted reasoning service behind `build_router`, then drives the API
//! the way the dashboard page does.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use valuebet::dashboard::{build_router, AppState, DashboardState};
use valuebet::engine::Bookkeeper;
use valuebet::llm::fair_value::FairValueEstimator;
use valuebet::storage::Store;
use valuebet::strategy::kelly::RiskModel;

use crate::mock_providers::{MockOdds, ScriptedReasoner};

async fn app(odds: MockOdds, reasoner: ScriptedReasoner, initial: f64) -> AppState {
    let store = Store::open_in_memory(initial).await.unwrap();
    Arc::new(DashboardState::new(
        Bookkeeper::new(store, false),
        Arc::new(odds),
        FairValueEstimator::new(Box::new(reasoner)),
        RiskModel::FractionalKelly,
    ))
}

async fn call(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn approx(v: &Value, expected: f64) -> bool {
    v.as_f64().map(|x| (x - expected).abs() < 1e-6).unwrap_or(false)
}

#[tokio::test]
async fn test_full_bet_lifecycle() {
    let reasoner = ScriptedReasoner::new()
        .reply(r#"{"fairOdd": 2.0, "probability": 0.5, "notes": "Evenly matched. Home form slightly better."}"#);
    let state = app(MockOdds::new(), reasoner.clone(), 1000.0).await;
    let router = || build_router(state.clone());

    // Browse the board.
    let (status, board) = call(router(), "GET", "/api/odds?sport=soccer_epl", None).await;
    assert_eq!(status, StatusCode::OK);
    let outcome = &board[0]["bookmakers"][0]["markets"][0]["outcomes"][0];
    assert_eq!(outcome["name"], "Arsenal");
    let price = outcome["price"].as_f64().unwrap();

    // Analyze the outcome.
    let (status, analysis) = call(
        router(),
        "POST",
        "/api/analyze",
        Some(json!({
            "event": "Arsenal vs Chelsea",
            "market": "h2h: Arsenal",
            "odds": price,
            "context": "Chelsea missing two starters"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(analysis["source"], "analyzed");
    assert!(approx(&analysis["edge"], 5.0));
    assert!(approx(&analysis["stakeFraction"], 0.25 * 0.05 / 1.1));
    assert!(reasoner.prompts()[0].contains("Chelsea missing two starters"));

    // Place the recommended bet.
    let stake = analysis["stake"].as_f64().unwrap();
    let (status, created) = call(
        router(),
        "POST",
        "/api/bets",
        Some(json!({
            "event": "Arsenal vs Chelsea",
            "market": "h2h: Arsenal",
            "odds": price,
            "fair_odds": analysis["fairOdd"],
            "edge": analysis["edge"],
            "stake": stake
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_i64().unwrap();

    let (_, bankroll) = call(router(), "GET", "/api/bankroll", None).await;
    assert!(approx(&bankroll["amount"], 1000.0 - stake));

    let (_, bets) = call(router(), "GET", "/api/bets", None).await;
    assert_eq!(bets.as_array().unwrap().len(), 1);
    assert_eq!(bets[0]["status"], "pending");

    let (_, stats) = call(router(), "GET", "/api/stats", None).await;
    assert!(approx(&stats["pending_stake"], stake));

    // Settle it.
    let (status, result) = call(
        router(),
        "POST",
        &format!("/api/bets/{id}/result"),
        Some(json!({ "status": "win" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&result["bankrollChange"], stake * price));

    let (_, bankroll) = call(router(), "GET", "/api/bankroll", None).await;
    assert!(approx(&bankroll["amount"], 1000.0 - stake + stake * price));

    let (_, stats) = call(router(), "GET", "/api/stats", None).await;
    assert_eq!(stats["wins"], 1);
    assert!(approx(&stats["pending_stake"], 0.0));
    assert!(approx(&stats["total_staked"], stake));
    assert!(approx(&stats["win_rate"], 100.0));
    assert!(stats["roi_pct"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_double_resolution_has_no_side_effect() {
    let state = app(MockOdds::new(), ScriptedReasoner::new(), 1000.0).await;
    let router = || build_router(state.clone());

    let (_, created) = call(
        router(),
        "POST",
        "/api/bets",
        Some(json!({
            "event": "Lakers vs Celtics", "market": "h2h: Lakers",
            "odds": 1.8, "fair_odds": 1.7, "edge": 5.88, "stake": 100.0
        })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = call(router(), "POST", &format!("/api/bets/{id}/result"), Some(json!({ "status": "void" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(router(), "POST", &format!("/api/bets/{id}/result"), Some(json!({ "status": "win" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid bet or already processed"));

    let (_, bankroll) = call(router(), "GET", "/api/bankroll", None).await;
    assert!(approx(&bankroll["amount"], 1000.0));
    let (_, bets) = call(router(), "GET", "/api/bets", None).await;
    assert_eq!(bets[0]["status"], "void");
}

#[tokio::test]
async fn test_loss_and_missing_bet() {
    let state = app(MockOdds::new(), ScriptedReasoner::new(), 500.0).await;
    let router = || build_router(state.clone());

    let (_, created) = call(
        router(),
        "POST",
        "/api/bets",
        Some(json!({
            "event": "A vs B", "market": "totals: Over 2.5",
            "odds": 1.95, "fair_odds": 1.85, "edge": 5.4, "stake": 50.0
        })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (_, result) = call(router(), "POST", &format!("/api/bets/{id}/result"), Some(json!({ "status": "loss" }))).await;
    assert!(approx(&result["bankrollChange"], 0.0));
    let (_, bankroll) = call(router(), "GET", "/api/bankroll", None).await;
    assert!(approx(&bankroll["amount"], 450.0));

    let (status, _) = call(router(), "POST", "/api/bets/9999/result", Some(json!({ "status": "win" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, bankroll) = call(router(), "GET", "/api/bankroll", None).await;
    assert!(approx(&bankroll["amount"], 450.0));
}

#[tokio::test]
async fn test_reset_then_roi_is_zero() {
    let state = app(MockOdds::new(), ScriptedReasoner::new(), 1000.0).await;
    let router = || build_router(state.clone());

    let (_, created) = call(
        router(),
        "POST",
        "/api/bets",
        Some(json!({
            "event": "A vs B", "market": "h2h: A",
            "odds": 3.0, "fair_odds": 2.5, "edge": 20.0, "stake": 100.0
        })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();
    call(router(), "POST", &format!("/api/bets/{id}/result"), Some(json!({ "status": "win" }))).await;

    let (_, stats) = call(router(), "GET", "/api/stats", None).await;
    assert!(approx(&stats["roi_pct"], 20.0));

    let (status, body) = call(router(), "POST", "/api/bankroll/reset", Some(json!({ "amount": 750.0 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, bankroll) = call(router(), "GET", "/api/bankroll", None).await;
    assert!(approx(&bankroll["amount"], 750.0));
    assert!(approx(&bankroll["initial_amount"], 750.0));
    let (_, stats) = call(router(), "GET", "/api/stats", None).await;
    assert!(approx(&stats["roi_pct"], 0.0));
}

#[tokio::test]
async fn test_unusable_model_reply_falls_back() {
    let reasoner = ScriptedReasoner::new()
        .reply("I think Arsenal will probably win.")
        .reply(r#"{"fairOdd": 0.5, "probability": 0.5, "notes": "bad"}"#)
        .fail("timeout");
    let state = app(MockOdds::new(), reasoner, 1000.0).await;

    for _ in 0..3 {
        let (status, analysis) = call(
            build_router(state.clone()),
            "POST",
            "/api/analyze",
            Some(json!({ "event": "Arsenal vs Chelsea", "market": "h2h: Draw", "odds": 3.4, "risk_model": "Safe" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(analysis["source"], "fallback");
        assert!(analysis["reason"].is_string());
        assert_eq!(analysis["fairOdd"], 3.4);
        assert!(approx(&analysis["probability"], 1.0 / 3.4));
        assert_eq!(analysis["edge"], 0.0);
        assert_eq!(analysis["stake"], 0.0);
        assert_eq!(analysis["notes"], "Analysis failed. Using market odds.");
    }
}

#[tokio::test]
async fn test_stake_above_bankroll_rejected() {
    let state = app(MockOdds::new(), ScriptedReasoner::new(), 100.0).await;
    let (status, body) = call(
        build_router(state.clone()),
        "POST",
        "/api/bets",
        Some(json!({
            "event": "A vs B", "market": "h2h: A",
            "odds": 2.0, "fair_odds": 1.9, "edge": 5.26, "stake": 150.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Insufficient bankroll"));

    let (_, bets) = call(build_router(state), "GET", "/api/bets", None).await;
    assert!(bets.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_odds_provider_outage() {
    let odds = MockOdds::new();
    odds.set_error("connection reset");
    let state = app(odds.clone(), ScriptedReasoner::new(), 1000.0).await;

    let (status, body) = call(build_router(state.clone()), "GET", "/api/sports", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("connection reset"));

    odds.clear_error();
    let (status, sports) = call(build_router(state.clone()), "GET", "/api/odds", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sports[0]["key"], "soccer_epl");
    assert_eq!(odds.calls(), vec!["sports".to_string(), "sports".to_string()]);
}
