//! Mock upstreams for integration testing.
//!
//! Provides a deterministic `OddsProvider` returning a canned sports list
//! and odds board, and a scripted `ReasoningService` that replays queued
//! replies. Both are in-memory with no network access.

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use valuebet::data::OddsProvider;
use valuebet::llm::{OutputSchema, ReasoningService};
use valuebet::types::{OracleError, Result};

/// A mock odds feed with a fixed board.
#[derive(Clone, Default)]
pub struct MockOdds {
    /// If set, all calls fail with an upstream error carrying this message.
    force_error: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockOdds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force all subsequent calls to fail as if the provider were down.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    /// Every call made so far, as `sports` or `odds:<sport>`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        match self.force_error.lock().unwrap().as_ref() {
            Some(msg) => Err(OracleError::Upstream {
                service: "mock-odds".into(),
                message: msg.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn board() -> Value {
        json!([
            {
                "id": "e912304de2b2ce35b473ce2ecd3d1502",
                "sport_key": "soccer_epl",
                "commence_time": "2026-10-24T14:00:00Z",
                "home_team": "Arsenal",
                "away_team": "Chelsea",
                "bookmakers": [
                    {
                        "key": "pinnacle",
                        "title": "Pinnacle",
                        "markets": [
                            {
                                "key": "h2h",
                                "outcomes": [
                                    { "name": "Arsenal", "price": 2.10 },
                                    { "name": "Chelsea", "price": 3.60 },
                                    { "name": "Draw", "price": 3.40 }
                                ]
                            }
                        ]
                    }
                ]
            }
        ])
    }
}

#[async_trait]
impl OddsProvider for MockOdds {
    async fn sports(&self) -> Result<Value> {
        self.calls.lock().unwrap().push("sports".into());
        self.check()?;
        Ok(json!([
            { "key": "soccer_epl", "group": "Soccer", "title": "EPL",
              "description": "English Premier League", "active": true, "has_outrights": false },
            { "key": "basketball_nba", "group": "Basketball", "title": "NBA",
              "description": "US Basketball", "active": true, "has_outrights": false }
        ]))
    }

    async fn odds(&self, sport: &str) -> Result<Value> {
        self.calls.lock().unwrap().push(format!("odds:{sport}"));
        self.check()?;
        Ok(Self::board())
    }

    fn name(&self) -> &'static str {
        "mock-odds"
    }
}

/// A reasoning service that replays queued replies in order.
/// An exhausted queue behaves like a transport failure.
#[derive(Clone, Default)]
pub struct ScriptedReasoner {
    replies: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedReasoner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self, msg: &str) -> Self {
        self.replies.lock().unwrap().push_back(Err(msg.to_string()));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningService for ScriptedReasoner {
    async fn generate_structured(&self, prompt: &str, schema: &OutputSchema) -> anyhow::Result<String> {
        assert_eq!(schema.fields.len(), 3, "fair-value schema has exactly three fields");
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(msg)) => Err(anyhow!(msg)),
            None => Err(anyhow!("connection refused")),
        }
    }

    fn model_name(&self) -> String {
        "scripted".to_string()
    }
}
