//! Persistence layer.
//!
//! A single local SQLite file holding three tables: the singleton
//! bankroll, the bet log, and the (unused) learning log. Query functions in
//! the submodules take a `&mut SqliteConnection` so they compose inside a
//! transaction as well as on a plain pooled connection.

pub mod bankroll;
pub mod bets;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::str::FromStr;
use tracing::info;

use crate::types::Result;

/// Default database file path.
pub const DEFAULT_DB_FILE: &str = "oracle.db";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS bankroll (
        id INTEGER PRIMARY KEY,
        amount REAL NOT NULL DEFAULT 1000.0,
        initial_amount REAL NOT NULL DEFAULT 1000.0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        event TEXT NOT NULL,
        market TEXT NOT NULL,
        odds REAL NOT NULL,
        fair_odds REAL NOT NULL,
        edge REAL NOT NULL,
        stake REAL NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'win', 'loss', 'void')),
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS learning_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        league TEXT,
        team TEXT,
        variance_adjustment REAL DEFAULT 0,
        notes TEXT
    )
    "#,
];

/// SQLite-backed store.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if missing) the database file, apply the schema and
    /// seed the bankroll if it is empty.
    pub async fn open(path: &str, initial_bankroll: f64) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init(initial_bankroll).await?;
        info!(path, "Database ready");
        Ok(store)
    }

    /// Private in-memory database (tests, dry runs). A single connection
    /// that never expires, since each SQLite memory connection is its own
    /// database.
    pub async fn open_in_memory(initial_bankroll: f64) -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init(initial_bankroll).await?;
        Ok(store)
    }

    async fn init(&self, initial_bankroll: f64) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        let seeded = sqlx::query(
            "INSERT INTO bankroll (id, amount, initial_amount)
             SELECT ?1, ?2, ?2 WHERE NOT EXISTS (SELECT 1 FROM bankroll)",
        )
        .bind(crate::types::BANKROLL_ID)
        .bind(initial_bankroll)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if seeded > 0 {
            info!(amount = initial_bankroll, "Seeded bankroll");
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
