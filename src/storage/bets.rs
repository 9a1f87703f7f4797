//! Bet log queries.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::types::{Bet, BetStatus, NewBet, Result};

const BET_COLUMNS: &str = "id, event, market, odds, fair_odds, edge, stake, status, created_at";

/// Insert a pending bet and return its id.
pub async fn insert(conn: &mut SqliteConnection, bet: &NewBet, created_at: DateTime<Utc>) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO bets (event, market, odds, fair_odds, edge, stake, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, 'pending', ?)
        "#,
    )
    .bind(bet.event.trim())
    .bind(bet.market.trim())
    .bind(bet.odds)
    .bind(bet.fair_odds)
    .bind(bet.edge)
    .bind(bet.stake)
    .bind(created_at)
    .execute(conn)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get(conn: &mut SqliteConnection, id: i64) -> Result<Option<Bet>> {
    let row = sqlx::query(&format!("SELECT {BET_COLUMNS} FROM bets WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;

    row.as_ref().map(bet_from_row).transpose()
}

/// Move a pending bet to a terminal status. Returns `false` if the bet is
/// missing or no longer pending, in which case nothing was written.
pub async fn finalize(conn: &mut SqliteConnection, id: i64, status: BetStatus) -> Result<bool> {
    let result = sqlx::query("UPDATE bets SET status = ? WHERE id = ? AND status = 'pending'")
        .bind(status.as_str())
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// All bets, most recent first.
pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<Bet>> {
    let rows = sqlx::query(&format!(
        "SELECT {BET_COLUMNS} FROM bets ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(conn)
    .await?;

    rows.iter().map(bet_from_row).collect()
}

fn bet_from_row(row: &SqliteRow) -> Result<Bet> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<BetStatus>()
        .map_err(|e| sqlx::Error::Decode(e.to_string().into()))?;

    Ok(Bet {
        id: row.try_get("id")?,
        event: row.try_get("event")?,
        market: row.try_get("market")?,
        odds: row.try_get("odds")?,
        fair_odds: row.try_get("fair_odds")?,
        edge: row.try_get("edge")?,
        stake: row.try_get("stake")?,
        status,
        created_at: row.try_get("created_at")?,
    })
}
