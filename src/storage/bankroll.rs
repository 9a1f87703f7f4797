//! Bankroll singleton queries.

use sqlx::{Row, SqliteConnection};

use crate::types::{Bankroll, Result, BANKROLL_ID};

pub async fn read(conn: &mut SqliteConnection) -> Result<Bankroll> {
    let row = sqlx::query("SELECT id, amount, initial_amount FROM bankroll WHERE id = ?")
        .bind(BANKROLL_ID)
        .fetch_one(conn)
        .await?;

    Ok(Bankroll {
        id: row.try_get("id")?,
        amount: row.try_get("amount")?,
        initial_amount: row.try_get("initial_amount")?,
    })
}

/// Set both `amount` and `initial_amount`, erasing ROI history.
pub async fn reset(conn: &mut SqliteConnection, amount: f64) -> Result<()> {
    let result = sqlx::query("UPDATE bankroll SET amount = ?, initial_amount = ? WHERE id = ?")
        .bind(amount)
        .bind(amount)
        .bind(BANKROLL_ID)
        .execute(conn)
        .await?;
    expect_one_row(result.rows_affected())
}

/// Subtract unconditionally; balance policy is enforced by the caller.
pub async fn debit(conn: &mut SqliteConnection, stake: f64) -> Result<()> {
    adjust(conn, -stake).await
}

pub async fn credit(conn: &mut SqliteConnection, delta: f64) -> Result<()> {
    adjust(conn, delta).await
}

async fn adjust(conn: &mut SqliteConnection, delta: f64) -> Result<()> {
    let result = sqlx::query("UPDATE bankroll SET amount = amount + ? WHERE id = ?")
        .bind(delta)
        .bind(BANKROLL_ID)
        .execute(conn)
        .await?;
    expect_one_row(result.rows_affected())
}

fn expect_one_row(affected: u64) -> Result<()> {
    if affected == 1 {
        Ok(())
    } else {
        Err(sqlx::Error::RowNotFound.into())
    }
}
