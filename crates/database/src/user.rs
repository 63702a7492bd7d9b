//! User provisioning and lookup.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{LedgerKind, User};

/// Coins seeded into every new account.
pub const WELCOME_BONUS_COINS: i64 = 40;

/// How long the welcome bonus stays valid.
const BONUS_VALIDITY_DAYS: i64 = 30;

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, balance, balance_expires_at, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}

/// Get a user if present, creating them with the welcome bonus otherwise.
///
/// Accounts appear on first authenticated request. Creation seeds the
/// one-time bonus and its ledger entry in a single transaction, so a crash
/// can never leave a credited balance without the matching entry.
pub async fn ensure_user(pool: &SqlitePool, id: &str, name: &str) -> Result<User> {
    if let Some(existing) = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, balance, balance_expires_at, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    {
        return Ok(existing);
    }

    let expires_at = (Utc::now() + Duration::days(BONUS_VALIDITY_DAYS)).to_rfc3339();

    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO users (id, name, balance, balance_expires_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(id) DO NOTHING
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(WELCOME_BONUS_COINS)
    .bind(&expires_at)
    .execute(&mut *tx)
    .await?;

    // A concurrent request may have provisioned the row first; the bonus
    // entry belongs to whichever insert won.
    if inserted.rows_affected() == 1 {
        sqlx::query(
            r#"
            INSERT INTO ledger_entries (user_id, kind, amount, note)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(LedgerKind::Bonus)
        .bind(WELCOME_BONUS_COINS)
        .bind("Welcome bonus coins")
        .execute(&mut *tx)
        .await?;

        tracing::info!(user_id = %id, coins = WELCOME_BONUS_COINS, "Provisioned new user");
    }

    tx.commit().await?;

    get_user(pool, id).await
}
