//! Coin ledger operations.
//!
//! Entries are append-only; the user's `balance` column is a cached
//! projection maintained in the same transaction as each append. The guarded
//! debit below is the single serialization point for per-user spending.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{LedgerEntry, LedgerKind};

/// Credit a user's balance and append the matching entry, atomically.
///
/// When `external_reference` is given, a duplicate reference surfaces as
/// [`DatabaseError::AlreadyRecorded`] and nothing is written. That makes
/// payment-confirmation handlers idempotent under at-least-once delivery:
/// replaying the same external event is a constraint violation, not a
/// double credit.
pub async fn credit(
    pool: &SqlitePool,
    user_id: &str,
    amount: i64,
    kind: LedgerKind,
    note: &str,
    external_reference: Option<&str>,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO ledger_entries (user_id, kind, amount, note, external_reference)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(kind)
    .bind(amount)
    .bind(note)
    .bind(external_reference)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyRecorded {
                    reference: external_reference.unwrap_or_default().to_string(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    let updated = sqlx::query(
        r#"
        UPDATE users
        SET balance = balance + ?
        WHERE id = ?
        "#,
    )
    .bind(amount)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: user_id.to_string(),
        });
    }

    tx.commit().await?;
    Ok(())
}

/// Debit a user's balance and append the matching (negative) entry,
/// atomically.
///
/// The balance check and the decrement are one conditional UPDATE, so two
/// concurrent debits can never jointly overdraw: the second one finds the
/// guard unsatisfied and fails with [`DatabaseError::InsufficientBalance`]
/// without writing anything.
pub async fn debit(
    pool: &SqlitePool,
    user_id: &str,
    amount: i64,
    kind: LedgerKind,
    note: &str,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        r#"
        UPDATE users
        SET balance = balance - ?
        WHERE id = ? AND balance >= ?
        "#,
    )
    .bind(amount)
    .bind(user_id)
    .bind(amount)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(DatabaseError::InsufficientBalance {
            user_id: user_id.to_string(),
            required: amount,
        });
    }

    sqlx::query(
        r#"
        INSERT INTO ledger_entries (user_id, kind, amount, note)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(kind)
    .bind(-amount)
    .bind(note)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Has a ledger entry with this external reference already been recorded?
pub async fn has_external_reference(pool: &SqlitePool, reference: &str) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM ledger_entries
        WHERE external_reference = ?
        "#,
    )
    .bind(reference)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// All entries for a user, newest first.
pub async fn entries_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<LedgerEntry>> {
    let entries = sqlx::query_as::<_, LedgerEntry>(
        r#"
        SELECT id, user_id, kind, amount, note, external_reference, created_at
        FROM ledger_entries
        WHERE user_id = ?
        ORDER BY id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Current cached balance for a user.
pub async fn balance_of(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT balance FROM users
        WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: user_id.to_string(),
    })
}
