//! Generation job persistence and terminal-state transitions.
//!
//! A job's `state` is monotonic: `processing -> completed | failed`, never
//! reversed. Both terminal transitions are conditional UPDATEs keyed on the
//! current state, executed inside one transaction together with any ledger
//! effect. Whichever signal (poll or webhook) commits first wins; every
//! later duplicate affects zero rows and is a no-op.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{GenerationJob, JobState, LedgerKind};

/// Fields for a new job row. The row is always created in `processing`.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub id: String,
    pub user_id: String,
    pub product_id: Option<String>,
    pub provider: String,
    pub external_job_id: String,
    pub external_task_id: Option<String>,
    pub prompt: String,
    pub aspect_ratio: String,
    pub source_image_url: String,
    pub caption: Option<String>,
}

const SELECT_JOB: &str = r#"
    SELECT id, user_id, product_id, provider, external_job_id, external_task_id,
           state, sub_state, result_url, failure_reason, prompt, aspect_ratio,
           source_image_url, caption, created_at
    FROM generation_jobs
"#;

/// Get a job by ID.
pub async fn get_job(pool: &SqlitePool, id: &str) -> Result<GenerationJob> {
    sqlx::query_as::<_, GenerationJob>(&format!("{SELECT_JOB} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "GenerationJob",
            id: id.to_string(),
        })
}

/// Get a job by ID, enforcing ownership.
pub async fn get_job_for_user(pool: &SqlitePool, id: &str, user_id: &str) -> Result<GenerationJob> {
    sqlx::query_as::<_, GenerationJob>(&format!("{SELECT_JOB} WHERE id = ? AND user_id = ?"))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "GenerationJob",
            id: id.to_string(),
        })
}

/// Find a provider's job by external identifier.
///
/// Providers are inconsistent about which identifier they echo back, so the
/// lookup matches either field.
pub async fn find_by_external_id(
    pool: &SqlitePool,
    provider: &str,
    external_id: &str,
) -> Result<Option<GenerationJob>> {
    let job = sqlx::query_as::<_, GenerationJob>(&format!(
        "{SELECT_JOB} WHERE provider = ? AND (external_job_id = ? OR external_task_id = ?)"
    ))
    .bind(provider)
    .bind(external_id)
    .bind(external_id)
    .fetch_optional(pool)
    .await?;

    Ok(job)
}

/// List a user's jobs, newest first.
pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<GenerationJob>> {
    let jobs = sqlx::query_as::<_, GenerationJob>(&format!(
        "{SELECT_JOB} WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ?"
    ))
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(jobs)
}

/// Create a job row and charge for it, atomically.
///
/// One transaction: guarded balance decrement, the `generation` ledger
/// entry, and the job row in `processing`. If the balance guard fails
/// (a concurrent spender got there first), nothing is written and the
/// submission surfaces as [`DatabaseError::InsufficientBalance`].
pub async fn create_charged(
    pool: &SqlitePool,
    new_job: &NewJob,
    price: i64,
    note: &str,
) -> Result<GenerationJob> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        r#"
        UPDATE users
        SET balance = balance - ?
        WHERE id = ? AND balance >= ?
        "#,
    )
    .bind(price)
    .bind(&new_job.user_id)
    .bind(price)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(DatabaseError::InsufficientBalance {
            user_id: new_job.user_id.clone(),
            required: price,
        });
    }

    sqlx::query(
        r#"
        INSERT INTO ledger_entries (user_id, kind, amount, note)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&new_job.user_id)
    .bind(LedgerKind::Generation)
    .bind(-price)
    .bind(note)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO generation_jobs
            (id, user_id, product_id, provider, external_job_id, external_task_id,
             state, prompt, aspect_ratio, source_image_url, caption)
        VALUES (?, ?, ?, ?, ?, ?, 'processing', ?, ?, ?, ?)
        "#,
    )
    .bind(&new_job.id)
    .bind(&new_job.user_id)
    .bind(&new_job.product_id)
    .bind(&new_job.provider)
    .bind(&new_job.external_job_id)
    .bind(&new_job.external_task_id)
    .bind(&new_job.prompt)
    .bind(&new_job.aspect_ratio)
    .bind(&new_job.source_image_url)
    .bind(&new_job.caption)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    get_job(pool, &new_job.id).await
}

/// Record a new informational sub-phase on a still-processing job.
///
/// Guarded to `processing`, so a late "still generating" signal after a
/// terminal transition changes nothing. Always safe to repeat.
pub async fn update_sub_state(
    pool: &SqlitePool,
    job_id: &str,
    sub_state: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE generation_jobs
        SET sub_state = ?
        WHERE id = ? AND state = 'processing'
        "#,
    )
    .bind(sub_state)
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Flip a processing job to `completed` with its result URL.
///
/// Returns `true` if this call performed the transition, `false` if the job
/// had already reached a terminal state (duplicate signal).
pub async fn complete(pool: &SqlitePool, job_id: &str, result_url: &str) -> Result<bool> {
    let updated = sqlx::query(
        r#"
        UPDATE generation_jobs
        SET state = 'completed', result_url = ?, sub_state = NULL
        WHERE id = ? AND state = 'processing'
        "#,
    )
    .bind(result_url)
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(updated.rows_affected() == 1)
}

/// Flip a processing job to `failed` and refund the charge, atomically.
///
/// The refund credit executes only when the conditional state UPDATE
/// affected a row, i.e. only for the one signal that wins the transition.
/// Any interleaving of duplicate polls and webhooks therefore produces at
/// most one `refund` entry, and a job can never sit in `failed` without its
/// refund (both are the same transaction).
///
/// Returns `true` if this call performed the transition.
pub async fn fail_and_refund(
    pool: &SqlitePool,
    job_id: &str,
    user_id: &str,
    failure_reason: &str,
    refund_amount: i64,
    note: &str,
) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        r#"
        UPDATE generation_jobs
        SET state = 'failed', failure_reason = ?, sub_state = NULL
        WHERE id = ? AND state = 'processing'
        "#,
    )
    .bind(failure_reason)
    .bind(job_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        // Already terminal; nothing to do and nothing to refund.
        return Ok(false);
    }

    sqlx::query(
        r#"
        INSERT INTO ledger_entries (user_id, kind, amount, note)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(LedgerKind::Refund)
    .bind(refund_amount)
    .bind(note)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE users
        SET balance = balance + ?
        WHERE id = ?
        "#,
    )
    .bind(refund_amount)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger;
    use crate::test_util::test_db;
    use crate::user;

    fn sample_job(id: &str, user_id: &str) -> NewJob {
        NewJob {
            id: id.to_string(),
            user_id: user_id.to_string(),
            product_id: None,
            provider: "pixelle".to_string(),
            external_job_id: format!("ext-{id}"),
            external_task_id: Some(format!("task-{id}")),
            prompt: "A product video".to_string(),
            aspect_ratio: "portrait".to_string(),
            source_image_url: "https://cdn.example/p.jpg".to_string(),
            caption: None,
        }
    }

    #[tokio::test]
    async fn test_create_charged_debits_and_creates() {
        let db = test_db().await;
        user::ensure_user(db.pool(), "u1", "Alice").await.unwrap();
        let start = ledger::balance_of(db.pool(), "u1").await.unwrap();

        let job = create_charged(db.pool(), &sample_job("j1", "u1"), 15, "Video: Mug")
            .await
            .unwrap();

        assert_eq!(job.state, JobState::Processing);
        assert_eq!(ledger::balance_of(db.pool(), "u1").await.unwrap(), start - 15);
    }

    #[tokio::test]
    async fn test_create_charged_insufficient_writes_nothing() {
        let db = test_db().await;
        user::ensure_user(db.pool(), "u1", "Alice").await.unwrap();

        let result = create_charged(db.pool(), &sample_job("j1", "u1"), 1000, "Video").await;
        assert!(matches!(
            result,
            Err(DatabaseError::InsufficientBalance { .. })
        ));
        assert!(matches!(
            get_job(db.pool(), "j1").await,
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_find_by_either_external_id() {
        let db = test_db().await;
        user::ensure_user(db.pool(), "u1", "Alice").await.unwrap();
        create_charged(db.pool(), &sample_job("j1", "u1"), 15, "Video")
            .await
            .unwrap();

        let by_job = find_by_external_id(db.pool(), "pixelle", "ext-j1")
            .await
            .unwrap();
        let by_task = find_by_external_id(db.pool(), "pixelle", "task-j1")
            .await
            .unwrap();
        assert_eq!(by_job.unwrap().id, "j1");
        assert_eq!(by_task.unwrap().id, "j1");

        // Wrong provider does not match.
        let other = find_by_external_id(db.pool(), "kinetic", "ext-j1")
            .await
            .unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn test_complete_is_idempotent() {
        let db = test_db().await;
        user::ensure_user(db.pool(), "u1", "Alice").await.unwrap();
        create_charged(db.pool(), &sample_job("j1", "u1"), 15, "Video")
            .await
            .unwrap();

        assert!(complete(db.pool(), "j1", "https://cdn.example/v.mp4")
            .await
            .unwrap());
        // Duplicate delivery loses the conditional update.
        assert!(!complete(db.pool(), "j1", "https://cdn.example/other.mp4")
            .await
            .unwrap());

        let job = get_job(db.pool(), "j1").await.unwrap();
        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.result_url.as_deref(), Some("https://cdn.example/v.mp4"));
    }

    #[tokio::test]
    async fn test_fail_and_refund_at_most_once() {
        let db = test_db().await;
        user::ensure_user(db.pool(), "u1", "Alice").await.unwrap();
        let start = ledger::balance_of(db.pool(), "u1").await.unwrap();
        create_charged(db.pool(), &sample_job("j1", "u1"), 15, "Video")
            .await
            .unwrap();

        assert!(
            fail_and_refund(db.pool(), "j1", "u1", "Please try again", 15, "Refund")
                .await
                .unwrap()
        );
        assert!(
            !fail_and_refund(db.pool(), "j1", "u1", "Please try again", 15, "Refund")
                .await
                .unwrap()
        );

        assert_eq!(ledger::balance_of(db.pool(), "u1").await.unwrap(), start);

        let refunds = ledger::entries_for_user(db.pool(), "u1")
            .await
            .unwrap()
            .into_iter()
            .filter(|e| e.kind == LedgerKind::Refund)
            .count();
        assert_eq!(refunds, 1);
    }

    #[tokio::test]
    async fn test_terminal_job_ignores_sub_state_updates() {
        let db = test_db().await;
        user::ensure_user(db.pool(), "u1", "Alice").await.unwrap();
        create_charged(db.pool(), &sample_job("j1", "u1"), 15, "Video")
            .await
            .unwrap();

        update_sub_state(db.pool(), "j1", Some("queuing"))
            .await
            .unwrap();
        assert_eq!(
            get_job(db.pool(), "j1").await.unwrap().sub_state.as_deref(),
            Some("queuing")
        );

        complete(db.pool(), "j1", "https://cdn.example/v.mp4")
            .await
            .unwrap();
        update_sub_state(db.pool(), "j1", Some("generating"))
            .await
            .unwrap();

        let job = get_job(db.pool(), "j1").await.unwrap();
        assert!(job.sub_state.is_none());
        assert_eq!(job.state, JobState::Completed);
    }
}
