//! End-to-end lifecycle tests: dispatch, reconciliation, refunds and
//! payment idempotency, driven through mock providers.

use std::sync::Arc;

use database::{ledger, user, Database, JobState, LedgerKind};
use mock_provider::{
    async_trait, CallbackError, CallbackEvent, FailingProvider, NormalizedStatus, ProviderError,
    ProviderId, SequenceProvider, StaticProvider, SubmitReceipt, SubmitRequest, VideoProvider,
};
use orchestrator::{
    CallbackOutcome, GenerationInput, Orchestrator, PaymentOutcome, ProviderRegistry,
    COINS_PER_VIDEO,
};
use serde_json::json;

const PRICE: i64 = COINS_PER_VIDEO;

async fn test_db() -> Database {
    // Single connection: every pooled connection to sqlite::memory: would
    // open its own database.
    let db = Database::connect_with_pool_size("sqlite::memory:", 1)
        .await
        .unwrap();
    db.migrate().await.unwrap();
    db
}

/// Provision a user and steer the balance to an exact value through the
/// ledger, so the entry sum stays consistent with the projection.
async fn user_with_balance(db: &Database, user_id: &str, balance: i64) {
    let account = user::ensure_user(db.pool(), user_id, "Test User")
        .await
        .unwrap();

    let diff = balance - account.balance;
    if diff > 0 {
        ledger::credit(db.pool(), user_id, diff, LedgerKind::Purchase, "setup", None)
            .await
            .unwrap();
    } else if diff < 0 {
        ledger::debit(db.pool(), user_id, -diff, LedgerKind::Generation, "setup")
            .await
            .unwrap();
    }
}

fn orchestrator_with(db: Database, provider: Arc<dyn VideoProvider>) -> Orchestrator {
    Orchestrator::new(db, ProviderRegistry::new().with(provider))
}

fn input() -> GenerationInput {
    GenerationInput {
        name: "Thermal Mug".to_string(),
        image_url: "https://cdn.example/mug.jpg".to_string(),
        features: "Keeps drinks hot for 12 hours".to_string(),
        concept: "closeup".to_string(),
        target_audience: "professionals".to_string(),
        caption: Some("The mug that works as late as you do".to_string()),
        provider: Some(ProviderId::Pixelle),
        save_product: false,
        product_id: None,
    }
}

fn success_payload(external_id: &str, url: &str) -> serde_json::Value {
    json!({"job_id": external_id, "phase": "succeeded", "result_url": url})
}

fn failed_payload(external_id: &str, detail: &str) -> serde_json::Value {
    json!({"job_id": external_id, "phase": "failed", "detail": detail})
}

async fn refund_count(db: &Database, user_id: &str) -> usize {
    ledger::entries_for_user(db.pool(), user_id)
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.kind == LedgerKind::Refund)
        .count()
}

// Scenario A: duplicate success webhooks complete the job once, no refund.
#[tokio::test]
async fn duplicate_success_webhooks_complete_once() {
    let db = test_db().await;
    user_with_balance(&db, "u1", PRICE).await;
    let orch = orchestrator_with(
        db.clone(),
        Arc::new(StaticProvider::pending(ProviderId::Pixelle)),
    );

    let job = orch.submit_generation("u1", input()).await.unwrap();
    assert_eq!(job.state, JobState::Processing);
    assert_eq!(ledger::balance_of(db.pool(), "u1").await.unwrap(), 0);

    let payload = success_payload(&job.external_job_id, "https://cdn.example/v.mp4");

    let first = orch
        .reconcile_callback(ProviderId::Pixelle, &payload)
        .await
        .unwrap();
    assert_eq!(first, CallbackOutcome::Applied);

    let second = orch
        .reconcile_callback(ProviderId::Pixelle, &payload)
        .await
        .unwrap();
    assert_eq!(second, CallbackOutcome::AlreadyTerminal);

    let snapshot = orch.reconcile_job("u1", &job.id).await.unwrap();
    assert_eq!(snapshot.state, JobState::Completed);
    assert_eq!(snapshot.result_url.as_deref(), Some("https://cdn.example/v.mp4"));

    assert_eq!(ledger::balance_of(db.pool(), "u1").await.unwrap(), 0);
    assert_eq!(refund_count(&db, "u1").await, 0);
}

// Scenario B: provider failure refunds the exact price, once.
#[tokio::test]
async fn failure_refunds_exactly_once() {
    let db = test_db().await;
    user_with_balance(&db, "u1", PRICE).await;
    let orch = orchestrator_with(
        db.clone(),
        Arc::new(StaticProvider::pending(ProviderId::Pixelle)),
    );

    let job = orch.submit_generation("u1", input()).await.unwrap();
    assert_eq!(ledger::balance_of(db.pool(), "u1").await.unwrap(), 0);

    let outcome = orch
        .reconcile_callback(
            ProviderId::Pixelle,
            &failed_payload(&job.external_job_id, "GPU worker crashed"),
        )
        .await
        .unwrap();
    assert_eq!(outcome, CallbackOutcome::Applied);

    let snapshot = orch.reconcile_job("u1", &job.id).await.unwrap();
    assert_eq!(snapshot.state, JobState::Failed);
    assert!(snapshot.failure_reason.is_some());

    assert_eq!(ledger::balance_of(db.pool(), "u1").await.unwrap(), PRICE);
    assert_eq!(refund_count(&db, "u1").await, 1);
}

// Scenario C: insufficient balance rejects before any provider call.
#[tokio::test]
async fn insufficient_balance_rejects_before_submit() {
    let db = test_db().await;
    user_with_balance(&db, "u1", PRICE - 5).await;
    let provider = Arc::new(StaticProvider::pending(ProviderId::Pixelle));
    let orch = orchestrator_with(db.clone(), provider.clone());

    let result = orch.submit_generation("u1", input()).await;
    assert!(matches!(
        result,
        Err(orchestrator::OrchestratorError::InsufficientBalance)
    ));

    assert_eq!(provider.submissions(), 0);
    assert_eq!(ledger::balance_of(db.pool(), "u1").await.unwrap(), PRICE - 5);
    assert!(orch.list_jobs("u1", 10).await.unwrap().is_empty());
}

// Scenario D: racing "still generating" and "failed" webhooks settle on
// failed with one refund.
#[tokio::test]
async fn concurrent_generating_and_failed_webhooks_settle_on_failed() {
    let db = test_db().await;
    user_with_balance(&db, "u1", PRICE).await;
    let orch = Arc::new(orchestrator_with(
        db.clone(),
        Arc::new(StaticProvider::pending(ProviderId::Pixelle)),
    ));

    let job = orch.submit_generation("u1", input()).await.unwrap();

    let generating = json!({"job_id": job.external_job_id, "phase": "generating"});
    let failed = failed_payload(&job.external_job_id, "render error");

    let (a, b) = tokio::join!(
        orch.reconcile_callback(ProviderId::Pixelle, &generating),
        orch.reconcile_callback(ProviderId::Pixelle, &failed),
    );
    a.unwrap();
    b.unwrap();

    let snapshot = orch.reconcile_job("u1", &job.id).await.unwrap();
    assert_eq!(snapshot.state, JobState::Failed);
    assert_eq!(ledger::balance_of(db.pool(), "u1").await.unwrap(), PRICE);
    assert_eq!(refund_count(&db, "u1").await, 1);
}

// P1: concurrent submissions never overdraw; exactly floor(balance/price)
// of them can win.
#[tokio::test]
async fn concurrent_submissions_never_overdraw() {
    let db = test_db().await;
    user_with_balance(&db, "u1", 2 * PRICE + 5).await;
    let orch = Arc::new(orchestrator_with(
        db.clone(),
        Arc::new(StaticProvider::pending(ProviderId::Pixelle)),
    ));

    let attempts = (0..5).map(|_| {
        let orch = orch.clone();
        async move { orch.submit_generation("u1", input()).await }
    });
    let results = futures::future::join_all(attempts).await;

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 2);

    let balance = ledger::balance_of(db.pool(), "u1").await.unwrap();
    assert_eq!(balance, 5);
    assert!(balance >= 0);
    assert_eq!(orch.list_jobs("u1", 10).await.unwrap().len(), 2);
}

// P2: any pile-up of failure signals across both channels yields one refund.
#[tokio::test]
async fn repeated_failure_signals_refund_once() {
    let db = test_db().await;
    user_with_balance(&db, "u1", PRICE).await;
    let orch = orchestrator_with(
        db.clone(),
        Arc::new(StaticProvider::new(
            ProviderId::Pixelle,
            NormalizedStatus::failed(Some("prompt violates content policy".to_string())),
        )),
    );

    let job = orch.submit_generation("u1", input()).await.unwrap();

    for _ in 0..5 {
        orch.reconcile_job("u1", &job.id).await.unwrap();
    }
    for _ in 0..3 {
        orch.reconcile_callback(
            ProviderId::Pixelle,
            &failed_payload(&job.external_job_id, "prompt violates content policy"),
        )
        .await
        .unwrap();
    }

    assert_eq!(ledger::balance_of(db.pool(), "u1").await.unwrap(), PRICE);
    assert_eq!(refund_count(&db, "u1").await, 1);

    let snapshot = orch.reconcile_job("u1", &job.id).await.unwrap();
    assert_eq!(snapshot.state, JobState::Failed);
    assert_eq!(
        snapshot.failure_reason.as_deref(),
        Some(orchestrator::failure::REASON_CONTENT_POLICY)
    );
}

// P3: a completed job is immutable under later failure signals.
#[tokio::test]
async fn terminal_job_ignores_later_signals() {
    let db = test_db().await;
    user_with_balance(&db, "u1", PRICE).await;
    let orch = orchestrator_with(
        db.clone(),
        Arc::new(StaticProvider::succeeding(
            ProviderId::Pixelle,
            "https://cdn.example/v.mp4",
        )),
    );

    let job = orch.submit_generation("u1", input()).await.unwrap();

    let snapshot = orch.reconcile_job("u1", &job.id).await.unwrap();
    assert_eq!(snapshot.state, JobState::Completed);

    let outcome = orch
        .reconcile_callback(
            ProviderId::Pixelle,
            &failed_payload(&job.external_job_id, "late failure"),
        )
        .await
        .unwrap();
    assert_eq!(outcome, CallbackOutcome::AlreadyTerminal);

    let after = orch.reconcile_job("u1", &job.id).await.unwrap();
    assert_eq!(after.state, JobState::Completed);
    assert_eq!(after.result_url.as_deref(), Some("https://cdn.example/v.mp4"));
    assert_eq!(ledger::balance_of(db.pool(), "u1").await.unwrap(), 0);
    assert_eq!(refund_count(&db, "u1").await, 0);
}

// P4: a provider that refuses the submission costs nothing.
#[tokio::test]
async fn rejected_submission_is_free() {
    let db = test_db().await;
    user_with_balance(&db, "u1", PRICE).await;
    let orch = orchestrator_with(
        db.clone(),
        Arc::new(FailingProvider::unavailable(ProviderId::Pixelle)),
    );

    let result = orch.submit_generation("u1", input()).await;
    assert!(matches!(
        result,
        Err(orchestrator::OrchestratorError::Provider(_))
    ));

    assert_eq!(ledger::balance_of(db.pool(), "u1").await.unwrap(), PRICE);
    assert!(orch.list_jobs("u1", 10).await.unwrap().is_empty());
    let entries = ledger::entries_for_user(db.pool(), "u1").await.unwrap();
    assert!(entries
        .iter()
        .all(|e| e.kind != LedgerKind::Generation || e.note == "setup"));
}

// P5: success without a playable URL is failure, with refund.
#[tokio::test]
async fn success_without_url_fails_conservatively() {
    let db = test_db().await;
    user_with_balance(&db, "u1", PRICE).await;
    let orch = orchestrator_with(
        db.clone(),
        Arc::new(StaticProvider::pending(ProviderId::Pixelle)),
    );

    let job = orch.submit_generation("u1", input()).await.unwrap();

    let payload = json!({"job_id": job.external_job_id, "phase": "succeeded"});
    orch.reconcile_callback(ProviderId::Pixelle, &payload)
        .await
        .unwrap();

    let snapshot = orch.reconcile_job("u1", &job.id).await.unwrap();
    assert_eq!(snapshot.state, JobState::Failed);
    assert!(snapshot.result_url.is_none());
    assert_eq!(
        snapshot.failure_reason.as_deref(),
        Some(orchestrator::failure::REASON_NO_RESULT)
    );
    assert_eq!(ledger::balance_of(db.pool(), "u1").await.unwrap(), PRICE);
    assert_eq!(refund_count(&db, "u1").await, 1);
}

// Poll-driven lifecycle: sub-states surface while generating, then the job
// completes.
#[tokio::test]
async fn poll_driven_lifecycle_surfaces_sub_states() {
    let db = test_db().await;
    user_with_balance(&db, "u1", PRICE).await;
    let orch = orchestrator_with(
        db.clone(),
        Arc::new(SequenceProvider::new(
            ProviderId::Kinetic,
            vec![
                NormalizedStatus::generating(Some("queuing".to_string())),
                NormalizedStatus::succeeded("https://cdn.example/v.mp4"),
            ],
        )),
    );

    let mut job_input = input();
    job_input.provider = Some(ProviderId::Kinetic);
    let job = orch.submit_generation("u1", job_input).await.unwrap();

    let first = orch.reconcile_job("u1", &job.id).await.unwrap();
    assert_eq!(first.state, JobState::Processing);
    assert_eq!(first.sub_state.as_deref(), Some("queuing"));

    let second = orch.reconcile_job("u1", &job.id).await.unwrap();
    assert_eq!(second.state, JobState::Completed);
    assert!(second.sub_state.is_none());
}

/// Accepts submissions but cannot be polled; for exercising the
/// report-last-known-state path.
struct UnpollableProvider;

#[async_trait]
impl VideoProvider for UnpollableProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Pixelle
    }

    async fn submit(&self, _req: &SubmitRequest) -> Result<SubmitReceipt, ProviderError> {
        Ok(SubmitReceipt::with_task_id("up-job-1", "up-task-1"))
    }

    async fn poll_status(&self, _id: &str) -> Result<NormalizedStatus, ProviderError> {
        Err(ProviderError::Unavailable("mock: poll unavailable".to_string()))
    }

    fn parse_callback(&self, _raw: &serde_json::Value) -> Result<CallbackEvent, CallbackError> {
        Err(CallbackError::Unrecognized)
    }
}

// A failed status check never fails the job; the poll reports persisted
// truth.
#[tokio::test]
async fn provider_outage_reports_last_persisted_state() {
    let db = test_db().await;
    user_with_balance(&db, "u1", PRICE).await;
    let orch = orchestrator_with(db.clone(), Arc::new(UnpollableProvider));

    let job = orch.submit_generation("u1", input()).await.unwrap();

    let snapshot = orch.reconcile_job("u1", &job.id).await.unwrap();
    assert_eq!(snapshot.state, JobState::Processing);
    assert_eq!(refund_count(&db, "u1").await, 0);
}

// Webhooks that correlate to nothing are ignored, not errors.
#[tokio::test]
async fn unknown_and_malformed_callbacks_are_ignored() {
    let db = test_db().await;
    user_with_balance(&db, "u1", PRICE).await;
    let orch = orchestrator_with(
        db.clone(),
        Arc::new(StaticProvider::pending(ProviderId::Pixelle)),
    );

    let unknown = orch
        .reconcile_callback(
            ProviderId::Pixelle,
            &success_payload("no-such-job", "https://cdn.example/v.mp4"),
        )
        .await
        .unwrap();
    assert_eq!(unknown, CallbackOutcome::Ignored);

    let malformed = orch
        .reconcile_callback(ProviderId::Pixelle, &json!({"hello": "world"}))
        .await
        .unwrap();
    assert_eq!(malformed, CallbackOutcome::Ignored);
}

// Payment confirmation is idempotent under duplicate delivery.
#[tokio::test]
async fn payment_confirmation_credits_once() {
    let db = test_db().await;
    user_with_balance(&db, "u1", 0).await;
    let orch = orchestrator_with(
        db.clone(),
        Arc::new(StaticProvider::pending(ProviderId::Pixelle)),
    );

    let first = orch
        .confirm_payment("u1", "creator-plan", 250, "cs_test_abc123")
        .await
        .unwrap();
    assert_eq!(first, PaymentOutcome::Credited);

    let replay = orch
        .confirm_payment("u1", "creator-plan", 250, "cs_test_abc123")
        .await
        .unwrap();
    assert_eq!(replay, PaymentOutcome::AlreadyProcessed);

    assert_eq!(ledger::balance_of(db.pool(), "u1").await.unwrap(), 250);
}

// Regeneration charges again and creates a fresh job against the saved
// product.
#[tokio::test]
async fn regenerate_creates_new_job_from_saved_product() {
    let db = test_db().await;
    user_with_balance(&db, "u1", 2 * PRICE).await;
    let orch = orchestrator_with(
        db.clone(),
        Arc::new(StaticProvider::pending(ProviderId::Pixelle)),
    );

    let mut job_input = input();
    job_input.save_product = true;
    let original = orch.submit_generation("u1", job_input).await.unwrap();
    assert!(original.product_id.is_some());

    let rerun = orch.regenerate("u1", &original.id).await.unwrap();
    assert_ne!(rerun.id, original.id);
    assert_eq!(rerun.product_id, original.product_id);
    assert_eq!(rerun.prompt, original.prompt);
    assert_eq!(rerun.state, JobState::Processing);

    assert_eq!(ledger::balance_of(db.pool(), "u1").await.unwrap(), 0);
    assert_eq!(orch.list_jobs("u1", 10).await.unwrap().len(), 2);
}
