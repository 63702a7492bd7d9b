//! The orchestrator: account provisioning, dispatch and payments.

use std::str::FromStr;
use std::sync::Arc;

use database::job::NewJob;
use database::product::ProductInput;
use database::{job, ledger, product, user, Database, GenerationJob, LedgerKind, User};
use provider_core::prompt::{build_video_prompt, PromptInput};
use provider_core::{AspectRatio, ProviderId, SubmitRequest, VideoProvider};
use tracing::{info, warn};
use uuid::Uuid;

use crate::caption::{stock_caption, CaptionWriter};
use crate::error::OrchestratorError;
use crate::providers::ProviderRegistry;
use crate::types::{GenerationInput, PaymentOutcome};
use crate::COINS_PER_VIDEO;

/// Coordinates the ledger, the job store and the provider adapters.
///
/// Holds no mutable state of its own; the database pool is the only shared
/// resource, and every guard that needs serialization lives there.
pub struct Orchestrator {
    db: Database,
    providers: ProviderRegistry,
    caption_writer: Option<Arc<dyn CaptionWriter>>,
    callback_base_url: Option<String>,
    default_provider: ProviderId,
}

impl Orchestrator {
    /// Create an orchestrator over the given database and providers.
    pub fn new(db: Database, providers: ProviderRegistry) -> Self {
        Self {
            db,
            providers,
            caption_writer: None,
            callback_base_url: None,
            default_provider: ProviderId::Pixelle,
        }
    }

    /// Attach a caption writer. Without one, dispatch uses the stock caption.
    pub fn with_caption_writer(mut self, writer: Arc<dyn CaptionWriter>) -> Self {
        self.caption_writer = Some(writer);
        self
    }

    /// Set the public base URL providers should call back on
    /// (e.g. `https://service.example`). Without one, providers are not asked
    /// to call back and jobs resolve by polling alone.
    pub fn with_callback_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.callback_base_url = Some(base_url.into());
        self
    }

    /// Set the provider used when a submission names none.
    pub fn with_default_provider(mut self, provider: ProviderId) -> Self {
        self.default_provider = provider;
        self
    }

    /// Get the database handle.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Get a user, provisioning the account (and its welcome bonus) on
    /// first sight.
    pub async fn ensure_account(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<User, OrchestratorError> {
        Ok(user::ensure_user(self.db.pool(), user_id, name).await?)
    }

    /// List a user's jobs, newest first.
    pub async fn list_jobs(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<GenerationJob>, OrchestratorError> {
        Ok(job::list_for_user(self.db.pool(), user_id, limit).await?)
    }

    /// Submit a new generation job.
    ///
    /// Order matters: validation and the balance precheck reject before any
    /// external call; the provider must accept before any coin moves; and
    /// the debit, ledger entry and job row land in one transaction.
    pub async fn submit_generation(
        &self,
        user_id: &str,
        input: GenerationInput,
    ) -> Result<GenerationJob, OrchestratorError> {
        validate_input(&input)?;

        let account = user::get_user(self.db.pool(), user_id).await?;
        if account.balance < COINS_PER_VIDEO {
            return Err(OrchestratorError::InsufficientBalance);
        }

        let caption = self.resolve_caption(&input).await;
        let product_id = self.save_product_if_asked(user_id, &input, &caption).await?;

        let prompt = build_video_prompt(&PromptInput {
            name: &input.name,
            features: &input.features,
            concept: &input.concept,
            target_audience: &input.target_audience,
            image_url: Some(&input.image_url),
        });

        let provider_id = input.provider.unwrap_or(self.default_provider);
        let provider = self.provider(provider_id)?;

        let receipt = provider
            .submit(&SubmitRequest {
                prompt: prompt.clone(),
                image_urls: vec![input.image_url.clone()],
                aspect_ratio: AspectRatio::Portrait,
                callback_url: self.callback_url_for(provider_id),
            })
            .await?;

        info!(
            user_id = %user_id,
            provider = %provider_id,
            external_job_id = %receipt.external_job_id,
            "Provider accepted generation"
        );

        let new_job = NewJob {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            product_id,
            provider: provider_id.as_str().to_string(),
            external_job_id: receipt.external_job_id,
            external_task_id: receipt.external_task_id,
            prompt,
            aspect_ratio: AspectRatio::Portrait.as_str().to_string(),
            source_image_url: input.image_url.clone(),
            caption: Some(caption),
        };

        let created = job::create_charged(
            self.db.pool(),
            &new_job,
            COINS_PER_VIDEO,
            &format!("Video generation: {}", input.name),
        )
        .await?;

        Ok(created)
    }

    /// Re-run a prior job against its saved product.
    ///
    /// A new job row with the old prompt and caption; the original is never
    /// touched.
    pub async fn regenerate(
        &self,
        user_id: &str,
        job_id: &str,
    ) -> Result<GenerationJob, OrchestratorError> {
        let original = job::get_job_for_user(self.db.pool(), job_id, user_id).await?;

        let product_id = original.product_id.clone().ok_or_else(|| {
            OrchestratorError::Validation("job has no saved product to regenerate from".to_string())
        })?;
        let source = product::get_product(self.db.pool(), &product_id).await?;
        if source.image_url.is_empty() {
            return Err(OrchestratorError::Validation(
                "saved product has no image".to_string(),
            ));
        }

        let account = user::get_user(self.db.pool(), user_id).await?;
        if account.balance < COINS_PER_VIDEO {
            return Err(OrchestratorError::InsufficientBalance);
        }

        let provider_id = ProviderId::from_str(&original.provider)
            .map_err(|e| OrchestratorError::UnknownProvider(e.0))?;
        let provider = self.provider(provider_id)?;

        let receipt = provider
            .submit(&SubmitRequest {
                prompt: original.prompt.clone(),
                image_urls: vec![source.image_url.clone()],
                aspect_ratio: AspectRatio::parse_lossy(&original.aspect_ratio),
                callback_url: self.callback_url_for(provider_id),
            })
            .await?;

        let new_job = NewJob {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            product_id: Some(product_id),
            provider: original.provider.clone(),
            external_job_id: receipt.external_job_id,
            external_task_id: receipt.external_task_id,
            prompt: original.prompt.clone(),
            aspect_ratio: original.aspect_ratio.clone(),
            source_image_url: source.image_url,
            caption: original.caption.clone(),
        };

        let created = job::create_charged(
            self.db.pool(),
            &new_job,
            COINS_PER_VIDEO,
            &format!("Video regeneration: {}", source.name),
        )
        .await?;

        Ok(created)
    }

    /// Record a confirmed external payment and credit its coins.
    ///
    /// Idempotent under at-least-once delivery: the payment id is the ledger
    /// entry's unique external reference, so a replay (webhook retry or a
    /// second client-side verification) reports
    /// [`PaymentOutcome::AlreadyProcessed`] and credits nothing.
    pub async fn confirm_payment(
        &self,
        user_id: &str,
        plan_id: &str,
        coin_amount: i64,
        external_payment_id: &str,
    ) -> Result<PaymentOutcome, OrchestratorError> {
        if coin_amount <= 0 {
            return Err(OrchestratorError::Validation(
                "coin amount must be positive".to_string(),
            ));
        }
        if external_payment_id.is_empty() {
            return Err(OrchestratorError::Validation(
                "missing external payment id".to_string(),
            ));
        }

        // Fails NotFound for unknown users before anything is written.
        user::get_user(self.db.pool(), user_id).await?;

        let result = ledger::credit(
            self.db.pool(),
            user_id,
            coin_amount,
            LedgerKind::Purchase,
            &format!("Purchased {plan_id}: +{coin_amount} coins"),
            Some(external_payment_id),
        )
        .await;

        match result {
            Ok(()) => {
                info!(user_id = %user_id, coins = coin_amount, "Credited purchase");
                Ok(PaymentOutcome::Credited)
            }
            Err(database::DatabaseError::AlreadyRecorded { reference }) => {
                info!(reference = %reference, "Payment already processed");
                Ok(PaymentOutcome::AlreadyProcessed)
            }
            Err(other) => Err(other.into()),
        }
    }

    pub(crate) fn provider(
        &self,
        id: ProviderId,
    ) -> Result<Arc<dyn VideoProvider>, OrchestratorError> {
        self.providers
            .get(id)
            .ok_or_else(|| OrchestratorError::UnknownProvider(id.to_string()))
    }

    fn callback_url_for(&self, provider: ProviderId) -> Option<String> {
        self.callback_base_url
            .as_ref()
            .map(|base| format!("{}/webhooks/{}", base.trim_end_matches('/'), provider))
    }

    async fn resolve_caption(&self, input: &GenerationInput) -> String {
        if let Some(caption) = input.caption.clone().filter(|c| !c.is_empty()) {
            return caption;
        }

        if let Some(writer) = &self.caption_writer {
            match writer.write_caption(&input.name, &input.features).await {
                Ok(caption) => return caption,
                Err(e) => warn!(error = %e, "Caption writer failed, using stock caption"),
            }
        }

        stock_caption(&input.name, &input.features)
    }

    async fn save_product_if_asked(
        &self,
        user_id: &str,
        input: &GenerationInput,
        caption: &str,
    ) -> Result<Option<String>, OrchestratorError> {
        if !input.save_product {
            return Ok(input.product_id.clone());
        }

        let fields = ProductInput {
            name: input.name.clone(),
            image_url: input.image_url.clone(),
            features: input.features.clone(),
            concept: input.concept.clone(),
            target_audience: input.target_audience.clone(),
            caption: Some(caption.to_string()),
        };

        match &input.product_id {
            Some(id) => {
                product::update_product(self.db.pool(), id, user_id, &fields).await?;
                Ok(Some(id.clone()))
            }
            None => {
                let id = Uuid::new_v4().to_string();
                let created = product::create_product(self.db.pool(), &id, user_id, &fields).await?;
                Ok(Some(created.id))
            }
        }
    }
}

fn validate_input(input: &GenerationInput) -> Result<(), OrchestratorError> {
    let required = [
        ("name", &input.name),
        ("image_url", &input.image_url),
        ("features", &input.features),
        ("concept", &input.concept),
        ("target_audience", &input.target_audience),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(OrchestratorError::Validation(format!(
                "missing required field: {field}"
            )));
        }
    }

    Ok(())
}
