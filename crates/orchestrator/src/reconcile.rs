//! The reconciliation engine.
//!
//! A processing job resolves through either channel: a client poll that asks
//! the provider for status, or a provider webhook that pushes it. Both funnel
//! into [`Orchestrator::apply_status`], whose terminal transitions are
//! conditional updates in the job store. Whichever signal commits first wins;
//! duplicates and races affect zero rows.

use std::str::FromStr;

use database::{job, GenerationJob};
use provider_core::{JobPhase, NormalizedStatus, ProviderId};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::OrchestratorError;
use crate::failure;
use crate::orchestrator::Orchestrator;
use crate::types::{CallbackOutcome, JobSnapshot};
use crate::COINS_PER_VIDEO;

impl Orchestrator {
    /// Poll-driven reconciliation: resolve one job on behalf of its owner.
    ///
    /// Terminal jobs return their snapshot without side effects. For a
    /// processing job the provider is polled first; if the provider cannot
    /// be reached the last persisted state is reported instead. A job is
    /// never failed merely because one status check did not complete.
    pub async fn reconcile_job(
        &self,
        user_id: &str,
        job_id: &str,
    ) -> Result<JobSnapshot, OrchestratorError> {
        let current = job::get_job_for_user(self.db().pool(), job_id, user_id).await?;

        if current.state.is_terminal() {
            return Ok(JobSnapshot::from(&current));
        }

        let provider_id = ProviderId::from_str(&current.provider)
            .map_err(|e| OrchestratorError::UnknownProvider(e.0))?;
        let provider = self.provider(provider_id)?;

        let status = match provider.poll_status(&current.external_job_id).await {
            Ok(status) => status,
            Err(e) => {
                warn!(
                    job_id = %job_id,
                    provider = %provider_id,
                    error = %e,
                    "Status poll failed, reporting last persisted state"
                );
                return Ok(JobSnapshot::from(&current));
            }
        };

        self.apply_status(&current, status).await?;

        let refreshed = job::get_job(self.db().pool(), job_id).await?;
        Ok(JobSnapshot::from(&refreshed))
    }

    /// Callback-driven reconciliation: resolve whatever job a raw webhook
    /// payload refers to.
    ///
    /// Every outcome is ack-worthy. Payloads that cannot be correlated are
    /// ignored (not ours, or too late to matter); already-terminal jobs see
    /// no further mutation.
    pub async fn reconcile_callback(
        &self,
        provider_id: ProviderId,
        raw: &Value,
    ) -> Result<CallbackOutcome, OrchestratorError> {
        let Some(provider) = self.provider(provider_id).ok() else {
            warn!(provider = %provider_id, "Callback for unconfigured provider");
            return Ok(CallbackOutcome::Ignored);
        };

        let event = match provider.parse_callback(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!(provider = %provider_id, error = %e, "Unparseable callback payload");
                return Ok(CallbackOutcome::Ignored);
            }
        };

        let job = match job::find_by_external_id(
            self.db().pool(),
            provider_id.as_str(),
            &event.external_job_id,
        )
        .await?
        {
            Some(job) => job,
            None => {
                warn!(
                    provider = %provider_id,
                    external_job_id = %event.external_job_id,
                    "Callback references no known job"
                );
                return Ok(CallbackOutcome::Ignored);
            }
        };

        if job.state.is_terminal() {
            debug!(job_id = %job.id, "Duplicate callback for terminal job");
            return Ok(CallbackOutcome::AlreadyTerminal);
        }

        self.apply_status(&job, event.status).await?;
        Ok(CallbackOutcome::Applied)
    }

    /// Apply one normalized status to a processing job.
    ///
    /// Success without a playable URL is conservatively treated as failure:
    /// a job is never marked completed without content, and the user gets
    /// their coins back now rather than waiting on a better-formed signal
    /// that may never come.
    pub(crate) async fn apply_status(
        &self,
        current: &GenerationJob,
        status: NormalizedStatus,
    ) -> Result<(), OrchestratorError> {
        match status.phase {
            JobPhase::Generating => {
                job::update_sub_state(self.db().pool(), &current.id, status.sub_state.as_deref())
                    .await?;
                debug!(
                    job_id = %current.id,
                    sub_state = ?status.sub_state,
                    "Job still generating"
                );
                Ok(())
            }

            JobPhase::Succeeded => match status.result_url.as_deref().filter(|u| !u.is_empty()) {
                Some(url) => {
                    let transitioned = job::complete(self.db().pool(), &current.id, url).await?;
                    if transitioned {
                        info!(job_id = %current.id, "Job completed");
                    } else {
                        debug!(job_id = %current.id, "Completion lost to an earlier signal");
                    }
                    Ok(())
                }
                None => {
                    self.fail_job(current, failure::REASON_NO_RESULT).await
                }
            },

            JobPhase::Failed => {
                let reason = failure::categorize(status.failure_detail.as_deref());
                if let Some(detail) = &status.failure_detail {
                    warn!(job_id = %current.id, detail = %detail, "Provider reported failure");
                }
                self.fail_job(current, reason).await
            }
        }
    }

    async fn fail_job(
        &self,
        current: &GenerationJob,
        reason: &str,
    ) -> Result<(), OrchestratorError> {
        let transitioned = job::fail_and_refund(
            self.db().pool(),
            &current.id,
            &current.user_id,
            reason,
            COINS_PER_VIDEO,
            &format!("Refund: video generation failed ({})", current.provider),
        )
        .await?;

        if transitioned {
            info!(
                job_id = %current.id,
                user_id = %current.user_id,
                coins = COINS_PER_VIDEO,
                "Job failed, coins refunded"
            );
        } else {
            debug!(job_id = %current.id, "Failure lost to an earlier signal");
        }

        Ok(())
    }
}
