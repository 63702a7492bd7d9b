//! Generation endpoints: dispatch, listing, polling and regeneration.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use database::GenerationJob;
use orchestrator::{GenerationInput, JobSnapshot};
use serde::{Deserialize, Serialize};

use crate::auth::AuthedUser;
use crate::error::Result;
use crate::state::AppState;

/// Default and maximum page sizes for job listing.
const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

/// Submit a new generation.
pub async fn create(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(input): Json<GenerationInput>,
) -> Result<(StatusCode, Json<GenerationJob>)> {
    let job = state.orchestrator.submit_generation(&user.id, input).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct JobList {
    jobs: Vec<GenerationJob>,
}

/// List the caller's jobs, newest first.
pub async fn list(
    State(state): State<AppState>,
    user: AuthedUser,
    Query(params): Query<ListParams>,
) -> Result<Json<JobList>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let jobs = state.orchestrator.list_jobs(&user.id, limit).await?;
    Ok(Json(JobList { jobs }))
}

/// Poll one job, reconciling against the provider first if still processing.
pub async fn status(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(job_id): Path<String>,
) -> Result<Json<JobSnapshot>> {
    let snapshot = state.orchestrator.reconcile_job(&user.id, &job_id).await?;
    Ok(Json(snapshot))
}

#[derive(Debug, Deserialize)]
pub struct RegenerateRequest {
    job_id: String,
}

/// Re-run a prior job against its saved product.
pub async fn regenerate(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(request): Json<RegenerateRequest>,
) -> Result<(StatusCode, Json<GenerationJob>)> {
    let job = state
        .orchestrator
        .regenerate(&user.id, &request.job_id)
        .await?;
    Ok((StatusCode::CREATED, Json(job)))
}
