//! Defensive parsing of Kinetic callback payloads.
//!
//! Three shapes have been observed in the wild:
//!
//! 1. the documented shape: `{code, msg, data: {taskId, state, resultJson,
//!    failMsg}}` where `resultJson` is a JSON *string* carrying
//!    `resultUrls`;
//! 2. the record-info shape: `{code, msg, data: {taskId, successFlag,
//!    response: {taskId, resultUrls}, errorMessage}}`;
//! 3. a legacy flat shape with `result_urls`/`resultUrls` directly under
//!    `data` and the task id sometimes at the payload root.
//!
//! Each extractor below tries the strategies in order; the first hit wins.
//! A payload that correlates but yields no verdict parses as
//! success-without-URL, which the reconciliation engine conservatively
//! fails; a recognizable-but-degraded callback must never leave a job
//! hanging in `processing`.

use provider_core::{CallbackError, CallbackEvent, NormalizedStatus};
use serde_json::Value;
use tracing::debug;

/// Pull the correlation id out of the payload, wherever this release put it.
pub fn extract_task_id(raw: &Value) -> Option<String> {
    let candidates = [
        raw.pointer("/data/taskId"),
        raw.get("taskId"),
        raw.pointer("/data/response/taskId"),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|id| !id.is_empty())
        .map(str::to_string)
}

/// Pull the first result URL out of the payload, trying each known location.
pub fn extract_result_url(raw: &Value) -> Option<String> {
    let array_locations = [
        "/data/response/resultUrls",
        "/data/result_urls",
        "/data/resultUrls",
    ];

    for location in array_locations {
        if let Some(url) = raw
            .pointer(location)
            .and_then(Value::as_array)
            .and_then(|urls| urls.first())
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
        {
            return Some(url.to_string());
        }
    }

    raw.pointer("/data/resultJson")
        .and_then(Value::as_str)
        .and_then(result_url_from_json)
}

/// Parse the embedded `resultJson` string and pull `resultUrls[0]`.
pub fn result_url_from_json(result_json: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(result_json).ok()?;
    parsed
        .get("resultUrls")
        .and_then(Value::as_array)
        .and_then(|urls| urls.first())
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

fn failure_detail(raw: &Value) -> Option<String> {
    let candidates = [
        raw.pointer("/data/failMsg"),
        raw.pointer("/data/errorMessage"),
        raw.get("msg"),
        raw.get("message"),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|msg| !msg.is_empty())
        .map(str::to_string)
}

fn success_with_optional_url(raw: &Value) -> NormalizedStatus {
    match extract_result_url(raw) {
        Some(url) => NormalizedStatus::succeeded(url),
        None => NormalizedStatus::succeeded_without_url(),
    }
}

/// Parse a raw Kinetic callback into a correlation id and normalized status.
pub fn parse(raw: &Value) -> Result<CallbackEvent, CallbackError> {
    let external_job_id = extract_task_id(raw).ok_or(CallbackError::Unrecognized)?;

    // Strategy 1: the documented `state` word.
    if let Some(state) = raw.pointer("/data/state").and_then(Value::as_str) {
        let status = match state {
            "success" => success_with_optional_url(raw),
            "fail" => NormalizedStatus::failed(failure_detail(raw)),
            other => NormalizedStatus::generating(Some(other.to_string())),
        };
        return Ok(CallbackEvent {
            external_job_id,
            status,
        });
    }

    // Strategy 2: the record-info `successFlag` (0=generating, 1=success,
    // 2/3=failed).
    if let Some(flag) = raw.pointer("/data/successFlag").and_then(Value::as_i64) {
        let status = match flag {
            0 => NormalizedStatus::generating(None),
            1 => success_with_optional_url(raw),
            _ => NormalizedStatus::failed(failure_detail(raw)),
        };
        return Ok(CallbackEvent {
            external_job_id,
            status,
        });
    }

    // Strategy 3: legacy shapes carry no verdict field. An explicit error
    // wins; otherwise an extractable URL means success, and a payload with
    // neither is success-without-URL so the engine can resolve the job.
    if raw
        .pointer("/data/errorCode")
        .map(|code| !code.is_null())
        .unwrap_or(false)
    {
        debug!("Kinetic callback carried only an error code");
        return Ok(CallbackEvent {
            external_job_id,
            status: NormalizedStatus::failed(failure_detail(raw)),
        });
    }

    Ok(CallbackEvent {
        external_job_id,
        status: success_with_optional_url(raw),
    })
}
