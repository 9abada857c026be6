//! blrec webhook handler.
//!
//! Validates the event, answers right away, and leaves the transfer to a
//! detached upload task so large recordings never hold the request open.

use autoupload_core::validation::{self, RejectionReason};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};

use crate::error::AppResult;
use crate::state::AppState;

/// POST /blrec-autoupload
///
/// Responds 200 once the job is dispatched, 200 for event types that do not
/// trigger uploads, and 400 for every other rejection.
pub async fn receive_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<StatusCode> {
    tracing::info!("Received a new webhook request");

    if !is_json_content_type(&headers) {
        let reason = RejectionReason::MalformedBody("Content-Type must be JSON".to_string());
        tracing::error!(code = reason.code(), %reason, "Rejected webhook event");
        return Err(reason.into());
    }

    let job = match validation::validate(&body, &state.rooms) {
        Ok(job) => job,
        Err(reason) if reason.is_irrelevant_event() => {
            tracing::info!(%reason, "Skipping event");
            return Ok(StatusCode::OK);
        }
        Err(reason) => {
            tracing::error!(code = reason.code(), %reason, "Rejected webhook event");
            return Err(reason.into());
        }
    };

    tracing::debug!(
        event_id = %job.event_id,
        room_id = job.room_id,
        path = %job.video_path.display(),
        "Event validated",
    );
    if !job.companion_path.is_file() {
        tracing::info!(
            room_id = job.room_id,
            "No danmu file found, uploading only the video file",
        );
    }

    tracing::info!(
        event_id = %job.event_id,
        room_id = job.room_id,
        "Dispatching upload",
    );
    // Detached: the handle is dropped and the response does not wait.
    drop(state.executor.spawn(job));

    Ok(StatusCode::OK)
}

/// Accepts `application/json` and `application/*+json`, with parameters.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}
