//! Tests for `AppError` → HTTP response mapping.
//!
//! These tests call `IntoResponse` directly on `AppError` values; no
//! router is involved.

use std::path::PathBuf;

use autoupload_api::error::AppError;
use autoupload_core::validation::RejectionReason;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: unknown room maps to 400 with UNKNOWN_ROOM code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_room_returns_400() {
    let err = AppError::from(RejectionReason::UnknownRoom(99));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "UNKNOWN_ROOM");
    assert_eq!(json["error"], "Room 99 is not configured");
}

// ---------------------------------------------------------------------------
// Test: wrong file type maps to 400 and names the path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn wrong_file_type_returns_400() {
    let err = AppError::from(RejectionReason::WrongFileType(PathBuf::from("/tmp/a.txt")));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "WRONG_FILE_TYPE");
    assert_eq!(json["error"], "Not an mp4 file: /tmp/a.txt");
}

// ---------------------------------------------------------------------------
// Test: malformed body maps to 400 with MALFORMED_BODY code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_body_returns_400() {
    let err = AppError::from(RejectionReason::MalformedBody("expected a JSON object".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "MALFORMED_BODY");
    assert_eq!(
        json["error"],
        "Request body is not a valid event: expected a JSON object"
    );
}
