use autoupload_core::validation::RejectionReason;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
/// Webhook callers only look at the status code; the body is for humans.
/// Irrelevant event types never reach this type: the handler acknowledges
/// them with a plain 200.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The inbound event failed validation.
    #[error(transparent)]
    Rejected(#[from] RejectionReason),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Rejected(reason) => {
                (StatusCode::BAD_REQUEST, reason.code(), reason.to_string())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
