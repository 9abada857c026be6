use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Path blrec is configured to post its events to.
pub const WEBHOOK_PATH: &str = "/blrec-autoupload";

/// Mount the webhook receiver.
pub fn router() -> Router<AppState> {
    Router::new().route(WEBHOOK_PATH, post(handlers::webhook::receive_event))
}
