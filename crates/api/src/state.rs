use std::sync::Arc;

use autoupload_core::config::RoomConfigStore;
use autoupload_upload::UploadExecutor;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Merged per-room upload settings, fixed at startup.
    pub rooms: Arc<RoomConfigStore>,
    /// Runs accepted jobs on detached tasks.
    pub executor: UploadExecutor,
}
