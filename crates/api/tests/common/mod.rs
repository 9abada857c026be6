#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use autoupload_core::config::{RoomConfig, RoomConfigStore};
use autoupload_upload::{
    FileUploader, UploadError, UploadExecutor, UploadRequest, UploadResponse,
};
use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tokio::sync::{mpsc, Notify};
use tower::ServiceExt;

use autoupload_api::config::ServerConfig;
use autoupload_api::router::build_app_router;
use autoupload_api::state::AppState;

pub const WEBHOOK: &str = "/blrec-autoupload";
pub const COMPLETED: &str = "VideoPostprocessingCompletedEvent";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
    }
}

/// Room 1 uploads to `post_url` with token `T` and no mrid.
pub fn test_rooms(post_url: &str) -> RoomConfigStore {
    RoomConfigStore::new([RoomConfig {
        room_id: 1,
        token: "T".to_string(),
        mrid: String::new(),
        post_url: post_url.to_string(),
    }])
}

/// Build the full application router around the given uploader.
///
/// Uses the same middleware stack as `main.rs`.
pub fn build_test_app(rooms: RoomConfigStore, uploader: Arc<dyn FileUploader>) -> Router {
    let state = AppState {
        rooms: Arc::new(rooms),
        executor: UploadExecutor::new(uploader),
    };
    build_app_router(state, &test_config())
}

// ---------------------------------------------------------------------------
// Recording uploader
// ---------------------------------------------------------------------------

/// One call observed by [`ChannelUploader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    pub file: PathBuf,
    pub token: String,
    pub mrid: String,
    pub post_url: String,
}

/// Forwards every upload call to a channel and answers 200.
pub struct ChannelUploader {
    tx: mpsc::UnboundedSender<RecordedUpload>,
}

#[async_trait]
impl FileUploader for ChannelUploader {
    async fn upload(&self, request: UploadRequest<'_>) -> Result<UploadResponse, UploadError> {
        let _ = self.tx.send(RecordedUpload {
            file: request.file.to_path_buf(),
            token: request.token.to_string(),
            mrid: request.mrid.to_string(),
            post_url: request.post_url.to_string(),
        });
        Ok(UploadResponse {
            status: 200,
            body: "ok".to_string(),
        })
    }
}

/// App for room 1 (`https://u`) whose uploads land in the returned receiver.
pub fn build_recording_app() -> (Router, mpsc::UnboundedReceiver<RecordedUpload>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = build_test_app(test_rooms("https://u"), Arc::new(ChannelUploader { tx }));
    (app, rx)
}

/// Holds every upload until `release` is notified, then records it.
pub struct GatedUploader {
    release: Arc<Notify>,
    tx: mpsc::UnboundedSender<RecordedUpload>,
}

#[async_trait]
impl FileUploader for GatedUploader {
    async fn upload(&self, request: UploadRequest<'_>) -> Result<UploadResponse, UploadError> {
        self.release.notified().await;
        let _ = self.tx.send(RecordedUpload {
            file: request.file.to_path_buf(),
            token: request.token.to_string(),
            mrid: request.mrid.to_string(),
            post_url: request.post_url.to_string(),
        });
        Ok(UploadResponse {
            status: 200,
            body: "ok".to_string(),
        })
    }
}

/// Like [`build_recording_app`], but uploads block until the returned
/// `Notify` is signalled once per file.
pub fn build_gated_app() -> (Router, Arc<Notify>, mpsc::UnboundedReceiver<RecordedUpload>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let release = Arc::new(Notify::new());
    let uploader = GatedUploader {
        release: release.clone(),
        tx,
    };
    let app = build_test_app(test_rooms("https://u"), Arc::new(uploader));
    (app, release, rx)
}

/// Wait for the next upload call.
pub async fn next_upload(rx: &mut mpsc::UnboundedReceiver<RecordedUpload>) -> RecordedUpload {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for an upload")
        .expect("upload channel closed")
}

/// Give detached tasks a moment, then assert nothing else was uploaded.
pub async fn assert_no_more_uploads(rx: &mut mpsc::UnboundedReceiver<RecordedUpload>) {
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rx.try_recv().is_err(), "unexpected extra upload");
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create `name` inside a fresh temp dir and return both.
pub fn recording(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, b"recording").unwrap();
    (dir, path)
}

pub fn event(event_type: &str, room_id: u64, path: &Path) -> serde_json::Value {
    serde_json::json!({
        "id": "x",
        "date": "d",
        "type": event_type,
        "data": { "room_id": room_id, "path": path },
    })
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn post_raw(app: Router, content_type: Option<&str>, body: Vec<u8>) -> Response {
    let mut builder = Request::builder().method(Method::POST).uri(WEBHOOK);
    if let Some(content_type) = content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    let request = builder.body(Body::from(body)).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, body: serde_json::Value) -> Response {
    post_raw(app, Some("application/json"), serde_json::to_vec(&body).unwrap()).await
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}
