//! Sequential per-job upload execution.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use autoupload_core::validation::UploadJob;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

use crate::uploader::{FileUploader, UploadRequest};

/// Which file of a job an outcome refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Video,
    /// The danmu XML written next to the recording.
    Companion,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => f.write_str("video"),
            Self::Companion => f.write_str("danmu"),
        }
    }
}

/// Result of one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub kind: FileKind,
    pub path: PathBuf,
    pub succeeded: bool,
    /// HTTP status, when the upload API answered at all.
    pub status: Option<u16>,
    /// Response body, or the transport error when there was no response.
    pub detail: String,
}

/// Runs the uploads for a job: the video first, then the danmu file if
/// it exists.
///
/// The companion upload is attempted even when the video upload failed.
/// Each file gets exactly one attempt.
///
/// Clones share one task tracker, so [`UploadExecutor::shutdown`] on any
/// clone waits for jobs spawned through all of them.
#[derive(Clone)]
pub struct UploadExecutor {
    uploader: Arc<dyn FileUploader>,
    tracker: TaskTracker,
}

impl UploadExecutor {
    pub fn new(uploader: Arc<dyn FileUploader>) -> Self {
        Self {
            uploader,
            tracker: TaskTracker::new(),
        }
    }

    /// Run `job` on a detached task.
    ///
    /// Callers are free to drop the handle; a panic inside the task stays
    /// inside the task. The task is still counted by [`Self::in_flight`]
    /// and awaited by [`Self::shutdown`].
    pub fn spawn(&self, job: UploadJob) -> JoinHandle<Vec<UploadOutcome>> {
        let executor = self.clone();
        let span = tracing::info_span!("upload", event_id = %job.event_id, room_id = job.room_id);
        self.tracker
            .spawn(async move { executor.execute(job).await }.instrument(span))
    }

    /// Number of spawned jobs that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait for every spawned job to finish.
    ///
    /// Jobs spawned after this is called are waited for too, as long as
    /// they start before the last running one ends.
    pub async fn shutdown(&self) {
        self.tracker.close();
        let running = self.tracker.len();
        if running > 0 {
            tracing::info!(running, "Waiting for in-flight uploads to finish");
        }
        self.tracker.wait().await;
        tracing::debug!("All uploads finished");
    }

    /// Upload the video, then the companion file when present.
    pub async fn execute(&self, job: UploadJob) -> Vec<UploadOutcome> {
        let mut outcomes = Vec::with_capacity(2);

        outcomes.push(self.upload_file(FileKind::Video, &job.video_path, &job).await);

        if job.companion_path.is_file() {
            outcomes.push(
                self.upload_file(FileKind::Companion, &job.companion_path, &job)
                    .await,
            );
        } else {
            tracing::debug!(
                path = %job.companion_path.display(),
                "No danmu file to upload",
            );
        }

        outcomes
    }

    async fn upload_file(&self, kind: FileKind, path: &Path, job: &UploadJob) -> UploadOutcome {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::info!(%kind, file = %file_name, url = %job.post_url, "Uploading file");

        let request = UploadRequest {
            file: path,
            token: &job.token,
            mrid: &job.mrid,
            post_url: &job.post_url,
        };

        match self.uploader.upload(request).await {
            Ok(response) if response.is_success() => {
                tracing::info!(
                    %kind,
                    file = %file_name,
                    status = response.status,
                    response = %response.body,
                    "Upload succeeded",
                );
                UploadOutcome {
                    kind,
                    path: path.to_path_buf(),
                    succeeded: true,
                    status: Some(response.status),
                    detail: response.body,
                }
            }
            Ok(response) => {
                tracing::error!(
                    %kind,
                    file = %file_name,
                    status = response.status,
                    response = %response.body,
                    "Upload rejected by the upload API",
                );
                UploadOutcome {
                    kind,
                    path: path.to_path_buf(),
                    succeeded: false,
                    status: Some(response.status),
                    detail: response.body,
                }
            }
            Err(e) => {
                tracing::error!(
                    %kind,
                    file = %file_name,
                    status = ?e.status(),
                    error = %e,
                    "Upload failed",
                );
                UploadOutcome {
                    kind,
                    path: path.to_path_buf(),
                    succeeded: false,
                    status: e.status(),
                    detail: e.to_string(),
                }
            }
        }
    }
}
