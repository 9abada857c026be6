//! Multipart upload client.
//!
//! [`HttpUploader`] posts one file per call as `multipart/form-data` with
//! the fields the upload API expects (`file`, `token`, `model`, and `mrid`
//! when set). The file is streamed from disk so large recordings are never
//! held in memory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;

/// Fixed `model` field value required by the upload API.
pub const UPLOAD_MODEL: &str = "2";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for a single upload attempt that produced no usable response.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The local file could not be opened or inspected.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The underlying HTTP request failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered but its body could not be read.
    #[error("Upload API returned {status} but the body could not be read: {source}")]
    Body {
        status: u16,
        #[source]
        source: reqwest::Error,
    },
}

impl UploadError {
    /// HTTP status the API answered with, if it got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Body { status, .. } => Some(*status),
            Self::Io { .. } | Self::Request(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// One file to send, with the room credentials it is sent under.
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    pub file: &'a Path,
    pub token: &'a str,
    /// Left out of the form when empty.
    pub mrid: &'a str,
    pub post_url: &'a str,
}

/// Status and raw body returned by the upload API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResponse {
    pub status: u16,
    pub body: String,
}

impl UploadResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ---------------------------------------------------------------------------
// FileUploader
// ---------------------------------------------------------------------------

/// Transport used by the executor to push a single file.
#[async_trait]
pub trait FileUploader: Send + Sync {
    /// Perform one upload attempt.
    ///
    /// Any HTTP response, successful or not, is returned as `Ok`. `Err` means
    /// no response was received, or one whose body could not be read.
    async fn upload(&self, request: UploadRequest<'_>) -> Result<UploadResponse, UploadError>;
}

/// [`FileUploader`] backed by [`reqwest`] multipart requests.
pub struct HttpUploader {
    client: reqwest::Client,
}

impl HttpUploader {
    /// Build an uploader with its own HTTP client.
    ///
    /// No overall timeout is set: recordings can take minutes to transfer.
    pub fn new(accept_invalid_certs: bool) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;
        Ok(Self { client })
    }

    async fn file_part(path: &Path) -> Result<Part, UploadError> {
        let io_err = |source| UploadError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = tokio::fs::File::open(path).await.map_err(io_err)?;
        let len = file.metadata().await.map_err(io_err)?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = Part::stream_with_length(body, len)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        Ok(part)
    }
}

#[async_trait]
impl FileUploader for HttpUploader {
    async fn upload(&self, request: UploadRequest<'_>) -> Result<UploadResponse, UploadError> {
        let mut form = Form::new()
            .part("file", Self::file_part(request.file).await?)
            .text("token", request.token.to_string())
            .text("model", UPLOAD_MODEL);
        if !request.mrid.is_empty() {
            form = form.text("mrid", request.mrid.to_string());
        }

        let response = self
            .client
            .post(request.post_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| UploadError::Body { status, source })?;
        Ok(UploadResponse { status, body })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
