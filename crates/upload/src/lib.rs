//! Upload execution for validated jobs.
//!
//! [`UploadExecutor`] takes an [`UploadJob`](autoupload_core::validation::UploadJob)
//! and pushes the recording, then its danmu file when one exists, to the
//! room's upload endpoint through a [`FileUploader`]. Outcomes are logged;
//! nothing is retried.

pub mod executor;
pub mod uploader;

pub use executor::{FileKind, UploadExecutor, UploadOutcome};
pub use uploader::{FileUploader, HttpUploader, UploadError, UploadRequest, UploadResponse};
