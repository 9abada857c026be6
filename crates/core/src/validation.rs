//! Inbound event validation.
//!
//! [`validate`] runs the checks below in order and stops at the first one
//! that fails:
//!
//! 1. the body is a JSON object
//! 2. `id`, `date`, `type` and `data` are all present
//! 3. `type` is [`VIDEO_POSTPROCESSING_COMPLETED`]
//! 4. `data` carries an integer `room_id` and a string `path`
//! 5. the file name ends in `.mp4`
//! 6. the file exists
//! 7. the room is configured
//!
//! The function only reads the filesystem and the config store, so calling
//! it twice on an unchanged filesystem gives the same answer.

use std::path::{Path, PathBuf};

use crate::config::RoomConfigStore;
use crate::event::{
    InboundEvent, COMPANION_EXTENSION, REQUIRED_FIELDS, VIDEO_EXTENSION,
    VIDEO_POSTPROCESSING_COMPLETED,
};
use crate::types::RoomId;

/// Why an inbound event was not turned into an [`UploadJob`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectionReason {
    #[error("Request body is not a valid event: {0}")]
    MalformedBody(String),

    #[error("Request is missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Not an error: blrec posts every event type to the same hook.
    #[error("Event type {0} does not trigger an upload")]
    WrongEventType(String),

    #[error("Not an mp4 file: {}", .0.display())]
    WrongFileType(PathBuf),

    #[error("Recording does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Room {0} is not configured")]
    UnknownRoom(RoomId),
}

impl RejectionReason {
    /// `true` for events that are simply not ours to handle.
    pub fn is_irrelevant_event(&self) -> bool {
        matches!(self, Self::WrongEventType(_))
    }

    /// Stable machine-readable code for logs and error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedBody(_) => "MALFORMED_BODY",
            Self::MissingFields(_) => "MISSING_FIELDS",
            Self::WrongEventType(_) => "IGNORED_EVENT_TYPE",
            Self::WrongFileType(_) => "WRONG_FILE_TYPE",
            Self::FileNotFound(_) => "FILE_NOT_FOUND",
            Self::UnknownRoom(_) => "UNKNOWN_ROOM",
        }
    }
}

/// A validated unit of upload work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    /// Correlation id of the event that produced this job.
    pub event_id: String,
    pub room_id: RoomId,
    pub video_path: PathBuf,
    /// Danmu file next to the video. May not exist.
    pub companion_path: PathBuf,
    pub token: String,
    pub mrid: String,
    pub post_url: String,
}

/// Validate a raw webhook body against the configured rooms.
pub fn validate(raw_body: &[u8], rooms: &RoomConfigStore) -> Result<UploadJob, RejectionReason> {
    let value: serde_json::Value = serde_json::from_slice(raw_body)
        .map_err(|e| RejectionReason::MalformedBody(e.to_string()))?;

    let serde_json::Value::Object(object) = value else {
        return Err(RejectionReason::MalformedBody(
            "expected a JSON object".to_string(),
        ));
    };

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(RejectionReason::MissingFields(missing));
    }

    match object.get("type").and_then(serde_json::Value::as_str) {
        Some(VIDEO_POSTPROCESSING_COMPLETED) => {}
        Some(other) => return Err(RejectionReason::WrongEventType(other.to_string())),
        None => {
            return Err(RejectionReason::MalformedBody(
                "`type` must be a string".to_string(),
            ))
        }
    }

    let event: InboundEvent = serde_json::from_value(serde_json::Value::Object(object))
        .map_err(|e| RejectionReason::MalformedBody(e.to_string()))?;

    let video_path = event.data.path;
    let Some(companion_path) = companion_path_for(&video_path) else {
        return Err(RejectionReason::WrongFileType(video_path));
    };

    if !video_path.is_file() {
        return Err(RejectionReason::FileNotFound(video_path));
    }

    let room = rooms
        .lookup(event.data.room_id)
        .ok_or(RejectionReason::UnknownRoom(event.data.room_id))?;

    Ok(UploadJob {
        event_id: event.id,
        room_id: room.room_id,
        video_path,
        companion_path,
        token: room.token.clone(),
        mrid: room.mrid.clone(),
        post_url: room.post_url.clone(),
    })
}

/// Path of the danmu file belonging to `video`.
///
/// Returns `None` when the file name does not end in `.mp4`.
pub fn companion_path_for(video: &Path) -> Option<PathBuf> {
    let name = video.file_name()?.to_str()?;
    let stem = name.strip_suffix(&format!(".{VIDEO_EXTENSION}"))?;
    Some(video.with_file_name(format!("{stem}.{COMPANION_EXTENSION}")))
}
