//! Webhook payload sent by blrec.

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::RoomId;

/// The only event type that triggers an upload.
pub const VIDEO_POSTPROCESSING_COMPLETED: &str = "VideoPostprocessingCompletedEvent";

/// Extension of finished recordings.
pub const VIDEO_EXTENSION: &str = "mp4";

/// Extension of the danmu (comment overlay) file written next to a recording.
pub const COMPANION_EXTENSION: &str = "xml";

/// Top-level keys every event must carry.
pub const REQUIRED_FIELDS: [&str; 4] = ["id", "date", "type", "data"];

/// A parsed webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundEvent {
    /// Correlation id assigned by blrec.
    pub id: String,
    /// Event timestamp; informational only.
    pub date: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

/// Payload of a `VideoPostprocessingCompletedEvent`.
#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub room_id: RoomId,
    /// Absolute path of the finished recording.
    pub path: PathBuf,
}
