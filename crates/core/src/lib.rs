//! Domain core for the blrec auto-uploader.
//!
//! Holds the room configuration store, the inbound webhook event model and
//! the request validator that turns a raw payload into an [`UploadJob`].
//! Nothing in this crate performs network I/O.
//!
//! [`UploadJob`]: validation::UploadJob

pub mod config;
pub mod error;
pub mod event;
pub mod types;
pub mod validation;
