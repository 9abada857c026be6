//! blrec auto-upload webhook server library.
//!
//! Exposes the building blocks (config, state, error handling, router,
//! routes) so integration tests and the binary entrypoint share them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod state;
