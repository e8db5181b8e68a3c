//! Shared test fixtures for the hotconf workspace.
//!
//! - [`ScriptedLoader`]: in-memory [`hc_core::RawLoader`] whose payload,
//!   failures and timing are driven by the test
//! - [`PayloadFile`]: payload file in its own temporary directory
//! - [`minio`]: one shared MinIO container per test process (port 9000);
//!   `None` when Docker is unavailable so S3 tests can skip
//!
//! Container fixtures are lazily initialized once per test process and
//! cleaned up when the process exits.

mod fixtures;
mod payload;
mod scripted;

pub use fixtures::*;
pub use payload::PayloadFile;
pub use scripted::{LoadGate, ScriptedLoader};
