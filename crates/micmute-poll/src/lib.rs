//! Microphone status polling for micmute.
//!
//! This crate provides a trait-based abstraction over whatever answers "is
//! the microphone muted", a command-line implementation of it, and the
//! [`StatusPoller`] that keeps a normalized [`MuteState`] up to date.

mod command;
mod poller;

use async_trait::async_trait;
pub use command::CommandSource;
pub use micmute_core::MuteState;
pub use poller::StatusPoller;
use thiserror::Error;

/// Errors returned by a status source for a single query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("status query timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("failed to launch status command `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("status command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },
}

/// Errors returned by [`StatusPoller`] to its caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollerError {
    #[error("invalid polling interval: {interval_ms}ms, must be greater than zero")]
    Configuration { interval_ms: u64 },
}

/// Result type for poller operations.
pub type Result<T> = std::result::Result<T, PollerError>;

/// Trait for mute status sources.
///
/// Implementations own any timeout around their query; a query that takes
/// too long should resolve to [`QueryError::Timeout`].
#[async_trait]
pub trait MicStatusSource: Send + Sync {
    /// Query the raw mute status encoding, e.g. `"true"` or `"false"`.
    async fn get_mic_status(&self) -> std::result::Result<String, QueryError>;

    /// Returns the name of this source for logging/debugging.
    fn name(&self) -> &str;
}
