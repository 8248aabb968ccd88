//! Error types for the Claude CLI adapter

use council_application::BackendError;
use thiserror::Error;

/// Result type alias for Claude CLI operations
pub type Result<T> = std::result::Result<T, ClaudeCliError>;

/// Errors that can occur when running the Claude CLI
#[derive(Error, Debug)]
pub enum ClaudeCliError {
    #[error("Claude CLI not found: {0}")]
    NotFound(String),

    #[error("Failed to spawn Claude CLI process: {0}")]
    SpawnError(std::io::Error),

    #[error("Claude CLI I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse stream line: {error}\nRaw line: {raw}")]
    ParseError { error: String, raw: String },

    #[error("Claude CLI exited ({status}) without a result: {stderr}")]
    Exited { status: String, stderr: String },

    #[error("Request timeout after {0}s")]
    Timeout(u64),
}

impl From<ClaudeCliError> for BackendError {
    fn from(err: ClaudeCliError) -> Self {
        match err {
            ClaudeCliError::NotFound(_) | ClaudeCliError::SpawnError(_) => {
                BackendError::Spawn(err.to_string())
            }
            ClaudeCliError::ParseError { .. } => BackendError::Protocol(err.to_string()),
            // A run that dies before its result line is usually a dropped
            // connection on the CLI side.
            ClaudeCliError::Exited { .. } | ClaudeCliError::Io(_) => {
                BackendError::StreamInterrupted(err.to_string())
            }
            ClaudeCliError::Timeout(secs) => BackendError::Timeout(secs),
        }
    }
}
