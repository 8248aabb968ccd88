//! Agent backend port
//!
//! Defines the interface for invoking the conversational backend that runs
//! an agent's multi-turn reasoning and tool use.

use crate::retry::IsRetryable;
use async_trait::async_trait;
use council_domain::{BackendEvent, ExecutionConfig};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur while invoking the backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("Budget exhausted")]
    BudgetExhausted,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to start backend: {0}")]
    Spawn(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl IsRetryable for BackendError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            BackendError::Connection(_) | BackendError::StreamInterrupted(_)
        )
    }
}

/// One invocation of an agent.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub agent_id: String,
    /// User-turn prompt
    pub prompt: String,
    /// Agent instructions, appended to the backend's system prompt
    pub instructions: String,
    pub config: ExecutionConfig,
}

/// Handle for receiving streaming events from a backend run.
///
/// Events arrive in backend order; a well-behaved run ends with
/// [`BackendEvent::Completed`]. Errors mid-stream are delivered in-band.
#[derive(Debug)]
pub struct BackendStream {
    pub receiver: mpsc::Receiver<Result<BackendEvent, BackendError>>,
}

impl BackendStream {
    pub fn new(receiver: mpsc::Receiver<Result<BackendEvent, BackendError>>) -> Self {
        Self { receiver }
    }

    /// A stream that replays a fixed sequence of items.
    pub fn from_events(items: Vec<Result<BackendEvent, BackendError>>) -> Self {
        let (tx, rx) = mpsc::channel(items.len().max(1));
        for item in items {
            // Capacity covers every item, so this never fails
            let _ = tx.try_send(item);
        }
        Self::new(rx)
    }

    pub async fn recv(&mut self) -> Option<Result<BackendEvent, BackendError>> {
        self.receiver.recv().await
    }
}

/// Conversational backend
///
/// Implementations (adapters) live in the infrastructure layer. The backend
/// owns turn counting, cost accounting and limit enforcement; callers pass
/// the limits in [`BackendRequest::config`].
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Start a run and return its event stream
    async fn invoke(&self, request: &BackendRequest) -> Result<BackendStream, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(BackendError::Connection("reset".into()).is_retryable());
        assert!(BackendError::StreamInterrupted("eof".into()).is_retryable());
        assert!(!BackendError::Timeout(60).is_retryable());
        assert!(!BackendError::BudgetExhausted.is_retryable());
        assert!(!BackendError::InvalidRequest("empty prompt".into()).is_retryable());
        assert!(!BackendError::Spawn("not found".into()).is_retryable());
    }

    #[tokio::test]
    async fn test_stream_from_events() {
        let mut stream = BackendStream::from_events(vec![
            Ok(BackendEvent::Text("hi".into())),
            Err(BackendError::StreamInterrupted("eof".into())),
        ]);
        assert_eq!(stream.recv().await, Some(Ok(BackendEvent::Text("hi".into()))));
        assert!(matches!(stream.recv().await, Some(Err(_))));
        assert_eq!(stream.recv().await, None);
    }
}
