//! Application layer for agent-council
//!
//! This crate contains use cases, port definitions, and the retry policy.
//! It depends only on the domain layer.

pub mod ports;
pub mod retry;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    agent_backend::{AgentBackend, BackendError, BackendRequest, BackendStream},
    execution_observer::{ExecutionObserver, NoObserver},
};
pub use retry::{IsRetryable, RetryPolicy, retry_async, retry_blocking};
pub use use_cases::run_agent::{RunAgentInput, RunAgentUseCase};
pub use use_cases::run_many::{FanoutReport, RunManyInput, RunManyUseCase};
pub use use_cases::run_overseer::{ObservationReport, RankingReport, RunOverseerUseCase};
