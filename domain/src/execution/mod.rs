//! Execution limits and results for a single agent run.
//!
//! - [`config::ExecutionConfig`]: turn / budget / timeout bounds (immutable)
//! - [`config::ExecutionPreset`]: named defaults (`quick`, `standard`, `deep`)
//! - [`result::ExecutionResult`]: normalized outcome of one run

pub mod config;
pub mod result;

pub use config::{ExecutionConfig, ExecutionOverrides, ExecutionPreset};
pub use result::{ExecutionOutcome, ExecutionResult, FailureKind, TokenUsage};
