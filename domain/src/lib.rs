//! Domain layer for agent-council
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Agents
//!
//! An agent is a named behavioral profile loaded from a text resource with a
//! metadata header. The [`AgentRegistry`] maps ids (and namespace aliases) to
//! shared [`AgentDefinition`]s.
//!
//! ## Execution
//!
//! Every run is bounded by an immutable [`ExecutionConfig`] (turns, budget,
//! wall-clock timeout) and produces an [`ExecutionResult`], including when it
//! fails.
//!
//! ## Decisions
//!
//! The overseer's free-form reply is reduced to a [`TriggerDecision`] by
//! [`parse_decision`], which never fails and never guesses a trigger.

pub mod agent;
pub mod core;
pub mod decision;
pub mod execution;
pub mod prompt;
pub mod resource;
pub mod session;

// Re-export commonly used types
pub use agent::{
    OVERSEER_AGENT_ID, RANKER_AGENT_ID,
    entities::{AgentDefinition, Provenance, SkipReason},
    normalize_agent_id,
    registry::AgentRegistry,
};
pub use core::{error::DomainError, string::truncate};
pub use decision::{
    Candidate, RankedCandidate, RankedItem, ThreadSnapshot, TriggerDecision, default_action,
    parse_decision, parse_ranking,
};
pub use execution::{
    ExecutionConfig, ExecutionOutcome, ExecutionOverrides, ExecutionPreset, ExecutionResult,
    FailureKind, TokenUsage,
};
pub use prompt::PromptTemplate;
pub use resource::{HeaderValue, ParsedResource, ResourceHeader, parse_resource};
pub use session::stream::{BackendEvent, RunSummary, StopReason};
