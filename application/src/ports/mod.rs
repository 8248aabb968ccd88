//! Port definitions (interfaces for external adapters)

pub mod agent_backend;
pub mod execution_observer;
