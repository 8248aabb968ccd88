//! Infrastructure layer for agent-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: filesystem agent discovery, configuration
//! file loading and the Claude CLI backend.

pub mod agents;
pub mod claude;
pub mod config;

// Re-export commonly used types
pub use agents::{FsAgentDiscovery, RegistryCache, ResourceFile, ScanInputs, ScanSignature};
pub use claude::{ClaudeCliBackend, ClaudeCliError};
pub use config::{
    ConfigIssue, ConfigLoader, FileAgentsConfig, FileBackendConfig, FileConfig,
    FileExecutionConfig, FileLoggingConfig, FileOutputConfig, FileRetryConfig, Severity,
};
