//! Claude CLI adapter
//!
//! Implements [`AgentBackend`](council_application::AgentBackend) by running
//! `claude -p ... --output-format stream-json` as a child process and
//! translating its JSON lines into backend events.

pub mod backend;
pub mod error;
pub mod protocol;

pub use backend::ClaudeCliBackend;
pub use error::ClaudeCliError;
