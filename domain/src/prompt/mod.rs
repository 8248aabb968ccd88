//! Prompt domain
//!
//! Templates for the fan-out task, the overseer decision and candidate ranking.

mod template;

pub use template::{AGENT_PLACEHOLDER, PromptTemplate};
