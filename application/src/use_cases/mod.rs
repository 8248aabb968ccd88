//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod run_agent;
pub mod run_many;
pub mod run_overseer;

#[cfg(test)]
pub(crate) mod testing;
