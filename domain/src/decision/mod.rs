//! Overseer decisions and candidate rankings.

pub mod entities;
pub mod parsing;

pub use entities::{Candidate, RankedCandidate, RankedItem, ThreadSnapshot, TriggerDecision};
pub use parsing::{default_action, parse_decision, parse_ranking};
