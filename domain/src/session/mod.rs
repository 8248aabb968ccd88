//! Backend session streaming.
//!
//! [`stream::BackendEvent`] is what the conversational backend emits while an
//! agent runs; [`stream::RunSummary`] is its terminal report.

pub mod stream;
