//! Filesystem agent discovery
//!
//! Builds an [`AgentRegistry`](council_domain::AgentRegistry) from
//! directories of Markdown resources, and caches it by a file-modification
//! signature.

mod cache;
mod discovery;

pub use cache::{RegistryCache, ScanSignature};
pub use discovery::{FsAgentDiscovery, ResourceFile, ScanInputs};
