//! JSON inputs for `observe` and `rank`

use anyhow::{Context, Result};
use council_domain::{Candidate, ThreadSnapshot};
use serde::Deserialize;
use std::path::Path;

/// A thread file holds either one thread or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ThreadFile {
    One(ThreadSnapshot),
    Many(Vec<ThreadSnapshot>),
}

impl ThreadFile {
    pub fn into_threads(self) -> Vec<ThreadSnapshot> {
        match self {
            ThreadFile::One(thread) => vec![thread],
            ThreadFile::Many(threads) => threads,
        }
    }
}

pub fn read_threads(path: &Path) -> Result<ThreadFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read thread file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid thread JSON in {}", path.display()))
}

pub fn read_candidates(path: &Path) -> Result<Vec<Candidate>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read candidate file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid candidate JSON in {}", path.display()))
}
