//! Agent resource locations from TOML (`[agents]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw agent directory configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentsConfig {
    /// Directory of built-in agent resources (`*.md`)
    pub builtin_dir: PathBuf,
    /// Contributor namespace directories, scanned in order after the builtins
    pub contributed_dirs: Vec<PathBuf>,
    /// Directory whose sub-directories are contributor namespaces
    pub contributed_root: Option<PathBuf>,
}

impl Default for FileAgentsConfig {
    fn default() -> Self {
        Self {
            builtin_dir: PathBuf::from("agents/builtin"),
            contributed_dirs: Vec::new(),
            contributed_root: None,
        }
    }
}
