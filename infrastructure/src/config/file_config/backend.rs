//! Backend configuration from TOML (`[backend]` section)

use serde::{Deserialize, Serialize};

/// Raw backend configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// Executable of the Claude CLI
    pub command: String,
    /// Model passed with `--model`
    pub model: Option<String>,
    /// Extra arguments appended to every invocation
    pub extra_args: Vec<String>,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            command: "claude".to_string(),
            model: None,
            extra_args: Vec::new(),
        }
    }
}
