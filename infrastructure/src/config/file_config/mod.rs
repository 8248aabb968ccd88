//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to domain/application types
//! on demand, collecting [`ConfigIssue`]s instead of failing.

mod agents;
mod backend;
mod execution;
mod logging;
mod output;
mod retry;
mod validation;

pub use agents::FileAgentsConfig;
pub use backend::FileBackendConfig;
pub use execution::FileExecutionConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use retry::FileRetryConfig;
pub use validation::{ConfigIssue, Severity};

use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Agent resource locations
    pub agents: FileAgentsConfig,
    /// Claude CLI backend settings
    pub backend: FileBackendConfig,
    /// Default execution limits
    pub execution: FileExecutionConfig,
    /// Retry policy around backend calls
    pub retry: FileRetryConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Logging settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Execution preset name and override ranges
    /// 2. Retry policy values
    /// 3. Backend command presence
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.execution.resolve(None).1);
        issues.extend(self.retry.to_policy().1);

        if self.backend.command.trim().is_empty() {
            issues.push(ConfigIssue::error("backend.command", "must not be empty"));
        }

        issues
    }
}
