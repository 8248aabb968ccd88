//! Execution limits from TOML (`[execution]` section)

use super::validation::ConfigIssue;
use council_domain::{ExecutionConfig, ExecutionOverrides, ExecutionPreset};
use serde::{Deserialize, Serialize};

/// Raw execution configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutionConfig {
    /// Preset name: "quick", "standard" or "deep"
    pub preset: String,
    pub max_turns: Option<u32>,
    pub max_budget_usd: Option<f64>,
    pub timeout_seconds: Option<u64>,
}

impl Default for FileExecutionConfig {
    fn default() -> Self {
        Self {
            preset: ExecutionPreset::default().as_str().to_string(),
            max_turns: None,
            max_budget_usd: None,
            timeout_seconds: None,
        }
    }
}

impl FileExecutionConfig {
    /// Parse the preset, falling back to the default preset on error.
    pub fn parse_preset(&self) -> (ExecutionPreset, Vec<ConfigIssue>) {
        match self.preset.parse::<ExecutionPreset>() {
            Ok(preset) => (preset, Vec::new()),
            Err(e) => (
                ExecutionPreset::default(),
                vec![ConfigIssue::warning(
                    "execution.preset",
                    format!("{}, falling back to '{}'", e, ExecutionPreset::default()),
                )],
            ),
        }
    }

    /// Resolve the preset plus overrides into an [`ExecutionConfig`].
    ///
    /// `preset` replaces the configured preset (e.g. from `--preset`).
    /// Out-of-range overrides are reported and ignored.
    pub fn resolve(&self, preset: Option<ExecutionPreset>) -> (ExecutionConfig, Vec<ConfigIssue>) {
        let (configured, mut issues) = self.parse_preset();
        let base = preset.unwrap_or(configured).config();

        let mut overrides = ExecutionOverrides::default();
        if let Some(turns) = self.max_turns {
            if turns == 0 {
                issues.push(ConfigIssue::warning("execution.max_turns", "must be positive"));
            } else {
                overrides = overrides.with_max_turns(turns);
            }
        }
        if let Some(budget) = self.max_budget_usd {
            if !budget.is_finite() || budget < 0.0 {
                issues.push(ConfigIssue::warning(
                    "execution.max_budget_usd",
                    "must be a non-negative number",
                ));
            } else {
                overrides = overrides.with_max_budget_usd(budget);
            }
        }
        if let Some(timeout) = self.timeout_seconds {
            if timeout == 0 {
                issues.push(ConfigIssue::warning(
                    "execution.timeout_seconds",
                    "must be positive",
                ));
            } else {
                overrides = overrides.with_timeout_seconds(timeout);
            }
        }

        (base.with_overrides(&overrides), issues)
    }
}
