//! Execution bounds passed to the conversational backend.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Turn, budget and wall-clock bounds for one agent run.
///
/// Fields are private: a config is validated once at construction and never
/// changes afterwards. Deriving a variant (e.g. applying per-agent overrides)
/// always produces a new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExecutionConfig {
    max_turns: u32,
    max_budget_usd: f64,
    timeout_seconds: u64,
}

impl ExecutionConfig {
    /// Create a validated config.
    ///
    /// `max_turns` and `timeout_seconds` must be positive, `max_budget_usd`
    /// must be finite and non-negative.
    pub fn new(
        max_turns: u32,
        max_budget_usd: f64,
        timeout_seconds: u64,
    ) -> Result<Self, DomainError> {
        if max_turns == 0 {
            return Err(DomainError::InvalidExecutionConfig(
                "max_turns must be positive".to_string(),
            ));
        }
        if !max_budget_usd.is_finite() || max_budget_usd < 0.0 {
            return Err(DomainError::InvalidExecutionConfig(format!(
                "max_budget_usd must be a non-negative number, got {}",
                max_budget_usd
            )));
        }
        if timeout_seconds == 0 {
            return Err(DomainError::InvalidExecutionConfig(
                "timeout_seconds must be positive".to_string(),
            ));
        }
        Ok(Self {
            max_turns,
            max_budget_usd,
            timeout_seconds,
        })
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    pub fn max_budget_usd(&self) -> f64 {
        self.max_budget_usd
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Derive a new config with the given overrides applied.
    ///
    /// Invalid override values were already rejected when the overrides
    /// were built, so this cannot fail.
    pub fn with_overrides(&self, overrides: &ExecutionOverrides) -> Self {
        Self {
            max_turns: overrides.max_turns.unwrap_or(self.max_turns),
            max_budget_usd: overrides.max_budget_usd.unwrap_or(self.max_budget_usd),
            timeout_seconds: overrides.timeout_seconds.unwrap_or(self.timeout_seconds),
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionPreset::Standard.config()
    }
}

/// Optional per-field replacements for an [`ExecutionConfig`].
///
/// Every present value is already valid (positive turns/timeout, finite
/// non-negative budget).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExecutionOverrides {
    max_turns: Option<u32>,
    max_budget_usd: Option<f64>,
    timeout_seconds: Option<u64>,
}

impl ExecutionOverrides {
    /// Build overrides from raw text values, silently dropping anything that
    /// does not parse or is out of range.
    pub fn from_raw(
        max_turns: Option<&str>,
        max_budget_usd: Option<&str>,
        timeout_seconds: Option<&str>,
    ) -> Self {
        Self {
            max_turns: max_turns
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|v| *v > 0),
            max_budget_usd: max_budget_usd
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v >= 0.0),
            timeout_seconds: timeout_seconds
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|v| *v > 0),
        }
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = Some(max_turns).filter(|v| *v > 0);
        self
    }

    pub fn with_max_budget_usd(mut self, budget: f64) -> Self {
        self.max_budget_usd = Some(budget).filter(|v| v.is_finite() && *v >= 0.0);
        self
    }

    pub fn with_timeout_seconds(mut self, timeout: u64) -> Self {
        self.timeout_seconds = Some(timeout).filter(|v| *v > 0);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.max_turns.is_none() && self.max_budget_usd.is_none() && self.timeout_seconds.is_none()
    }
}

/// Named execution presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionPreset {
    /// Short, cheap runs (triage, routing decisions)
    Quick,
    /// Regular review work
    #[default]
    Standard,
    /// Long investigations
    Deep,
}

impl ExecutionPreset {
    pub const ALL: [ExecutionPreset; 3] = [
        ExecutionPreset::Quick,
        ExecutionPreset::Standard,
        ExecutionPreset::Deep,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionPreset::Quick => "quick",
            ExecutionPreset::Standard => "standard",
            ExecutionPreset::Deep => "deep",
        }
    }

    /// The immutable default config for this preset.
    pub fn config(&self) -> ExecutionConfig {
        let (max_turns, max_budget_usd, timeout_seconds) = match self {
            ExecutionPreset::Quick => (2, 0.20, 60),
            ExecutionPreset::Standard => (3, 0.50, 180),
            ExecutionPreset::Deep => (5, 1.00, 300),
        };
        ExecutionConfig {
            max_turns,
            max_budget_usd,
            timeout_seconds,
        }
    }
}

impl fmt::Display for ExecutionPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionPreset {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quick" => Ok(ExecutionPreset::Quick),
            // "review" is the older name of the standard preset
            "standard" | "review" => Ok(ExecutionPreset::Standard),
            "deep" => Ok(ExecutionPreset::Deep),
            other => Err(DomainError::UnknownPreset(other.to_string())),
        }
    }
}
