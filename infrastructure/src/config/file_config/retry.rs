//! Retry policy from TOML (`[retry]` section)

use super::validation::ConfigIssue;
use council_application::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw retry configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    /// Total attempts including the first
    pub max_attempts: u32,
    pub initial_delay_secs: f64,
    pub backoff_factor: f64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_secs: 2.0,
            backoff_factor: 2.0,
        }
    }
}

impl FileRetryConfig {
    /// Convert to a [`RetryPolicy`], replacing invalid values with defaults.
    pub fn to_policy(&self) -> (RetryPolicy, Vec<ConfigIssue>) {
        let defaults = Self::default();
        let mut issues = Vec::new();

        let max_attempts = if self.max_attempts == 0 {
            issues.push(ConfigIssue::warning("retry.max_attempts", "must be at least 1"));
            defaults.max_attempts
        } else {
            self.max_attempts
        };

        let initial_delay = match Duration::try_from_secs_f64(self.initial_delay_secs) {
            Ok(delay) => delay,
            Err(_) => {
                issues.push(ConfigIssue::warning(
                    "retry.initial_delay_secs",
                    "must be a non-negative number",
                ));
                Duration::from_secs_f64(defaults.initial_delay_secs)
            }
        };

        let backoff_factor = if self.backoff_factor.is_finite() && self.backoff_factor >= 1.0 {
            self.backoff_factor
        } else {
            issues.push(ConfigIssue::warning("retry.backoff_factor", "must be at least 1.0"));
            defaults.backoff_factor
        };

        (
            RetryPolicy::new(max_attempts, initial_delay, backoff_factor),
            issues,
        )
    }
}
