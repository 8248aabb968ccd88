//! Presentation-level configuration
//!
//! How results and progress are rendered, resolved from the `[output]`
//! section and the command-line flags.

use serde::{Deserialize, Serialize};

/// Output configuration for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Enable colored terminal output
    pub color: bool,
    /// Print JSON instead of formatted text
    pub json: bool,
    /// Show progress indicators
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            json: false,
            show_progress: true,
        }
    }
}

impl OutputConfig {
    /// Combine the configured color setting with command-line flags.
    ///
    /// JSON output never shows progress bars so stdout stays parseable.
    pub fn resolve(color: bool, no_color: bool, json: bool, quiet: bool) -> Self {
        Self {
            color: color && !no_color,
            json,
            show_progress: !quiet && !json,
        }
    }

    /// Apply the color setting to the `colored` crate globally.
    pub fn apply(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_flags() {
        let config = OutputConfig::resolve(true, false, false, false);
        assert_eq!(config, OutputConfig::default());

        let config = OutputConfig::resolve(true, true, false, false);
        assert!(!config.color);

        let config = OutputConfig::resolve(true, false, true, false);
        assert!(config.json);
        assert!(!config.show_progress);

        let config = OutputConfig::resolve(false, false, false, true);
        assert!(!config.color);
        assert!(!config.show_progress);
    }
}
