//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid execution config: {0}")]
    InvalidExecutionConfig(String),

    #[error("Unknown execution preset: {0}")]
    UnknownPreset(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DomainError::UnknownPreset("turbo".to_string());
        assert_eq!(error.to_string(), "Unknown execution preset: turbo");

        let error = DomainError::InvalidExecutionConfig("max_turns must be positive".to_string());
        assert!(error.to_string().contains("max_turns"));
    }
}
