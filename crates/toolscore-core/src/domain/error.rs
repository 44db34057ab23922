//! Domain-level error taxonomy for Toolscore.

use std::path::PathBuf;

/// Errors produced when a value violates a construction invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("tool name must not be empty")]
    EmptyToolName,

    #[error("unknown composite weight key: {key} (expected one of {allowed})")]
    UnknownWeightKey { key: String, allowed: String },

    #[error("composite weight for {key} must be non-negative, got {value}")]
    NegativeWeight { key: String, value: f64 },

    #[error("composite weight for {key} must be finite")]
    NonFiniteWeight { key: String },
}

/// Toolscore loading and configuration errors.
///
/// The metrics engine itself never produces these; they only surface at the
/// loading, adapter and configuration boundaries.
#[derive(Debug, thiserror::Error)]
pub enum ToolscoreError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("format error: {0}")]
    Format(String),

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolscoreError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        ToolscoreError::Format(msg.into())
    }
}

/// Result type for Toolscore operations.
pub type Result<T> = std::result::Result<T, ToolscoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ToolscoreError::from(ValidationError::EmptyToolName);
        assert!(err.to_string().contains("validation error"));
        assert!(err.to_string().contains("tool name must not be empty"));
    }

    #[test]
    fn test_not_found_names_path() {
        let err = ToolscoreError::NotFound(PathBuf::from("gold/calls.json"));
        assert_eq!(err.to_string(), "file not found: gold/calls.json");
    }

    #[test]
    fn test_parse_error_names_path_and_reason() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = ToolscoreError::Parse {
            path: PathBuf::from("trace.json"),
            source,
        };
        let msg = err.to_string();
        assert!(msg.contains("trace.json"));
        assert!(msg.contains("key must be a string"));
    }

    #[test]
    fn test_negative_weight_error() {
        let err = ValidationError::NegativeWeight {
            key: "argument_f1".to_string(),
            value: -0.5,
        };
        let msg = err.to_string();
        assert!(msg.contains("argument_f1"));
        assert!(msg.contains("-0.5"));
    }
}
