//! Error types for rigmate.
//!
//! Library crates use [`RigmateError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Extraction gaps are deliberately NOT errors: a field the extractor could
//! not derive is an absent spec key, and an unscorable component carries
//! `scores: None`. Only caller mistakes and storage faults surface here.

use std::path::PathBuf;

/// Top-level error type for all rigmate operations.
#[derive(Debug, thiserror::Error)]
pub enum RigmateError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Listing or agent-output parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Caller-supplied input rejected (budget ≤ 0, unknown use case,
    /// empty category set, unknown component id).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RigmateError>;

impl RigmateError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = RigmateError::config("missing db path");
        assert_eq!(err.to_string(), "config error: missing db path");

        let err = RigmateError::validation("budget must be positive, got 0");
        assert!(err.to_string().contains("budget must be positive"));
    }
}
