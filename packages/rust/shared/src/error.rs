//! Error types for dashtree.
//!
//! Library crates use [`DashtreeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all dashtree operations.
#[derive(Debug, thiserror::Error)]
pub enum DashtreeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Layout document could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// `combine`/`append` received something that is not a collection or item.
    #[error("invalid combination: {message}")]
    InvalidCombination { message: String },

    /// A tab path contains an empty segment.
    #[error("malformed tab path {path:?}: empty segment at position {position}")]
    MalformedPath { path: Vec<String>, position: usize },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DashtreeError>;

impl DashtreeError {
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

    /// Create an invalid-combination error from any displayable message.
    pub fn invalid_combination(msg: impl Into<String>) -> Self {
        Self::InvalidCombination {
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
        let err = DashtreeError::config("unknown policy");
        assert_eq!(err.to_string(), "config error: unknown policy");

        let err = DashtreeError::invalid_combination("expected a collection, got a number");
        assert!(err.to_string().starts_with("invalid combination:"));
        assert!(err.to_string().contains("got a number"));
    }

    #[test]
    fn malformed_path_names_position() {
        let err = DashtreeError::MalformedPath {
            path: vec!["sis".into(), String::new()],
            position: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("\"sis\""));
        assert!(msg.contains("position 1"));
    }
}
