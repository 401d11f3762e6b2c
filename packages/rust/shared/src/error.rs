//! Error types for FuncRef.
//!
//! Library crates use [`FuncRefError`] via `thiserror`. Schema conflicts are
//! fatal to startup; unknown-kind errors are recoverable by the caller
//! (skip the entity, log, continue).

use std::path::PathBuf;

/// Top-level error type for all FuncRef operations.
#[derive(Debug, thiserror::Error)]
pub enum FuncRefError {
    /// Re-registration of an entity kind or relationship category with
    /// settings that differ from the existing registration.
    #[error("configuration conflict for {name:?}: {message}")]
    ConfigurationConflict { name: String, message: String },

    /// An entity references a kind that was never registered.
    #[error("unknown entity kind {kind:?}")]
    UnknownEntityKind { kind: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Data validation error (bad identifier, malformed record, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FuncRefError>;

impl FuncRefError {
    /// Create a conflict error for a named schema item.
    pub fn conflict(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ConfigurationConflict {
            name: name.into(),
            message: msg.into(),
        }
    }

    /// Create an unknown-kind error.
    pub fn unknown_kind(kind: impl Into<String>) -> Self {
        Self::UnknownEntityKind { kind: kind.into() }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
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
        let err = FuncRefError::conflict("function", "hierarchical flag differs");
        assert_eq!(
            err.to_string(),
            "configuration conflict for \"function\": hierarchical flag differs"
        );

        let err = FuncRefError::unknown_kind("widget");
        assert!(err.to_string().contains("widget"));
    }
}
