//! Error types for Polidoc.
//!
//! Library crates use [`PolidocError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Import failures follow a strict taxonomy: `MalformedInput` and `Schema`
//! abort before any row is parsed, `Row` aborts the whole batch with zero
//! store mutation. Non-fatal data-quality findings are not errors at all —
//! they travel as nits on the import report.

use std::path::PathBuf;

/// Top-level error type for all Polidoc operations.
#[derive(Debug, thiserror::Error)]
pub enum PolidocError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Unreadable or structurally unusable workbook (bad bytes, no sheets).
    #[error("malformed spreadsheet: {message}")]
    MalformedInput { message: String },

    /// Header row is missing one or more required column roles.
    #[error("cannot find columns: {missing}")]
    Schema { missing: String },

    /// A data row is unusable (duplicate id, unknown language, dangling
    /// reference). Fatal to the whole batch.
    #[error("row error: {message}")]
    Row { message: String },

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Object storage (spreadsheet/attachment store) error.
    #[error("object store error: {0}")]
    ObjectStore(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PolidocError>;

impl PolidocError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a malformed-input error from any displayable message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: msg.into(),
        }
    }

    /// Create a batch-fatal row error from any displayable message.
    pub fn row(msg: impl Into<String>) -> Self {
        Self::Row {
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
        let err = PolidocError::config("database path not set");
        assert_eq!(err.to_string(), "config error: database path not set");

        let err = PolidocError::Schema {
            missing: "Year, Title".into(),
        };
        assert_eq!(err.to_string(), "cannot find columns: Year, Title");

        let err = PolidocError::row("duplicate item ID on row 14: YPS-003");
        assert!(err.to_string().contains("YPS-003"));
    }
}
