//! Error types for the styleguide generator.
//!
//! Library crates use [`StyleguideError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Only conditions that stop the whole run are errors. Recoverable problems
//! (bad annotations, unknown shortcodes, ambiguous types) are recorded in a
//! [`crate::Diagnostics`] sink instead.

use std::path::PathBuf;

/// Top-level error type for all styleguide operations.
#[derive(Debug, thiserror::Error)]
pub enum StyleguideError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Stylesheet source that the scanner cannot make sense of.
    #[error("parse error in {path:?} at line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: u32,
        message: String,
    },

    /// Annotation-order or syntax-tree invariant violation. Aborts the run.
    #[error("structural error: {message}")]
    Structural { message: String },

    /// Data validation error.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Writing the output files failed.
    #[error("export error: {0}")]
    Export(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StyleguideError>;

impl StyleguideError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error for a location in a source file.
    pub fn parse(path: impl Into<PathBuf>, line: u32, msg: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: msg.into(),
        }
    }

    /// Create a structural (fatal) error from any displayable message.
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural {
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

    /// Whether this error belongs to the fatal structural class.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural { .. })
    }
}
