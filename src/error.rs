use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the flat-file store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persisted CSV fails schema or type validation. Never silently
    /// coerced; the caller decides whether to abort or re-prompt.
    #[error("corrupt data in {}: {reason}", .path.display())]
    CorruptData { path: PathBuf, reason: String },

    #[error("no project named '{project_id}'")]
    NotFound { project_id: String },

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptData {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Failures raised while building or hydrating a project session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("invalid date range: {message}")]
    InvalidRange { message: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}
