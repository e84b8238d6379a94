//! Error types for the weaver engine

use thiserror::Error;

use crate::bundle::Variant;
use crate::config::ConfigError;
use crate::flows::FlowError;
use crate::parser::ParseError;
use crate::store::StoreError;

/// Result type alias using WeaverError
pub type Result<T> = std::result::Result<T, WeaverError>;

/// Errors surfaced by session actions, export and configuration
#[derive(Debug, Error)]
pub enum WeaverError {
    /// Rejected user input (empty prompt or name, nothing to edit, bad section)
    #[error("{0}")]
    Validation(String),

    /// Model invocation failed
    #[error("{0}")]
    Model(#[from] FlowError),

    /// The edit reply held text but no delimited sections
    #[error("The AI response was not in the expected format")]
    FormatMismatch,

    /// Snapshot persistence failed
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Another model request is still in flight
    #[error("A request is already in progress")]
    Busy,

    #[error("Project not found: {0}")]
    NotFound(String),

    #[error("Project holds {found} code but this session works with {expected} code")]
    VariantMismatch { expected: Variant, found: Variant },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export failed: {0}")]
    Export(#[from] zip::result::ZipError),

    #[error("{0}")]
    Config(#[from] ConfigError),
}

impl WeaverError {
    /// Create a validation error with a message
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<ParseError> for WeaverError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::FormatMismatch => Self::FormatMismatch,
        }
    }
}
