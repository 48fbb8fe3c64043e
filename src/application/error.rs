//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::application::codec::Format;
use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("invalid {format} tree data: {message}")]
    Parse { format: Format, message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("unsupported file format: {0} (expected .txt, .bin, .dat, .json or .xml)")]
    UnsupportedFormat(PathBuf),

    #[error("the tree is empty, nothing to export")]
    EmptyTree,

    #[error("the tree was imported without validation and cannot be edited")]
    UnverifiedTree,

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    pub fn parse(format: Format, message: impl Into<String>) -> Self {
        Self::Parse {
            format,
            message: message.into(),
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
