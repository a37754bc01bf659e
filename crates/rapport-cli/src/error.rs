//! Error types for the CLI application.

use rapport_engine::{ErrorKind, RelationshipError};
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid store configuration
    #[error(transparent)]
    StoreConfig(#[from] rapport_store::ConfigError),

    /// Database error
    #[error("Store error: {0}")]
    Store(#[from] rapport_store::StoreError),

    /// Relationship operation failed
    #[error("{0}")]
    Relationship(#[from] RelationshipError),

    /// No actor matches a name or id given on the command line
    #[error("Not found: no {expected} matches {reference}")]
    UnknownActor {
        /// What was typed
        reference: String,
        /// Actor types that were searched
        expected: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl CliError {
    /// Process exit code for this error
    ///
    /// 2 invalid argument, 3 not found, 4 conflict, 1 anything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Relationship(e) => match e.kind() {
                ErrorKind::InvalidArgument => 2,
                ErrorKind::NotFound => 3,
                ErrorKind::Conflict => 4,
                ErrorKind::Storage => 1,
            },
            CliError::UnknownActor { .. } => 3,
            _ => 1,
        }
    }
}
