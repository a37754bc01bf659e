//! Error types for the store adapters

use rapport_domain::traits::StorageFault;
use rapport_domain::PairKey;
use thiserror::Error;

/// Errors that can occur in the SQLite adapter
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A transaction was asked to touch a pair it does not own
    #[error("Pair {requested} is outside the scope of transaction {scope}")]
    OutOfScope {
        /// Pair owned by the transaction
        scope: PairKey,
        /// Pair the caller tried to touch
        requested: PairKey,
    },
}

impl StorageFault for StoreError {
    fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::Database(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

/// Errors that can occur in the in-memory adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryStoreError {
    /// A write would break the one-state-per-pair rule
    #[error("Constraint violation on {pair}: {reason}")]
    Constraint {
        /// Pair the write targeted
        pair: PairKey,
        /// Which rule fired
        reason: &'static str,
    },

    /// A transaction was asked to touch a pair it does not own
    #[error("Pair {requested} is outside the scope of transaction {scope}")]
    OutOfScope {
        /// Pair owned by the transaction
        scope: PairKey,
        /// Pair the caller tried to touch
        requested: PairKey,
    },
}

impl StorageFault for MemoryStoreError {
    fn is_conflict(&self) -> bool {
        matches!(self, MemoryStoreError::Constraint { .. })
    }
}
