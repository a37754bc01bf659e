//! Rapport Storage Layer
//!
//! Implements the `RelationshipStore` and `ActorDirectory` traits from
//! `rapport-domain`.
//!
//! # Architecture
//!
//! - [`SqliteStore`]: requests and relationships in SQLite. Unique indexes on
//!   the canonical `(kind, low_id, high_id)` pair and cross-table triggers make
//!   the database itself refuse a second state for a pair.
//! - [`MemoryStore`]: the same contract in process memory, with one lock per
//!   pair so unrelated pairs never contend.
//! - [`SqliteActorDirectory`] / [`MemoryActorDirectory`]: actor lookup and
//!   registration.
//!
//! # Examples
//!
//! ```no_run
//! use rapport_store::{SqliteActorDirectory, SqliteStore};
//!
//! let store = SqliteStore::new("rapport.db").unwrap();
//! let actors = SqliteActorDirectory::new("rapport.db").unwrap();
//! let alice = actors.create_user("alice").unwrap();
//! ```

#![warn(missing_docs)]

mod actors;
mod config;
mod error;
mod memory;
mod sqlite;

pub use actors::{MemoryActorDirectory, SqliteActorDirectory};
pub use config::{ConfigError, StoreConfig};
pub use error::{MemoryStoreError, StoreError};
pub use memory::{MemoryStore, MemoryTransaction};
pub use sqlite::{SqliteStore, SqliteTransaction};
