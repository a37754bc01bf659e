//! Rapport Relationship Engine
//!
//! The request/accept/reject/remove state machine for every relationship kind,
//! plus the read-only queries built on top of it.
//!
//! The engine is generic over a [`RelationshipStore`](rapport_domain::traits::RelationshipStore)
//! and an [`ActorDirectory`](rapport_domain::traits::ActorDirectory). It never
//! holds pair state of its own: every decision is taken inside a store
//! transaction scoped to the pair being changed.
//!
//! # Examples
//!
//! ```
//! use rapport_engine::{ErrorKind, RelationshipEngine};
//! use rapport_store::{MemoryActorDirectory, MemoryStore};
//!
//! let directory = MemoryActorDirectory::new();
//! let ana = directory.create_user("ana");
//! let guild = directory.create_group("smiths");
//!
//! let engine = RelationshipEngine::new(MemoryStore::new(), directory);
//! engine.memberships().create_request(ana.id, guild.id, true).unwrap();
//!
//! let err = engine.memberships().create_request(ana.id, guild.id, false).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Conflict);
//! assert_eq!(engine.memberships().relationship_count(guild.id).unwrap(), 1);
//! ```

#![warn(missing_docs)]

mod engine;
mod error;
mod query;
mod scope;

pub use engine::RelationshipEngine;
pub use error::{BoxError, ErrorKind, RelationshipError, Result};
pub use scope::KindScope;
