//! Rapport Domain Layer
//!
//! This crate contains the domain model for Rapport, the relationship engine
//! behind a game social graph. It has no external dependencies and defines the
//! value objects and trait seams that the store and engine crates build on.
//!
//! ## Key Concepts
//!
//! - **Actor**: a User or a Group, the participants of every relationship
//! - **Kind**: UserFriend, UserGroupMembership or GroupAlliance, described by a
//!   small descriptor table instead of per-kind types
//! - **Request**: a pending, directed proposal to form a relationship
//! - **Relationship**: an accepted, undirected association between two actors
//! - **Pair state**: every unordered pair is None, Pending (one direction) or Related
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Storage and actor lookup are reached only through the traits in [`traits`]
//! - Business rules live in `rapport-engine`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod actor;
pub mod kind;
pub mod relationship;
pub mod traits;

// Re-exports for convenience
pub use actor::{Actor, ActorId, ActorType};
pub use kind::{KindDescriptor, RelationshipKind, Side};
pub use relationship::{PairKey, PairState, Relationship, RelationshipRequest};
