//! Error types for engine operations

use rapport_domain::traits::StorageFault;
use rapport_domain::{ActorId, ActorType, PairKey, PairState, RelationshipKind, Side};
use thiserror::Error;

/// Boxed error from a store adapter or actor directory
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, RelationshipError>;

/// Coarse classification of a [`RelationshipError`]
///
/// Transport layers map these to status codes; the variants of
/// [`RelationshipError`] carry the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The call itself is malformed (e.g. an actor relating to itself)
    InvalidArgument,

    /// An actor, request or relationship does not exist
    NotFound,

    /// The pair already has state that forbids the operation
    Conflict,

    /// The store or directory failed; not caused by the caller
    Storage,
}

/// Errors returned by [`RelationshipEngine`](crate::RelationshipEngine)
#[derive(Error, Debug)]
pub enum RelationshipError {
    /// Requestor and acceptor are the same actor
    #[error("Invalid argument: actor {0} cannot relate to itself")]
    SelfRelationship(ActorId),

    /// An actor does not exist, or is not of the type the kind requires
    #[error("Not found: {side} {id} is not an existing {expected} ({kind})")]
    ActorNotFound {
        /// Relationship kind being requested
        kind: RelationshipKind,
        /// Which participant failed to resolve
        side: Side,
        /// The id that failed to resolve
        id: ActorId,
        /// Actor type the kind requires on that side
        expected: ActorType,
    },

    /// No pending request with this exact direction
    #[error("Not found: no pending {kind} request from {requestor} to {acceptor}")]
    RequestNotFound {
        /// Relationship kind
        kind: RelationshipKind,
        /// Requestor of the missing request
        requestor: ActorId,
        /// Acceptor of the missing request
        acceptor: ActorId,
    },

    /// The pair is not related
    #[error("Not found: no relationship for {0}")]
    RelationshipNotFound(PairKey),

    /// The pair already has a pending request or a relationship
    #[error("Conflict: {pair} is already {}", .state.label())]
    Conflict {
        /// Pair the operation targeted
        pair: PairKey,
        /// State found in the store
        state: PairState,
    },

    /// A concurrent writer changed the pair first and the store refused the write
    #[error("Conflict: {pair} was modified concurrently: {source}")]
    ConstraintViolation {
        /// Pair the operation targeted
        pair: PairKey,
        /// Constraint error reported by the store
        source: BoxError,
    },

    /// Store failure unrelated to the caller's input
    #[error("Storage error: {0}")]
    Storage(#[source] BoxError),

    /// Actor directory failure
    #[error("Actor directory error: {0}")]
    Directory(#[source] BoxError),
}

impl RelationshipError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelationshipError::SelfRelationship(_) => ErrorKind::InvalidArgument,
            RelationshipError::ActorNotFound { .. }
            | RelationshipError::RequestNotFound { .. }
            | RelationshipError::RelationshipNotFound(_) => ErrorKind::NotFound,
            RelationshipError::Conflict { .. } | RelationshipError::ConstraintViolation { .. } => {
                ErrorKind::Conflict
            }
            RelationshipError::Storage(_) | RelationshipError::Directory(_) => ErrorKind::Storage,
        }
    }

    /// Whether this is a not-found error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Whether this is a conflict error
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    /// Wrap a store error raised outside a pair transaction
    pub(crate) fn storage<E: StorageFault>(err: E) -> Self {
        RelationshipError::Storage(Box::new(err))
    }

    /// Wrap a store error raised while writing `pair`
    ///
    /// Constraint violations become conflicts; everything else propagates as
    /// a storage error.
    pub(crate) fn write<E: StorageFault>(pair: PairKey, err: E) -> Self {
        if err.is_conflict() {
            RelationshipError::ConstraintViolation {
                pair,
                source: Box::new(err),
            }
        } else {
            RelationshipError::Storage(Box::new(err))
        }
    }

    /// Wrap an actor directory error
    pub(crate) fn directory<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RelationshipError::Directory(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapport_domain::Relationship;

    #[derive(Debug, Error)]
    #[error("fake store error (conflict: {0})")]
    struct FakeFault(bool);

    impl StorageFault for FakeFault {
        fn is_conflict(&self) -> bool {
            self.0
        }
    }

    fn pair() -> PairKey {
        PairKey::new(RelationshipKind::UserFriend, ActorId::new(1), ActorId::new(2))
    }

    #[test]
    fn test_constraint_faults_become_conflicts() {
        let err = RelationshipError::write(pair(), FakeFault(true));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("modified concurrently"));
    }

    #[test]
    fn test_other_faults_propagate_as_storage() {
        let err = RelationshipError::write(pair(), FakeFault(false));
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(!err.is_conflict());
        assert!(!err.is_not_found());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_messages_name_the_failing_side() {
        let err = RelationshipError::ActorNotFound {
            kind: RelationshipKind::GroupAlliance,
            side: Side::Acceptor,
            id: ActorId::new(-1),
            expected: ActorType::Group,
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            err.to_string(),
            "Not found: acceptor -1 is not an existing group (group_alliance)"
        );
    }

    #[test]
    fn test_conflict_message_names_state() {
        let relationship =
            Relationship::new(RelationshipKind::UserFriend, ActorId::new(2), ActorId::new(1), 0);
        let err = RelationshipError::Conflict {
            pair: pair(),
            state: PairState::Related(relationship),
        };
        assert_eq!(err.to_string(), "Conflict: user_friend:{1, 2} is already related");
    }
}
