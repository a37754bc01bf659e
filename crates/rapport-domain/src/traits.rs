//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Implementations live in `rapport-store`; the engine only sees these seams.

use crate::{Actor, ActorId, ActorType, PairKey, PairState, Relationship, RelationshipKind, RelationshipRequest};

/// Error raised by a store adapter
///
/// The engine must tell a lost race (a uniqueness constraint firing) apart
/// from every other storage fault: the first is reported as a conflict, the
/// second propagates unchanged.
pub trait StorageFault: std::error::Error + Send + Sync + 'static {
    /// Whether this error is a constraint violation on the pair key
    fn is_conflict(&self) -> bool;
}

/// Read access to users and groups
///
/// Owned by the account system. The engine only asks whether an id exists and
/// what type it has.
pub trait ActorDirectory {
    /// Error type for directory lookups
    type Error: std::error::Error + Send + Sync + 'static;

    /// Resolve an actor by id
    fn get_actor(&self, id: ActorId) -> Result<Option<Actor>, Self::Error>;

    /// Whether an actor with this id exists
    fn exists(&self, id: ActorId) -> Result<bool, Self::Error> {
        Ok(self.get_actor(id)?.is_some())
    }

    /// Type of the actor, or `None` if it does not exist
    fn type_of(&self, id: ActorId) -> Result<Option<ActorType>, Self::Error> {
        Ok(self.get_actor(id)?.map(|actor| actor.actor_type))
    }
}

/// Storage for pending requests and accepted relationships
///
/// Requests and relationships share one trait: every state transition touches
/// both tables inside a single [`PairTransaction`].
pub trait RelationshipStore {
    /// Error type for store operations
    type Error: StorageFault;

    /// Transaction scoped to one unordered pair
    type Transaction<'a>: PairTransaction<Error = Self::Error>
    where
        Self: 'a;

    /// Open a transaction that owns `pair` until it is committed or dropped
    ///
    /// Dropping the transaction without committing discards its writes.
    fn begin(&self, pair: PairKey) -> Result<Self::Transaction<'_>, Self::Error>;

    /// Current state of a pair, read outside any transaction
    fn pair_state(&self, pair: PairKey) -> Result<PairState, Self::Error>;

    /// Pending requests addressed to `acceptor`, in insertion order
    fn incoming_requests(
        &self,
        kind: RelationshipKind,
        acceptor: ActorId,
    ) -> Result<Vec<RelationshipRequest>, Self::Error>;

    /// Pending requests sent by `requestor`, in insertion order
    fn outgoing_requests(
        &self,
        kind: RelationshipKind,
        requestor: ActorId,
    ) -> Result<Vec<RelationshipRequest>, Self::Error>;

    /// Ids of every actor related to `actor`, each listed once
    fn related_actors(
        &self,
        kind: RelationshipKind,
        actor: ActorId,
    ) -> Result<Vec<ActorId>, Self::Error>;

    /// Number of distinct actors related to `actor`
    fn relationship_count(&self, kind: RelationshipKind, actor: ActorId) -> Result<usize, Self::Error>;
}

/// Atomic unit of work over one unordered pair
///
/// Reads observe the transaction's own writes. Writes become visible to other
/// callers all at once on [`commit`](PairTransaction::commit).
pub trait PairTransaction {
    /// Error type for transaction operations
    type Error: StorageFault;

    /// The pair this transaction owns
    fn pair(&self) -> PairKey;

    /// State of the pair as seen by this transaction
    fn pair_state(&mut self) -> Result<PairState, Self::Error> {
        if let Some(relationship) = self.find_relationship()? {
            return Ok(PairState::Related(relationship));
        }

        let pair = self.pair();
        if let Some(request) = self.find_request(pair.low, pair.high)? {
            return Ok(PairState::Pending(request));
        }
        if let Some(request) = self.find_request(pair.high, pair.low)? {
            return Ok(PairState::Pending(request));
        }

        Ok(PairState::None)
    }

    /// Pending request with exactly this direction
    fn find_request(
        &mut self,
        requestor: ActorId,
        acceptor: ActorId,
    ) -> Result<Option<RelationshipRequest>, Self::Error>;

    /// Relationship for the pair, whichever order it was stored in
    fn find_relationship(&mut self) -> Result<Option<Relationship>, Self::Error>;

    /// Insert a pending request
    fn insert_request(&mut self, request: &RelationshipRequest) -> Result<(), Self::Error>;

    /// Delete the pending request with exactly this direction
    ///
    /// Returns `false` if there was none.
    fn delete_request(&mut self, requestor: ActorId, acceptor: ActorId) -> Result<bool, Self::Error>;

    /// Insert an accepted relationship
    fn insert_relationship(&mut self, relationship: &Relationship) -> Result<(), Self::Error>;

    /// Delete the relationship for the pair
    ///
    /// Returns `false` if there was none.
    fn delete_relationship(&mut self) -> Result<bool, Self::Error>;

    /// Publish every write made through this transaction
    fn commit(self) -> Result<(), Self::Error>;
}
