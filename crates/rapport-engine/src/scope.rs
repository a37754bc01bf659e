//! Per-kind view of the engine

use crate::error::Result;
use crate::RelationshipEngine;
use rapport_domain::traits::{ActorDirectory, RelationshipStore};
use rapport_domain::{Actor, ActorId, KindDescriptor, PairState, RelationshipKind, RelationshipRequest};

/// The engine's operations with the relationship kind fixed
///
/// Obtained from [`RelationshipEngine::kind`] or one of the named shortcuts
/// such as [`RelationshipEngine::friends`].
pub struct KindScope<'e, S, D> {
    engine: &'e RelationshipEngine<S, D>,
    kind: RelationshipKind,
}

impl<S, D> Clone for KindScope<'_, S, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, D> Copy for KindScope<'_, S, D> {}

impl<'e, S, D> KindScope<'e, S, D>
where
    S: RelationshipStore,
    D: ActorDirectory,
{
    pub(crate) fn new(engine: &'e RelationshipEngine<S, D>, kind: RelationshipKind) -> Self {
        Self { engine, kind }
    }

    /// The kind this scope operates on
    pub fn kind(&self) -> RelationshipKind {
        self.kind
    }

    /// Participant rules for this kind
    pub fn descriptor(&self) -> &'static KindDescriptor {
        self.kind.descriptor()
    }

    /// See [`RelationshipEngine::create_request`]
    pub fn create_request(
        &self,
        requestor: ActorId,
        acceptor: ActorId,
        auto_accept: bool,
    ) -> Result<RelationshipRequest> {
        self.engine.create_request(self.kind, requestor, acceptor, auto_accept)
    }

    /// See [`RelationshipEngine::update_request`]
    pub fn update_request(&self, requestor: ActorId, acceptor: ActorId, accepted: bool) -> Result<()> {
        self.engine.update_request(self.kind, requestor, acceptor, accepted)
    }

    /// See [`RelationshipEngine::remove_relationship`]
    pub fn remove_relationship(&self, requestor: ActorId, acceptor: ActorId) -> Result<()> {
        self.engine.remove_relationship(self.kind, requestor, acceptor)
    }

    /// Requestors with a pending request to `actor`
    pub fn incoming_requests(&self, actor: ActorId) -> Result<Vec<Actor>> {
        self.engine.incoming_requests(self.kind, actor)
    }

    /// Acceptors of `actor`'s pending requests
    pub fn outgoing_requests(&self, actor: ActorId) -> Result<Vec<Actor>> {
        self.engine.outgoing_requests(self.kind, actor)
    }

    /// Actors related to `actor`
    pub fn related_actors(&self, actor: ActorId) -> Result<Vec<Actor>> {
        self.engine.related_actors(self.kind, actor)
    }

    /// Number of actors related to `actor`
    pub fn relationship_count(&self, actor: ActorId) -> Result<usize> {
        self.engine.relationship_count(self.kind, actor)
    }

    /// Current state of the pair `{a, b}`
    pub fn pair_state(&self, a: ActorId, b: ActorId) -> Result<PairState> {
        self.engine.pair_state(self.kind, a, b)
    }
}
