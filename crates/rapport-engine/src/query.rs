//! Read-only projections over the request and relationship stores

use crate::error::{RelationshipError, Result};
use crate::RelationshipEngine;
use rapport_domain::traits::{ActorDirectory, RelationshipStore};
use rapport_domain::{Actor, ActorId, PairKey, PairState, RelationshipKind};
use tracing::{debug, warn};

impl<S, D> RelationshipEngine<S, D>
where
    S: RelationshipStore,
    D: ActorDirectory,
{
    /// Actors with a pending request addressed to `actor`, oldest first
    pub fn incoming_requests(&self, kind: RelationshipKind, actor: ActorId) -> Result<Vec<Actor>> {
        let requests = self
            .store()
            .incoming_requests(kind, actor)
            .map_err(RelationshipError::storage)?;
        debug!(%kind, %actor, count = requests.len(), "Loaded incoming requests");
        self.resolve_all(requests.iter().map(|r| r.requestor_id))
    }

    /// Actors `actor` has sent a pending request to, oldest first
    pub fn outgoing_requests(&self, kind: RelationshipKind, actor: ActorId) -> Result<Vec<Actor>> {
        let requests = self
            .store()
            .outgoing_requests(kind, actor)
            .map_err(RelationshipError::storage)?;
        debug!(%kind, %actor, count = requests.len(), "Loaded outgoing requests");
        self.resolve_all(requests.iter().map(|r| r.acceptor_id))
    }

    /// Actors related to `actor`, whichever side of the original request they were on
    pub fn related_actors(&self, kind: RelationshipKind, actor: ActorId) -> Result<Vec<Actor>> {
        let ids = self
            .store()
            .related_actors(kind, actor)
            .map_err(RelationshipError::storage)?;
        debug!(%kind, %actor, count = ids.len(), "Loaded related actors");
        self.resolve_all(ids)
    }

    /// Number of actors related to `actor`, counted by the store
    pub fn relationship_count(&self, kind: RelationshipKind, actor: ActorId) -> Result<usize> {
        self.store()
            .relationship_count(kind, actor)
            .map_err(RelationshipError::storage)
    }

    /// Current state of the pair `{a, b}`
    pub fn pair_state(&self, kind: RelationshipKind, a: ActorId, b: ActorId) -> Result<PairState> {
        self.store()
            .pair_state(PairKey::new(kind, a, b))
            .map_err(RelationshipError::storage)
    }

    fn resolve_all<I>(&self, ids: I) -> Result<Vec<Actor>>
    where
        I: IntoIterator<Item = ActorId>,
    {
        let mut actors = Vec::new();
        for id in ids {
            match self
                .directory()
                .get_actor(id)
                .map_err(RelationshipError::directory)?
            {
                Some(actor) => actors.push(actor),
                None => warn!(%id, "Actor in relationship store no longer resolves; skipping"),
            }
        }
        Ok(actors)
    }
}
