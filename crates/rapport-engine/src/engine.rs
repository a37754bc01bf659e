//! The relationship request state machine

use crate::error::{RelationshipError, Result};
use crate::scope::KindScope;
use rapport_domain::traits::{ActorDirectory, PairTransaction, RelationshipStore};
use rapport_domain::{
    Actor, ActorId, KindDescriptor, PairKey, PairState, Relationship, RelationshipKind,
    RelationshipRequest, Side,
};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Current timestamp in seconds since Unix epoch
pub(crate) fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Relationship engine for every [`RelationshipKind`]
///
/// The engine is the only writer of the request and relationship stores. Each
/// state-changing call runs inside one [`PairTransaction`], so the
/// check-then-write sequence for a pair is atomic. Whether calls on unrelated
/// pairs run in parallel depends on the store: `MemoryStore` locks per pair,
/// `SqliteStore` serializes every writer on the database.
///
/// Pair states and transitions:
///
/// | From | Operation | To |
/// |------|-----------|----|
/// | None | `create_request(a, b, false)` | Pending a→b |
/// | None | `create_request(a, b, true)` | Related |
/// | Pending a→b | `update_request(a, b, true)` | Related |
/// | Pending a→b | `update_request(a, b, false)` | None |
/// | Related | `remove_relationship(a, b)` | None |
///
/// Every other combination fails without touching the stores.
///
/// # Examples
///
/// ```
/// use rapport_engine::RelationshipEngine;
/// use rapport_store::{MemoryActorDirectory, MemoryStore};
///
/// let directory = MemoryActorDirectory::new();
/// let alice = directory.create_user("alice");
/// let bob = directory.create_user("bob");
///
/// let engine = RelationshipEngine::new(MemoryStore::new(), directory);
/// let friends = engine.friends();
/// friends.create_request(alice.id, bob.id, false).unwrap();
/// friends.update_request(alice.id, bob.id, true).unwrap();
///
/// assert_eq!(friends.related_actors(bob.id).unwrap(), vec![alice]);
/// ```
pub struct RelationshipEngine<S, D> {
    store: S,
    directory: D,
}

impl<S, D> RelationshipEngine<S, D>
where
    S: RelationshipStore,
    D: ActorDirectory,
{
    /// Create an engine over a store and an actor directory
    pub fn new(store: S, directory: D) -> Self {
        Self { store, directory }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The actor directory
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Operations for a single relationship kind
    pub fn kind(&self, kind: RelationshipKind) -> KindScope<'_, S, D> {
        KindScope::new(self, kind)
    }

    /// User to user friendships
    pub fn friends(&self) -> KindScope<'_, S, D> {
        self.kind(RelationshipKind::UserFriend)
    }

    /// User to group memberships
    pub fn memberships(&self) -> KindScope<'_, S, D> {
        self.kind(RelationshipKind::UserGroupMembership)
    }

    /// Group to group alliances
    pub fn alliances(&self) -> KindScope<'_, S, D> {
        self.kind(RelationshipKind::GroupAlliance)
    }

    /// Send a request from `requestor` to `acceptor`
    ///
    /// Fails with:
    /// - `SelfRelationship` if both ids are the same
    /// - `ActorNotFound` if either id does not resolve to an actor of the type
    ///   the kind expects on that side
    /// - `Conflict` if the pair already has a pending request (in either
    ///   direction) or a relationship
    ///
    /// With `auto_accept`, no request is stored: the relationship is created
    /// directly and the returned request only echoes what was accepted.
    pub fn create_request(
        &self,
        kind: RelationshipKind,
        requestor: ActorId,
        acceptor: ActorId,
        auto_accept: bool,
    ) -> Result<RelationshipRequest> {
        if requestor == acceptor {
            return Err(RelationshipError::SelfRelationship(requestor));
        }

        let descriptor = kind.descriptor();
        self.resolve_participant(descriptor, Side::Requestor, requestor)?;
        self.resolve_participant(descriptor, Side::Acceptor, acceptor)?;

        let pair = PairKey::new(kind, requestor, acceptor);
        let now = current_timestamp();
        let request = RelationshipRequest::new(kind, requestor, acceptor, auto_accept, now);

        let mut tx = self.store.begin(pair).map_err(|e| RelationshipError::write(pair, e))?;

        let state = tx.pair_state().map_err(|e| RelationshipError::write(pair, e))?;
        if !state.is_none() {
            debug!(%pair, state = state.label(), "Request refused: pair already has state");
            return Err(RelationshipError::Conflict { pair, state });
        }

        let inserted = if auto_accept {
            tx.insert_relationship(&request.to_relationship(now))
        } else {
            tx.insert_request(&request)
        };
        inserted.map_err(|e| RelationshipError::write(pair, e))?;

        tx.commit().map_err(|e| RelationshipError::write(pair, e))?;

        if auto_accept {
            info!(%kind, %requestor, %acceptor, "Relationship created by auto-accept");
        } else {
            info!(%kind, %requestor, %acceptor, "Relationship request created");
        }
        Ok(request)
    }

    /// Accept or reject the pending request from `requestor` to `acceptor`
    ///
    /// The request must exist with exactly this direction, otherwise the call
    /// fails with `RequestNotFound`. That includes requests already resolved by
    /// an earlier call and requests that were auto-accepted.
    pub fn update_request(
        &self,
        kind: RelationshipKind,
        requestor: ActorId,
        acceptor: ActorId,
        accepted: bool,
    ) -> Result<()> {
        let pair = PairKey::new(kind, requestor, acceptor);
        let mut tx = self.store.begin(pair).map_err(|e| RelationshipError::write(pair, e))?;

        let removed = tx
            .delete_request(requestor, acceptor)
            .map_err(|e| RelationshipError::write(pair, e))?;
        if !removed {
            return Err(RelationshipError::RequestNotFound {
                kind,
                requestor,
                acceptor,
            });
        }

        if accepted {
            if let Some(existing) = tx
                .find_relationship()
                .map_err(|e| RelationshipError::write(pair, e))?
            {
                return Err(RelationshipError::Conflict {
                    pair,
                    state: PairState::Related(existing),
                });
            }
            let relationship = Relationship::new(kind, requestor, acceptor, current_timestamp());
            tx.insert_relationship(&relationship)
                .map_err(|e| RelationshipError::write(pair, e))?;
        }

        tx.commit().map_err(|e| RelationshipError::write(pair, e))?;

        if accepted {
            info!(%kind, %requestor, %acceptor, "Relationship request accepted");
        } else {
            info!(%kind, %requestor, %acceptor, "Relationship request rejected");
        }
        Ok(())
    }

    /// End the relationship between two actors
    ///
    /// Either participant may be passed as `requestor`; the pair is looked up
    /// in both orders. Fails with `RelationshipNotFound` if the pair is not
    /// related. Nothing is kept after removal: relating again needs a new
    /// request.
    pub fn remove_relationship(
        &self,
        kind: RelationshipKind,
        requestor: ActorId,
        acceptor: ActorId,
    ) -> Result<()> {
        let pair = PairKey::new(kind, requestor, acceptor);
        let mut tx = self.store.begin(pair).map_err(|e| RelationshipError::write(pair, e))?;

        let removed = tx
            .delete_relationship()
            .map_err(|e| RelationshipError::write(pair, e))?;
        if !removed {
            return Err(RelationshipError::RelationshipNotFound(pair));
        }

        tx.commit().map_err(|e| RelationshipError::write(pair, e))?;
        info!(%kind, %requestor, %acceptor, "Relationship removed");
        Ok(())
    }

    /// Resolve `id` and check it may occupy `side` of the kind
    fn resolve_participant(
        &self,
        descriptor: &KindDescriptor,
        side: Side,
        id: ActorId,
    ) -> Result<Actor> {
        let expected = descriptor.expected_type(side);
        let actor = self
            .directory
            .get_actor(id)
            .map_err(RelationshipError::directory)?;

        match actor {
            Some(actor) if descriptor.accepts(side, actor.actor_type) => Ok(actor),
            _ => Err(RelationshipError::ActorNotFound {
                kind: descriptor.kind,
                side,
                id,
                expected,
            }),
        }
    }
}
