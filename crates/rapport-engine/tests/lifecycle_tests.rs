//! Request lifecycle tests for rapport-engine
//!
//! Each check runs against the in-memory adapter and against SQLite (actors
//! and relationships sharing one database file).

use rapport_domain::traits::{ActorDirectory, RelationshipStore};
use rapport_domain::{ActorId, PairState, Side};
use rapport_engine::{ErrorKind, RelationshipEngine, RelationshipError};
use rapport_store::{MemoryActorDirectory, MemoryStore, SqliteActorDirectory, SqliteStore};
use tempfile::TempDir;

/// Actors every check starts from
struct Cast {
    u1: ActorId,
    u2: ActorId,
    u3: ActorId,
    g1: ActorId,
    g2: ActorId,
}

fn memory_engine() -> (RelationshipEngine<MemoryStore, MemoryActorDirectory>, Cast) {
    let directory = MemoryActorDirectory::new();
    let cast = Cast {
        u1: directory.create_user("u1").id,
        u2: directory.create_user("u2").id,
        u3: directory.create_user("u3").id,
        g1: directory.create_group("g1").id,
        g2: directory.create_group("g2").id,
    };
    (RelationshipEngine::new(MemoryStore::new(), directory), cast)
}

fn sqlite_engine(dir: &TempDir) -> (RelationshipEngine<SqliteStore, SqliteActorDirectory>, Cast) {
    let path = dir.path().join("rapport.db");
    let directory = SqliteActorDirectory::new(&path).unwrap();
    let cast = Cast {
        u1: directory.create_user("u1").unwrap().id,
        u2: directory.create_user("u2").unwrap().id,
        u3: directory.create_user("u3").unwrap().id,
        g1: directory.create_group("g1").unwrap().id,
        g2: directory.create_group("g2").unwrap().id,
    };
    let store = SqliteStore::new(&path).unwrap();
    (RelationshipEngine::new(store, directory), cast)
}

fn ids(actors: Vec<rapport_domain::Actor>) -> Vec<ActorId> {
    actors.into_iter().map(|a| a.id).collect()
}

/// Repeating a pending request conflicts
fn check_duplicate_request_conflicts<S, D>(engine: &RelationshipEngine<S, D>, cast: &Cast)
where
    S: RelationshipStore,
    D: ActorDirectory,
{
    let friends = engine.friends();
    let request = friends.create_request(cast.u1, cast.u2, false).unwrap();
    assert_eq!(request.requestor_id, cast.u1);
    assert_eq!(request.acceptor_id, cast.u2);
    assert!(!request.auto_accept);

    let err = friends.create_request(cast.u1, cast.u2, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(matches!(
        err,
        RelationshipError::Conflict { state: PairState::Pending(_), .. }
    ));
    assert_eq!(ids(friends.incoming_requests(cast.u2).unwrap()), vec![cast.u1]);
}

/// A pending request blocks a request in the other direction too
fn check_reverse_request_conflicts<S, D>(engine: &RelationshipEngine<S, D>, cast: &Cast)
where
    S: RelationshipStore,
    D: ActorDirectory,
{
    let alliances = engine.alliances();
    alliances.create_request(cast.g1, cast.g2, false).unwrap();

    let err = alliances.create_request(cast.g2, cast.g1, false).unwrap_err();
    assert!(err.is_conflict());
    let err = alliances.create_request(cast.g2, cast.g1, true).unwrap_err();
    assert!(err.is_conflict());

    assert!(alliances.pair_state(cast.g2, cast.g1).unwrap().is_pending_from(cast.g1));
    assert_eq!(alliances.relationship_count(cast.g1).unwrap(), 0);
}

/// Auto-accept skips the pending stage
fn check_auto_accept<S, D>(engine: &RelationshipEngine<S, D>, cast: &Cast)
where
    S: RelationshipStore,
    D: ActorDirectory,
{
    let friends = engine.friends();
    let request = friends.create_request(cast.u1, cast.u2, true).unwrap();
    assert!(request.auto_accept);

    assert!(friends.incoming_requests(cast.u2).unwrap().is_empty());
    assert!(friends.outgoing_requests(cast.u1).unwrap().is_empty());
    assert_eq!(ids(friends.related_actors(cast.u1).unwrap()), vec![cast.u2]);

    let err = friends.update_request(cast.u1, cast.u2, true).unwrap_err();
    assert!(matches!(err, RelationshipError::RequestNotFound { .. }));

    // Related pairs refuse new requests in either direction
    assert!(friends.create_request(cast.u2, cast.u1, false).unwrap_err().is_conflict());
    assert!(friends.create_request(cast.u1, cast.u2, true).unwrap_err().is_conflict());
}

/// Accepting relates both sides and is visible from either
fn check_accept<S, D>(engine: &RelationshipEngine<S, D>, cast: &Cast)
where
    S: RelationshipStore,
    D: ActorDirectory,
{
    let friends = engine.friends();
    friends.create_request(cast.u1, cast.u2, false).unwrap();
    friends.update_request(cast.u1, cast.u2, true).unwrap();

    assert_eq!(ids(friends.related_actors(cast.u1).unwrap()), vec![cast.u2]);
    assert_eq!(ids(friends.related_actors(cast.u2).unwrap()), vec![cast.u1]);
    assert_eq!(friends.relationship_count(cast.u1).unwrap(), 1);
    assert_eq!(friends.relationship_count(cast.u2).unwrap(), 1);
    assert!(friends.incoming_requests(cast.u2).unwrap().is_empty());

    // A resolved request cannot be resolved again
    let err = friends.update_request(cast.u1, cast.u2, true).unwrap_err();
    assert!(err.is_not_found());
    let err = friends.update_request(cast.u1, cast.u2, false).unwrap_err();
    assert!(err.is_not_found());
    assert!(friends.pair_state(cast.u1, cast.u2).unwrap().is_related());
}

/// Rejecting leaves the pair with no state
fn check_reject<S, D>(engine: &RelationshipEngine<S, D>, cast: &Cast)
where
    S: RelationshipStore,
    D: ActorDirectory,
{
    let friends = engine.friends();
    friends.create_request(cast.u1, cast.u2, false).unwrap();
    friends.update_request(cast.u1, cast.u2, false).unwrap();

    assert!(friends.incoming_requests(cast.u2).unwrap().is_empty());
    assert!(friends.related_actors(cast.u1).unwrap().is_empty());
    assert_eq!(friends.pair_state(cast.u1, cast.u2).unwrap(), PairState::None);

    // The pair can start over, from either side
    friends.create_request(cast.u2, cast.u1, false).unwrap();
    assert_eq!(ids(friends.outgoing_requests(cast.u2).unwrap()), vec![cast.u1]);
}

/// Only the exact direction of a pending request can be resolved
fn check_update_requires_direction<S, D>(engine: &RelationshipEngine<S, D>, cast: &Cast)
where
    S: RelationshipStore,
    D: ActorDirectory,
{
    let members = engine.memberships();
    members.create_request(cast.u1, cast.g1, false).unwrap();

    let err = members.update_request(cast.g1, cast.u1, true).unwrap_err();
    assert!(err.is_not_found());
    assert!(members.pair_state(cast.u1, cast.g1).unwrap().is_pending_from(cast.u1));

    members.update_request(cast.u1, cast.g1, true).unwrap();
    assert_eq!(ids(members.related_actors(cast.g1).unwrap()), vec![cast.u1]);
}

/// Unknown actors and wrong actor types are reported as not found
fn check_unknown_actor<S, D>(engine: &RelationshipEngine<S, D>, cast: &Cast)
where
    S: RelationshipStore,
    D: ActorDirectory,
{
    let friends = engine.friends();
    let err = friends.create_request(ActorId::new(-1), cast.u2, false).unwrap_err();
    assert!(matches!(
        err,
        RelationshipError::ActorNotFound { side: Side::Requestor, .. }
    ));

    let err = friends.create_request(cast.u1, ActorId::new(-1), false).unwrap_err();
    assert!(matches!(
        err,
        RelationshipError::ActorNotFound { side: Side::Acceptor, .. }
    ));

    // A group is not a valid member
    let err = engine.memberships().create_request(cast.g1, cast.g2, false).unwrap_err();
    assert!(err.is_not_found());

    assert!(friends.incoming_requests(cast.u2).unwrap().is_empty());
}

/// Removal works from either side and leaves nothing behind
fn check_remove<S, D>(engine: &RelationshipEngine<S, D>, cast: &Cast)
where
    S: RelationshipStore,
    D: ActorDirectory,
{
    let friends = engine.friends();
    friends.create_request(cast.u1, cast.u2, true).unwrap();
    friends.create_request(cast.u3, cast.u1, true).unwrap();
    assert_eq!(friends.relationship_count(cast.u1).unwrap(), 2);

    // Stored as u1 -> u2, removed as u2 -> u1
    friends.remove_relationship(cast.u2, cast.u1).unwrap();
    assert_eq!(friends.pair_state(cast.u1, cast.u2).unwrap(), PairState::None);
    assert_eq!(ids(friends.related_actors(cast.u1).unwrap()), vec![cast.u3]);

    let err = friends.remove_relationship(cast.u1, cast.u2).unwrap_err();
    assert!(matches!(err, RelationshipError::RelationshipNotFound(_)));

    // Removing a pending request's pair is not a relationship removal
    friends.create_request(cast.u1, cast.u2, false).unwrap();
    assert!(friends.remove_relationship(cast.u1, cast.u2).unwrap_err().is_not_found());
    assert!(friends.pair_state(cast.u1, cast.u2).unwrap().is_pending_from(cast.u1));
}

/// Related actors are listed in the order the relationships were formed
fn check_related_actor_order<S, D>(engine: &RelationshipEngine<S, D>, cast: &Cast)
where
    S: RelationshipStore,
    D: ActorDirectory,
{
    let members = engine.memberships();
    members.create_request(cast.u3, cast.g1, false).unwrap();
    members.create_request(cast.u1, cast.g1, true).unwrap();
    members.create_request(cast.u2, cast.g1, false).unwrap();

    assert_eq!(ids(members.incoming_requests(cast.g1).unwrap()), vec![cast.u3, cast.u2]);

    members.update_request(cast.u2, cast.g1, true).unwrap();
    members.update_request(cast.u3, cast.g1, true).unwrap();

    assert_eq!(
        ids(members.related_actors(cast.g1).unwrap()),
        vec![cast.u1, cast.u2, cast.u3]
    );
    assert_eq!(members.relationship_count(cast.g1).unwrap(), 3);
    for user in [cast.u1, cast.u2, cast.u3] {
        assert_eq!(ids(members.related_actors(user).unwrap()), vec![cast.g1]);
    }
}

macro_rules! adapter_tests {
    ($($check:ident),* $(,)?) => {
        mod memory {
            use super::*;
            $(
                #[test]
                fn $check() {
                    let (engine, cast) = memory_engine();
                    super::$check(&engine, &cast);
                }
            )*
        }

        mod sqlite {
            use super::*;
            $(
                #[test]
                fn $check() {
                    let dir = TempDir::new().unwrap();
                    let (engine, cast) = sqlite_engine(&dir);
                    super::$check(&engine, &cast);
                }
            )*
        }
    };
}

adapter_tests!(
    check_duplicate_request_conflicts,
    check_reverse_request_conflicts,
    check_auto_accept,
    check_accept,
    check_reject,
    check_update_requires_direction,
    check_unknown_actor,
    check_remove,
    check_related_actor_order,
);

#[test]
fn test_sqlite_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let cast = {
        let (engine, cast) = sqlite_engine(&dir);
        engine.friends().create_request(cast.u1, cast.u2, false).unwrap();
        engine.alliances().create_request(cast.g1, cast.g2, true).unwrap();
        cast
    };

    let path = dir.path().join("rapport.db");
    let engine = RelationshipEngine::new(
        SqliteStore::new(&path).unwrap(),
        SqliteActorDirectory::new(&path).unwrap(),
    );
    assert!(engine.friends().pair_state(cast.u2, cast.u1).unwrap().is_pending_from(cast.u1));
    assert_eq!(engine.alliances().relationship_count(cast.g2).unwrap(), 1);

    engine.friends().update_request(cast.u1, cast.u2, true).unwrap();
    assert_eq!(ids(engine.friends().related_actors(cast.u2).unwrap()), vec![cast.u1]);
}
