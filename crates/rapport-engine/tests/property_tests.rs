//! Property tests for rapport-engine
//!
//! Random operation sequences are applied both to the engine and to a small
//! reference model of pair states. Every result must match the model, and
//! after every step each pair holds at most one pending request or one
//! relationship.

use proptest::prelude::*;
use rapport_domain::traits::{ActorDirectory, RelationshipStore};
use rapport_domain::{ActorId, PairState};
use rapport_engine::{ErrorKind, RelationshipEngine};
use rapport_store::{MemoryActorDirectory, MemoryStore, SqliteStore};
use std::collections::HashMap;

const USERS: usize = 4;

#[derive(Debug, Clone)]
enum Op {
    Create { a: usize, b: usize, auto_accept: bool },
    Update { a: usize, b: usize, accepted: bool },
    Remove { a: usize, b: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let user = 0..USERS;
    prop_oneof![
        (user.clone(), user.clone(), any::<bool>())
            .prop_map(|(a, b, auto_accept)| Op::Create { a, b, auto_accept }),
        (user.clone(), user.clone(), any::<bool>())
            .prop_map(|(a, b, accepted)| Op::Update { a, b, accepted }),
        (user.clone(), user).prop_map(|(a, b)| Op::Remove { a, b }),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Model {
    Pending { from: usize },
    Related,
}

/// Reference model keyed by the unordered pair
#[derive(Default)]
struct Reference {
    pairs: HashMap<(usize, usize), Model>,
}

impl Reference {
    fn key(a: usize, b: usize) -> (usize, usize) {
        (a.min(b), a.max(b))
    }

    fn apply(&mut self, op: &Op) -> Result<(), ErrorKind> {
        match *op {
            Op::Create { a, b, auto_accept } => {
                if a == b {
                    return Err(ErrorKind::InvalidArgument);
                }
                let key = Self::key(a, b);
                if self.pairs.contains_key(&key) {
                    return Err(ErrorKind::Conflict);
                }
                let state = if auto_accept { Model::Related } else { Model::Pending { from: a } };
                self.pairs.insert(key, state);
                Ok(())
            }
            Op::Update { a, b, accepted } => {
                let key = Self::key(a, b);
                match self.pairs.get(&key) {
                    Some(Model::Pending { from }) if *from == a && a != b => {
                        if accepted {
                            self.pairs.insert(key, Model::Related);
                        } else {
                            self.pairs.remove(&key);
                        }
                        Ok(())
                    }
                    _ => Err(ErrorKind::NotFound),
                }
            }
            Op::Remove { a, b } => {
                let key = Self::key(a, b);
                match self.pairs.get(&key) {
                    Some(Model::Related) => {
                        self.pairs.remove(&key);
                        Ok(())
                    }
                    _ => Err(ErrorKind::NotFound),
                }
            }
        }
    }
}

fn run_sequence<S, D>(engine: &RelationshipEngine<S, D>, users: &[ActorId], ops: &[Op])
where
    S: RelationshipStore,
    D: ActorDirectory,
{
    let friends = engine.friends();
    let mut reference = Reference::default();

    for op in ops {
        let actual = match *op {
            Op::Create { a, b, auto_accept } => friends
                .create_request(users[a], users[b], auto_accept)
                .map(|_| ()),
            Op::Update { a, b, accepted } => friends.update_request(users[a], users[b], accepted),
            Op::Remove { a, b } => friends.remove_relationship(users[a], users[b]),
        }
        .map_err(|e| e.kind());
        let expected = reference.apply(op);
        assert_eq!(actual, expected, "{:?}", op);

        for a in 0..USERS {
            for b in (a + 1)..USERS {
                let state = friends.pair_state(users[a], users[b]).unwrap();
                let expected = reference.pairs.get(&(a, b)).copied();
                match (state, expected) {
                    (PairState::None, None) | (PairState::Related(_), Some(Model::Related)) => {}
                    (PairState::Pending(request), Some(Model::Pending { from })) => {
                        assert_eq!(request.requestor_id, users[from]);
                    }
                    (state, expected) => {
                        panic!("pair ({}, {}) is {:?}, model says {:?}", a, b, state, expected)
                    }
                }
            }
        }

        for (i, &user) in users.iter().enumerate() {
            let related = friends.related_actors(user).unwrap();
            assert_eq!(friends.relationship_count(user).unwrap(), related.len());
            for other in &related {
                let back = friends.related_actors(other.id).unwrap();
                assert!(back.iter().any(|a| a.id == user), "relation of {} not symmetric", i);
            }

            // A pending pair never shows up as related, and vice versa
            for incoming in friends.incoming_requests(user).unwrap() {
                assert!(!related.iter().any(|a| a.id == incoming.id));
            }
        }
    }
}

fn directory() -> (MemoryActorDirectory, Vec<ActorId>) {
    let directory = MemoryActorDirectory::new();
    let users = (0..USERS)
        .map(|i| directory.create_user(&format!("user-{}", i)).id)
        .collect();
    (directory, users)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn memory_store_matches_model(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let (directory, users) = directory();
        let engine = RelationshipEngine::new(MemoryStore::new(), directory);
        run_sequence(&engine, &users, &ops);
        prop_assert_eq!(engine.store().active_pair_locks(), 0);
    }

    #[test]
    fn sqlite_store_matches_model(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let (directory, users) = directory();
        let engine = RelationshipEngine::new(SqliteStore::in_memory().unwrap(), directory);
        run_sequence(&engine, &users, &ops);
    }
}
