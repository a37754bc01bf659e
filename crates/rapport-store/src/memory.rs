//! In-memory adapter with per-pair locking
//!
//! Each unordered pair has its own lock, taken for the whole life of a
//! transaction, so unrelated pairs never wait on each other. Writes are staged
//! in the transaction and published under one short write lock on the tables,
//! which keeps readers from seeing a request and its relationship at the same
//! time (or neither).

use crate::MemoryStoreError;
use parking_lot::{Mutex, RawMutex, RwLock};
use parking_lot::lock_api::ArcMutexGuard;
use rapport_domain::traits::{PairTransaction, RelationshipStore};
use rapport_domain::{ActorId, PairKey, PairState, Relationship, RelationshipKind, RelationshipRequest};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Stored<T> {
    seq: u64,
    value: T,
}

#[derive(Debug, Default)]
struct Tables {
    next_seq: u64,
    requests: HashMap<PairKey, Stored<RelationshipRequest>>,
    relationships: HashMap<PairKey, Stored<Relationship>>,
}

impl Tables {
    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// Process-local implementation of [`RelationshipStore`]
///
/// Useful for tests and for embedding the engine without a database. Nothing
/// is persisted.
///
/// # Examples
///
/// ```
/// use rapport_domain::traits::RelationshipStore;
/// use rapport_domain::{ActorId, RelationshipKind};
/// use rapport_store::MemoryStore;
///
/// let store = MemoryStore::new();
/// let count = store.relationship_count(RelationshipKind::UserFriend, ActorId::new(1)).unwrap();
/// assert_eq!(count, 0);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    pair_locks: Mutex<HashMap<PairKey, Arc<Mutex<()>>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pair locks currently held or waited on
    pub fn active_pair_locks(&self) -> usize {
        self.pair_locks.lock().len()
    }

    fn lock_pair(&self, pair: PairKey) -> ArcMutexGuard<RawMutex, ()> {
        let lock = self.pair_locks.lock().entry(pair).or_default().clone();
        lock.lock_arc()
    }

    fn release_pair(&self, pair: PairKey) {
        let mut locks = self.pair_locks.lock();
        // Only the map still holds the lock: no transaction owns or awaits it
        if locks.get(&pair).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&pair);
        }
    }

    fn requests_where<F>(&self, kind: RelationshipKind, filter: F) -> Vec<RelationshipRequest>
    where
        F: Fn(&RelationshipRequest) -> bool,
    {
        let tables = self.tables.read();
        let mut rows: Vec<&Stored<RelationshipRequest>> = tables
            .requests
            .values()
            .filter(|row| row.value.kind == kind && filter(&row.value))
            .collect();
        rows.sort_by_key(|row| row.seq);
        rows.into_iter().map(|row| row.value.clone()).collect()
    }
}

impl RelationshipStore for MemoryStore {
    type Error = MemoryStoreError;
    type Transaction<'a> = MemoryTransaction<'a> where Self: 'a;

    fn begin(&self, pair: PairKey) -> Result<MemoryTransaction<'_>, MemoryStoreError> {
        let guard = self.lock_pair(pair);
        let tables = self.tables.read();
        let request = tables.requests.get(&pair).map(Staged::existing);
        let relationship = tables.relationships.get(&pair).map(Staged::existing);
        drop(tables);

        Ok(MemoryTransaction {
            store: self,
            pair,
            guard: Some(guard),
            request,
            relationship,
            dirty: false,
        })
    }

    fn pair_state(&self, pair: PairKey) -> Result<PairState, MemoryStoreError> {
        let tables = self.tables.read();
        if let Some(row) = tables.relationships.get(&pair) {
            return Ok(PairState::Related(row.value.clone()));
        }
        Ok(tables
            .requests
            .get(&pair)
            .map_or(PairState::None, |row| PairState::Pending(row.value.clone())))
    }

    fn incoming_requests(
        &self,
        kind: RelationshipKind,
        acceptor: ActorId,
    ) -> Result<Vec<RelationshipRequest>, MemoryStoreError> {
        Ok(self.requests_where(kind, |r| r.acceptor_id == acceptor))
    }

    fn outgoing_requests(
        &self,
        kind: RelationshipKind,
        requestor: ActorId,
    ) -> Result<Vec<RelationshipRequest>, MemoryStoreError> {
        Ok(self.requests_where(kind, |r| r.requestor_id == requestor))
    }

    fn related_actors(
        &self,
        kind: RelationshipKind,
        actor: ActorId,
    ) -> Result<Vec<ActorId>, MemoryStoreError> {
        let tables = self.tables.read();
        let mut rows: Vec<(u64, ActorId)> = tables
            .relationships
            .values()
            .filter(|row| row.value.kind == kind)
            .filter_map(|row| row.value.other(actor).map(|other| (row.seq, other)))
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);

        let mut seen = HashSet::new();
        Ok(rows
            .into_iter()
            .map(|(_, other)| other)
            .filter(|other| seen.insert(*other))
            .collect())
    }

    fn relationship_count(&self, kind: RelationshipKind, actor: ActorId) -> Result<usize, MemoryStoreError> {
        let tables = self.tables.read();
        let distinct: HashSet<ActorId> = tables
            .relationships
            .values()
            .filter(|row| row.value.kind == kind)
            .filter_map(|row| row.value.other(actor))
            .collect();
        Ok(distinct.len())
    }
}

#[derive(Debug, Clone)]
struct Staged<T> {
    seq: Option<u64>,
    value: T,
}

impl<T: Clone> Staged<T> {
    fn existing(row: &Stored<T>) -> Self {
        Self {
            seq: Some(row.seq),
            value: row.value.clone(),
        }
    }

    fn new(value: T) -> Self {
        Self { seq: None, value }
    }
}

/// Transaction over one pair of a [`MemoryStore`]
///
/// Holds the pair lock until dropped. Uncommitted writes are discarded.
pub struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    pair: PairKey,
    guard: Option<ArcMutexGuard<RawMutex, ()>>,
    request: Option<Staged<RelationshipRequest>>,
    relationship: Option<Staged<Relationship>>,
    dirty: bool,
}

impl MemoryTransaction<'_> {
    fn ensure_scope(&self, requested: PairKey) -> Result<(), MemoryStoreError> {
        if requested != self.pair {
            return Err(MemoryStoreError::OutOfScope {
                scope: self.pair,
                requested,
            });
        }
        Ok(())
    }

    fn violation(&self, reason: &'static str) -> MemoryStoreError {
        MemoryStoreError::Constraint {
            pair: self.pair,
            reason,
        }
    }
}

impl PairTransaction for MemoryTransaction<'_> {
    type Error = MemoryStoreError;

    fn pair(&self) -> PairKey {
        self.pair
    }

    fn find_request(
        &mut self,
        requestor: ActorId,
        acceptor: ActorId,
    ) -> Result<Option<RelationshipRequest>, MemoryStoreError> {
        self.ensure_scope(PairKey::new(self.pair.kind, requestor, acceptor))?;
        Ok(self
            .request
            .as_ref()
            .filter(|staged| staged.value.requestor_id == requestor && staged.value.acceptor_id == acceptor)
            .map(|staged| staged.value.clone()))
    }

    fn find_relationship(&mut self) -> Result<Option<Relationship>, MemoryStoreError> {
        Ok(self.relationship.as_ref().map(|staged| staged.value.clone()))
    }

    fn insert_request(&mut self, request: &RelationshipRequest) -> Result<(), MemoryStoreError> {
        self.ensure_scope(request.pair_key())?;
        if request.requestor_id == request.acceptor_id {
            return Err(self.violation("requestor and acceptor must differ"));
        }
        if self.request.is_some() {
            return Err(self.violation("a request is already pending for the pair"));
        }
        if self.relationship.is_some() {
            return Err(self.violation("pair is already related"));
        }
        self.request = Some(Staged::new(request.clone()));
        self.dirty = true;
        Ok(())
    }

    fn delete_request(&mut self, requestor: ActorId, acceptor: ActorId) -> Result<bool, MemoryStoreError> {
        if self.find_request(requestor, acceptor)?.is_none() {
            return Ok(false);
        }
        self.request = None;
        self.dirty = true;
        Ok(true)
    }

    fn insert_relationship(&mut self, relationship: &Relationship) -> Result<(), MemoryStoreError> {
        self.ensure_scope(relationship.pair_key())?;
        if relationship.requestor_id == relationship.acceptor_id {
            return Err(self.violation("requestor and acceptor must differ"));
        }
        if self.relationship.is_some() {
            return Err(self.violation("pair is already related"));
        }
        if self.request.is_some() {
            return Err(self.violation("pair has a pending request"));
        }
        self.relationship = Some(Staged::new(relationship.clone()));
        self.dirty = true;
        Ok(())
    }

    fn delete_relationship(&mut self) -> Result<bool, MemoryStoreError> {
        let existed = self.relationship.take().is_some();
        self.dirty |= existed;
        Ok(existed)
    }

    fn commit(mut self) -> Result<(), MemoryStoreError> {
        if !self.dirty {
            return Ok(());
        }

        let pair = self.pair;
        let mut tables = self.store.tables.write();

        match self.request.take() {
            Some(staged) => {
                let seq = staged.seq.unwrap_or_else(|| tables.bump_seq());
                tables.requests.insert(pair, Stored { seq, value: staged.value });
            }
            None => {
                tables.requests.remove(&pair);
            }
        }

        match self.relationship.take() {
            Some(staged) => {
                let seq = staged.seq.unwrap_or_else(|| tables.bump_seq());
                tables.relationships.insert(pair, Stored { seq, value: staged.value });
            }
            None => {
                tables.relationships.remove(&pair);
            }
        }

        self.dirty = false;
        Ok(())
    }
}

impl Drop for MemoryTransaction<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.store.release_pair(self.pair);
    }
}
