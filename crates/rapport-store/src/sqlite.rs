//! SQLite adapter for the request and relationship tables

use crate::{StoreConfig, StoreError};
use parking_lot::{Mutex, MutexGuard};
use rapport_domain::traits::{PairTransaction, RelationshipStore};
use rapport_domain::{ActorId, PairKey, PairState, Relationship, RelationshipKind, RelationshipRequest};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, warn};

const REQUEST_COLUMNS: &str = "kind, requestor_id, acceptor_id, auto_accept, created_at";
const RELATIONSHIP_COLUMNS: &str = "kind, requestor_id, acceptor_id, created_at";

// Every relationship touching ?2, seen from ?2's side. Both stored orderings are
// read so the result never depends on who sent the original request.
const RELATED_SQL: &str = "SELECT acceptor_id AS other, seq FROM relationships
         WHERE kind = ?1 AND requestor_id = ?2
     UNION ALL
     SELECT requestor_id AS other, seq FROM relationships
         WHERE kind = ?1 AND acceptor_id = ?2";

/// Open a connection and bring the schema up to date
pub(crate) fn open_connection(config: &StoreConfig) -> Result<Connection, StoreError> {
    let conn = Connection::open(&config.path)?;
    conn.busy_timeout(config.busy_timeout())?;

    if config.wal && !config.is_in_memory() {
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!("SQLite journal mode: {}", mode);
    }

    conn.execute_batch(include_str!("schema.sql"))?;
    debug!("Schema ready at {}", config.path.display());
    Ok(conn)
}

fn kind_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<RelationshipKind> {
    let name: String = row.get(idx)?;
    RelationshipKind::parse(&name).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(StoreError::InvalidData(format!("Unknown relationship kind: {}", name))),
        )
    })
}

fn request_from_row(row: &Row<'_>) -> rusqlite::Result<RelationshipRequest> {
    Ok(RelationshipRequest {
        kind: kind_at(row, 0)?,
        requestor_id: ActorId::new(row.get(1)?),
        acceptor_id: ActorId::new(row.get(2)?),
        auto_accept: row.get(3)?,
        created_at: row.get::<_, i64>(4)? as u64,
    })
}

fn relationship_from_row(row: &Row<'_>) -> rusqlite::Result<Relationship> {
    Ok(Relationship {
        kind: kind_at(row, 0)?,
        requestor_id: ActorId::new(row.get(1)?),
        acceptor_id: ActorId::new(row.get(2)?),
        created_at: row.get::<_, i64>(3)? as u64,
    })
}

fn select_request(
    conn: &Connection,
    kind: RelationshipKind,
    requestor: ActorId,
    acceptor: ActorId,
) -> Result<Option<RelationshipRequest>, StoreError> {
    let sql = format!(
        "SELECT {} FROM relationship_requests
         WHERE kind = ?1 AND requestor_id = ?2 AND acceptor_id = ?3",
        REQUEST_COLUMNS
    );
    let request = conn
        .prepare_cached(&sql)?
        .query_row(
            params![kind.as_str(), requestor.value(), acceptor.value()],
            request_from_row,
        )
        .optional()?;
    Ok(request)
}

fn select_relationship(conn: &Connection, pair: PairKey) -> Result<Option<Relationship>, StoreError> {
    let sql = format!(
        "SELECT {} FROM relationships WHERE kind = ?1 AND low_id = ?2 AND high_id = ?3",
        RELATIONSHIP_COLUMNS
    );
    let relationship = conn
        .prepare_cached(&sql)?
        .query_row(
            params![pair.kind.as_str(), pair.low.value(), pair.high.value()],
            relationship_from_row,
        )
        .optional()?;
    Ok(relationship)
}

fn select_pending(conn: &Connection, pair: PairKey) -> Result<Option<RelationshipRequest>, StoreError> {
    let sql = format!(
        "SELECT {} FROM relationship_requests WHERE kind = ?1 AND low_id = ?2 AND high_id = ?3",
        REQUEST_COLUMNS
    );
    let request = conn
        .prepare_cached(&sql)?
        .query_row(
            params![pair.kind.as_str(), pair.low.value(), pair.high.value()],
            request_from_row,
        )
        .optional()?;
    Ok(request)
}

fn select_pair_state(conn: &Connection, pair: PairKey) -> Result<PairState, StoreError> {
    if let Some(relationship) = select_relationship(conn, pair)? {
        return Ok(PairState::Related(relationship));
    }
    Ok(select_pending(conn, pair)?.map_or(PairState::None, PairState::Pending))
}

/// SQLite-backed implementation of [`RelationshipStore`]
///
/// Requests and relationships live in two tables of the same database. The
/// schema enforces the one-state-per-pair rule on its own (unique indexes on
/// the canonical pair plus cross-table triggers), so a writer that loses a race
/// gets a constraint violation instead of corrupting the pair.
///
/// # Thread Safety
///
/// The store is `Sync`; callers share it behind an `Arc`. Unlike
/// [`MemoryStore`](crate::MemoryStore) there is no per-pair locking: every
/// pair transaction takes the single writer connection, and `BEGIN IMMEDIATE`
/// holds SQLite's database-wide write lock until commit or rollback. Writes to
/// unrelated pairs therefore run one at a time, across this store and any
/// other store (in this process or another) opened on the same file; waiters
/// block for up to `busy_timeout_ms`. File-backed stores read through a second
/// connection, so queries run while a write transaction is open.
///
/// # Examples
///
/// ```no_run
/// use rapport_store::SqliteStore;
///
/// let store = SqliteStore::new("rapport.db").unwrap();
/// ```
pub struct SqliteStore {
    writer: Mutex<Connection>,
    reader: Option<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` with default settings
    ///
    /// Use `:memory:` for a private in-memory database.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if path.as_ref().as_os_str() == ":memory:" {
            return Self::open(&StoreConfig::in_memory());
        }
        Self::open(&StoreConfig::at(path))
    }

    /// Open a private in-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::open(&StoreConfig::in_memory())
    }

    /// Open the database described by `config`
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let writer = open_connection(config)?;
        // A second connection to ":memory:" would be a different database
        let reader = if config.is_in_memory() {
            None
        } else {
            Some(Mutex::new(open_connection(config)?))
        };
        Ok(Self {
            writer: Mutex::new(writer),
            reader,
        })
    }

    fn read_conn(&self) -> MutexGuard<'_, Connection> {
        match &self.reader {
            Some(reader) => reader.lock(),
            None => self.writer.lock(),
        }
    }

    fn query_requests(
        &self,
        kind: RelationshipKind,
        column: &str,
        actor: ActorId,
    ) -> Result<Vec<RelationshipRequest>, StoreError> {
        let sql = format!(
            "SELECT {} FROM relationship_requests WHERE kind = ?1 AND {} = ?2 ORDER BY seq",
            REQUEST_COLUMNS, column
        );
        let conn = self.read_conn();
        let mut stmt = conn.prepare_cached(&sql)?;
        let requests = stmt
            .query_map(params![kind.as_str(), actor.value()], request_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(requests)
    }
}

impl RelationshipStore for SqliteStore {
    type Error = StoreError;
    type Transaction<'a> = SqliteTransaction<'a> where Self: 'a;

    fn begin(&self, pair: PairKey) -> Result<SqliteTransaction<'_>, StoreError> {
        let conn = self.writer.lock();
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(SqliteTransaction {
            conn,
            pair,
            open: true,
        })
    }

    fn pair_state(&self, pair: PairKey) -> Result<PairState, StoreError> {
        let conn = self.read_conn();
        // Both reads share one deferred transaction so they see the same snapshot
        conn.execute_batch("BEGIN")?;
        let state = select_pair_state(&conn, pair);
        conn.execute_batch("COMMIT")?;
        state
    }

    fn incoming_requests(
        &self,
        kind: RelationshipKind,
        acceptor: ActorId,
    ) -> Result<Vec<RelationshipRequest>, StoreError> {
        self.query_requests(kind, "acceptor_id", acceptor)
    }

    fn outgoing_requests(
        &self,
        kind: RelationshipKind,
        requestor: ActorId,
    ) -> Result<Vec<RelationshipRequest>, StoreError> {
        self.query_requests(kind, "requestor_id", requestor)
    }

    fn related_actors(
        &self,
        kind: RelationshipKind,
        actor: ActorId,
    ) -> Result<Vec<ActorId>, StoreError> {
        let sql = format!(
            "SELECT other FROM ({}) GROUP BY other ORDER BY MIN(seq)",
            RELATED_SQL
        );
        let conn = self.read_conn();
        let mut stmt = conn.prepare_cached(&sql)?;
        let ids = stmt
            .query_map(params![kind.as_str(), actor.value()], |row| {
                Ok(ActorId::new(row.get(0)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn relationship_count(&self, kind: RelationshipKind, actor: ActorId) -> Result<usize, StoreError> {
        let sql = format!("SELECT COUNT(DISTINCT other) FROM ({})", RELATED_SQL);
        let conn = self.read_conn();
        let count: i64 = conn
            .prepare_cached(&sql)?
            .query_row(params![kind.as_str(), actor.value()], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Immediate-mode SQLite transaction over one pair
///
/// Rolls back on drop unless [`commit`](PairTransaction::commit) succeeded.
pub struct SqliteTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    pair: PairKey,
    open: bool,
}

impl SqliteTransaction<'_> {
    fn ensure_scope(&self, requested: PairKey) -> Result<(), StoreError> {
        if requested != self.pair {
            return Err(StoreError::OutOfScope {
                scope: self.pair,
                requested,
            });
        }
        Ok(())
    }
}

impl PairTransaction for SqliteTransaction<'_> {
    type Error = StoreError;

    fn pair(&self) -> PairKey {
        self.pair
    }

    fn find_request(
        &mut self,
        requestor: ActorId,
        acceptor: ActorId,
    ) -> Result<Option<RelationshipRequest>, StoreError> {
        self.ensure_scope(PairKey::new(self.pair.kind, requestor, acceptor))?;
        select_request(&self.conn, self.pair.kind, requestor, acceptor)
    }

    fn find_relationship(&mut self) -> Result<Option<Relationship>, StoreError> {
        select_relationship(&self.conn, self.pair)
    }

    fn insert_request(&mut self, request: &RelationshipRequest) -> Result<(), StoreError> {
        self.ensure_scope(request.pair_key())?;
        self.conn
            .prepare_cached(
                "INSERT INTO relationship_requests
                 (kind, requestor_id, acceptor_id, low_id, high_id, auto_accept, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?
            .execute(params![
                request.kind.as_str(),
                request.requestor_id.value(),
                request.acceptor_id.value(),
                self.pair.low.value(),
                self.pair.high.value(),
                request.auto_accept,
                request.created_at as i64,
            ])?;
        Ok(())
    }

    fn delete_request(&mut self, requestor: ActorId, acceptor: ActorId) -> Result<bool, StoreError> {
        self.ensure_scope(PairKey::new(self.pair.kind, requestor, acceptor))?;
        let deleted = self
            .conn
            .prepare_cached(
                "DELETE FROM relationship_requests
                 WHERE kind = ?1 AND requestor_id = ?2 AND acceptor_id = ?3",
            )?
            .execute(params![self.pair.kind.as_str(), requestor.value(), acceptor.value()])?;
        Ok(deleted > 0)
    }

    fn insert_relationship(&mut self, relationship: &Relationship) -> Result<(), StoreError> {
        self.ensure_scope(relationship.pair_key())?;
        self.conn
            .prepare_cached(
                "INSERT INTO relationships
                 (kind, requestor_id, acceptor_id, low_id, high_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?
            .execute(params![
                relationship.kind.as_str(),
                relationship.requestor_id.value(),
                relationship.acceptor_id.value(),
                self.pair.low.value(),
                self.pair.high.value(),
                relationship.created_at as i64,
            ])?;
        Ok(())
    }

    fn delete_relationship(&mut self) -> Result<bool, StoreError> {
        let deleted = self
            .conn
            .prepare_cached(
                "DELETE FROM relationships WHERE kind = ?1 AND low_id = ?2 AND high_id = ?3",
            )?
            .execute(params![
                self.pair.kind.as_str(),
                self.pair.low.value(),
                self.pair.high.value(),
            ])?;
        Ok(deleted > 0)
    }

    fn commit(mut self) -> Result<(), StoreError> {
        self.conn.execute_batch("COMMIT")?;
        self.open = false;
        Ok(())
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                warn!("Rollback of transaction on {} failed: {}", self.pair, e);
            }
        }
    }
}
