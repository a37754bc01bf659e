//! Actor directories
//!
//! The engine only reads actors. These directories also register them, which
//! stands in for the account system in tests and in the CLI.

use crate::sqlite::open_connection;
use crate::{StoreConfig, StoreError};
use parking_lot::{Mutex, RwLock};
use rapport_domain::traits::ActorDirectory;
use rapport_domain::{Actor, ActorId, ActorType};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn actor_from_row(row: &Row<'_>) -> rusqlite::Result<Actor> {
    let type_name: String = row.get(1)?;
    let actor_type = ActorType::parse(&type_name).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            Box::new(StoreError::InvalidData(format!("Unknown actor type: {}", type_name))),
        )
    })?;
    Ok(Actor {
        id: ActorId::new(row.get(0)?),
        actor_type,
        name: row.get(2)?,
    })
}

/// SQLite-backed actor directory
///
/// Uses the `actors` table of the same schema as [`SqliteStore`](crate::SqliteStore),
/// so both can point at one database file.
pub struct SqliteActorDirectory {
    conn: Mutex<Connection>,
}

impl SqliteActorDirectory {
    /// Open (or create) the directory at `path` with default settings
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if path.as_ref().as_os_str() == ":memory:" {
            return Self::open(&StoreConfig::in_memory());
        }
        Self::open(&StoreConfig::at(path))
    }

    /// Open the directory described by `config`
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        Ok(Self {
            conn: Mutex::new(open_connection(config)?),
        })
    }

    /// Register a new actor
    ///
    /// Names are unique per actor type.
    pub fn create(&self, actor_type: ActorType, name: &str) -> Result<Actor, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidData("Actor name must not be empty".to_string()));
        }

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO actors (actor_type, name, created_at) VALUES (?1, ?2, ?3)",
            params![actor_type.as_str(), name, current_timestamp() as i64],
        )?;
        let actor = Actor::new(ActorId::new(conn.last_insert_rowid()), actor_type, name);
        info!(id = %actor.id, actor_type = %actor_type, name = %actor.name, "Registered actor");
        Ok(actor)
    }

    /// Register a new user
    pub fn create_user(&self, name: &str) -> Result<Actor, StoreError> {
        self.create(ActorType::User, name)
    }

    /// Register a new group
    pub fn create_group(&self, name: &str) -> Result<Actor, StoreError> {
        self.create(ActorType::Group, name)
    }

    /// Find an actor by type and exact name
    pub fn find_by_name(&self, actor_type: ActorType, name: &str) -> Result<Option<Actor>, StoreError> {
        let conn = self.conn.lock();
        let actor = conn
            .query_row(
                "SELECT id, actor_type, name FROM actors WHERE actor_type = ?1 AND name = ?2",
                params![actor_type.as_str(), name],
                actor_from_row,
            )
            .optional()?;
        Ok(actor)
    }

    /// List actors, optionally restricted to one type, ordered by id
    pub fn list(&self, actor_type: Option<ActorType>) -> Result<Vec<Actor>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, actor_type, name FROM actors
             WHERE ?1 IS NULL OR actor_type = ?1 ORDER BY id",
        )?;
        let actors = stmt
            .query_map(params![actor_type.map(|t| t.as_str())], actor_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(actors)
    }
}

impl ActorDirectory for SqliteActorDirectory {
    type Error = StoreError;

    fn get_actor(&self, id: ActorId) -> Result<Option<Actor>, StoreError> {
        let conn = self.conn.lock();
        let actor = conn
            .prepare_cached("SELECT id, actor_type, name FROM actors WHERE id = ?1")?
            .query_row(params![id.value()], actor_from_row)
            .optional()?;
        Ok(actor)
    }
}

/// Process-local actor directory
///
/// Ids are assigned sequentially from 1 and never reused, even after the
/// highest one is removed.
#[derive(Debug, Default)]
pub struct MemoryActorDirectory {
    registry: RwLock<Registry>,
}

#[derive(Debug, Default)]
struct Registry {
    last_id: i64,
    actors: BTreeMap<ActorId, Actor>,
}

impl MemoryActorDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new actor under the next id
    pub fn create(&self, actor_type: ActorType, name: &str) -> Actor {
        let mut registry = self.registry.write();
        registry.last_id += 1;
        let actor = Actor::new(ActorId::new(registry.last_id), actor_type, name);
        registry.actors.insert(actor.id, actor.clone());
        actor
    }

    /// Register a new user
    pub fn create_user(&self, name: &str) -> Actor {
        self.create(ActorType::User, name)
    }

    /// Register a new group
    pub fn create_group(&self, name: &str) -> Actor {
        self.create(ActorType::Group, name)
    }

    /// Remove an actor, returning it if it existed
    pub fn remove(&self, id: ActorId) -> Option<Actor> {
        self.registry.write().actors.remove(&id)
    }
}

impl ActorDirectory for MemoryActorDirectory {
    type Error = Infallible;

    fn get_actor(&self, id: ActorId) -> Result<Option<Actor>, Infallible> {
        Ok(self.registry.read().actors.get(&id).cloned())
    }
}
