//! Command implementations.

pub mod actor;
pub mod relation;

pub use self::actor::run_actor;
pub use self::relation::run_relation;

use crate::cli::Command;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use rapport_domain::RelationshipKind;
use rapport_engine::RelationshipEngine;
use rapport_store::{SqliteActorDirectory, SqliteStore, StoreConfig};
use std::fs;
use tracing::debug;

/// Engine over the configured SQLite database.
pub type Engine = RelationshipEngine<SqliteStore, SqliteActorDirectory>;

/// Open the actor directory and relationship store described by `config`.
pub fn open_engine(config: &StoreConfig) -> Result<Engine> {
    if !config.is_in_memory() {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
    }

    let directory = SqliteActorDirectory::open(config)?;
    let store = SqliteStore::open(config)?;
    debug!("Opened database at {}", config.path.display());
    Ok(RelationshipEngine::new(store, directory))
}

/// Run a command against an open engine and return what it prints.
pub fn run(command: Command, engine: &Engine, formatter: &Formatter) -> Result<String> {
    debug!(kind = ?command.relationship_kind(), "Running command");
    match command {
        Command::Actor(args) => run_actor(args.action, engine.directory(), formatter),
        Command::Friend(args) => run_relation(RelationshipKind::UserFriend, args.action, engine, formatter),
        Command::Member(args) => {
            run_relation(RelationshipKind::UserGroupMembership, args.action, engine, formatter)
        }
        Command::Alliance(args) => {
            run_relation(RelationshipKind::GroupAlliance, args.action, engine, formatter)
        }
    }
}

/// Execute a command and print its output.
pub fn execute(command: Command, config: &Config, formatter: &Formatter) -> Result<()> {
    let engine = open_engine(&config.store)?;
    let output = run(command, &engine, formatter)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
