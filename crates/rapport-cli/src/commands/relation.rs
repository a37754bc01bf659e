//! Relationship command implementation, shared by every kind.

use super::Engine;
use crate::cli::{ActorRef, RelationAction};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use rapport_domain::traits::ActorDirectory;
use rapport_domain::{Actor, ActorType, RelationshipKind};
use rapport_store::SqliteActorDirectory;

/// Run a relationship command for `kind`.
pub fn run_relation(
    kind: RelationshipKind,
    action: RelationAction,
    engine: &Engine,
    formatter: &Formatter,
) -> Result<String> {
    let scope = engine.kind(kind);
    let descriptor = scope.descriptor();
    let requestor_side = [descriptor.requestor_type];
    let acceptor_side = [descriptor.acceptor_type];
    let either_side = [descriptor.requestor_type, descriptor.acceptor_type];
    let directory = engine.directory();

    match action {
        RelationAction::Request {
            requestor,
            acceptor,
            auto_accept,
        } => {
            let requestor = resolve(directory, &requestor, &requestor_side)?;
            let acceptor = resolve(directory, &acceptor, &acceptor_side)?;
            scope.create_request(requestor.id, acceptor.id, auto_accept)?;
            let outcome = if auto_accept { "Related" } else { "Requested" };
            formatter.format_outcome(kind, outcome, &requestor, &acceptor)
        }
        RelationAction::Accept { requestor, acceptor } => {
            let requestor = resolve(directory, &requestor, &requestor_side)?;
            let acceptor = resolve(directory, &acceptor, &acceptor_side)?;
            scope.update_request(requestor.id, acceptor.id, true)?;
            formatter.format_outcome(kind, "Accepted", &requestor, &acceptor)
        }
        RelationAction::Reject { requestor, acceptor } => {
            let requestor = resolve(directory, &requestor, &requestor_side)?;
            let acceptor = resolve(directory, &acceptor, &acceptor_side)?;
            scope.update_request(requestor.id, acceptor.id, false)?;
            formatter.format_outcome(kind, "Rejected", &requestor, &acceptor)
        }
        RelationAction::Remove { first, second } => {
            let first = resolve(directory, &first, &either_side)?;
            let second = resolve(directory, &second, &either_side)?;
            scope.remove_relationship(first.id, second.id)?;
            formatter.format_outcome(kind, "Removed", &first, &second)
        }
        RelationAction::Incoming { actor } => {
            let actor = resolve(directory, &actor, &acceptor_side)?;
            formatter.format_actors(&scope.incoming_requests(actor.id)?)
        }
        RelationAction::Outgoing { actor } => {
            let actor = resolve(directory, &actor, &requestor_side)?;
            formatter.format_actors(&scope.outgoing_requests(actor.id)?)
        }
        RelationAction::List { actor } => {
            let actor = resolve(directory, &actor, &either_side)?;
            formatter.format_actors(&scope.related_actors(actor.id)?)
        }
        RelationAction::Count { actor } => {
            let actor = resolve(directory, &actor, &either_side)?;
            let count = scope.relationship_count(actor.id)?;
            formatter.format_count(kind, &actor, count)
        }
    }
}

/// Look up an actor by id or name among the given types.
///
/// Names are tried against each type in order; the first match wins.
fn resolve(directory: &SqliteActorDirectory, reference: &ActorRef, types: &[ActorType]) -> Result<Actor> {
    let found = match reference {
        ActorRef::Id(id) => directory
            .get_actor(*id)?
            .filter(|actor| types.contains(&actor.actor_type)),
        ActorRef::Name(name) => {
            let mut found = None;
            for actor_type in types {
                if let Some(actor) = directory.find_by_name(*actor_type, name)? {
                    found = Some(actor);
                    break;
                }
            }
            found
        }
    };

    found.ok_or_else(|| {
        let mut expected: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
        expected.dedup();
        CliError::UnknownActor {
            reference: reference.to_string(),
            expected: expected.join(" or "),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::open_engine;
    use crate::config::OutputFormat;
    use rapport_store::StoreConfig;
    use tempfile::TempDir;

    fn name(s: &str) -> ActorRef {
        ActorRef::Name(s.to_string())
    }

    fn setup(dir: &TempDir) -> Engine {
        let engine = open_engine(&StoreConfig::at(dir.path().join("cli.db"))).unwrap();
        engine.directory().create_user("alice").unwrap();
        engine.directory().create_user("bob").unwrap();
        engine.directory().create_group("smiths").unwrap();
        engine
    }

    #[test]
    fn test_friend_request_accept_and_list() {
        let dir = TempDir::new().unwrap();
        let engine = setup(&dir);
        let quiet = Formatter::new(OutputFormat::Quiet, false);
        let kind = RelationshipKind::UserFriend;

        run_relation(
            kind,
            RelationAction::Request {
                requestor: name("alice"),
                acceptor: name("bob"),
                auto_accept: false,
            },
            &engine,
            &quiet,
        )
        .unwrap();

        let incoming = run_relation(kind, RelationAction::Incoming { actor: name("bob") }, &engine, &quiet).unwrap();
        assert_eq!(incoming, "1");

        run_relation(
            kind,
            RelationAction::Accept {
                requestor: name("alice"),
                acceptor: name("bob"),
            },
            &engine,
            &quiet,
        )
        .unwrap();

        let friends = run_relation(kind, RelationAction::List { actor: name("alice") }, &engine, &quiet).unwrap();
        assert_eq!(friends, "2");
        let count = run_relation(kind, RelationAction::Count { actor: name("bob") }, &engine, &quiet).unwrap();
        assert_eq!(count, "1");
    }

    #[test]
    fn test_membership_resolves_names_by_side() {
        let dir = TempDir::new().unwrap();
        let engine = setup(&dir);
        // A user and a group may share a name
        engine.directory().create_group("alice").unwrap();
        let json = Formatter::new(OutputFormat::Json, false);
        let kind = RelationshipKind::UserGroupMembership;

        let output = run_relation(
            kind,
            RelationAction::Request {
                requestor: name("alice"),
                acceptor: name("smiths"),
                auto_accept: true,
            },
            &engine,
            &json,
        )
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["requestor"]["type"], "user");
        assert_eq!(parsed["acceptor"]["name"], "smiths");
        assert_eq!(parsed["outcome"], "Related");

        // Removal takes the participants in either order
        run_relation(
            kind,
            RelationAction::Remove {
                first: name("smiths"),
                second: name("bob"),
            },
            &engine,
            &json,
        )
        .unwrap_err();
        run_relation(
            kind,
            RelationAction::Remove {
                first: name("smiths"),
                second: ActorRef::Id(rapport_domain::ActorId::new(1)),
            },
            &engine,
            &json,
        )
        .unwrap();
    }

    #[test]
    fn test_errors_carry_exit_codes() {
        let dir = TempDir::new().unwrap();
        let engine = setup(&dir);
        let formatter = Formatter::new(OutputFormat::Table, false);
        let kind = RelationshipKind::UserFriend;
        let request = || RelationAction::Request {
            requestor: name("alice"),
            acceptor: name("bob"),
            auto_accept: false,
        };

        run_relation(kind, request(), &engine, &formatter).unwrap();
        let err = run_relation(kind, request(), &engine, &formatter).unwrap_err();
        assert_eq!(err.exit_code(), 4);

        let err = run_relation(
            kind,
            RelationAction::Accept {
                requestor: name("bob"),
                acceptor: name("alice"),
            },
            &engine,
            &formatter,
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 3);

        // smiths is a group, not a user
        let err = run_relation(kind, RelationAction::List { actor: name("smiths") }, &engine, &formatter).unwrap_err();
        assert!(matches!(err, CliError::UnknownActor { .. }));
        assert_eq!(err.to_string(), "Not found: no user matches 'smiths'");
    }
}
