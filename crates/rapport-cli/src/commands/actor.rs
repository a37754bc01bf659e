//! Actor command implementation.

use crate::cli::ActorAction;
use crate::error::Result;
use crate::output::Formatter;
use rapport_store::SqliteActorDirectory;

/// Run an actor command.
pub fn run_actor(action: ActorAction, directory: &SqliteActorDirectory, formatter: &Formatter) -> Result<String> {
    match action {
        ActorAction::Add { actor_type, name } => {
            let actor = directory.create(actor_type.into(), &name)?;
            formatter.format_actor(&actor)
        }
        ActorAction::List { actor_type } => {
            let actors = directory.list(actor_type.map(Into::into))?;
            formatter.format_actors(&actors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ActorTypeArg;
    use crate::config::OutputFormat;

    #[test]
    fn test_add_then_list() {
        let directory = SqliteActorDirectory::new(":memory:").unwrap();
        let quiet = Formatter::new(OutputFormat::Quiet, false);

        let id = run_actor(
            ActorAction::Add {
                actor_type: ActorTypeArg::User,
                name: "alice".to_string(),
            },
            &directory,
            &quiet,
        )
        .unwrap();
        run_actor(
            ActorAction::Add {
                actor_type: ActorTypeArg::Group,
                name: "smiths".to_string(),
            },
            &directory,
            &quiet,
        )
        .unwrap();

        let users = run_actor(
            ActorAction::List {
                actor_type: Some(ActorTypeArg::User),
            },
            &directory,
            &quiet,
        )
        .unwrap();
        assert_eq!(users, id);

        let table = Formatter::new(OutputFormat::Table, false);
        let all = run_actor(ActorAction::List { actor_type: None }, &directory, &table).unwrap();
        assert!(all.contains("alice"));
        assert!(all.contains("smiths"));
    }

    #[test]
    fn test_duplicate_name_fails() {
        let directory = SqliteActorDirectory::new(":memory:").unwrap();
        let formatter = Formatter::new(OutputFormat::Table, false);
        let add = || {
            run_actor(
                ActorAction::Add {
                    actor_type: ActorTypeArg::User,
                    name: "alice".to_string(),
                },
                &directory,
                &formatter,
            )
        };
        assert!(add().is_ok());
        assert!(add().is_err());
    }
}
