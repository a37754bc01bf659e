//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use rapport_domain::{ActorId, ActorType, RelationshipKind};
use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Rapport CLI - Manage friendships, memberships and alliances between actors.
#[derive(Debug, Parser)]
#[command(name = "rapport")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file (overrides the configured store path)
    #[arg(long, global = true, env = "RAPPORT_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register and list users and groups
    Actor(ActorArgs),

    /// User to user friendships
    Friend(RelationArgs),

    /// User to group memberships
    Member(RelationArgs),

    /// Group to group alliances
    Alliance(RelationArgs),
}

impl Command {
    /// Relationship kind addressed by this command, if any
    pub fn relationship_kind(&self) -> Option<RelationshipKind> {
        match self {
            Command::Actor(_) => None,
            Command::Friend(_) => Some(RelationshipKind::UserFriend),
            Command::Member(_) => Some(RelationshipKind::UserGroupMembership),
            Command::Alliance(_) => Some(RelationshipKind::GroupAlliance),
        }
    }
}

/// Arguments for actor management.
#[derive(Debug, Args)]
pub struct ActorArgs {
    #[command(subcommand)]
    pub action: ActorAction,
}

/// Actor management actions.
#[derive(Debug, Subcommand)]
pub enum ActorAction {
    /// Register a user or group
    Add {
        /// Actor type
        #[arg(value_enum)]
        actor_type: ActorTypeArg,
        /// Display name, unique per actor type
        name: String,
    },

    /// List registered actors
    List {
        /// Only list actors of this type
        #[arg(short = 't', long = "type", value_enum)]
        actor_type: Option<ActorTypeArg>,
    },
}

/// Arguments shared by every relationship kind.
#[derive(Debug, Args)]
pub struct RelationArgs {
    #[command(subcommand)]
    pub action: RelationAction,
}

/// Relationship actions.
///
/// Actors are given by numeric id or by name.
#[derive(Debug, Subcommand)]
pub enum RelationAction {
    /// Send a request
    Request {
        /// Actor sending the request
        requestor: ActorRef,
        /// Actor receiving the request
        acceptor: ActorRef,
        /// Create the relationship immediately
        #[arg(long)]
        auto_accept: bool,
    },

    /// Accept a pending request
    Accept {
        /// Actor that sent the request
        requestor: ActorRef,
        /// Actor the request was sent to
        acceptor: ActorRef,
    },

    /// Reject a pending request
    Reject {
        /// Actor that sent the request
        requestor: ActorRef,
        /// Actor the request was sent to
        acceptor: ActorRef,
    },

    /// End a relationship (participants in either order)
    Remove {
        /// One participant
        first: ActorRef,
        /// The other participant
        second: ActorRef,
    },

    /// List actors with a pending request to an actor
    Incoming {
        /// Actor receiving the requests
        actor: ActorRef,
    },

    /// List actors an actor has a pending request to
    Outgoing {
        /// Actor that sent the requests
        actor: ActorRef,
    },

    /// List related actors
    List {
        /// Actor whose relationships to list
        actor: ActorRef,
    },

    /// Count related actors
    Count {
        /// Actor whose relationships to count
        actor: ActorRef,
    },
}

/// Actor type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ActorTypeArg {
    /// A player account
    User,
    /// A guild, clan or team
    Group,
}

/// Actor given on the command line: a numeric id or a name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorRef {
    /// Numeric actor id
    Id(ActorId),
    /// Actor name, resolved against the directory
    Name(String),
}

impl FromStr for ActorRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(id) => ActorRef::Id(ActorId::new(id)),
            Err(_) => ActorRef::Name(s.to_string()),
        })
    }
}

impl fmt::Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorRef::Id(id) => write!(f, "{}", id),
            ActorRef::Name(name) => write!(f, "'{}'", name),
        }
    }
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<ActorTypeArg> for ActorType {
    fn from(actor_type: ActorTypeArg) -> Self {
        match actor_type {
            ActorTypeArg::User => ActorType::User,
            ActorTypeArg::Group => ActorType::Group,
        }
    }
}
