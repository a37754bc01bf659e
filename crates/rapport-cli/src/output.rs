//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use rapport_domain::{Actor, RelationshipKind};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a list of actors.
    pub fn format_actors(&self, actors: &[Actor]) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_actors_json(actors),
            OutputFormat::Table => Ok(self.format_actors_table(actors)),
            OutputFormat::Quiet => Ok(self.format_actors_quiet(actors)),
        }
    }

    /// Format a single actor.
    pub fn format_actor(&self, actor: &Actor) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&actor_json(actor))?),
            OutputFormat::Table => Ok(self.success(&format!(
                "Registered {} '{}' with id {}",
                actor.actor_type, actor.name, actor.id
            ))),
            OutputFormat::Quiet => Ok(actor.id.to_string()),
        }
    }

    /// Format a relationship count.
    pub fn format_count(&self, kind: RelationshipKind, actor: &Actor, count: usize) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "kind": kind.as_str(),
                "actor": actor_json(actor),
                "count": count,
            }))?),
            OutputFormat::Table => Ok(format!(
                "{} has {} {}",
                self.colorize(&actor.name, "cyan"),
                count,
                kind_noun(kind, count)
            )),
            OutputFormat::Quiet => Ok(count.to_string()),
        }
    }

    /// Format the outcome of a state-changing command.
    pub fn format_outcome(&self, kind: RelationshipKind, outcome: &str, requestor: &Actor, acceptor: &Actor) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "kind": kind.as_str(),
                "outcome": outcome,
                "requestor": actor_json(requestor),
                "acceptor": actor_json(acceptor),
            }))?),
            OutputFormat::Table => Ok(self.success(&format!(
                "{} ({}): {} -> {}",
                outcome, kind, requestor.name, acceptor.name
            ))),
            OutputFormat::Quiet => Ok(String::new()),
        }
    }

    /// Format actors as JSON.
    fn format_actors_json(&self, actors: &[Actor]) -> Result<String> {
        let json_actors: Vec<serde_json::Value> = actors.iter().map(actor_json).collect();
        Ok(serde_json::to_string_pretty(&json_actors)?)
    }

    /// Format actors as a table.
    fn format_actors_table(&self, actors: &[Actor]) -> String {
        if actors.is_empty() {
            return self.colorize("No actors found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Type", "Name"]);

        for actor in actors {
            builder.push_record([
                actor.id.to_string(),
                actor.actor_type.to_string(),
                actor.name.clone(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format actors in quiet mode (IDs only).
    fn format_actors_quiet(&self, actors: &[Actor]) -> String {
        let ids: Vec<String> = actors.iter().map(|a| a.id.to_string()).collect();
        ids.join("\n")
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn actor_json(actor: &Actor) -> serde_json::Value {
    serde_json::json!({
        "id": actor.id.value(),
        "type": actor.actor_type.as_str(),
        "name": actor.name,
    })
}

fn kind_noun(kind: RelationshipKind, count: usize) -> &'static str {
    match (kind, count == 1) {
        (RelationshipKind::UserFriend, true) => "friend",
        (RelationshipKind::UserFriend, false) => "friends",
        (RelationshipKind::UserGroupMembership, true) => "membership",
        (RelationshipKind::UserGroupMembership, false) => "memberships",
        (RelationshipKind::GroupAlliance, true) => "alliance",
        (RelationshipKind::GroupAlliance, false) => "alliances",
    }
}
