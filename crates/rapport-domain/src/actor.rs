//! Actor module - the two participant types of the social graph

use std::fmt;
use std::str::FromStr;

/// Identifier of a user or group, as issued by the account system
///
/// Any integer is a valid `ActorId`; whether it names an existing actor is up
/// to the actor directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorId(i64);

impl ActorId {
    /// Wrap a raw id
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw id
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ActorId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ActorId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| format!("Invalid actor id '{}': {}", s, e))
    }
}

/// Type of an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorType {
    /// An individual player account
    User,

    /// A group of users (guild, clan, team)
    Group,
}

impl ActorType {
    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorType::User => "user",
            ActorType::Group => "group",
        }
    }

    /// Parse a type from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(ActorType::User),
            "group" => Some(ActorType::Group),
            _ => None,
        }
    }
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid actor type: {}", s))
    }
}

/// A resolved actor, as returned by the actor directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Actor identifier
    pub id: ActorId,

    /// Whether this is a user or a group
    pub actor_type: ActorType,

    /// Display name
    pub name: String,
}

impl Actor {
    /// Create a new actor
    pub fn new(id: ActorId, actor_type: ActorType, name: impl Into<String>) -> Self {
        Self {
            id,
            actor_type,
            name: name.into(),
        }
    }

    /// Create a user actor
    pub fn user(id: ActorId, name: impl Into<String>) -> Self {
        Self::new(id, ActorType::User, name)
    }

    /// Create a group actor
    pub fn group(id: ActorId, name: impl Into<String>) -> Self {
        Self::new(id, ActorType::Group, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_id_parsing() {
        assert_eq!("42".parse::<ActorId>().unwrap(), ActorId::new(42));
        assert_eq!(" -1 ".parse::<ActorId>().unwrap(), ActorId::new(-1));
        assert!("abc".parse::<ActorId>().is_err());
    }

    #[test]
    fn test_actor_type_parsing() {
        assert_eq!(ActorType::parse("USER"), Some(ActorType::User));
        assert_eq!(ActorType::parse("group"), Some(ActorType::Group));
        assert_eq!(ActorType::parse("guild"), None);
        assert_eq!(ActorType::Group.to_string(), "group");
    }
}
