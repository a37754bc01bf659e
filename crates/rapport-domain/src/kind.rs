//! Relationship kinds and their descriptor table
//!
//! A single engine serves every kind. What differs between kinds is data, not
//! behavior: which actor type may request, which may accept, and whether the
//! resulting relationship reads the same from both sides.

use crate::ActorType;
use std::fmt;
use std::str::FromStr;

/// Kind of relationship between two actors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelationshipKind {
    /// User to user friendship
    UserFriend,

    /// User to group membership
    UserGroupMembership,

    /// Group to group alliance
    GroupAlliance,
}

/// Which end of a request an actor sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The actor that sent the request
    Requestor,

    /// The actor the request was sent to
    Acceptor,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Requestor => f.write_str("requestor"),
            Side::Acceptor => f.write_str("acceptor"),
        }
    }
}

/// Static description of a relationship kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindDescriptor {
    /// The kind being described
    pub kind: RelationshipKind,

    /// Actor type allowed to send requests
    pub requestor_type: ActorType,

    /// Actor type allowed to receive requests
    pub acceptor_type: ActorType,

    /// Whether an accepted relationship is visible from both participants
    pub symmetric: bool,
}

impl KindDescriptor {
    /// Actor type expected on the given side
    pub fn expected_type(&self, side: Side) -> ActorType {
        match side {
            Side::Requestor => self.requestor_type,
            Side::Acceptor => self.acceptor_type,
        }
    }

    /// Whether an actor of `actor_type` may occupy `side`
    pub fn accepts(&self, side: Side, actor_type: ActorType) -> bool {
        self.expected_type(side) == actor_type
    }
}

const DESCRIPTORS: [KindDescriptor; 3] = [
    KindDescriptor {
        kind: RelationshipKind::UserFriend,
        requestor_type: ActorType::User,
        acceptor_type: ActorType::User,
        symmetric: true,
    },
    KindDescriptor {
        kind: RelationshipKind::UserGroupMembership,
        requestor_type: ActorType::User,
        acceptor_type: ActorType::Group,
        symmetric: true,
    },
    KindDescriptor {
        kind: RelationshipKind::GroupAlliance,
        requestor_type: ActorType::Group,
        acceptor_type: ActorType::Group,
        symmetric: true,
    },
];

impl RelationshipKind {
    /// Every kind, in descriptor table order
    pub const ALL: [RelationshipKind; 3] = [
        RelationshipKind::UserFriend,
        RelationshipKind::UserGroupMembership,
        RelationshipKind::GroupAlliance,
    ];

    /// Look up the descriptor for this kind
    pub fn descriptor(&self) -> &'static KindDescriptor {
        match self {
            RelationshipKind::UserFriend => &DESCRIPTORS[0],
            RelationshipKind::UserGroupMembership => &DESCRIPTORS[1],
            RelationshipKind::GroupAlliance => &DESCRIPTORS[2],
        }
    }

    /// Get the kind name as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::UserFriend => "user_friend",
            RelationshipKind::UserGroupMembership => "user_group_membership",
            RelationshipKind::GroupAlliance => "group_alliance",
        }
    }

    /// Parse a kind from its stored name or a short alias
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user_friend" | "friend" => Some(RelationshipKind::UserFriend),
            "user_group_membership" | "member" | "membership" => {
                Some(RelationshipKind::UserGroupMembership)
            }
            "group_alliance" | "alliance" => Some(RelationshipKind::GroupAlliance),
            _ => None,
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid relationship kind: {}", s))
    }
}
