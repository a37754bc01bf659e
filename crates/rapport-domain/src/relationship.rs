//! Requests, relationships and the state of an actor pair

use crate::{ActorId, RelationshipKind};
use std::fmt;

/// A pending, directed proposal to form a relationship
///
/// Identity is `(kind, requestor_id, acceptor_id)`. A request only exists while
/// it is pending: accepting or rejecting it deletes the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipRequest {
    /// Kind of relationship being requested
    pub kind: RelationshipKind,

    /// Actor that sent the request
    pub requestor_id: ActorId,

    /// Actor the request was sent to
    pub acceptor_id: ActorId,

    /// Whether the request skipped the pending stage
    pub auto_accept: bool,

    /// Creation time (seconds since Unix epoch)
    pub created_at: u64,
}

impl RelationshipRequest {
    /// Create a new request
    pub fn new(
        kind: RelationshipKind,
        requestor_id: ActorId,
        acceptor_id: ActorId,
        auto_accept: bool,
        created_at: u64,
    ) -> Self {
        Self {
            kind,
            requestor_id,
            acceptor_id,
            auto_accept,
            created_at,
        }
    }

    /// Key of the unordered pair this request belongs to
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(self.kind, self.requestor_id, self.acceptor_id)
    }

    /// The relationship this request turns into once accepted
    pub fn to_relationship(&self, accepted_at: u64) -> Relationship {
        Relationship::new(self.kind, self.requestor_id, self.acceptor_id, accepted_at)
    }
}

/// An accepted association between two actors
///
/// The ids keep the order of the original request, but the relationship is
/// undirected: identity is `(kind, {requestor_id, acceptor_id})`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Kind of relationship
    pub kind: RelationshipKind,

    /// Actor that sent the original request
    pub requestor_id: ActorId,

    /// Actor that received the original request
    pub acceptor_id: ActorId,

    /// When the relationship was established
    pub created_at: u64,
}

impl Relationship {
    /// Create a new relationship
    pub fn new(
        kind: RelationshipKind,
        requestor_id: ActorId,
        acceptor_id: ActorId,
        created_at: u64,
    ) -> Self {
        Self {
            kind,
            requestor_id,
            acceptor_id,
            created_at,
        }
    }

    /// Key of the unordered pair this relationship belongs to
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(self.kind, self.requestor_id, self.acceptor_id)
    }

    /// Whether `id` participates in this relationship
    pub fn involves(&self, id: ActorId) -> bool {
        self.requestor_id == id || self.acceptor_id == id
    }

    /// The participant that is not `id`, if `id` participates at all
    pub fn other(&self, id: ActorId) -> Option<ActorId> {
        if self.requestor_id == id {
            Some(self.acceptor_id)
        } else if self.acceptor_id == id {
            Some(self.requestor_id)
        } else {
            None
        }
    }
}

/// Canonical key of an unordered actor pair within one kind
///
/// `low <= high` always holds, so `(a, b)` and `(b, a)` produce the same key.
/// This is the unit of atomicity for every state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    /// Relationship kind the pair is scoped to
    pub kind: RelationshipKind,

    /// Smaller of the two ids
    pub low: ActorId,

    /// Larger of the two ids
    pub high: ActorId,
}

impl PairKey {
    /// Build the key for `a` and `b` in either order
    pub fn new(kind: RelationshipKind, a: ActorId, b: ActorId) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self { kind, low, high }
    }

    /// Whether `id` is one of the two participants
    pub fn contains(&self, id: ActorId) -> bool {
        self.low == id || self.high == id
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{{{}, {}}}", self.kind, self.low, self.high)
    }
}

/// State of an unordered pair
///
/// Exactly one of these holds for every `(kind, {a, b})` at all times. The
/// direction of a pending request is carried by the request itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairState {
    /// No request and no relationship
    None,

    /// A request is waiting for an answer
    Pending(RelationshipRequest),

    /// The pair is related
    Related(Relationship),
}

impl PairState {
    /// Whether the pair has no state at all
    pub fn is_none(&self) -> bool {
        matches!(self, PairState::None)
    }

    /// Whether the pair is related
    pub fn is_related(&self) -> bool {
        matches!(self, PairState::Related(_))
    }

    /// Whether a request from `requestor` is pending
    pub fn is_pending_from(&self, requestor: ActorId) -> bool {
        matches!(self, PairState::Pending(r) if r.requestor_id == requestor)
    }

    /// Short label used in logs and error messages
    pub fn label(&self) -> &'static str {
        match self {
            PairState::None => "none",
            PairState::Pending(_) => "pending",
            PairState::Related(_) => "related",
        }
    }
}
