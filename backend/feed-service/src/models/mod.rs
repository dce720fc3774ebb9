use crate::error::AppError;
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

pub type UserId = String;
pub type StatusId = String;

/// user → friends
pub type FriendMap = HashMap<UserId, HashSet<UserId>>;

/// actor → interactions performed by that actor
pub type EventLog = HashMap<UserId, Vec<InteractionEvent>>;

/// Status corpus keyed by id. Ordered so that corpus iteration is stable.
pub type StatusCorpus = BTreeMap<StatusId, Status>;

/// Reaction kinds accepted by the affinity weights table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionKind {
    Hahas,
    Loves,
    Sads,
    Angrys,
    Wows,
    Likes,
    Special,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 7] = [
        ReactionKind::Hahas,
        ReactionKind::Loves,
        ReactionKind::Sads,
        ReactionKind::Angrys,
        ReactionKind::Wows,
        ReactionKind::Likes,
        ReactionKind::Special,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Hahas => "hahas",
            ReactionKind::Loves => "loves",
            ReactionKind::Sads => "sads",
            ReactionKind::Angrys => "angrys",
            ReactionKind::Wows => "wows",
            ReactionKind::Likes => "likes",
            ReactionKind::Special => "special",
        }
    }

    /// Affinity weight of a single reaction of this kind.
    pub fn weight(&self) -> f64 {
        match self {
            ReactionKind::Hahas => 10.0,
            ReactionKind::Loves => 10.0,
            ReactionKind::Sads => 5.0,
            ReactionKind::Angrys => 25.0,
            ReactionKind::Wows => 25.0,
            ReactionKind::Likes => 5.0,
            ReactionKind::Special => 30.0,
        }
    }
}

impl FromStr for ReactionKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ReactionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == value.trim())
            .ok_or_else(|| AppError::Validation(format!("unknown reaction kind '{}'", value)))
    }
}

/// A single interaction a user performed on somebody's status.
///
/// Reaction kinds are kept as raw strings; they are validated when the
/// affinity graph consumes the event.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    Comment {
        actor: UserId,
        target_status: StatusId,
        timestamp: NaiveDateTime,
    },
    Reaction {
        actor: UserId,
        target_status: StatusId,
        kind: String,
        timestamp: NaiveDateTime,
    },
    Share {
        actor: UserId,
        target_status: StatusId,
        timestamp: NaiveDateTime,
    },
}

impl InteractionEvent {
    pub fn actor(&self) -> &str {
        match self {
            InteractionEvent::Comment { actor, .. }
            | InteractionEvent::Reaction { actor, .. }
            | InteractionEvent::Share { actor, .. } => actor,
        }
    }

    pub fn target_status(&self) -> &str {
        match self {
            InteractionEvent::Comment { target_status, .. }
            | InteractionEvent::Reaction { target_status, .. }
            | InteractionEvent::Share { target_status, .. } => target_status,
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            InteractionEvent::Comment { timestamp, .. }
            | InteractionEvent::Reaction { timestamp, .. }
            | InteractionEvent::Share { timestamp, .. } => *timestamp,
        }
    }
}

/// Per-kind reaction counters of a status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReactionCounts {
    pub likes: u64,
    pub loves: u64,
    pub wows: u64,
    pub hahas: u64,
    pub sads: u64,
    pub angrys: u64,
    pub special: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub id: StatusId,
    pub author: UserId,
    pub message: String,
    pub link: String,
    pub published: NaiveDateTime,
    pub reactions: ReactionCounts,
    pub num_comments: u64,
    pub num_shares: u64,
}

/// One ranked entry of a user's feed
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub status_id: StatusId,
    pub author: UserId,
    pub message: String,
    pub link: String,
    pub published: NaiveDateTime,
    pub relevance: f64,
}

impl FeedEntry {
    pub fn from_status(status: &Status, relevance: f64) -> Self {
        Self {
            status_id: status.id.clone(),
            author: status.author.clone(),
            message: status.message.clone(),
            link: status.link.clone(),
            published: status.published,
            relevance,
        }
    }
}

impl fmt::Display for FeedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Message: {}", self.message)?;
        writeln!(f, "Link: {}", self.link)?;
        writeln!(f, "Published: {}", self.published)?;
        writeln!(f, "Author: {}", self.author)?;
        write!(f, "Relevance: {}", self.relevance)
    }
}
