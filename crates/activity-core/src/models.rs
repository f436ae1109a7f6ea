use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use crate::error::Result;
use crate::time_utils::parse_created_at;

// ── Actor ─────────────────────────────────────────────────────────────────────

/// The account that performed an event, as snapshotted into that event.
///
/// Two snapshots of the same account compare equal when their `id` matches,
/// whatever the other fields say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: u64,
    #[serde(default)]
    pub login: String,
    /// API URL of the account (`url` in the archive).
    #[serde(rename = "url", default)]
    pub profile_url: String,
    #[serde(default)]
    pub avatar_url: String,
}

impl PartialEq for Actor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Actor {}

impl Hash for Actor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

/// The repository an event targeted. Identity is `id` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl PartialEq for Repository {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Repository {}

impl Hash for Repository {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// ── Event ─────────────────────────────────────────────────────────────────────

/// One public activity record from an hourly archive file.
///
/// Deserialising keeps the recognised fields and silently ignores everything
/// else the archive schema carries (`payload`, `org`, `gravatar_id`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    /// Archive type tag, e.g. `"PushEvent"`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Always `true` in practice; private activity is not archived.
    #[serde(rename = "public", default)]
    pub is_public: bool,
    pub actor: Actor,
    pub repo: Repository,
    /// `YYYY-MM-DDTHH:MM:SSZ`, kept verbatim.
    pub created_at: String,
}

impl Event {
    /// The concrete category this event belongs to.
    pub fn category(&self) -> EventCategory {
        EventCategory::of_type(&self.event_type)
    }

    /// Parse `created_at` with the strict archive format.
    pub fn created_at_utc(&self) -> Result<DateTime<Utc>> {
        parse_created_at(&self.created_at)
    }
}

// ── EventCategory ─────────────────────────────────────────────────────────────

/// Category used to select events for ranking.
///
/// `Any` matches every event. Every other variant is concrete: exactly one
/// concrete category matches a given event, with `Other` catching the type
/// tags not named here. Summing an actor's scores over
/// [`EventCategory::CONCRETE`] therefore gives their `Any` score.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum EventCategory {
    #[default]
    Any,
    CommitComment,
    Create,
    Delete,
    Fork,
    Gollum,
    IssueComment,
    Issues,
    Member,
    Public,
    PullRequest,
    PullRequestReviewComment,
    Push,
    Release,
    Watch,
    Other,
}

impl EventCategory {
    /// Every category except `Any`.
    pub const CONCRETE: [EventCategory; 15] = [
        EventCategory::CommitComment,
        EventCategory::Create,
        EventCategory::Delete,
        EventCategory::Fork,
        EventCategory::Gollum,
        EventCategory::IssueComment,
        EventCategory::Issues,
        EventCategory::Member,
        EventCategory::Public,
        EventCategory::PullRequest,
        EventCategory::PullRequestReviewComment,
        EventCategory::Push,
        EventCategory::Release,
        EventCategory::Watch,
        EventCategory::Other,
    ];

    /// The archive type tag for a concrete, named category.
    ///
    /// `None` for `Any` and `Other`, which do not correspond to one tag.
    pub fn type_tag(self) -> Option<&'static str> {
        let tag = match self {
            Self::Any | Self::Other => return None,
            Self::CommitComment => "CommitCommentEvent",
            Self::Create => "CreateEvent",
            Self::Delete => "DeleteEvent",
            Self::Fork => "ForkEvent",
            Self::Gollum => "GollumEvent",
            Self::IssueComment => "IssueCommentEvent",
            Self::Issues => "IssuesEvent",
            Self::Member => "MemberEvent",
            Self::Public => "PublicEvent",
            Self::PullRequest => "PullRequestEvent",
            Self::PullRequestReviewComment => "PullRequestReviewCommentEvent",
            Self::Push => "PushEvent",
            Self::Release => "ReleaseEvent",
            Self::Watch => "WatchEvent",
        };
        Some(tag)
    }

    /// Map an archive type tag onto its concrete category.
    pub fn of_type(event_type: &str) -> Self {
        Self::CONCRETE
            .into_iter()
            .find(|c| c.type_tag() == Some(event_type))
            .unwrap_or(Self::Other)
    }

    /// Whether an event with `event_type` counts towards this category.
    pub fn matches(self, event_type: &str) -> bool {
        match self {
            Self::Any => true,
            concrete => Self::of_type(event_type) == concrete,
        }
    }

    /// Short human label used in report headings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Any => "overall activity",
            Self::CommitComment => "commit comments",
            Self::Create => "creates",
            Self::Delete => "deletes",
            Self::Fork => "forks",
            Self::Gollum => "wiki edits",
            Self::IssueComment => "issue comments",
            Self::Issues => "issues",
            Self::Member => "member changes",
            Self::Public => "repos made public",
            Self::PullRequest => "pull requests",
            Self::PullRequestReviewComment => "review comments",
            Self::Push => "commit pushes",
            Self::Release => "releases",
            Self::Watch => "stars",
            Self::Other => "other events",
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── Query results ─────────────────────────────────────────────────────────────

/// One row of a top-K ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedActor {
    pub actor_id: u64,
    /// Number of matching events performed by the actor.
    pub score: u64,
}

/// A repository together with its number of distinct pushing actors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub url: String,
    pub distinct_contributor_count: usize,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
