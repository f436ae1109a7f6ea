//! Query engine over a buffered day of archive events.
//!
//! [`AnalyticsEngine`] drains an event source once and answers every query by
//! scanning its immutable buffer.

use std::collections::{BTreeMap, HashMap, HashSet};

use activity_core::error::Result;
use activity_core::models::{Event, EventCategory, RankedActor, RepositorySummary};
use activity_core::time_utils::{parse_time_of_day, TimezoneHandler};
use chrono::{DateTime, NaiveTime, Utc};
use tracing::{debug, info};

// ── AnalyticsEngine ───────────────────────────────────────────────────────────

/// Read-only snapshot of events plus the aggregate queries run against it.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    events: Vec<Event>,
}

impl AnalyticsEngine {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// Drain `source` completely into a new engine.
    ///
    /// The first `Err` item aborts construction; no partially-filled engine is
    /// ever returned.
    pub fn from_reader<I>(source: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<Event>>,
    {
        let events = source.into_iter().collect::<Result<Vec<_>>>()?;
        info!("Buffered {} events", events.len());
        Ok(Self::new(events))
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// The `k` actors with the most events in `category`.
    ///
    /// Ordered by score descending; equal scores are ordered by ascending
    /// actor id. Actors without a matching event never appear. `k == 0`
    /// yields an empty ranking.
    pub fn top_k_actors_by(&self, k: usize, category: EventCategory) -> Vec<RankedActor> {
        if k == 0 {
            return Vec::new();
        }

        let mut counts: HashMap<u64, u64> = HashMap::new();
        for event in self
            .events
            .iter()
            .filter(|e| category.matches(&e.event_type))
        {
            *counts.entry(event.actor.id).or_default() += 1;
        }

        debug!(
            "top_k_actors_by({}, {:?}): {} matching actors",
            k,
            category,
            counts.len()
        );
        rank_actors(counts, k)
    }

    /// Whether any event's `created_at` time of day is exactly `target`.
    ///
    /// `target` is a 24-hour `HH:MM:SS` string compared against the literal
    /// UTC clock value in the timestamp. Stops at the first match.
    ///
    /// # Errors
    /// * [`InvalidTimeOfDay`](activity_core::ActivityError::InvalidTimeOfDay)
    ///   when `target` is not `HH:MM:SS`.
    /// * [`TimestampFormat`](activity_core::ActivityError::TimestampFormat)
    ///   when a buffered `created_at` does not parse. Such events are never
    ///   skipped silently.
    pub fn has_event_at_exact_time(&self, target: &str) -> Result<bool> {
        let target = parse_time_of_day(target)?;
        self.any_event_at(target, |ts| ts.time())
    }

    /// Like [`has_event_at_exact_time`](Self::has_event_at_exact_time), but
    /// compares against the wall clock of the IANA `timezone`.
    pub fn has_event_at_local_time(&self, target: &str, timezone: &str) -> Result<bool> {
        let target = parse_time_of_day(target)?;
        let handler = TimezoneHandler::new(timezone)?;
        self.any_event_at(target, |ts| handler.time_of_day(ts))
    }

    /// Repositories whose number of distinct pushing actors lies in
    /// `min_inclusive..=max_inclusive`.
    ///
    /// Only push events count. Name and URL come from the first push seen for
    /// the repository. `None` for `min_inclusive` means no lower bound. The
    /// result is in ascending repository-id order, although callers should not
    /// rely on any ordering.
    pub fn repositories_by_contributor_range(
        &self,
        max_inclusive: usize,
        min_inclusive: Option<usize>,
    ) -> Vec<RepositorySummary> {
        let mut repos: BTreeMap<u64, RepoContributors> = BTreeMap::new();
        for event in self
            .events
            .iter()
            .filter(|e| EventCategory::Push.matches(&e.event_type))
        {
            repos
                .entry(event.repo.id)
                .or_insert_with(|| RepoContributors::first_seen(event))
                .contributors
                .insert(event.actor.id);
        }

        summarize_in_range(repos.values(), max_inclusive, min_inclusive)
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn any_event_at(
        &self,
        target: NaiveTime,
        clock: impl Fn(DateTime<Utc>) -> NaiveTime,
    ) -> Result<bool> {
        for event in &self.events {
            if clock(event.created_at_utc()?) == target {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl FromIterator<Event> for AnalyticsEngine {
    fn from_iter<T: IntoIterator<Item = Event>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ── Shared aggregation helpers ────────────────────────────────────────────────

/// Push contributors of one repository.
#[derive(Debug, Clone, Default)]
pub(crate) struct RepoContributors {
    pub name: String,
    pub url: String,
    pub contributors: HashSet<u64>,
}

impl RepoContributors {
    pub fn first_seen(event: &Event) -> Self {
        Self {
            name: event.repo.name.clone(),
            url: event.repo.url.clone(),
            contributors: HashSet::new(),
        }
    }
}

/// Sort `(actor_id, score)` pairs by score descending then id ascending,
/// keeping the first `k`.
pub(crate) fn rank_actors(
    counts: impl IntoIterator<Item = (u64, u64)>,
    k: usize,
) -> Vec<RankedActor> {
    let mut ranked: Vec<RankedActor> = counts
        .into_iter()
        .map(|(actor_id, score)| RankedActor { actor_id, score })
        .collect();
    ranked.sort_unstable_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.actor_id.cmp(&b.actor_id))
    });
    ranked.truncate(k);
    ranked
}

/// Keep repositories with `min <= n <= max` distinct contributors.
pub(crate) fn summarize_in_range<'a>(
    repos: impl IntoIterator<Item = &'a RepoContributors>,
    max_inclusive: usize,
    min_inclusive: Option<usize>,
) -> Vec<RepositorySummary> {
    let min = min_inclusive.unwrap_or(0);
    repos
        .into_iter()
        .filter_map(|repo| {
            let n = repo.contributors.len();
            (min..=max_inclusive).contains(&n).then(|| RepositorySummary {
                name: repo.name.clone(),
                url: repo.url.clone(),
                distinct_contributor_count: n,
            })
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
