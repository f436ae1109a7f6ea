//! Single-pass aggregation of archive events.
//!
//! [`ActivityAggregator`] folds events one at a time into every per-category
//! actor counter and the push-contributor sets, so a day of archives can be
//! summarised without buffering the events themselves.

use std::collections::{BTreeMap, HashMap};

use activity_core::error::Result;
use activity_core::models::{Event, EventCategory, RankedActor, RepositorySummary};

use crate::analyzer::{rank_actors, summarize_in_range, RepoContributors};

// ── ActivityAggregator ────────────────────────────────────────────────────────

/// Running totals for the top-K and contributor-range queries.
///
/// Answers agree with [`AnalyticsEngine`](crate::analyzer::AnalyticsEngine)
/// on the same events, including the ascending-id tie-break.
#[derive(Debug, Clone, Default)]
pub struct ActivityAggregator {
    /// Actor id → event count, per category (`Any` and each concrete one).
    counters: HashMap<EventCategory, HashMap<u64, u64>>,
    /// Repository id → push contributors.
    repos: BTreeMap<u64, RepoContributors>,
    event_count: u64,
}

impl ActivityAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold every event of `source`, stopping at the first fatal error.
    pub fn from_reader<I>(source: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<Event>>,
    {
        let mut agg = Self::new();
        for event in source {
            agg.add_event(&event?);
        }
        Ok(agg)
    }

    /// Accumulate one event into all aggregates.
    pub fn add_event(&mut self, event: &Event) {
        self.event_count += 1;

        let category = event.category();
        for key in [EventCategory::Any, category] {
            *self
                .counters
                .entry(key)
                .or_default()
                .entry(event.actor.id)
                .or_default() += 1;
        }

        if category == EventCategory::Push {
            self.repos
                .entry(event.repo.id)
                .or_insert_with(|| RepoContributors::first_seen(event))
                .contributors
                .insert(event.actor.id);
        }
    }

    /// Number of events folded so far.
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Number of distinct actors with at least one event in `category`.
    pub fn actor_count(&self, category: EventCategory) -> usize {
        self.counters.get(&category).map_or(0, HashMap::len)
    }

    /// Same semantics as
    /// [`AnalyticsEngine::top_k_actors_by`](crate::analyzer::AnalyticsEngine::top_k_actors_by).
    pub fn top_k(&self, k: usize, category: EventCategory) -> Vec<RankedActor> {
        if k == 0 {
            return Vec::new();
        }
        match self.counters.get(&category) {
            Some(counts) => rank_actors(counts.iter().map(|(&id, &n)| (id, n)), k),
            None => Vec::new(),
        }
    }

    /// Same semantics as `repositories_by_contributor_range` on
    /// [`AnalyticsEngine`](crate::analyzer::AnalyticsEngine).
    pub fn repositories_in_range(
        &self,
        max_inclusive: usize,
        min_inclusive: Option<usize>,
    ) -> Vec<RepositorySummary> {
        summarize_in_range(self.repos.values(), max_inclusive, min_inclusive)
    }
}

impl<'a> Extend<&'a Event> for ActivityAggregator {
    fn extend<T: IntoIterator<Item = &'a Event>>(&mut self, iter: T) {
        for event in iter {
            self.add_event(event);
        }
    }
}

impl<'a> FromIterator<&'a Event> for ActivityAggregator {
    fn from_iter<T: IntoIterator<Item = &'a Event>>(iter: T) -> Self {
        let mut agg = Self::new();
        agg.extend(iter);
        agg
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AnalyticsEngine;
    use activity_core::error::ActivityError;
    use activity_core::models::{Actor, Repository};

    fn make_event(kind: &str, actor_id: u64, repo_id: u64) -> Event {
        Event {
            id: format!("{kind}-{actor_id}-{repo_id}"),
            event_type: kind.to_string(),
            is_public: true,
            actor: Actor {
                id: actor_id,
                login: format!("user{actor_id}"),
                profile_url: String::new(),
                avatar_url: String::new(),
            },
            repo: Repository {
                id: repo_id,
                name: format!("org/repo{repo_id}"),
                url: String::new(),
            },
            created_at: "2015-01-01T00:00:00Z".to_string(),
        }
    }

    /// Deterministic but irregular mix of event types, actors and repos.
    fn mixed_events() -> Vec<Event> {
        let kinds = [
            "PushEvent",
            "PushEvent",
            "WatchEvent",
            "IssuesEvent",
            "PullRequestEvent",
            "CreateEvent",
            "GistEvent",
        ];
        (0..400u64)
            .map(|i| {
                let kind = kinds[(i * 7 % kinds.len() as u64) as usize];
                make_event(kind, (i * 13) % 23, (i * 5) % 11)
            })
            .collect()
    }

    #[test]
    fn test_counts_any_and_concrete() {
        let events = vec![
            make_event("PushEvent", 1, 1),
            make_event("PushEvent", 1, 1),
            make_event("WatchEvent", 1, 2),
            make_event("IssuesEvent", 2, 2),
        ];
        let agg: ActivityAggregator = events.iter().collect();

        assert_eq!(agg.event_count(), 4);
        assert_eq!(agg.actor_count(EventCategory::Any), 2);
        assert_eq!(agg.actor_count(EventCategory::Push), 1);
        assert_eq!(agg.actor_count(EventCategory::Fork), 0);
        assert_eq!(
            agg.top_k(1, EventCategory::Any),
            vec![RankedActor {
                actor_id: 1,
                score: 3
            }]
        );
    }

    #[test]
    fn test_agrees_with_engine() {
        let events = mixed_events();
        let agg: ActivityAggregator = events.iter().collect();
        let engine = AnalyticsEngine::new(events);

        let mut categories = vec![EventCategory::Any];
        categories.extend(EventCategory::CONCRETE);
        for category in categories {
            for k in [0, 1, 5, 100] {
                assert_eq!(
                    agg.top_k(k, category),
                    engine.top_k_actors_by(k, category),
                    "{category:?} k={k}"
                );
            }
        }

        for (max, min) in [(10, Some(5)), (3, None), (0, None), (100, Some(1))] {
            assert_eq!(
                agg.repositories_in_range(max, min),
                engine.repositories_by_contributor_range(max, min)
            );
        }
    }

    #[test]
    fn test_from_reader_propagates_fatal_error() {
        let items = vec![
            Ok(make_event("PushEvent", 1, 1)),
            Err(ActivityError::Config("boom".into())),
            Ok(make_event("PushEvent", 2, 1)),
        ];
        assert!(ActivityAggregator::from_reader(items).is_err());
    }

    #[test]
    fn test_empty() {
        let agg = ActivityAggregator::new();
        assert_eq!(agg.event_count(), 0);
        assert!(agg.top_k(10, EventCategory::Push).is_empty());
        assert!(agg.repositories_in_range(10, None).is_empty());
    }
}
