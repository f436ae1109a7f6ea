//! Report pipeline for a day of archive events.
//!
//! Builds the standard set of reports (four top-K rankings, the exact-time
//! check and the contributor-range list) from an [`AnalyticsEngine`] and
//! returns them as a serialisable [`ActivityReport`].

use std::path::PathBuf;

use activity_core::error::Result;
use activity_core::formatting::{format_count, format_flag, format_ranking, format_repositories};
use activity_core::models::{EventCategory, RankedActor, RepositorySummary};
use activity_core::settings::Settings;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analyzer::AnalyticsEngine;
use crate::reader::EventReader;

/// Categories ranked in every report.
pub const STANDARD_CATEGORIES: [EventCategory; 4] = [
    EventCategory::Any,
    EventCategory::PullRequest,
    EventCategory::Issues,
    EventCategory::Push,
];

// ── Public types ──────────────────────────────────────────────────────────────

/// Inputs of [`build_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub top_k: usize,
    /// Ranked in addition to [`STANDARD_CATEGORIES`] when not already there.
    pub extra_category: Option<EventCategory>,
    /// `HH:MM:SS` target of the exact-time check.
    pub at: String,
    /// IANA timezone for the exact-time check; `None` means the literal UTC
    /// clock value.
    pub timezone: Option<String>,
    pub min_contributors: Option<usize>,
    pub max_contributors: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_k: 10,
            extra_category: None,
            at: "12:00:00".to_string(),
            timezone: None,
            min_contributors: Some(5),
            max_contributors: 10,
        }
    }
}

impl From<&Settings> for ReportOptions {
    fn from(s: &Settings) -> Self {
        Self {
            top_k: s.top,
            extra_category: s.category,
            at: s.at.clone(),
            timezone: s.timezone.clone(),
            min_contributors: Some(s.min_contributors),
            max_contributors: s.max_contributors,
        }
    }
}

/// One top-K ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRanking {
    pub category: EventCategory,
    pub actors: Vec<RankedActor>,
}

/// Outcome of the exact-time check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactTimeCheck {
    pub target: String,
    pub timezone: Option<String>,
    pub found: bool,
}

/// Repositories within the contributor range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorRangeReport {
    pub min_contributors: Option<usize>,
    pub max_contributors: usize,
    pub repositories: Vec<RepositorySummary>,
}

/// Metadata produced alongside the reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// ISO-8601 timestamp when this report was generated.
    pub generated_at: String,
    pub events_processed: usize,
    /// Archive files the events were read from.
    pub files: Vec<PathBuf>,
    /// Wall-clock seconds spent reading and buffering events.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent answering the queries.
    pub query_time_seconds: f64,
}

/// Everything the CLI prints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityReport {
    pub metadata: ReportMetadata,
    /// K used for every ranking.
    pub top_k: usize,
    pub rankings: Vec<CategoryRanking>,
    pub exact_time: ExactTimeCheck,
    pub contributor_range: ContributorRangeReport,
}

impl ActivityReport {
    /// Human-readable rendering, one block per report.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for ranking in &self.rankings {
            let title = format!(
                "Top {} actors by {}",
                self.top_k,
                ranking.category.label()
            );
            out.push_str(&format_ranking(&title, &ranking.actors));
            out.push('\n');
        }

        let clock = self.exact_time.timezone.as_deref().unwrap_or("UTC");
        out.push_str(&format_flag(
            &format!("Event at exactly {} ({clock})", self.exact_time.target),
            self.exact_time.found,
        ));
        out.push('\n');

        let range = &self.contributor_range;
        let title = format!(
            "Repositories with {} to {} distinct pushers",
            range.min_contributors.unwrap_or(0),
            range.max_contributors
        );
        out.push_str(&format_repositories(&title, &range.repositories));

        out.push_str(&format!(
            "\n{} events analysed\n",
            format_count(self.metadata.events_processed as u64)
        ));
        out
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Answer every report query against `engine`.
///
/// `load_time_seconds` and `files` are left empty; [`run_analysis`] fills
/// them in.
pub fn build_report(engine: &AnalyticsEngine, options: &ReportOptions) -> Result<ActivityReport> {
    let query_start = std::time::Instant::now();

    let mut categories = STANDARD_CATEGORIES.to_vec();
    if let Some(extra) = options.extra_category {
        if !categories.contains(&extra) {
            categories.push(extra);
        }
    }
    let rankings = categories
        .into_iter()
        .map(|category| CategoryRanking {
            category,
            actors: engine.top_k_actors_by(options.top_k, category),
        })
        .collect();

    let found = match &options.timezone {
        Some(tz) => engine.has_event_at_local_time(&options.at, tz)?,
        None => engine.has_event_at_exact_time(&options.at)?,
    };
    let exact_time = ExactTimeCheck {
        target: options.at.clone(),
        timezone: options.timezone.clone(),
        found,
    };

    let contributor_range = ContributorRangeReport {
        min_contributors: options.min_contributors,
        max_contributors: options.max_contributors,
        repositories: engine
            .repositories_by_contributor_range(options.max_contributors, options.min_contributors),
    };

    let metadata = ReportMetadata {
        generated_at: Utc::now().to_rfc3339(),
        events_processed: engine.len(),
        files: Vec::new(),
        load_time_seconds: 0.0,
        query_time_seconds: query_start.elapsed().as_secs_f64(),
    };

    Ok(ActivityReport {
        metadata,
        top_k: options.top_k,
        rankings,
        exact_time,
        contributor_range,
    })
}

/// Run the full pipeline for the CLI.
///
/// 1. Build an [`EventReader`] from `--dir` / `--file`.
/// 2. Drain it into an [`AnalyticsEngine`].
/// 3. Answer the report queries.
pub fn run_analysis(settings: &Settings) -> Result<ActivityReport> {
    settings.validate()?;

    // ── Step 1: Reader ────────────────────────────────────────────────────────
    let reader = EventReader::from_source(settings.dir.as_deref(), settings.file.as_deref())?;
    let files = reader.pending_files().to_vec();
    info!("Reading {} archive file(s)", files.len());

    // ── Step 2: Buffer ────────────────────────────────────────────────────────
    let load_start = std::time::Instant::now();
    let engine = AnalyticsEngine::from_reader(reader)?;
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Step 3: Queries ───────────────────────────────────────────────────────
    let mut report = build_report(&engine, &ReportOptions::from(settings))?;
    report.metadata.files = files;
    report.metadata.load_time_seconds = load_time;

    info!(
        "Analysed {} events in {:.2}s",
        report.metadata.events_processed,
        load_time + report.metadata.query_time_seconds
    );
    Ok(report)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use activity_core::error::ActivityError;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    fn event_line(kind: &str, actor_id: u64, repo_id: u64, ts: &str) -> String {
        serde_json::json!({
            "id": format!("{actor_id}-{repo_id}-{ts}"),
            "type": kind,
            "public": true,
            "actor": {
                "id": actor_id,
                "login": format!("u{actor_id}"),
                "url": "",
                "avatar_url": ""
            },
            "repo": {
                "id": repo_id,
                "name": format!("o/r{repo_id}"),
                "url": format!("https://api.github.com/repos/o/r{repo_id}")
            },
            "created_at": ts
        })
        .to_string()
    }

    /// Two hourly files: repo 1 gets 6 distinct pushers, repo 2 gets 3, and
    /// actor 1 is also the top PR author.
    fn write_day(dir: &Path) {
        let mut hour0 = std::fs::File::create(dir.join("2015-01-01-0.json")).unwrap();
        for actor in 1..=6 {
            let line = event_line("PushEvent", actor, 1, "2015-01-01T00:10:00Z");
            writeln!(hour0, "{line}").unwrap();
        }
        writeln!(hour0, "garbage").unwrap();

        let mut hour12 = std::fs::File::create(dir.join("2015-01-01-12.json")).unwrap();
        for actor in 1..=3 {
            let line = event_line("PushEvent", actor, 2, "2015-01-01T12:00:00Z");
            writeln!(hour12, "{line}").unwrap();
        }
        for line in [
            event_line("PullRequestEvent", 1, 2, "2015-01-01T12:30:00Z"),
            event_line("IssuesEvent", 4, 2, "2015-01-01T12:45:00Z"),
        ] {
            writeln!(hour12, "{line}").unwrap();
        }
    }

    fn settings_for(dir: &Path, extra: &[&str]) -> Settings {
        let dir_str = dir.to_str().unwrap().to_string();
        let mut args = vec!["gh-activity".to_string(), "--dir".to_string(), dir_str];
        args.extend(extra.iter().map(|s| s.to_string()));
        Settings::load_from_args(args).unwrap()
    }

    #[test]
    fn test_run_analysis_standard_reports() {
        let dir = TempDir::new().unwrap();
        write_day(dir.path());

        let report = run_analysis(&settings_for(dir.path(), &[])).unwrap();

        assert_eq!(report.metadata.events_processed, 11);
        assert_eq!(report.metadata.files.len(), 2);

        let categories: Vec<EventCategory> = report.rankings.iter().map(|r| r.category).collect();
        assert_eq!(categories, STANDARD_CATEGORIES.to_vec());

        // Actor 1: two pushes and one PR.
        assert_eq!(
            report.rankings[0].actors[0],
            RankedActor {
                actor_id: 1,
                score: 3
            }
        );
        assert_eq!(report.rankings[1].actors.len(), 1);
        assert_eq!(report.rankings[2].actors[0].actor_id, 4);

        assert!(report.exact_time.found);

        let names: Vec<&str> = report
            .contributor_range
            .repositories
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["o/r1"]);
    }

    #[test]
    fn test_run_analysis_single_file_and_extra_category() {
        let dir = TempDir::new().unwrap();
        write_day(dir.path());

        let settings = settings_for(
            dir.path(),
            &["--file", "2015-01-01-12.json", "--category", "watch", "--at", "00:10:00"],
        );
        let report = run_analysis(&settings).unwrap();

        assert_eq!(report.metadata.events_processed, 5);
        assert_eq!(report.rankings.len(), 5);
        assert_eq!(report.rankings[4].category, EventCategory::Watch);
        assert!(report.rankings[4].actors.is_empty());
        assert!(!report.exact_time.found);
    }

    #[test]
    fn test_run_analysis_timezone() {
        let dir = TempDir::new().unwrap();
        write_day(dir.path());

        // 12:00:00Z is 04:00:00 in Los Angeles in January.
        let settings = settings_for(
            dir.path(),
            &["--at", "04:00:00", "--timezone", "America/Los_Angeles"],
        );
        let report = run_analysis(&settings).unwrap();
        assert!(report.exact_time.found);
        assert_eq!(report.exact_time.timezone.as_deref(), Some("America/Los_Angeles"));
    }

    #[test]
    fn test_run_analysis_requires_source() {
        let settings = Settings::load_from_args(["gh-activity"]).unwrap();
        let err = run_analysis(&settings).unwrap_err();
        assert!(matches!(err, ActivityError::Config(_)));
    }

    #[test]
    fn test_two_independent_reads_agree() {
        let dir = TempDir::new().unwrap();
        write_day(dir.path());

        let first = AnalyticsEngine::from_reader(EventReader::from_directory(dir.path()).unwrap())
            .unwrap();
        let second = AnalyticsEngine::from_reader(EventReader::from_directory(dir.path()).unwrap())
            .unwrap();

        for category in STANDARD_CATEGORIES {
            assert_eq!(
                first.top_k_actors_by(10, category),
                second.top_k_actors_by(10, category)
            );
        }
        for at in ["12:00:00", "00:10:00", "23:59:59"] {
            assert_eq!(
                first.has_event_at_exact_time(at).unwrap(),
                second.has_event_at_exact_time(at).unwrap()
            );
        }
        assert_eq!(
            first.repositories_by_contributor_range(10, Some(1)),
            second.repositories_by_contributor_range(10, Some(1))
        );
    }

    #[test]
    fn test_build_report_empty_engine() {
        let engine = AnalyticsEngine::default();
        let report = build_report(&engine, &ReportOptions::default()).unwrap();
        assert!(report.rankings.iter().all(|r| r.actors.is_empty()));
        assert!(!report.exact_time.found);
        assert!(report.contributor_range.repositories.is_empty());
        assert_eq!(report.metadata.events_processed, 0);
    }

    #[test]
    fn test_render_text_and_json() {
        let dir = TempDir::new().unwrap();
        write_day(dir.path());
        let report = run_analysis(&settings_for(dir.path(), &[])).unwrap();

        let text = report.render_text();
        assert!(text.contains("Top 10 actors by overall activity"));
        assert!(text.contains("actors by pull requests"));
        assert!(text.contains("Event at exactly 12:00:00 (UTC): yes"));
        assert!(text.contains("Repositories with 5 to 10 distinct pushers (1)"));
        assert!(text.contains("11 events analysed"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rankings"][3]["category"], "push");
        assert_eq!(json["exact_time"]["found"], true);
        assert_eq!(
            json["contributor_range"]["repositories"][0]["distinct_contributor_count"],
            6
        );
    }
}
