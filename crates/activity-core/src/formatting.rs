use std::fmt::Write as _;

use crate::models::{RankedActor, RepositorySummary};

/// Format an integer count with thousands separators.
///
/// # Examples
///
/// ```
/// use activity_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(999), "999");
/// assert_eq!(format_count(1234567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    let digits = value.to_string().into_bytes();
    let lead = match digits.len() % 3 {
        0 => 3,
        n => n,
    };
    let (head, tail) = digits.split_at(lead.min(digits.len()));
    let mut out = String::from_utf8_lossy(head).into_owned();
    for group in tail.chunks(3) {
        out.push(',');
        out.push_str(&String::from_utf8_lossy(group));
    }
    out
}

/// Render a top-K ranking as a numbered list under `title`.
///
/// An empty ranking renders as the title followed by `(none)`.
pub fn format_ranking(title: &str, ranking: &[RankedActor]) -> String {
    let mut out = format!("{title}\n");
    if ranking.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }
    for (pos, row) in ranking.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. actor {:<12} {:>8}",
            pos + 1,
            row.actor_id,
            format_count(row.score)
        );
    }
    out
}

/// Render a repository list, one repository per line, with a count header.
pub fn format_repositories(title: &str, repos: &[RepositorySummary]) -> String {
    let mut out = format!("{title} ({})\n", format_count(repos.len() as u64));
    for repo in repos {
        let _ = writeln!(
            out,
            "  {:<48} {:>3} contributors  {}",
            repo.name, repo.distinct_contributor_count, repo.url
        );
    }
    out
}

/// Render a yes/no answer line.
pub fn format_flag(question: &str, answer: bool) -> String {
    format!("{question}: {}\n", if answer { "yes" } else { "no" })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
