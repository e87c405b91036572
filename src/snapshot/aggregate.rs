use std::collections::{HashMap, HashSet};

use crate::github::{PublicEvent, RepoSummary};
use crate::snapshot::types::{
    Achievement, ActivityEntry, Analytics, DerivedMetrics, LanguageCount, LanguageShare,
    ACTIVITY_WINDOW, TOP_LANGUAGES_CAP,
};

const PUSH_EVENT: &str = "PushEvent";

/// Sums the display counters across all repositories and ranks languages by
/// repository count. Repositories with no declared language are skipped from
/// the ranking. Ties break alphabetically so the ordering is deterministic.
pub fn aggregate_repos(repos: &[RepoSummary]) -> Analytics {
    let mut analytics = Analytics::default();
    let mut languages: HashMap<&str, u32> = HashMap::new();

    for repo in repos {
        analytics.stars += repo.stargazers_count;
        analytics.forks += repo.forks_count;
        analytics.watchers += repo.watchers_count;
        analytics.open_issues += repo.open_issues_count;
        if let Some(language) = repo.language.as_deref() {
            *languages.entry(language).or_insert(0) += 1;
        }
    }

    let mut top: Vec<LanguageCount> = languages
        .into_iter()
        .map(|(name, count)| LanguageCount {
            name: name.to_string(),
            count,
        })
        .collect();
    top.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    top.truncate(TOP_LANGUAGES_CAP);

    analytics.top_languages = top;
    analytics
}

/// Percentage share per top language, rounded to whole percent. The
/// denominator counts only repositories with a declared language, so the
/// shares sum to roughly 100 regardless of how many repos went unranked.
pub fn language_distribution(top_languages: &[LanguageCount]) -> Vec<LanguageShare> {
    let total: u32 = top_languages.iter().map(|l| l.count).sum();

    top_languages
        .iter()
        .map(|language| LanguageShare {
            name: language.name.clone(),
            pct: if total > 0 {
                (f64::from(language.count) * 100.0 / f64::from(total)).round() as u32
            } else {
                0
            },
        })
        .collect()
}

/// Maps the newest events into display entries, capped at the activity
/// window. The browsable URL is derived from the repo name when present.
pub fn to_activity(events: &[PublicEvent]) -> Vec<ActivityEntry> {
    events
        .iter()
        .take(ACTIVITY_WINDOW)
        .map(|event| {
            let repo = event.repo.as_ref().map(|r| r.name.clone());
            let url = repo
                .as_deref()
                .map(|name| format!("https://github.com/{}", name))
                .unwrap_or_default();

            ActivityEntry {
                id: event.id.clone(),
                event_type: event.event_type.clone(),
                repo,
                date: event.created_at,
                payload: event.payload.clone(),
                url,
            }
        })
        .collect()
}

pub fn derive_metrics(activity: &[ActivityEntry]) -> DerivedMetrics {
    let pushes = activity
        .iter()
        .filter(|entry| entry.event_type == PUSH_EVENT)
        .count() as u32;

    let days: HashSet<_> = activity.iter().map(|entry| entry.date.date_naive()).collect();

    DerivedMetrics {
        pushes_in_window: pushes,
        active_days: days.len() as u32,
        ..DerivedMetrics::default()
    }
}

pub fn star_achievement(stars: u64) -> Achievement {
    Achievement {
        id: "stars-100".to_string(),
        title: "100+ Stars".to_string(),
        icon: "🏆".to_string(),
        date: String::new(),
        note: format!("{} total stars", stars),
    }
}
