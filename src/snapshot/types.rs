use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-languages list is capped at this many entries.
pub const TOP_LANGUAGES_CAP: usize = 12;
/// Recent-activity window, newest first.
pub const ACTIVITY_WINDOW: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageCount {
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageShare {
    pub name: String,
    pub pct: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub top_languages: Vec<LanguageCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub repo: Option<String>,
    pub date: DateTime<Utc>,
    pub payload: serde_json::Value,
    pub url: String,
}

/// Derived from whatever activity window was last fetched. `pushes_in_window`
/// counts push events among those entries only, which may span fewer than 30
/// days of history. `peak_hour` is editorial filler, never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub pushes_in_window: u32,
    pub active_days: u32,
    pub peak_hour: String,
}

impl Default for DerivedMetrics {
    fn default() -> Self {
        Self {
            pushes_in_window: 0,
            active_days: 0,
            peak_hour: "20:00".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub date: String,
    pub note: String,
}

/// Complete display data for one account at one point in time. Replaced
/// wholesale on every successful fetch cycle, never merged field-by-field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub analytics: Analytics,
    pub language_distribution: Vec<LanguageShare>,
    pub recent_activity: Vec<ActivityEntry>,
    pub metrics: DerivedMetrics,
    pub achievements: Vec<Achievement>,
    pub contribution_graph_url: String,
    pub visitor_badge_url: String,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            analytics: Analytics::default(),
            language_distribution: Vec::new(),
            recent_activity: Vec::new(),
            metrics: DerivedMetrics::default(),
            achievements: vec![Achievement {
                id: "sponsors".to_string(),
                title: "Sponsor".to_string(),
                icon: "🏆".to_string(),
                date: "2025-06-01".to_string(),
                note: "First sponsor".to_string(),
            }],
            contribution_graph_url: String::new(),
            visitor_badge_url: "https://img.shields.io/badge/visitors---gray".to_string(),
        }
    }
}

/// One persisted cache slot. Fresh while `now - ts` is below the TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub ts: DateTime<Utc>,
    pub data: Snapshot,
}

/// How the served snapshot was obtained. Fetch failures are invisible in the
/// snapshot itself, so this is the only freshness signal callers get.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSource {
    FreshFromCache,
    Fetched,
    StaleAfterError,
    EmptyAfterError,
}

#[derive(Debug, Clone)]
pub struct SnapshotOutcome {
    pub source: SnapshotSource,
    pub snapshot: Snapshot,
}
