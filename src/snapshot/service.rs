use chrono::Duration;
use rand::Rng;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::github::GitHubFetcher;
use crate::snapshot::aggregate;
use crate::snapshot::types::{CacheEntry, Snapshot, SnapshotOutcome, SnapshotSource};
use crate::utils::storage::{CacheStore, Clock};

pub const DEFAULT_ACCOUNT: &str = "dieWehmut";
/// URL path segment under which locally generated contribution SVGs are hosted.
pub const CONTRIBUTION_DIR: &str = "profile-3d-contrib";

const CACHE_TTL_MINUTES: i64 = 60;
const FALLBACK_CHART_BASE: &str = "https://ghchart.rshah.org";

/// Decorative pseudo visitor count in [0, 10000). Not a real metric; the
/// default draws a fresh random value per cycle, tests pin it.
pub trait VisitorCounter: Send + Sync {
    fn next(&self) -> u32;
}

pub struct RandomVisitorCounter;

impl VisitorCounter for RandomVisitorCounter {
    fn next(&self) -> u32 {
        rand::thread_rng().gen_range(0..10_000)
    }
}

/// Aggregates GitHub display data per account and serves it cache-first.
///
/// Every external dependency sits behind a seam (fetcher, store, clock,
/// visitor counter) so the fetch cycle is deterministic under test. The
/// service never returns an error: each cycle degrades to previously held
/// or default data when anything external fails.
pub struct SnapshotService {
    fetcher: Arc<dyn GitHubFetcher>,
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    visitors: Arc<dyn VisitorCounter>,
    static_dir: PathBuf,
    current: RwLock<HashMap<String, Snapshot>>,
    gates: AsyncMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SnapshotService {
    pub fn new(
        fetcher: Arc<dyn GitHubFetcher>,
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
        visitors: Arc<dyn VisitorCounter>,
        static_dir: PathBuf,
    ) -> Self {
        Self {
            fetcher,
            store,
            clock,
            visitors,
            static_dir,
            current: RwLock::new(HashMap::new()),
            gates: AsyncMutex::new(HashMap::new()),
        }
    }

    /// Returns the snapshot for `account`, fetching only when the cached
    /// entry is stale or missing. Concurrent calls for the same account
    /// coalesce into one cycle; the waiters are served from the cache the
    /// cycle just wrote.
    pub async fn get_snapshot(&self, account: &str, token: Option<&str>) -> SnapshotOutcome {
        if let Some(snapshot) = self.fresh_cached(account) {
            debug!("Serving cached snapshot for account: {}", account);
            return SnapshotOutcome {
                source: SnapshotSource::FreshFromCache,
                snapshot,
            };
        }

        let gate = self.gate_for(account).await;
        let _running = gate.lock().await;

        // A caller that waited on the gate rides on the cycle that just
        // completed instead of starting its own.
        if let Some(snapshot) = self.fresh_cached(account) {
            debug!("Coalesced snapshot request for account: {}", account);
            return SnapshotOutcome {
                source: SnapshotSource::FreshFromCache,
                snapshot,
            };
        }

        self.run_cycle(account, token).await
    }

    fn fresh_cached(&self, account: &str) -> Option<Snapshot> {
        let entries = match self.store.load() {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Snapshot cache read failed: {}", err);
                return None;
            }
        };

        let entry = entries.get(account)?;
        if self.clock.now() - entry.ts < Duration::minutes(CACHE_TTL_MINUTES) {
            Some(entry.data.clone())
        } else {
            None
        }
    }

    async fn run_cycle(&self, account: &str, token: Option<&str>) -> SnapshotOutcome {
        let prior = self.current.read().unwrap().get(account).cloned();

        // The repository list anchors the cycle; without it there is nothing
        // to aggregate, so any failure here degrades to prior data.
        let repos = match self.fetcher.list_repos(account, token).await {
            Ok(repos) => repos,
            Err(err) => {
                warn!("Repository list failed for {}: {}", account, err);
                return self.degraded(account, prior);
            }
        };

        let mut next = prior.unwrap_or_default();
        next.analytics = aggregate::aggregate_repos(&repos);
        next.language_distribution = aggregate::language_distribution(&next.analytics.top_languages);

        match self.fetcher.list_public_events(account, token).await {
            Ok(events) => next.recent_activity = aggregate::to_activity(&events),
            Err(err) => {
                warn!(
                    "Events fetch failed for {}, keeping prior activity: {}",
                    account, err
                );
            }
        }
        next.metrics = aggregate::derive_metrics(&next.recent_activity);

        next.achievements = vec![aggregate::star_achievement(next.analytics.stars)];
        next.contribution_graph_url = self.resolve_graph_url(account).await;
        next.visitor_badge_url = format!(
            "https://img.shields.io/badge/visitors--{}-blue",
            self.visitors.next()
        );

        self.persist(account, &next);
        self.current
            .write()
            .unwrap()
            .insert(account.to_string(), next.clone());

        info!("Snapshot refreshed for account: {}", account);
        SnapshotOutcome {
            source: SnapshotSource::Fetched,
            snapshot: next,
        }
    }

    /// Failure path for an aborted cycle: previously held values if any,
    /// then a stale persisted entry, then defaults. Never an error.
    fn degraded(&self, account: &str, prior: Option<Snapshot>) -> SnapshotOutcome {
        if let Some(snapshot) = prior {
            return SnapshotOutcome {
                source: SnapshotSource::StaleAfterError,
                snapshot,
            };
        }

        if let Ok(entries) = self.store.load() {
            if let Some(entry) = entries.get(account) {
                return SnapshotOutcome {
                    source: SnapshotSource::StaleAfterError,
                    snapshot: entry.data.clone(),
                };
            }
        }

        SnapshotOutcome {
            source: SnapshotSource::EmptyAfterError,
            snapshot: Snapshot::default(),
        }
    }

    /// Prefers a locally generated contribution SVG when the hosted file
    /// exists, otherwise falls back to the third-party chart. Probe errors
    /// count as absent.
    async fn resolve_graph_url(&self, account: &str) -> String {
        let local = self
            .static_dir
            .join(CONTRIBUTION_DIR)
            .join(format!("{}.svg", account));

        match tokio::fs::metadata(&local).await {
            Ok(meta) if meta.is_file() => format!("/{}/{}.svg", CONTRIBUTION_DIR, account),
            _ => format!("{}/{}", FALLBACK_CHART_BASE, account),
        }
    }

    /// Best-effort write: a failed persist is logged and swallowed so it
    /// never aborts an otherwise-successful cycle. Other accounts' entries
    /// are carried over untouched.
    fn persist(&self, account: &str, snapshot: &Snapshot) {
        let mut entries = match self.store.load() {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Snapshot cache read failed before write: {}", err);
                HashMap::new()
            }
        };

        entries.insert(
            account.to_string(),
            CacheEntry {
                ts: self.clock.now(),
                data: snapshot.clone(),
            },
        );

        if let Err(err) = self.store.save(&entries) {
            warn!("Snapshot cache write failed for {}: {}", account, err);
        }
    }

    async fn gate_for(&self, account: &str) -> Arc<AsyncMutex<()>> {
        self.gates
            .lock()
            .await
            .entry(account.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{EventRepo, GitHubError, PublicEvent, RepoSummary};
    use crate::utils::storage::test_support::{ManualClock, MemoryStore, ReadOnlyStore};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct StubVisitors(u32);

    impl VisitorCounter for StubVisitors {
        fn next(&self) -> u32 {
            self.0
        }
    }

    #[derive(Default)]
    struct FakeGitHub {
        repos: Vec<RepoSummary>,
        events: Vec<PublicEvent>,
        fail_repos: AtomicBool,
        fail_events: AtomicBool,
        repo_calls: AtomicUsize,
        event_calls: AtomicUsize,
        delay_ms: u64,
    }

    #[async_trait]
    impl GitHubFetcher for FakeGitHub {
        async fn list_repos(
            &self,
            _account: &str,
            _token: Option<&str>,
        ) -> Result<Vec<RepoSummary>, GitHubError> {
            self.repo_calls.fetch_add(1, Ordering::SeqCst);
            if self.delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
            }
            if self.fail_repos.load(Ordering::SeqCst) {
                return Err(GitHubError::ApiError {
                    status: 403,
                    message: "forbidden".to_string(),
                });
            }
            Ok(self.repos.clone())
        }

        async fn list_public_events(
            &self,
            _account: &str,
            _token: Option<&str>,
        ) -> Result<Vec<PublicEvent>, GitHubError> {
            self.event_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_events.load(Ordering::SeqCst) {
                return Err(GitHubError::ApiError {
                    status: 500,
                    message: "unavailable".to_string(),
                });
            }
            Ok(self.events.clone())
        }
    }

    fn repo(stars: u64, language: Option<&str>) -> RepoSummary {
        RepoSummary {
            stargazers_count: stars,
            language: language.map(str::to_string),
            ..RepoSummary::default()
        }
    }

    fn push_event(id: &str) -> PublicEvent {
        PublicEvent {
            id: id.to_string(),
            event_type: "PushEvent".to_string(),
            repo: Some(EventRepo {
                name: "acct/repo".to_string(),
            }),
            created_at: Utc.with_ymd_and_hms(2025, 8, 20, 9, 0, 0).unwrap(),
            payload: json!({"commits": []}),
        }
    }

    struct Harness {
        github: Arc<FakeGitHub>,
        clock: Arc<ManualClock>,
        service: SnapshotService,
        static_dir_guard: tempfile::TempDir,
    }

    fn harness(github: FakeGitHub) -> Harness {
        harness_with_store(github, Arc::new(MemoryStore::default()))
    }

    fn harness_with_store(github: FakeGitHub, store: Arc<dyn CacheStore>) -> Harness {
        let github = Arc::new(github);
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 8, 20, 12, 0, 0).unwrap(),
        ));
        let static_dir = tempfile::tempdir().unwrap();

        let service = SnapshotService::new(
            github.clone(),
            store,
            clock.clone(),
            Arc::new(StubVisitors(7)),
            static_dir.path().to_path_buf(),
        );

        Harness {
            github,
            clock,
            service,
            static_dir_guard: static_dir,
        }
    }

    #[tokio::test]
    async fn second_call_within_ttl_skips_the_network() {
        let h = harness(FakeGitHub {
            repos: vec![repo(3, Some("Rust"))],
            events: vec![push_event("1")],
            ..FakeGitHub::default()
        });

        let first = h.service.get_snapshot("alice", None).await;
        assert_eq!(first.source, SnapshotSource::Fetched);

        h.clock.advance(Duration::minutes(59));
        let second = h.service.get_snapshot("alice", None).await;
        assert_eq!(second.source, SnapshotSource::FreshFromCache);
        assert_eq!(second.snapshot, first.snapshot);
        assert_eq!(h.github.repo_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.github.event_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_entry_triggers_a_refetch() {
        let h = harness(FakeGitHub {
            repos: vec![repo(3, Some("Rust"))],
            ..FakeGitHub::default()
        });

        h.service.get_snapshot("alice", None).await;
        h.clock.advance(Duration::minutes(61));
        let outcome = h.service.get_snapshot("alice", None).await;

        assert_eq!(outcome.source, SnapshotSource::Fetched);
        assert_eq!(h.github.repo_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn aggregates_languages_and_distribution() {
        let mut repos: Vec<RepoSummary> = Vec::new();
        repos.extend((0..5).map(|_| repo(1, Some("Go"))));
        repos.extend((0..3).map(|_| repo(1, Some("Rust"))));
        repos.extend((0..2).map(|_| repo(1, None)));

        let h = harness(FakeGitHub {
            repos,
            ..FakeGitHub::default()
        });

        let outcome = h.service.get_snapshot("alice", None).await;
        let analytics = &outcome.snapshot.analytics;
        assert_eq!(analytics.stars, 10);
        assert_eq!(analytics.top_languages[0].name, "Go");
        assert_eq!(analytics.top_languages[0].count, 5);
        assert_eq!(analytics.top_languages[1].count, 3);

        let shares = &outcome.snapshot.language_distribution;
        assert_eq!(shares[0].pct, 63);
        assert_eq!(shares[1].pct, 38);
    }

    #[tokio::test]
    async fn first_ever_failure_serves_defaults() {
        let h = harness(FakeGitHub {
            fail_repos: AtomicBool::new(true),
            ..FakeGitHub::default()
        });

        let outcome = h.service.get_snapshot("alice", None).await;
        assert_eq!(outcome.source, SnapshotSource::EmptyAfterError);
        assert_eq!(outcome.snapshot, Snapshot::default());
    }

    #[tokio::test]
    async fn repo_failure_after_a_success_serves_the_prior_snapshot() {
        let h = harness(FakeGitHub {
            repos: vec![repo(5, Some("Rust"))],
            events: vec![push_event("1")],
            ..FakeGitHub::default()
        });

        let fetched = h.service.get_snapshot("alice", None).await;
        h.clock.advance(Duration::minutes(61));
        h.github.fail_repos.store(true, Ordering::SeqCst);

        let outcome = h.service.get_snapshot("alice", None).await;
        assert_eq!(outcome.source, SnapshotSource::StaleAfterError);
        assert_eq!(outcome.snapshot, fetched.snapshot);
    }

    #[tokio::test]
    async fn events_failure_keeps_activity_but_updates_analytics() {
        let h = harness(FakeGitHub {
            repos: vec![repo(5, Some("Rust"))],
            events: vec![push_event("1"), push_event("2")],
            ..FakeGitHub::default()
        });

        let first = h.service.get_snapshot("alice", None).await;
        assert_eq!(first.snapshot.recent_activity.len(), 2);

        h.clock.advance(Duration::minutes(61));
        h.github.fail_events.store(true, Ordering::SeqCst);

        let outcome = h.service.get_snapshot("alice", None).await;
        assert_eq!(outcome.source, SnapshotSource::Fetched);
        assert_eq!(outcome.snapshot.recent_activity, first.snapshot.recent_activity);
        assert_eq!(outcome.snapshot.analytics.stars, 5);
        assert_eq!(outcome.snapshot.metrics.pushes_in_window, 2);
    }

    #[tokio::test]
    async fn local_contribution_svg_wins_over_the_fallback_chart() {
        let h = harness(FakeGitHub::default());
        let graph_dir = h.static_dir_guard.path().join(CONTRIBUTION_DIR);
        std::fs::create_dir_all(&graph_dir).unwrap();
        std::fs::write(graph_dir.join("alice.svg"), "<svg/>").unwrap();

        let outcome = h.service.get_snapshot("alice", None).await;
        assert_eq!(
            outcome.snapshot.contribution_graph_url,
            "/profile-3d-contrib/alice.svg"
        );

        let other = h.service.get_snapshot("bob", None).await;
        assert_eq!(
            other.snapshot.contribution_graph_url,
            "https://ghchart.rshah.org/bob"
        );
    }

    #[tokio::test]
    async fn badge_url_uses_the_injected_counter() {
        let h = harness(FakeGitHub::default());
        let outcome = h.service.get_snapshot("alice", None).await;
        assert_eq!(
            outcome.snapshot.visitor_badge_url,
            "https://img.shields.io/badge/visitors--7-blue"
        );
    }

    #[tokio::test]
    async fn persisting_one_account_preserves_the_others() {
        let store = Arc::new(MemoryStore::default());
        let mut seeded = HashMap::new();
        seeded.insert(
            "bob".to_string(),
            CacheEntry {
                ts: Utc.with_ymd_and_hms(2025, 8, 20, 11, 30, 0).unwrap(),
                data: Snapshot::default(),
            },
        );
        store.save(&seeded).unwrap();

        let h = harness_with_store(
            FakeGitHub {
                repos: vec![repo(1, Some("Rust"))],
                ..FakeGitHub::default()
            },
            store.clone(),
        );

        h.service.get_snapshot("alice", None).await;
        let entries = store.load().unwrap();
        assert!(entries.contains_key("alice"));
        assert!(entries.contains_key("bob"));
    }

    #[tokio::test]
    async fn a_failed_cache_write_does_not_fail_the_cycle() {
        let h = harness_with_store(
            FakeGitHub {
                repos: vec![repo(1, Some("Rust"))],
                ..FakeGitHub::default()
            },
            Arc::new(ReadOnlyStore),
        );

        let outcome = h.service.get_snapshot("alice", None).await;
        assert_eq!(outcome.source, SnapshotSource::Fetched);
        assert_eq!(outcome.snapshot.analytics.stars, 1);
    }

    #[tokio::test]
    async fn concurrent_calls_coalesce_into_one_cycle() {
        let h = harness(FakeGitHub {
            repos: vec![repo(1, Some("Rust"))],
            delay_ms: 50,
            ..FakeGitHub::default()
        });

        let (a, b) = tokio::join!(
            h.service.get_snapshot("alice", None),
            h.service.get_snapshot("alice", None)
        );

        assert_eq!(h.github.repo_calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.snapshot, b.snapshot);
        let sources = [a.source, b.source];
        assert!(sources.contains(&SnapshotSource::Fetched));
        assert!(sources.contains(&SnapshotSource::FreshFromCache));
    }
}
