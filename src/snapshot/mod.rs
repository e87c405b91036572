mod aggregate;
mod service;
mod types;

pub use service::{
    RandomVisitorCounter, SnapshotService, VisitorCounter, CONTRIBUTION_DIR, DEFAULT_ACCOUNT,
};
pub use types::{
    Achievement, ActivityEntry, Analytics, CacheEntry, DerivedMetrics, LanguageCount,
    LanguageShare, Snapshot, SnapshotOutcome, SnapshotSource,
};
