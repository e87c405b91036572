use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

use crate::snapshot::CacheEntry;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Time source for freshness checks. Injected so tests can advance time
/// without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Persistent snapshot cache: one outer map keyed by account, loaded and
/// saved as a whole, mirroring a single serialized blob.
pub trait CacheStore: Send + Sync {
    fn load(&self) -> Result<HashMap<String, CacheEntry>, StoreError>;
    fn save(&self, entries: &HashMap<String, CacheEntry>) -> Result<(), StoreError>;
}

/// File-backed store holding the whole account map in one JSON document.
/// A missing or unreadable-as-JSON file loads as empty rather than failing.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CacheStore for JsonFileStore {
    fn load(&self) -> Result<HashMap<String, CacheEntry>, StoreError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let raw = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                warn!("Discarding unreadable snapshot cache: {}", err);
                Ok(HashMap::new())
            }
        }
    }

    fn save(&self, entries: &HashMap<String, CacheEntry>) -> Result<(), StoreError> {
        let raw = serde_json::to_string(entries)?;
        fs::write(&self.path, raw)?;
        debug!("Persisted {} cached snapshot(s)", entries.len());
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;
    use chrono::TimeZone;

    fn entry() -> CacheEntry {
        CacheEntry {
            ts: Utc.with_ymd_and_hms(2025, 8, 20, 12, 0, 0).unwrap(),
            data: Snapshot::default(),
        }
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("cache.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(path);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn round_trips_entries_per_account() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("cache.json"));

        let mut entries = HashMap::new();
        entries.insert("alice".to_string(), entry());
        entries.insert("bob".to_string(), entry());
        store.save(&entries).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded["alice"].ts, entry().ts);
        assert_eq!(loaded["bob"].data, Snapshot::default());
    }

    #[test]
    fn save_into_missing_directory_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("missing").join("cache.json"));
        assert!(store.save(&HashMap::new()).is_err());
    }
}
