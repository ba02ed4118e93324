//! Injectable catalog store.
//!
//! Catalogs are transient in-process state keyed by the ref (or job id)
//! they were built for. The store is a trait so hosting layers can swap
//! the backing; the in-memory implementation carries a TTL so a
//! long-running process does not accumulate stale catalogs without
//! bound.

use crate::builder::Catalog;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Keyed storage for built catalogs.
pub trait CatalogStore: Send + Sync {
    /// Returns the catalog stored under a key, if still present.
    fn get(&self, key: &str) -> Option<Catalog>;

    /// Stores a catalog under a key, replacing any previous entry.
    fn insert(&self, key: &str, catalog: Catalog);

    /// Removes the entry under a key.
    fn remove(&self, key: &str);
}

/// In-memory catalog store with TTL eviction.
///
/// Expired entries are dropped on access and swept on insert; there is
/// no background task.
pub struct MemoryCatalogStore {
    ttl: Duration,
    entries: RwLock<HashMap<String, (Instant, Catalog)>>,
}

impl MemoryCatalogStore {
    /// Creates a store whose entries expire after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .values()
            .filter(|(stored, _)| now.duration_since(*stored) < self.ttl)
            .count()
    }

    /// Returns true if no live entries remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CatalogStore for MemoryCatalogStore {
    fn get(&self, key: &str) -> Option<Catalog> {
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some((stored, catalog)) if stored.elapsed() < self.ttl => Some(catalog.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn insert(&self, key: &str, catalog: Catalog) {
        let mut entries = self.entries.write();
        entries.retain(|_, (stored, _)| stored.elapsed() < self.ttl);
        entries.insert(key.to_string(), (Instant::now(), catalog));
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(commit: &str) -> Catalog {
        Catalog {
            commit_id: commit.into(),
            rows: Vec::new(),
        }
    }

    #[test]
    fn round_trip() {
        let store = MemoryCatalogStore::new(Duration::from_secs(60));
        assert!(store.get("main").is_none());

        store.insert("main", catalog("c1"));
        assert_eq!(store.get("main").unwrap().commit_id, "c1");

        store.insert("main", catalog("c2"));
        assert_eq!(store.get("main").unwrap().commit_id, "c2");

        store.remove("main");
        assert!(store.get("main").is_none());
    }

    #[test]
    fn entries_expire() {
        let store = MemoryCatalogStore::new(Duration::from_millis(10));
        store.insert("main", catalog("c1"));
        assert!(store.get("main").is_some());

        std::thread::sleep(Duration::from_millis(20));
        assert!(store.get("main").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn insert_sweeps_expired_entries() {
        let store = MemoryCatalogStore::new(Duration::from_millis(10));
        store.insert("old", catalog("c1"));
        std::thread::sleep(Duration::from_millis(20));

        store.insert("new", catalog("c2"));
        assert_eq!(store.len(), 1);
    }
}
