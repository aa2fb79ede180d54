//! Query-level result cache
//!
//! Finder results are cached under a key built from the query and its
//! parameters. Every entry remembers the tables its query read; a write to
//! any of those tables evicts it.
//!
//! Each table also carries a generation counter that every invalidation
//! bumps. A reader takes a [`Generation`] snapshot before querying and stores
//! its result with [`QueryCache::put_if_unchanged`]; a result read before a
//! concurrent write committed is then never published.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

struct CacheEntry {
    tables: &'static [&'static str],
    value: Arc<dyn Any + Send + Sync>,
}

/// Generations of a set of tables, taken before a cacheable query runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    epoch: u64,
    tables: Vec<u64>,
}

/// Shared cache for finder results
///
/// One instance is shared by all DAOs of a [`crate::SqliteStore`], so a write
/// through one DAO invalidates cached results of the others.
#[derive(Default)]
pub struct QueryCache {
    entries: DashMap<String, CacheEntry>,
    generations: DashMap<String, u64>,
    epoch: AtomicU64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the cache key for a query and its parameters
    pub fn key(query: &str, params: &[&str]) -> String {
        let mut key = String::from(query);
        for param in params {
            key.push('\u{1f}');
            key.push_str(param);
        }
        key
    }

    /// Returns the cached value for `key` if present and of type `T`
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entry = self.entries.get(key)?;
        let value = entry.value.downcast_ref::<T>().cloned();
        if value.is_some() {
            tracing::trace!(key, "Query cache hit");
        }
        value
    }

    /// Snapshots the generations of `tables`
    pub fn generation(&self, tables: &[&str]) -> Generation {
        Generation {
            epoch: self.epoch.load(Ordering::SeqCst),
            tables: tables
                .iter()
                .map(|t| self.generations.get(*t).map_or(0, |g| *g))
                .collect(),
        }
    }

    /// Stores `value` under `key`, tagged with the tables the query read
    pub fn put<T>(&self, key: String, tables: &'static [&'static str], value: T)
    where
        T: Send + Sync + 'static,
    {
        self.entries.insert(
            key,
            CacheEntry {
                tables,
                value: Arc::new(value),
            },
        );
    }

    /// Stores `value` only if none of `tables` was invalidated since `seen`
    ///
    /// Returns false if the value was discarded. The entry is inserted before
    /// the generations are compared: an invalidation racing with this call
    /// either shows up in the comparison or evicts the entry afterwards.
    pub fn put_if_unchanged<T>(
        &self,
        key: String,
        tables: &'static [&'static str],
        seen: &Generation,
        value: T,
    ) -> bool
    where
        T: Send + Sync + 'static,
    {
        let value: Arc<dyn Any + Send + Sync> = Arc::new(value);
        self.entries.insert(
            key.clone(),
            CacheEntry {
                tables,
                value: Arc::clone(&value),
            },
        );

        if self.generation(tables) == *seen {
            return true;
        }
        self.entries
            .remove_if(&key, |_, entry| Arc::ptr_eq(&entry.value, &value));
        tracing::trace!(key, "Query result outdated by a concurrent write");
        false
    }

    /// Evicts every entry whose query read `table`, returning the number evicted
    pub fn invalidate_table(&self, table: &str) -> usize {
        *self.generations.entry(table.to_string()).or_insert(0) += 1;

        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !entry.tables.iter().any(|t| *t == table));
        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            tracing::debug!(table, evicted, "Query cache invalidated");
        }
        evicted
    }

    /// Evicts everything
    pub fn clear(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLE_TABLES: &[&str] = &["message_bundle", "text_item"];

    #[test]
    fn test_key_includes_params() {
        assert_ne!(
            QueryCache::key("find_by_locale", &["de", "DE"]),
            QueryCache::key("find_by_locale", &["deD", "E"])
        );
        assert_eq!(
            QueryCache::key("q", &["a"]),
            QueryCache::key("q", &["a"])
        );
    }

    #[test]
    fn test_put_and_get() {
        let cache = QueryCache::new();
        cache.put("k".to_string(), BUNDLE_TABLES, vec![1_i64, 2, 3]);

        assert_eq!(cache.get::<Vec<i64>>("k"), Some(vec![1, 2, 3]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_wrong_type_misses() {
        let cache = QueryCache::new();
        cache.put("k".to_string(), BUNDLE_TABLES, 42_u32);
        assert_eq!(cache.get::<String>("k"), None);
    }

    #[test]
    fn test_invalidate_by_table() {
        let cache = QueryCache::new();
        cache.put("bundles".to_string(), BUNDLE_TABLES, 1_u8);
        cache.put("locales".to_string(), &["text_item"], 2_u8);
        cache.put("trees".to_string(), &["tree"], 3_u8);

        assert_eq!(cache.invalidate_table("text_item"), 2);
        assert!(cache.get::<u8>("bundles").is_none());
        assert!(cache.get::<u8>("locales").is_none());
        assert_eq!(cache.get::<u8>("trees"), Some(3));

        assert_eq!(cache.invalidate_table("account"), 0);
    }

    #[test]
    fn test_put_if_unchanged_stores_when_no_write_intervened() {
        let cache = QueryCache::new();
        let seen = cache.generation(BUNDLE_TABLES);

        assert!(cache.put_if_unchanged("k".to_string(), BUNDLE_TABLES, &seen, 7_u8));
        assert_eq!(cache.get::<u8>("k"), Some(7));
    }

    #[test]
    fn test_put_if_unchanged_discards_result_read_before_write() {
        let cache = QueryCache::new();
        let seen = cache.generation(BUNDLE_TABLES);

        // A write lands while the query is running; nothing is cached yet
        assert_eq!(cache.invalidate_table("text_item"), 0);

        assert!(!cache.put_if_unchanged("k".to_string(), BUNDLE_TABLES, &seen, 7_u8));
        assert!(cache.get::<u8>("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unrelated_write_keeps_generation() {
        let cache = QueryCache::new();
        let seen = cache.generation(BUNDLE_TABLES);
        cache.invalidate_table("tree");
        assert_eq!(cache.generation(BUNDLE_TABLES), seen);
    }

    #[test]
    fn test_clear_changes_generation() {
        let cache = QueryCache::new();
        let seen = cache.generation(&["tree"]);
        cache.clear();
        assert_ne!(cache.generation(&["tree"]), seen);
    }

    #[test]
    fn test_clear() {
        let cache = QueryCache::new();
        cache.put("a".to_string(), &["tree"], ());
        cache.clear();
        assert!(cache.is_empty());
    }
}
