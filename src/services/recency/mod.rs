//! Recent-Top Cache
//!
//! Registry of post ids recently surfaced near the top of the feed, plus a
//! seen-history timestamp per id. Owned explicitly and injected into the
//! ranker (no module-level state), so independent ranking contexts and test
//! isolation come for free.
//!
//! Eviction is a construction choice: unbounded by default, or a bounded
//! FIFO window that drops the oldest recorded id when full.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

#[derive(Debug, Default)]
struct TopIds {
    set: HashSet<String>,
    order: VecDeque<String>,
}

/// Process-wide registry of recently shown top-of-feed ids.
///
/// All methods take `&self`; a single mutex guards the ordered id window
/// and a concurrent map holds the seen-history timestamps, so the cache can
/// be shared as `Arc<RecencyCache>` across ranking calls.
#[derive(Debug, Default)]
pub struct RecencyCache {
    top: Mutex<TopIds>,
    capacity: Option<usize>,
    last_seen: DashMap<String, DateTime<Utc>>,
}

impl RecencyCache {
    /// Unbounded cache; entries persist until explicitly cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounded cache: recording beyond `capacity` evicts the oldest id.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            top: Mutex::new(TopIds::default()),
            capacity: Some(capacity),
            last_seen: DashMap::new(),
        }
    }

    fn lock_top(&self) -> std::sync::MutexGuard<'_, TopIds> {
        // A poisoned lock only means another thread panicked mid-mutation
        // of a plain set; the data is still usable.
        self.top.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the id set with the given ids (session bootstrap from
    /// externally known "already shown" state). Seed order counts as
    /// recording order for eviction purposes.
    pub fn seed<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut top = self.lock_top();
        top.set.clear();
        top.order.clear();
        for id in ids {
            let id = id.into();
            if id.is_empty() || !top.set.insert(id.clone()) {
                continue;
            }
            top.order.push_back(id);
            self.evict_over_capacity(&mut top);
        }
        debug!(cached_ids = top.set.len(), "Recency cache seeded");
    }

    /// Drop every recorded top id. Seen history is untouched.
    pub fn clear(&self) {
        let mut top = self.lock_top();
        top.set.clear();
        top.order.clear();
        debug!("Recency cache cleared");
    }

    /// Record one id as shown at the top of the feed. Idempotent: an
    /// already-present id refreshes its seen-history timestamp without
    /// duplicating or reordering the eviction window.
    pub fn record(&self, id: &str) {
        self.record_at(id, Utc::now());
    }

    /// `record` with an injected timestamp, used by the ranker so one
    /// ranking call observes a single consistent clock.
    pub fn record_at(&self, id: &str, now: DateTime<Utc>) {
        if id.is_empty() {
            return;
        }
        self.last_seen.insert(id.to_string(), now);

        let mut top = self.lock_top();
        if top.set.insert(id.to_string()) {
            top.order.push_back(id.to_string());
            self.evict_over_capacity(&mut top);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock_top().set.contains(id)
    }

    pub fn len(&self) -> usize {
        self.lock_top().set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_top().set.is_empty()
    }

    /// Hours since this id was last recorded as shown, if ever.
    pub fn hours_since_seen(&self, id: &str, now: DateTime<Utc>) -> Option<f64> {
        self.last_seen
            .get(id)
            .map(|at| ((now - *at).num_seconds() as f64 / 3600.0).max(0.0))
    }

    /// Clear only the seen-history timestamps, leaving the top-id set
    /// intact. Distinct from [`clear`](Self::clear).
    pub fn clear_seen_history(&self) {
        self.last_seen.clear();
        debug!("Seen history cleared");
    }

    fn evict_over_capacity(&self, top: &mut TopIds) {
        if let Some(capacity) = self.capacity {
            while top.order.len() > capacity {
                if let Some(oldest) = top.order.pop_front() {
                    top.set.remove(&oldest);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_record_is_idempotent() {
        let cache = RecencyCache::new();
        cache.record("p1");
        cache.record("p1");

        assert_eq!(cache.len(), 1);
        assert!(cache.contains("p1"));
    }

    #[test]
    fn test_seed_replaces_previous_state() {
        let cache = RecencyCache::new();
        cache.record("old");
        cache.seed(["a", "b", "c"]);

        assert_eq!(cache.len(), 3);
        assert!(!cache.contains("old"));
        assert!(cache.contains("b"));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_bounded_cache_evicts_oldest_first() {
        let cache = RecencyCache::with_capacity(2);
        cache.record("a");
        cache.record("b");
        cache.record("c");

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));

        // Re-recording an existing id must not evict anything.
        cache.record("b");
        assert_eq!(cache.len(), 2);
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_seed_respects_capacity() {
        let cache = RecencyCache::with_capacity(2);
        cache.seed(["a", "b", "c", "d"]);

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("c"));
        assert!(cache.contains("d"));
    }

    #[test]
    fn test_hours_since_seen() {
        let cache = RecencyCache::new();
        let now = Utc::now();
        cache.record_at("p1", now - Duration::hours(3));

        let hours = cache.hours_since_seen("p1", now).unwrap();
        assert!((hours - 3.0).abs() < 0.01);
        assert!(cache.hours_since_seen("unknown", now).is_none());
    }

    #[test]
    fn test_clear_seen_history_is_distinct_from_clear() {
        let cache = RecencyCache::new();
        let now = Utc::now();
        cache.record_at("p1", now);

        cache.clear_seen_history();
        assert!(cache.contains("p1"));
        assert!(cache.hours_since_seen("p1", now).is_none());
    }

    #[test]
    fn test_empty_id_is_ignored() {
        let cache = RecencyCache::new();
        cache.record("");
        cache.seed([""]);
        assert!(cache.is_empty());
    }
}
