//! Memory Layer Module
//!
//! The fast cache layer: a bounded HashMap of entries with LRU eviction and
//! lazy TTL expiry.

use std::collections::HashMap;

use serde_json::Value;

use crate::cache::pattern::wildcard_match;
use crate::cache::{AccessTracker, CacheEntry};

// == Lookup ==
/// Outcome of a memory-layer lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Resident and valid
    Hit(Value),
    /// Was resident but expired; it has now been removed
    Expired,
    /// Not resident
    Absent,
}

// == Memory Layer ==
/// In-memory entries bounded to `max_items`, evicting the least recently
/// touched key when a new key arrives at capacity.
#[derive(Debug)]
pub struct MemoryLayer {
    /// Key-entry storage
    entries: HashMap<String, CacheEntry>,
    /// Last-access tracking
    access: AccessTracker,
    /// Maximum number of entries allowed
    max_items: usize,
}

impl MemoryLayer {
    // == Constructor ==
    /// Creates an empty layer. A capacity of zero is raised to one.
    pub fn new(max_items: usize) -> Self {
        Self {
            entries: HashMap::new(),
            access: AccessTracker::new(),
            max_items: max_items.max(1),
        }
    }

    // == Get ==
    /// Looks up a key, touching it on a hit and dropping it if expired.
    pub fn lookup(&mut self, key: &str) -> Lookup {
        let Some(entry) = self.entries.get(key) else {
            return Lookup::Absent;
        };

        if entry.is_expired() {
            self.remove(key);
            return Lookup::Expired;
        }

        let data = entry.data.clone();
        self.access.touch(key);
        Lookup::Hit(data)
    }

    // == Insert ==
    /// Stores an entry under its key and marks it as just used.
    ///
    /// Inserting a new key at capacity first evicts the least recently used
    /// key, which is returned. Replacing a resident key never evicts.
    pub fn insert(&mut self, entry: CacheEntry) -> Option<String> {
        let key = entry.key.clone();
        let mut evicted = None;

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_items {
            evicted = self.access.evict_oldest();
            if let Some(old) = &evicted {
                self.entries.remove(old);
            }
        }

        self.entries.insert(key.clone(), entry);
        self.access.touch(&key);
        evicted
    }

    // == Remove ==
    /// Removes a key, returning whether it was resident.
    pub fn remove(&mut self, key: &str) -> bool {
        self.access.remove(key);
        self.entries.remove(key).is_some()
    }

    /// Resident keys matching a wildcard pattern.
    pub fn matching_keys(&self, pattern: &str) -> Vec<String> {
        self.entries
            .keys()
            .filter(|key| wildcard_match(pattern, key))
            .cloned()
            .collect()
    }

    // == Purge Expired ==
    /// Removes every expired entry, returning how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }
        expired.len()
    }

    /// Sum of serialized entry sizes.
    pub fn estimated_bytes(&self) -> usize {
        self.entries.values().map(CacheEntry::estimated_size).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.access.clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_items
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    fn entry(key: &str, data: Value) -> CacheEntry {
        CacheEntry::new(key, data, 60_000)
    }

    #[test]
    fn test_layer_new() {
        let layer = MemoryLayer::new(100);
        assert!(layer.is_empty());
        assert_eq!(layer.capacity(), 100);
        assert_eq!(MemoryLayer::new(0).capacity(), 1);
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut layer = MemoryLayer::new(100);

        assert_eq!(layer.insert(entry("teamA", json!({"wins": 5}))), None);
        assert_eq!(layer.lookup("teamA"), Lookup::Hit(json!({"wins": 5})));
        assert_eq!(layer.lookup("teamB"), Lookup::Absent);
    }

    #[test]
    fn test_expired_entry_is_dropped_on_lookup() {
        let mut layer = MemoryLayer::new(100);
        layer.insert(CacheEntry::new("teamA", json!(1), 30));

        sleep(Duration::from_millis(60));

        assert_eq!(layer.lookup("teamA"), Lookup::Expired);
        assert!(!layer.contains("teamA"));
        assert_eq!(layer.lookup("teamA"), Lookup::Absent);
    }

    #[test]
    fn test_overwrite_keeps_single_entry() {
        let mut layer = MemoryLayer::new(100);

        layer.insert(entry("k", json!(1)));
        layer.insert(entry("k", json!(2)));

        assert_eq!(layer.len(), 1);
        assert_eq!(layer.lookup("k"), Lookup::Hit(json!(2)));
    }

    #[test]
    fn test_lru_eviction() {
        let mut layer = MemoryLayer::new(3);

        layer.insert(entry("key1", json!(1)));
        layer.insert(entry("key2", json!(2)));
        layer.insert(entry("key3", json!(3)));

        // Layer is full, adding key4 evicts key1 (oldest)
        assert_eq!(layer.insert(entry("key4", json!(4))), Some("key1".to_string()));
        assert_eq!(layer.len(), 3);
        assert!(!layer.contains("key1"));
    }

    #[test]
    fn test_lookup_refreshes_recency() {
        let mut layer = MemoryLayer::new(2);

        layer.insert(entry("a", json!(1)));
        layer.insert(entry("b", json!(2)));
        layer.lookup("a");

        assert_eq!(layer.insert(entry("c", json!(3))), Some("b".to_string()));
        assert!(layer.contains("a"));
        assert!(layer.contains("c"));
    }

    #[test]
    fn test_reinsert_at_capacity_never_evicts() {
        let mut layer = MemoryLayer::new(2);

        layer.insert(entry("a", json!(1)));
        layer.insert(entry("b", json!(2)));

        assert_eq!(layer.insert(entry("a", json!(10))), None);
        assert_eq!(layer.len(), 2);
    }

    #[test]
    fn test_matching_keys() {
        let mut layer = MemoryLayer::new(10);
        layer.insert(entry("player-1", json!(1)));
        layer.insert(entry("player-2", json!(2)));
        layer.insert(entry("team-1", json!(3)));

        let mut keys = layer.matching_keys("player-*");
        keys.sort();
        assert_eq!(keys, vec!["player-1", "player-2"]);
    }

    #[test]
    fn test_purge_expired() {
        let mut layer = MemoryLayer::new(10);
        layer.insert(CacheEntry::new("short", json!(1), 20));
        layer.insert(entry("long", json!(2)));

        sleep(Duration::from_millis(50));

        assert_eq!(layer.purge_expired(), 1);
        assert_eq!(layer.keys(), vec!["long".to_string()]);
    }

    #[test]
    fn test_clear_and_size() {
        let mut layer = MemoryLayer::new(10);
        layer.insert(entry("a", json!("payload")));
        assert!(layer.estimated_bytes() > 0);

        layer.clear();
        assert!(layer.is_empty());
        assert_eq!(layer.estimated_bytes(), 0);
    }
}
