//! Access Tracker Module
//!
//! Records when each memory-resident key was last touched, for LRU eviction.

use std::collections::HashMap;

use crate::cache::entry::current_timestamp_ms;

// == Access Stamp ==
/// Last-touch time of a key.
///
/// The sequence number increases on every touch, so two touches in the same
/// millisecond still order by when they happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AccessStamp {
    /// Wall-clock time of the touch (Unix milliseconds)
    pub at_ms: u64,
    /// Tracker-wide touch counter
    pub seq: u64,
}

// == Access Tracker ==
/// Tracks last-access times for LRU eviction.
///
/// Finding the oldest key is a linear scan, which is fine for the small
/// capacities the memory layer runs with.
#[derive(Debug, Default)]
pub struct AccessTracker {
    /// Last access per key
    stamps: HashMap<String, AccessStamp>,
    /// Next sequence number to hand out
    next_seq: u64,
}

impl AccessTracker {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as used right now.
    pub fn touch(&mut self, key: &str) {
        let stamp = AccessStamp {
            at_ms: current_timestamp_ms(),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.stamps.insert(key.to_string(), stamp);
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        self.stamps.remove(key);
    }

    // == Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn oldest(&self) -> Option<&str> {
        self.stamps
            .iter()
            .min_by_key(|(_, stamp)| **stamp)
            .map(|(key, _)| key.as_str())
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let key = self.oldest()?.to_string();
        self.stamps.remove(&key);
        Some(key)
    }

    /// Last access of a key, if tracked.
    pub fn stamp(&self, key: &str) -> Option<AccessStamp> {
        self.stamps.get(key).copied()
    }

    pub fn clear(&mut self) {
        self.stamps.clear();
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.stamps.contains_key(key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_new() {
        let tracker = AccessTracker::new();
        assert!(tracker.is_empty());
        assert_eq!(tracker.oldest(), None);
    }

    #[test]
    fn test_touch_new_keys() {
        let mut tracker = AccessTracker::new();

        tracker.touch("key1");
        tracker.touch("key2");
        tracker.touch("key3");

        assert_eq!(tracker.len(), 3);
        // key1 is oldest (touched first)
        assert_eq!(tracker.oldest(), Some("key1"));
    }

    #[test]
    fn test_touch_existing_key_moves_it_last() {
        let mut tracker = AccessTracker::new();

        tracker.touch("key1");
        tracker.touch("key2");
        tracker.touch("key3");
        tracker.touch("key1");

        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.oldest(), Some("key2"));
    }

    #[test]
    fn test_same_millisecond_ties_follow_touch_order() {
        let mut tracker = AccessTracker::new();

        tracker.touch("a");
        tracker.touch("b");
        let a = tracker.stamp("a").unwrap();
        let b = tracker.stamp("b").unwrap();

        assert!(a < b);
        assert!(a.seq < b.seq);
    }

    #[test]
    fn test_evict_order_after_multiple_touches() {
        let mut tracker = AccessTracker::new();

        tracker.touch("a");
        tracker.touch("b");
        tracker.touch("c");
        tracker.touch("a");
        tracker.touch("c");
        tracker.touch("b");

        assert_eq!(tracker.evict_oldest(), Some("a".to_string()));
        assert_eq!(tracker.evict_oldest(), Some("c".to_string()));
        assert_eq!(tracker.evict_oldest(), Some("b".to_string()));
        assert_eq!(tracker.evict_oldest(), None);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut tracker = AccessTracker::new();

        tracker.touch("key1");
        tracker.touch("key2");
        tracker.remove("key1");
        tracker.remove("nonexistent");

        assert!(!tracker.contains("key1"));
        assert!(tracker.contains("key2"));

        tracker.clear();
        assert!(tracker.is_empty());
    }
}
