//! LRU Tracker Module
//!
//! Least-recently-used ordering for fast-tier eviction.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Tracks access order for LRU eviction.
///
/// Every touch stamps the key with a fresh generation number; the smallest
/// generation is the least recently used key.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// generation -> key, ordered oldest first
    order: BTreeMap<u64, String>,
    /// key -> current generation
    generations: HashMap<String, u64>,
    next_generation: u64,
}

impl LruTracker {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used, inserting it if unknown.
    pub fn touch(&mut self, key: &str) {
        let generation = self.next_generation;
        self.next_generation += 1;

        if let Some(previous) = self.generations.insert(key.to_string(), generation) {
            self.order.remove(&previous);
        }
        self.order.insert(generation, key.to_string());
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) {
        if let Some(generation) = self.generations.remove(key) {
            self.order.remove(&generation);
        }
    }

    // == Evict Oldest ==
    /// Removes and returns the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.generations.remove(&key);
        Some(key)
    }

    /// Returns the least recently used key without removing it.
    #[allow(dead_code)]
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.first_key_value().map(|(_, key)| key)
    }

    pub fn len(&self) -> usize {
        self.generations.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    #[allow(dead_code)]
    pub fn contains(&self, key: &str) -> bool {
        self.generations.contains_key(key)
    }
}
