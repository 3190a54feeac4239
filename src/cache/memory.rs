//! Memory Tier Module
//!
//! In-process tier combining HashMap storage with LRU tracking, a byte budget
//! and TTL expiration. Serves as the fast tier, and as the remote tier when no
//! external store is configured.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::tier::{CacheTier, TierError, TierValue};
use crate::cache::{CacheEntry, LruTracker};

// == Tier Stats ==
/// Tier-local counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TierStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped to stay within the byte budget
    pub evictions: u64,
    pub total_entries: usize,
    pub total_bytes: usize,
}

// == Tier Store ==
/// Synchronous storage behind [`MemoryTier`].
#[derive(Debug)]
pub struct TierStore {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: TierStats,
    used_bytes: usize,
    max_bytes: usize,
}

impl TierStore {
    /// Creates an empty store holding at most `max_bytes` of encoded values.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: TierStats::default(),
            used_bytes: 0,
            max_bytes,
        }
    }

    // == Set ==
    /// Stores an entry, evicting least recently used entries until it fits.
    ///
    /// Overwriting a key resets its TTL.
    pub fn set(&mut self, key: &str, data: Arc<Vec<u8>>, ttl: Duration) -> Result<(), TierError> {
        let size = data.len();
        if size > self.max_bytes {
            return Err(TierError::Rejected(format!(
                "{} bytes exceeds tier budget of {} bytes",
                size, self.max_bytes
            )));
        }

        self.detach(key);

        while self.used_bytes + size > self.max_bytes {
            match self.lru.evict_oldest() {
                Some(evicted) => {
                    if let Some(entry) = self.entries.remove(&evicted) {
                        self.used_bytes -= entry.size();
                    }
                    self.stats.evictions += 1;
                    debug!(key = %evicted, "evicted to make room");
                }
                None => break,
            }
        }

        self.entries.insert(key.to_string(), CacheEntry::new(data, ttl));
        self.lru.touch(key);
        self.used_bytes += size;
        Ok(())
    }

    // == Get ==
    /// Returns a live entry. Expired entries are dropped and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<CacheEntry> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                let entry = entry.clone();
                self.stats.hits += 1;
                self.lru.touch(key);
                Some(entry)
            }
            Some(_) => {
                self.detach(key);
                self.stats.misses += 1;
                None
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    // == Remove ==
    /// Returns true if the key was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.detach(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|entry| !entry.is_expired())
    }

    // == Expire ==
    /// Moves a live entry's expiry. Returns false if absent or already expired.
    pub fn expire(&mut self, key: &str, ttl: Duration) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                entry.extend(ttl);
                true
            }
            _ => false,
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.detach(key);
        }
        expired.len()
    }

    pub fn stats(&self) -> TierStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats.total_bytes = self.used_bytes;
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    fn detach(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        match self.entries.remove(key) {
            Some(entry) => {
                self.used_bytes -= entry.size();
                true
            }
            None => false,
        }
    }
}

// == Memory Tier ==
/// [`CacheTier`] over a lock-guarded [`TierStore`].
#[derive(Debug)]
pub struct MemoryTier {
    name: String,
    store: RwLock<TierStore>,
}

impl MemoryTier {
    pub fn new(name: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            name: name.into(),
            store: RwLock::new(TierStore::new(max_bytes)),
        }
    }

    /// Drops expired entries so they stop counting against the byte budget.
    pub async fn cleanup_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }

    pub async fn stats(&self) -> TierStats {
        self.store.read().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

#[async_trait]
impl CacheTier for MemoryTier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<TierValue>, TierError> {
        // Write lock: a hit touches the LRU order.
        let mut store = self.store.write().await;
        Ok(store.get(key).map(|entry| TierValue {
            ttl_remaining: Some(entry.ttl_remaining()),
            data: entry.data,
        }))
    }

    async fn set(&self, key: &str, data: Arc<Vec<u8>>, ttl: Duration) -> Result<(), TierError> {
        self.store.write().await.set(key, data, ttl)
    }

    async fn remove(&self, key: &str) -> Result<(), TierError> {
        self.store.write().await.remove(key);
        Ok(())
    }

    async fn contains(&self, key: &str) -> Result<bool, TierError> {
        Ok(self.store.read().await.contains(key))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, TierError> {
        Ok(self.store.write().await.expire(key, ttl))
    }
}
