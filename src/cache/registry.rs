//! Key Registry Module
//!
//! Best-effort index of keys written through the coordinator. The remote tier
//! cannot enumerate its keys, so pattern invalidation scans this index
//! instead. Entries are only dropped by explicit removal; a key that expires
//! naturally in its tiers lingers here until it is overwritten or removed.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

// == Key Registry ==
#[derive(Debug, Default)]
pub struct KeyRegistry {
    keys: DashMap<String, DateTime<Utc>>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` as written at `at`, replacing any earlier timestamp.
    pub fn add(&self, key: &str, at: DateTime<Utc>) {
        self.keys.insert(key.to_string(), at);
    }

    pub fn remove(&self, key: &str) {
        self.keys.remove(key);
    }

    /// Point-in-time copy of the registered keys. Concurrent `add` calls may or
    /// may not be reflected.
    pub fn snapshot(&self) -> Vec<String> {
        self.keys.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn inserted_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.keys.get(key).map(|entry| *entry.value())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_add_and_snapshot() {
        let registry = KeyRegistry::new();
        let now = Utc::now();

        registry.add("a", now);
        registry.add("b", now);
        registry.add("a", now + Duration::seconds(5));

        let mut keys = registry.snapshot();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(registry.inserted_at("a"), Some(now + Duration::seconds(5)));
    }

    #[test]
    fn test_remove() {
        let registry = KeyRegistry::new();

        registry.add("a", Utc::now());
        registry.remove("a");
        registry.remove("never-added");

        assert!(registry.is_empty());
        assert!(!registry.contains("a"));
    }

    #[tokio::test]
    async fn test_concurrent_adds() {
        let registry = std::sync::Arc::new(KeyRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    for i in 0..100 {
                        registry.add(&format!("w{}:{}", worker, i), Utc::now());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.len(), 800);
    }
}
