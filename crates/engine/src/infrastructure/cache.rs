//! TTL-based cache for ephemeral state.
//!
//! Provides a thread-safe cache with automatic expiration and a hard entry cap
//! to prevent unbounded memory growth in long-running server processes.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// A thread-safe cache with time-to-live expiration and a capacity bound.
///
/// Expired entries are never returned. They are dropped by `cleanup_expired()`
/// or when an insert finds the cache full; if the cache is still full after
/// that, the oldest entry is evicted.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, TtlEntry<V>>>,
    ttl: Duration,
    capacity: usize,
}

struct TtlEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    /// Create a new cache with the specified TTL and no practical size limit.
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, usize::MAX)
    }

    /// Create a new cache holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Insert a value, replacing any existing entry and resetting the TTL.
    pub async fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Instant::now()).await;
    }

    /// Insert a value with an explicit timestamp.
    pub(crate) async fn insert_at(&self, key: K, value: V, inserted_at: Instant) {
        let mut guard = self.entries.write().await;
        if !guard.contains_key(&key) && guard.len() >= self.capacity {
            let ttl = self.ttl;
            guard.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
            if guard.len() >= self.capacity {
                let oldest = guard
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    guard.remove(&oldest);
                }
            }
        }
        guard.insert(key, TtlEntry { value, inserted_at });
    }

    /// Get a value if it exists and hasn't expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let guard = self.entries.read().await;
        guard.get(key).and_then(|entry| {
            if entry.inserted_at.elapsed() < self.ttl {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    /// Remove and return a value if it exists (regardless of expiration).
    pub async fn remove(&self, key: &K) -> Option<V> {
        self.entries.write().await.remove(key).map(|e| e.value)
    }

    /// Remove every entry whose key matches and return how many were removed.
    pub async fn remove_where<F>(&self, mut matches: F) -> usize
    where
        F: FnMut(&K) -> bool + Send,
    {
        let mut guard = self.entries.write().await;
        let before_count = guard.len();
        guard.retain(|k, _| !matches(k));
        before_count - guard.len()
    }

    /// Remove all expired entries and return the count of removed entries.
    pub async fn cleanup_expired(&self) -> usize {
        let mut guard = self.entries.write().await;
        let before_count = guard.len();
        guard.retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);
        before_count - guard.len()
    }

    /// Get the current number of entries (including expired ones not yet cleaned).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
