//! Per-entity mutual exclusion.
//!
//! Every use case that reads an entity, decides, and writes it back runs
//! while holding the lock for that entity's key. Two requests for the same
//! PR id (or team name) are therefore serialized, while requests for
//! different keys proceed in parallel.
//!
//! An entry lives only while some task holds or waits on it. The last guard
//! to drop removes it from the map.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard};
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = HashMap<String, Arc<Mutex<()>>>;

/// Lazily created async mutexes, one per key.
#[derive(Default)]
pub struct KeyedLocks {
    locks: Arc<StdMutex<LockMap>>,
}

/// Holds the lock for one key. Dropping it releases the lock and evicts the
/// entry when no other task references it.
pub struct KeyGuard {
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<StdMutex<LockMap>>,
}

impl KeyGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        let mut locks = lock_map(&self.locks);
        // Release first so the map holds the only remaining reference
        self.guard.take();

        let unused = locks
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if unused {
            locks.remove(&self.key);
        }
    }
}

/// The map is never left half-updated, so a poisoned lock is still usable.
fn lock_map(locks: &StdMutex<LockMap>) -> StdMutexGuard<'_, LockMap> {
    locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the lock for a key.
    ///
    /// The clone is taken under the map lock, so a guard being dropped
    /// concurrently sees this reference and keeps the entry.
    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        lock_map(&self.locks)
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquire the lock for `key`. The returned guard releases it on drop.
    pub async fn acquire(&self, key: &str) -> KeyGuard {
        let guard = self.lock_for(key).lock_owned().await;
        KeyGuard {
            key: key.to_string(),
            guard: Some(guard),
            locks: self.locks.clone(),
        }
    }

    /// Acquire the locks for several keys.
    ///
    /// Keys are deduplicated and taken in sorted order, so two callers with
    /// overlapping key sets cannot deadlock each other.
    pub async fn acquire_many<I, K>(&self, keys: I) -> Vec<KeyGuard>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut keys: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in &keys {
            guards.push(self.acquire(key).await);
        }
        guards
    }

    /// Number of keys currently held or waited on.
    pub fn len(&self) -> usize {
        lock_map(&self.locks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
