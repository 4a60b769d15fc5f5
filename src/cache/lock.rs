//! Per-version fetch locks.
//!
//! Concurrent cache misses for the same version must not download and extract
//! the same archive twice. [`FetchLocks`] hands out one async mutex per version
//! name; the first caller through runs the fetch, the rest wait and then find
//! the version on disk.
//!
//! Entries are created lazily with an atomic get-or-insert and removed when the
//! last [`FetchGuard`] for a name is dropped and nobody is waiting on it. Both
//! operations go through the map's entry locking, so a release never removes a
//! mutex another task has just picked up.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-name async mutexes.
///
/// Cloning is cheap and clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct FetchLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl FetchLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `name`.
    ///
    /// The lock is held until the returned guard is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quilt::cache::FetchLocks;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let locks = FetchLocks::new();
    /// {
    ///     let _guard = locks.acquire("1.0.0").await;
    ///     assert_eq!(locks.len(), 1);
    /// }
    /// assert!(locks.is_empty());
    /// # }
    /// ```
    pub async fn acquire(&self, name: &str) -> FetchGuard {
        let lock = self
            .locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        tracing::trace!(target: "quilt::cache", "Waiting for fetch lock: {}", name);
        let guard = lock.lock_owned().await;
        tracing::trace!(target: "quilt::cache", "Acquired fetch lock: {}", name);

        FetchGuard {
            name: name.to_string(),
            locks: Arc::clone(&self.locks),
            guard: Some(guard),
        }
    }

    /// Number of names with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no lock entries are live.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one version name.
///
/// Dropping the guard releases the mutex and removes the registry entry when
/// no other task holds or waits on it.
#[derive(Debug)]
pub struct FetchGuard {
    name: String,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl FetchGuard {
    /// The locked version name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        // Release first so our Arc is gone before the count check
        drop(self.guard.take());
        // Only the registry's own reference left means no holder or waiter
        self.locks.remove_if(&self.name, |_, lock| Arc::strong_count(lock) == 1);
        tracing::trace!(target: "quilt::cache", "Released fetch lock: {}", self.name);
    }
}
