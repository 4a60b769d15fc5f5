//! In-memory version cache.
//!
//! [`VersionCache::get_version`] is the single entry point for "give me this
//! version", trying each source in turn:
//!
//! ```text
//! LRU hit ──▶ return
//!    │ miss
//!    ▼
//! manifest on disk ──▶ load, insert, return
//!    │ missing
//!    ▼
//! Fetcher::fetch_and_load ──▶ insert, return
//!    │ failure
//!    ▼
//! None
//! ```
//!
//! # Concurrency
//!
//! The [`LruCache`] sits behind a `tokio::sync::Mutex` held only for lookups
//! and inserts, never across disk or network I/O. Concurrent misses for one
//! name may both load from disk (each gets an equivalent `Arc<Version>`, the
//! later insert wins); fetching is single-flight per name through the
//! [`FetchLocks`] in the fetcher.
//!
//! Eviction only drops the in-memory copy. The directory stays on disk and the
//! next request reloads it.

pub mod lock;
pub mod lru;

pub use lock::{FetchGuard, FetchLocks};
pub use self::lru::LruCache;

use crate::fetch::Fetcher;
use crate::utils::validate_version_name;
use crate::version::{Version, load_version, manifest_exists};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Bounded cache of loaded versions in front of the disk and the fetcher.
#[derive(Debug)]
pub struct VersionCache {
    versions: Mutex<LruCache<String, Arc<Version>>>,
    local_path: PathBuf,
    fetcher: Fetcher,
}

impl VersionCache {
    /// Cache holding up to `capacity` versions loaded from `local_path`.
    pub fn new(local_path: impl Into<PathBuf>, capacity: usize, fetcher: Fetcher) -> Self {
        Self {
            versions: Mutex::new(LruCache::new(capacity)),
            local_path: local_path.into(),
            fetcher,
        }
    }

    /// Directory holding the version directories.
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// The fetcher used on disk misses.
    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Return the named version, loading or fetching it if needed.
    ///
    /// `None` means the version is unavailable; the reason has been logged.
    pub async fn get_version(&self, name: &str) -> Option<Arc<Version>> {
        if let Err(e) = validate_version_name(name) {
            tracing::warn!(target: "quilt::cache", "{}", e);
            return None;
        }

        if let Some(version) = self.versions.lock().await.get(name) {
            tracing::trace!(target: "quilt::cache", "Cache hit: {}", name);
            return Some(Arc::clone(version));
        }

        let loaded = if manifest_exists(&self.local_path, name).await {
            tracing::debug!(target: "quilt::cache", "Loading version {} from disk", name);
            load_version(&self.local_path, name).await
        } else {
            tracing::debug!(target: "quilt::cache", "Version {} not on disk, fetching", name);
            self.fetcher.fetch_and_load(name).await
        };

        match loaded {
            Ok(version) => {
                let version = Arc::new(version);
                let evicted =
                    self.versions.lock().await.set(name.to_string(), Arc::clone(&version));
                if let Some((evicted, _)) = evicted {
                    tracing::debug!(target: "quilt::cache", "Evicted version {}", evicted);
                }
                Some(version)
            }
            Err(e) => {
                tracing::warn!(target: "quilt::cache", "Version {} unavailable: {}", name, e);
                None
            }
        }
    }

    /// Names of the versions currently held in memory, sorted.
    pub async fn cached_names(&self) -> Vec<String> {
        let mut names = self.versions.lock().await.keys();
        names.sort();
        names
    }

    /// Drop a version from memory. Its directory is left on disk.
    pub async fn evict(&self, name: &str) -> bool {
        self.versions.lock().await.delete(name).is_some()
    }
}
