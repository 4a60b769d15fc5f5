//! Bounded least-recently-used map.
//!
//! [`LruCache`] keeps at most `capacity` entries. Every [`set`](LruCache::set)
//! and successful [`get`](LruCache::get) moves the key to the most-recently-used
//! end; inserting past capacity evicts exactly one key, the least recently
//! touched one.
//!
//! Storage and recency tracking come from the `lru` crate; this wrapper fixes
//! the surface the version cache relies on (eviction reported from `set`,
//! capacity clamped to at least one). It is not synchronized.
//! [`VersionCache`](super::VersionCache) wraps it in an async mutex.

use std::borrow::Borrow;
use std::hash::Hash;
use std::num::NonZeroUsize;

/// Bounded key → value store with recency-based eviction.
///
/// # Examples
///
/// ```rust
/// use quilt::cache::LruCache;
///
/// let mut cache = LruCache::new(2);
/// cache.set("a", 1);
/// cache.set("b", 2);
/// cache.get("a");
/// cache.set("c", 3); // evicts "b"
///
/// assert_eq!(cache.get("b"), None);
/// assert_eq!(cache.get("a"), Some(&1));
/// ```
#[derive(Debug)]
pub struct LruCache<K: Hash + Eq, V> {
    inner: ::lru::LruCache<K, V>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or_else(|| {
            tracing::warn!(target: "quilt::cache", "LRU capacity 0 is not supported, using 1");
            NonZeroUsize::MIN
        });
        Self {
            inner: ::lru::LruCache::new(capacity),
        }
    }

    /// Insert or update `key` and mark it most recently used.
    ///
    /// Returns the evicted entry when the insert pushed the cache over
    /// capacity. Updating an existing key evicts nothing.
    pub fn set(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.inner.contains(&key) {
            self.inner.put(key, value);
            return None;
        }
        self.inner.push(key, value)
    }

    /// Look up `key`, marking it most recently used on a hit.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.inner.get(key)
    }

    /// Remove `key`. No-op if absent.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.inner.pop(key)
    }

    /// All keys currently present, most recently used first.
    pub fn keys(&self) -> Vec<K> {
        self.inner.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.inner.cap().get()
    }
}
