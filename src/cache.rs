//! In-memory response caching
//!
//! [`CachingTransport`] wraps any [`Transport`] with an LRU cache of
//! successful responses. Caching is off until [`CachingTransport::enable`]
//! is called and can be suspended for a scope with
//! [`CachingTransport::suspend`], which paginated queries use so that
//! cursor-bound requests always reach the server.
//!
//! # Example
//!
//! ```
//! use ferro_myvariant::cache::CachingTransport;
//! use ferro_myvariant::client::{Method, MockTransport, Transport};
//!
//! let mock = MockTransport::new();
//! mock.push_json(200, "{}");
//!
//! let transport = CachingTransport::new(mock, 16);
//! transport.enable("session", &[Method::Get]);
//!
//! assert!(!transport.get("http://localhost/metadata", &[]).unwrap().from_cache);
//! assert!(transport.get("http://localhost/metadata", &[]).unwrap().from_cache);
//! assert_eq!(transport.stats().hits, 1);
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, info};

use crate::client::{HttpResponse, Method, Params, Transport};
use crate::error::FerroError;

/// Statistics for cache usage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of items currently in cache
    pub size: usize,
    /// Maximum cache capacity
    pub capacity: usize,
    /// Number of evictions
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Thread-safe LRU cache
///
/// Reads do not refresh an entry's recency, so eviction order is by
/// insertion of the least recently written key.
pub struct LruCache<K: Hash + Eq + Clone, V: Clone> {
    entries: RwLock<HashMap<K, (V, u64)>>,
    capacity: usize,
    access_counter: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<K: Hash + Eq + Clone, V: Clone> LruCache<K, V> {
    /// Create a new LRU cache holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(capacity.min(4096))),
            capacity,
            access_counter: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Get a value from the cache
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        if let Some((value, _)) = entries.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(value.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Insert a value, evicting the oldest entry when full
    pub fn insert(&self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        let access = self.access_counter.fetch_add(1, Ordering::Relaxed);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            self.evict_lru(&mut entries);
        }

        entries.insert(key, (value, access));
    }

    fn evict_lru(&self, entries: &mut HashMap<K, (V, u64)>) {
        if let Some(lru_key) = entries
            .iter()
            .min_by_key(|(_, (_, access))| *access)
            .map(|(k, _)| k.clone())
        {
            entries.remove(&lru_key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.len(),
            capacity: self.capacity,
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Number of items in the cache
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Identity of a cacheable request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub method: Method,
    pub url: String,
    pub params: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default)]
struct CacheSettings {
    name: String,
    methods: Vec<Method>,
}

/// A [`Transport`] that serves repeated successful requests from memory
pub struct CachingTransport<T> {
    inner: T,
    cache: LruCache<CacheKey, HttpResponse>,
    settings: RwLock<CacheSettings>,
    enabled: AtomicBool,
    suspended: AtomicUsize,
}

impl<T> CachingTransport<T> {
    /// Wrap `inner`; caching starts disabled
    pub fn new(inner: T, capacity: usize) -> Self {
        Self {
            inner,
            cache: LruCache::new(capacity),
            settings: RwLock::new(CacheSettings::default()),
            enabled: AtomicBool::new(false),
            suspended: AtomicUsize::new(0),
        }
    }

    /// Start caching responses to `methods` under the cache name `name`
    ///
    /// Switching to a different name drops previously cached responses.
    pub fn enable(&self, name: &str, methods: &[Method]) {
        let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        if !settings.name.is_empty() && settings.name != name {
            self.cache.clear();
        }
        settings.name = name.to_string();
        settings.methods = methods.to_vec();
        self.enabled.store(true, Ordering::SeqCst);
        info!("[ Future queries will be cached in \"{}\" ]", name);
    }

    /// Stop caching; cached responses are kept until [`Self::clear`]
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        info!("[ Caching stopped ]");
    }

    /// Drop all cached responses
    pub fn clear(&self) {
        self.cache.clear();
        debug!("response cache cleared");
    }

    /// Bypass the cache until the returned guard is dropped
    pub fn suspend(&self) -> CacheSuspension<'_> {
        self.suspended.fetch_add(1, Ordering::SeqCst);
        CacheSuspension {
            counter: &self.suspended,
        }
    }

    /// Whether requests are currently looked up in the cache
    pub fn is_active(&self) -> bool {
        self.enabled.load(Ordering::SeqCst) && self.suspended.load(Ordering::SeqCst) == 0
    }

    /// Whether caching was enabled, regardless of suspension
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Name given to the cache on [`Self::enable`]
    pub fn name(&self) -> String {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .name
            .clone()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The wrapped transport
    pub fn inner(&self) -> &T {
        &self.inner
    }

    fn caches(&self, method: Method) -> bool {
        self.is_active()
            && self
                .settings
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .methods
                .contains(&method)
    }
}

impl<T: Transport> CachingTransport<T> {
    fn fetch(&self, method: Method, url: &str, params: &Params) -> Result<HttpResponse, FerroError> {
        if !self.caches(method) {
            return self.inner.send(method, url, params);
        }

        let key = CacheKey {
            method,
            url: url.to_string(),
            params: params.to_vec(),
        };
        if let Some(mut cached) = self.cache.get(&key) {
            info!("Returning cached result");
            cached.from_cache = true;
            return Ok(cached);
        }

        let response = self.inner.send(method, url, params)?;
        if response.is_success() {
            self.cache.insert(key, response.clone());
        }
        Ok(response)
    }
}

impl<T: Transport> Transport for CachingTransport<T> {
    fn get(&self, url: &str, params: &Params) -> Result<HttpResponse, FerroError> {
        self.fetch(Method::Get, url, params)
    }

    fn post(&self, url: &str, form: &Params) -> Result<HttpResponse, FerroError> {
        self.fetch(Method::Post, url, form)
    }
}

/// Guard returned by [`CachingTransport::suspend`]
#[must_use = "caching resumes as soon as the guard is dropped"]
#[derive(Debug)]
pub struct CacheSuspension<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for CacheSuspension<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockTransport;

    const URL: &str = "http://localhost/v1/metadata";

    fn counting() -> CachingTransport<MockTransport> {
        CachingTransport::new(
            MockTransport::with_handler(|_| HttpResponse::new(200, "{}")),
            8,
        )
    }

    #[test]
    fn test_lru_eviction() {
        let cache: LruCache<u32, u32> = LruCache::new(2);
        cache.insert(1, 10);
        cache.insert(2, 20);
        cache.insert(3, 30);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&3), Some(30));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_lru_zero_capacity() {
        let cache: LruCache<u32, u32> = LruCache::new(0);
        cache.insert(1, 10);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_disabled_by_default() {
        let transport = counting();
        transport.get(URL, &[]).unwrap();
        let second = transport.get(URL, &[]).unwrap();

        assert!(!second.from_cache);
        assert_eq!(transport.inner().requests().len(), 2);
    }

    #[test]
    fn test_enabled_serves_from_cache() {
        let transport = counting();
        transport.enable("test", &[Method::Get, Method::Post]);

        transport.get(URL, &[]).unwrap();
        let second = transport.get(URL, &[]).unwrap();

        assert!(second.from_cache);
        assert_eq!(transport.inner().requests().len(), 1);
        assert_eq!(transport.name(), "test");
    }

    #[test]
    fn test_only_configured_methods_are_cached() {
        let transport = counting();
        transport.enable("test", &[Method::Get]);

        transport.post(URL, &[]).unwrap();
        assert!(!transport.post(URL, &[]).unwrap().from_cache);
    }

    #[test]
    fn test_params_are_part_of_the_key() {
        let transport = counting();
        transport.enable("test", &[Method::Get]);

        let a = vec![("q".to_string(), "a".to_string())];
        let b = vec![("q".to_string(), "b".to_string())];
        transport.get(URL, &a).unwrap();
        assert!(!transport.get(URL, &b).unwrap().from_cache);
        assert!(transport.get(URL, &a).unwrap().from_cache);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let transport = CachingTransport::new(MockTransport::new(), 8);
        transport.enable("test", &[Method::Get]);
        transport.inner().push_json(500, "boom");
        transport.inner().push_json(200, "{}");

        assert_eq!(transport.get(URL, &[]).unwrap().status, 500);
        assert_eq!(transport.get(URL, &[]).unwrap().status, 200);
        assert!(transport.get(URL, &[]).unwrap().from_cache);
    }

    #[test]
    fn test_suspend_bypasses_and_restores() {
        let transport = counting();
        transport.enable("test", &[Method::Get]);
        transport.get(URL, &[]).unwrap();

        {
            let _outer = transport.suspend();
            let _inner = transport.suspend();
            assert!(!transport.is_active());
            assert!(!transport.get(URL, &[]).unwrap().from_cache);
        }

        assert!(transport.is_active());
        assert!(transport.get(URL, &[]).unwrap().from_cache);
    }

    #[test]
    fn test_disable_and_clear() {
        let transport = counting();
        transport.enable("test", &[Method::Get]);
        transport.get(URL, &[]).unwrap();
        assert_eq!(transport.stats().size, 1);

        transport.disable();
        assert!(!transport.get(URL, &[]).unwrap().from_cache);

        transport.clear();
        assert_eq!(transport.stats().size, 0);
    }

    #[test]
    fn test_renaming_drops_entries() {
        let transport = counting();
        transport.enable("first", &[Method::Get]);
        transport.get(URL, &[]).unwrap();

        transport.enable("second", &[Method::Get]);
        assert!(!transport.get(URL, &[]).unwrap().from_cache);
    }
}
