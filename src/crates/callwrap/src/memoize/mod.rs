//! Memoizing call wrapper
//!
//! [`memoize`] wraps a callable so that each distinct argument value is
//! computed once; later calls with an equal argument return the stored
//! result without invoking the callable again, so its side effects do not
//! repeat.
//!
//! The argument value is the cache key. Positional arguments are a tuple;
//! keyword-style arguments are a struct deriving `Eq + Hash + Clone`:
//!
//! ```rust
//! use callwrap::memoize;
//!
//! #[derive(Clone, PartialEq, Eq, Hash)]
//! struct Quote {
//!     base: &'static str,
//!     quote: &'static str,
//! }
//!
//! let rate = memoize(|q: Quote| format!("{}/{}", q.base, q.quote));
//! let eur_usd = Quote { base: "EUR", quote: "USD" };
//! assert_eq!(rate.call(eur_usd.clone()), "EUR/USD");
//! assert!(rate.contains(&eur_usd));
//! ```
//!
//! The cache grows for the lifetime of the wrapper. There is no eviction,
//! size bound or expiry.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// Wrap an infallible callable in a result cache
pub fn memoize<F, K, V>(func: F) -> Memoized<F, K, V>
where
    F: Fn(K) -> V,
{
    Memoized::new(func)
}

/// Wrap a fallible callable in a result cache
///
/// Only `Ok` results are stored. See [`Memoized::try_call`].
pub fn try_memoize<F, K, V, E>(func: F) -> Memoized<F, K, V>
where
    F: Fn(K) -> Result<V, E>,
{
    Memoized::new(func)
}

/// Hit/miss counters for a [`Memoized`] wrapper
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Calls answered from the cache
    pub hits: u64,
    /// Calls that invoked the wrapped callable
    pub misses: u64,
    /// Results currently stored
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of calls answered from the cache, 0.0 when there were none
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A callable with a per-argument result cache
///
/// Safe to share between threads when `F`, `K` and `V` are. The cache lock
/// is released while the callable runs, so the callable may itself call
/// other memoized wrappers. Two threads missing on the same key at once
/// both compute; the first result stored wins and is what both receive.
pub struct Memoized<F, K, V> {
    func: F,
    name: Option<String>,
    cache: Mutex<HashMap<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    _marker: PhantomData<fn(K) -> V>,
}

impl<F, K, V> Memoized<F, K, V> {
    fn new(func: F) -> Self {
        Self {
            func,
            name: None,
            cache: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            _marker: PhantomData,
        }
    }

    /// Name the wrapped callable for log events
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("memoized")
    }

    /// Number of stored results
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl<F, K, V> Memoized<F, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Whether a result is stored for `args`
    pub fn contains(&self, args: &K) -> bool {
        self.cache.lock().contains_key(args)
    }

    /// Invoke the callable, or return the stored result for `args`
    pub fn call(&self, args: K) -> V
    where
        F: Fn(K) -> V,
    {
        if let Some(hit) = self.lookup(&args) {
            return hit;
        }

        let value = (self.func)(args.clone());
        self.store(args, value)
    }

    /// Invoke a fallible callable, or return the stored result for `args`
    ///
    /// An `Err` is returned unchanged and not stored, so the next call with
    /// the same arguments invokes the callable again.
    pub fn try_call<E>(&self, args: K) -> Result<V, E>
    where
        F: Fn(K) -> Result<V, E>,
    {
        if let Some(hit) = self.lookup(&args) {
            return Ok(hit);
        }

        match (self.func)(args.clone()) {
            Ok(value) => Ok(self.store(args, value)),
            Err(error) => {
                debug!(call = %self.name(), "Call failed; result not cached");
                Err(error)
            }
        }
    }

    fn lookup(&self, args: &K) -> Option<V> {
        let hit = self.cache.lock().get(args).cloned();
        match hit {
            Some(_) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(call = %self.name(), "Cache hit");
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(call = %self.name(), "Cache miss; computing");
            }
        }
        hit
    }

    fn store(&self, args: K, value: V) -> V {
        self.cache.lock().entry(args).or_insert(value).clone()
    }
}

impl<F, K, V> std::fmt::Debug for Memoized<F, K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memoized")
            .field("name", &self.name())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
