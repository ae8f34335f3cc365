//! Caching wrappers
//!
//! Read-through and invalidate-on-success wrappers around async operations.
//! The free functions cover one-off calls; [`Cacheable`] and
//! [`CacheInvalidate`] bind the cache settings to an operation once so it can
//! be called repeatedly.
//!
//! Only `Ok` results are cached, and invalidation runs only after `Ok`. An
//! operation's `Err` is returned to the caller untouched.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::invalidation::InvalidationStrategy;
use super::manager::CacheManager;

// == Read-through ==
/// Returns the cached value for `key`, or runs `op` and caches its `Ok`
/// result for `ttl` seconds (the manager default when `None`).
pub async fn with_cache<T, E, F, Fut>(
    manager: &CacheManager,
    key: &str,
    ttl: Option<u64>,
    op: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if let Some(cached) = manager.get::<T>(key).await {
        debug!(key = key, "Cached call hit");
        return Ok(cached);
    }

    debug!(key = key, "Cached call miss");
    let value = op().await?;
    manager.set(key, &value, ttl).await;
    Ok(value)
}

/// An async operation whose results are cached under a key derived from its
/// arguments.
///
/// ```ignore
/// let load_task = Cacheable::new(manager, |id: &String| CacheKeys::task(id), |id| repo.load(id))
///     .with_ttl(300);
/// let task = load_task.call("t1".to_string()).await?;
/// ```
pub struct Cacheable<K, F> {
    manager: Arc<CacheManager>,
    key_fn: K,
    ttl: Option<u64>,
    op: F,
}

impl<K, F> Cacheable<K, F> {
    pub fn new(manager: Arc<CacheManager>, key_fn: K, op: F) -> Self {
        Self {
            manager,
            key_fn,
            ttl: None,
            op,
        }
    }

    pub fn with_ttl(mut self, seconds: u64) -> Self {
        self.ttl = Some(seconds);
        self
    }

    pub async fn call<A, T, E, Fut>(&self, args: A) -> Result<T, E>
    where
        K: Fn(&A) -> String,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Serialize + DeserializeOwned,
    {
        let key = (self.key_fn)(&args);
        with_cache(&self.manager, &key, self.ttl, || (self.op)(args)).await
    }
}

// == Invalidate on success ==
/// Runs `op`; if it succeeds, invalidates every pattern in `patterns`.
pub async fn with_invalidation<T, E, S, F, Fut>(
    strategy: &InvalidationStrategy,
    patterns: &[S],
    op: F,
) -> Result<T, E>
where
    S: AsRef<str>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let value = op().await?;

    for pattern in patterns {
        strategy.invalidate_pattern(pattern.as_ref()).await;
    }
    Ok(value)
}

/// An async mutation that invalidates a fixed set of patterns after each
/// successful call.
pub struct CacheInvalidate<F> {
    strategy: Arc<InvalidationStrategy>,
    patterns: Vec<String>,
    op: F,
}

impl<F> CacheInvalidate<F> {
    pub fn new<S: Into<String>>(
        strategy: Arc<InvalidationStrategy>,
        patterns: impl IntoIterator<Item = S>,
        op: F,
    ) -> Self {
        Self {
            strategy,
            patterns: patterns.into_iter().map(Into::into).collect(),
            op,
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub async fn call<A, T, E, Fut>(&self, args: A) -> Result<T, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        with_invalidation(&self.strategy, self.patterns.as_slice(), || (self.op)(args)).await
    }
}
