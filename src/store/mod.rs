//! Store Module
//!
//! Adapters between the cache manager and a key-value store. The manager only
//! talks to [`StoreClient`]; the Redis adapter is the production backend and
//! [`MemoryStore`] stands in for it in tests and single-process deployments.

mod entry;
mod lru;
mod memory;
mod pattern;
mod redis;
mod stats;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{CacheBackendKind, CacheConfig};
use crate::error::{CacheError, Result};

pub use entry::StoreEntry;
pub use lru::LruTracker;
pub use memory::MemoryStore;
pub use pattern::{glob_match, KeyPattern};
pub use self::redis::RedisStore;
pub use stats::StoreStats;

// == Store Client ==
/// The command set the cache manager relies on.
///
/// Mirrors the Redis commands of the same names. Implementations report every
/// failure as a [`CacheError`]; deciding what a failure means for the caller
/// is the manager's job.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// GET: the raw value, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// SETEX: store `value` expiring after `seconds`.
    async fn setex(&self, key: &str, seconds: u64, value: &str) -> Result<()>;

    /// DEL with several keys. Returns how many existed.
    async fn del(&self, keys: &[String]) -> Result<u64>;

    /// KEYS: every live key matching a glob pattern.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;

    /// FLUSHDB
    async fn flushdb(&self) -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// TTL: seconds left, `-1` without expiry, `-2` when the key is absent.
    async fn ttl(&self, key: &str) -> Result<i64>;

    /// EXPIRE: returns `false` when the key does not exist.
    async fn expire(&self, key: &str, seconds: u64) -> Result<bool>;

    /// INCRBY: returns the value after the increment.
    async fn incrby(&self, key: &str, amount: i64) -> Result<i64>;

    /// INFO: `field:value` lines grouped under `# Section` headers.
    async fn info(&self) -> Result<String>;

    /// QUIT: release the connection. Later calls may fail.
    async fn quit(&self) -> Result<()>;

    /// Backend name for logging.
    fn backend_name(&self) -> &'static str;
}

// == Open ==
/// Opens the store described by `config`.
///
/// Fails with [`CacheError::Unavailable`] when caching is disabled and with
/// [`CacheError::Connection`] when the Redis URL is missing or unreachable.
pub async fn open(config: &CacheConfig) -> Result<Arc<dyn StoreClient>> {
    match config.backend {
        CacheBackendKind::Disabled => Err(CacheError::Unavailable(
            "caching is disabled by configuration".to_string(),
        )),
        CacheBackendKind::Memory => Ok(Arc::new(MemoryStore::new(config.memory_max_entries))),
        CacheBackendKind::Redis => {
            let url = config.redis_url.as_deref().ok_or_else(|| {
                CacheError::Connection("REDIS_URL is not configured".to_string())
            })?;
            let store = RedisStore::connect(url, config.operation_timeout()).await?;
            Ok(Arc::new(store))
        }
    }
}
