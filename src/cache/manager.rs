//! Cache Manager
//!
//! The one cache façade the application shares. Owns the store handle and the
//! default TTL, serializes values as JSON, and contains every store failure:
//! callers get a miss or a neutral value, never an error.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::{CacheConfig, DEFAULT_TTL_SECS};
use crate::store::{self, StoreClient};

// == Store Mode ==
/// Whether the manager currently has a store to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    Connected,
    /// No store: reads miss, writes are dropped
    Degraded,
}

// == Cache Manager ==
/// Shared cache façade over a [`StoreClient`].
///
/// Construct one per process at the composition root (see
/// [`CacheLayer`](crate::CacheLayer)) and share it behind an `Arc`.
///
/// | Operation | Degraded / error result |
/// |---|---|
/// | [`get`](Self::get) | `None` |
/// | [`set`](Self::set), [`delete`](Self::delete), [`clear`](Self::clear) | no-op |
/// | [`delete_pattern`](Self::delete_pattern) | `0` |
/// | [`exists`](Self::exists), [`set_ttl`](Self::set_ttl) | `false` |
/// | [`get_ttl`](Self::get_ttl) | `-1` |
/// | [`increment`](Self::increment) | `0` |
/// | [`get_stats`](Self::get_stats) | empty map |
pub struct CacheManager {
    store: RwLock<Option<Arc<dyn StoreClient>>>,
    default_ttl: AtomicU64,
    /// Set by `close`; a pending connection attempt must not revive the manager
    closed: AtomicBool,
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("mode", &self.mode())
            .field("backend", &self.backend_name())
            .field("default_ttl", &self.default_ttl())
            .finish()
    }
}

impl CacheManager {
    // == Constructors ==
    /// A manager with no store. Every operation is a no-op.
    pub fn disabled(default_ttl: u64) -> Self {
        Self {
            store: RwLock::new(None),
            default_ttl: AtomicU64::new(default_ttl),
            closed: AtomicBool::new(false),
        }
    }

    /// A connected manager over an existing store.
    pub fn with_store(store: Arc<dyn StoreClient>, default_ttl: u64) -> Self {
        let manager = Self::disabled(default_ttl);
        *manager.store.write() = Some(store);
        manager
    }

    /// Opens the configured store and waits for the outcome.
    ///
    /// A failed or disabled store yields a degraded manager and a warning.
    pub async fn connect(config: &CacheConfig) -> Self {
        let manager = Self::disabled(config.default_ttl);
        manager.attach(config).await;
        manager
    }

    /// Returns immediately in degraded mode and connects in the background.
    ///
    /// Operations issued before the connection completes behave as degraded.
    /// Without a tokio runtime the manager stays degraded.
    pub fn spawn(config: &CacheConfig) -> Arc<Self> {
        let manager = Arc::new(Self::disabled(config.default_ttl));

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let pending = Arc::clone(&manager);
                let config = config.clone();
                handle.spawn(async move {
                    pending.attach(&config).await;
                });
            }
            Err(_) => {
                warn!("No tokio runtime available, cache manager stays degraded");
            }
        }

        manager
    }

    async fn attach(&self, config: &CacheConfig) {
        match store::open(config).await {
            Ok(store) => {
                {
                    // `close` flips the flag before taking this lock
                    let mut slot = self.store.write();
                    if !self.closed.load(Ordering::SeqCst) {
                        info!(
                            backend = store.backend_name(),
                            default_ttl = self.default_ttl(),
                            "Cache store connected"
                        );
                        *slot = Some(store);
                        return;
                    }
                }
                debug!("Cache manager closed before the store connected");
                let _ = store.quit().await;
            }
            Err(e) => {
                warn!(
                    backend = %config.backend,
                    error = %e,
                    "Cache store unavailable, running in degraded mode"
                );
            }
        }
    }

    // == Accessors ==
    pub fn mode(&self) -> StoreMode {
        if self.store.read().is_some() {
            StoreMode::Connected
        } else {
            StoreMode::Degraded
        }
    }

    pub fn is_connected(&self) -> bool {
        self.mode() == StoreMode::Connected
    }

    /// Name of the attached backend, `"none"` when degraded.
    pub fn backend_name(&self) -> &'static str {
        self.store
            .read()
            .as_ref()
            .map_or("none", |store| store.backend_name())
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl.load(Ordering::Relaxed)
    }

    /// Changes the TTL used by later writes; stored entries keep theirs.
    pub fn set_default_ttl(&self, seconds: u64) {
        self.default_ttl.store(seconds, Ordering::Relaxed);
    }

    fn store(&self) -> Option<Arc<dyn StoreClient>> {
        self.store.read().clone()
    }

    // == Get ==
    /// Reads and deserializes `key`. Misses, expired keys and failures all
    /// return `None`; the caller recomputes in every case.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let store = self.store()?;

        match store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!(key = key, "Cache HIT");
                    Some(value)
                }
                Err(e) => {
                    warn!(key = key, error = %e, "Cached value could not be decoded");
                    None
                }
            },
            Ok(None) => {
                debug!(key = key, "Cache MISS");
                None
            }
            Err(e) => {
                error!(key = key, error = %e, "Cache get failed");
                None
            }
        }
    }

    // == Set ==
    /// Serializes `value` and stores it for `ttl` seconds, or the default TTL.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<u64>) {
        let Some(store) = self.store() else {
            return;
        };

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = key, error = %e, "Value could not be encoded for caching");
                return;
            }
        };

        // SETEX rejects a zero expiry
        let ttl = ttl.unwrap_or_else(|| self.default_ttl()).max(1);
        match store.setex(key, ttl, &raw).await {
            Ok(()) => debug!(key = key, ttl_seconds = ttl, "Cache SET"),
            Err(e) => error!(key = key, error = %e, "Cache set failed"),
        }
    }

    // == Delete ==
    pub async fn delete(&self, key: &str) {
        let Some(store) = self.store() else {
            return;
        };

        match store.del(&[key.to_string()]).await {
            Ok(_) => debug!(key = key, "Cache DEL"),
            Err(e) => error!(key = key, error = %e, "Cache delete failed"),
        }
    }

    // == Delete Pattern ==
    /// Deletes every key matching the glob `pattern` and returns how many.
    ///
    /// Enumerates then deletes in two round trips, so a key written in between
    /// can survive.
    pub async fn delete_pattern(&self, pattern: &str) -> u64 {
        let Some(store) = self.store() else {
            return 0;
        };

        let keys = match store.keys(pattern).await {
            Ok(keys) => keys,
            Err(e) => {
                error!(pattern = pattern, error = %e, "Cache key enumeration failed");
                return 0;
            }
        };

        if keys.is_empty() {
            debug!(pattern = pattern, "No cache keys matched pattern");
            return 0;
        }

        match store.del(&keys).await {
            Ok(deleted) => {
                debug!(pattern = pattern, deleted = deleted, "Cache pattern DEL");
                deleted
            }
            Err(e) => {
                error!(pattern = pattern, error = %e, "Cache pattern delete failed");
                0
            }
        }
    }

    // == Clear ==
    /// Flushes the whole store namespace. For tests and admin tooling only.
    pub async fn clear(&self) {
        let Some(store) = self.store() else {
            return;
        };

        match store.flushdb().await {
            Ok(()) => info!("Cache cleared"),
            Err(e) => error!(error = %e, "Cache clear failed"),
        }
    }

    pub async fn exists(&self, key: &str) -> bool {
        let Some(store) = self.store() else {
            return false;
        };

        store.exists(key).await.unwrap_or_else(|e| {
            error!(key = key, error = %e, "Cache exists check failed");
            false
        })
    }

    // == TTL ==
    /// Seconds left on `key` as the store reports it (`-2` absent, `-1` no
    /// expiry); `-1` when degraded or on failure.
    pub async fn get_ttl(&self, key: &str) -> i64 {
        let Some(store) = self.store() else {
            return -1;
        };

        store.ttl(key).await.unwrap_or_else(|e| {
            error!(key = key, error = %e, "Cache TTL lookup failed");
            -1
        })
    }

    /// Resets the expiry of an existing key. `false` if the key is absent.
    pub async fn set_ttl(&self, key: &str, seconds: u64) -> bool {
        let Some(store) = self.store() else {
            return false;
        };

        store.expire(key, seconds).await.unwrap_or_else(|e| {
            error!(key = key, error = %e, "Cache TTL update failed");
            false
        })
    }

    // == Increment ==
    /// Adds one to the counter at `key`.
    pub async fn increment(&self, key: &str) -> i64 {
        self.increment_by(key, 1).await
    }

    /// Adds `amount` to the counter at `key` and returns the new value.
    pub async fn increment_by(&self, key: &str, amount: i64) -> i64 {
        let Some(store) = self.store() else {
            return 0;
        };

        store.incrby(key, amount).await.unwrap_or_else(|e| {
            error!(key = key, amount = amount, error = %e, "Cache increment failed");
            0
        })
    }

    // == Stats ==
    /// Store-reported statistics as `field -> value`.
    pub async fn get_stats(&self) -> HashMap<String, String> {
        let Some(store) = self.store() else {
            return HashMap::new();
        };

        match store.info().await {
            Ok(raw) => parse_info(&raw),
            Err(e) => {
                error!(error = %e, "Cache stats lookup failed");
                HashMap::new()
            }
        }
    }

    // == Close ==
    /// Releases the store and switches to degraded mode. Safe to call twice.
    pub async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let store = self.store.write().take();

        if let Some(store) = store {
            match store.quit().await {
                Ok(()) => info!(backend = store.backend_name(), "Cache store closed"),
                Err(e) => warn!(error = %e, "Cache store did not close cleanly"),
            }
        }
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::disabled(DEFAULT_TTL_SECS)
    }
}

/// Parses an INFO payload into `field -> value`, skipping section headers.
fn parse_info(raw: &str) -> HashMap<String, String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .map(|(field, value)| (field.to_string(), value.to_string()))
        .collect()
}
