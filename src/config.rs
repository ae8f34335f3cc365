//! Configuration Module
//!
//! Loads cache and admin server settings from environment variables.
//! Missing or malformed values fall back to defaults; nothing here panics.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default TTL applied when a write omits one (one hour).
pub const DEFAULT_TTL_SECS: u64 = 3600;

// == Backend Kind ==
/// Which store the cache manager should attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    /// Remote Redis-compatible store
    Redis,
    /// In-process store (single instance, tests, local development)
    Memory,
    /// No store: every cache operation is a no-op
    Disabled,
}

impl FromStr for CacheBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" | "in-memory" => Ok(Self::Memory),
            "disabled" | "none" | "noop" => Ok(Self::Disabled),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

impl fmt::Display for CacheBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Redis => "redis",
            Self::Memory => "memory",
            Self::Disabled => "disabled",
        };
        f.write_str(name)
    }
}

// == Cache Config ==
/// Settings for the cache manager and its store.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Store to attach to
    pub backend: CacheBackendKind,
    /// Connection string for the Redis backend
    pub redis_url: Option<String>,
    /// TTL in seconds for writes that don't specify one
    pub default_ttl: u64,
    /// Upper bound for a single store round trip, in milliseconds
    pub operation_timeout_ms: u64,
    /// Capacity of the in-process store before LRU eviction kicks in
    pub memory_max_entries: usize,
}

impl CacheConfig {
    /// Loads cache settings from the environment.
    ///
    /// # Environment Variables
    /// - `CACHE_BACKEND` - `redis`, `memory` or `disabled` (default: `redis` when
    ///   `REDIS_URL` is set, `disabled` otherwise)
    /// - `REDIS_URL` - Redis connection string
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    /// - `CACHE_OPERATION_TIMEOUT_MS` - Per-operation timeout (default: 2000)
    /// - `CACHE_MEMORY_MAX_ENTRIES` - In-process store capacity (default: 10000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let redis_url = env::var("REDIS_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let backend = match env::var("CACHE_BACKEND") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Invalid CACHE_BACKEND, caching disabled");
                CacheBackendKind::Disabled
            }),
            Err(_) if redis_url.is_some() => CacheBackendKind::Redis,
            Err(_) => CacheBackendKind::Disabled,
        };

        Self {
            backend,
            redis_url,
            default_ttl: parse_env("CACHE_DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            operation_timeout_ms: parse_env("CACHE_OPERATION_TIMEOUT_MS")
                .unwrap_or(defaults.operation_timeout_ms),
            memory_max_entries: parse_env("CACHE_MEMORY_MAX_ENTRIES")
                .unwrap_or(defaults.memory_max_entries),
        }
    }

    /// Config for a Redis-backed cache at `url`.
    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            backend: CacheBackendKind::Redis,
            redis_url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Config for the in-process store.
    pub fn memory() -> Self {
        Self {
            backend: CacheBackendKind::Memory,
            ..Self::default()
        }
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms.max(1))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::Disabled,
            redis_url: None,
            default_ttl: DEFAULT_TTL_SECS,
            operation_timeout_ms: 2000,
            memory_max_entries: 10_000,
        }
    }
}

// == Config ==
/// Top-level configuration for the admin binary.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache manager settings
    pub cache: CacheConfig,
    /// HTTP port for the admin surface
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// `SERVER_PORT` sets the admin port (default: 3000); see
    /// [`CacheConfig::from_env`] for the cache variables.
    pub fn from_env() -> Self {
        Self {
            cache: CacheConfig::from_env(),
            server_port: parse_env("SERVER_PORT").unwrap_or(3000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            server_port: 3000,
        }
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
