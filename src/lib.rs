//! ITSM Cache - A fail-soft caching layer for service-management data
//!
//! A typed cache façade over Redis (or an in-process store) with
//! dependency-aware invalidation, canonical key builders and read-through
//! wrappers. When the store is unreachable every operation degrades to a
//! miss or a no-op.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod layer;
pub mod models;
pub mod store;

pub use api::AppState;
pub use cache::{
    domain, with_cache, with_invalidation, CacheInvalidate, CacheKeys, CacheManager, Cacheable,
    InvalidationStrategy, StoreMode,
};
pub use config::{CacheBackendKind, CacheConfig, Config};
pub use error::{CacheError, Result};
pub use layer::CacheLayer;
