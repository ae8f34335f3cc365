//! Cache Module
//!
//! The application-facing cache: a fail-soft [`CacheManager`] over a store
//! backend, dependency-aware invalidation, canonical key builders, and
//! read-through / invalidate-on-success wrappers.

mod invalidation;
mod keys;
mod manager;
mod wrappers;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use invalidation::InvalidationStrategy;
pub use keys::{domain, CacheKeys};
pub use manager::{CacheManager, StoreMode};
pub use wrappers::{with_cache, with_invalidation, CacheInvalidate, Cacheable};
