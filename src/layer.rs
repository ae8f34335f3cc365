//! Composition root
//!
//! Builds the one [`CacheManager`] and [`InvalidationStrategy`] a process
//! shares, and hands out `Arc` handles to them.

use std::sync::Arc;

use crate::cache::{CacheManager, InvalidationStrategy};
use crate::config::CacheConfig;
use crate::store::MemoryStore;

/// The cache manager paired with the invalidation strategy that wraps it.
#[derive(Debug, Clone)]
pub struct CacheLayer {
    manager: Arc<CacheManager>,
    invalidation: Arc<InvalidationStrategy>,
}

impl CacheLayer {
    /// Wires a strategy around an existing manager.
    pub fn from_manager(manager: Arc<CacheManager>) -> Self {
        let invalidation = Arc::new(InvalidationStrategy::new(Arc::clone(&manager)));
        Self {
            manager,
            invalidation,
        }
    }

    /// Connects to the configured store before returning.
    pub async fn connect(config: &CacheConfig) -> Self {
        Self::from_manager(Arc::new(CacheManager::connect(config).await))
    }

    /// Returns at once; the store connects in the background.
    pub fn spawn(config: &CacheConfig) -> Self {
        Self::from_manager(CacheManager::spawn(config))
    }

    /// A layer over a fresh in-process store.
    pub fn in_memory(default_ttl: u64) -> Self {
        let config = CacheConfig::memory();
        let store = Arc::new(MemoryStore::new(config.memory_max_entries));
        Self::from_manager(Arc::new(CacheManager::with_store(store, default_ttl)))
    }

    pub fn manager(&self) -> &Arc<CacheManager> {
        &self.manager
    }

    pub fn invalidation(&self) -> &Arc<InvalidationStrategy> {
        &self.invalidation
    }
}
