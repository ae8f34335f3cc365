//! Invalidation Strategy
//!
//! Records which cached keys are derived from which, and drops whole groups of
//! keys together. All store I/O goes through the [`CacheManager`].
//!
//! The dependency graph lives in process memory. Instances sharing one store
//! do not see each other's edges.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::keys::CacheKeys;
use super::manager::CacheManager;

// == Invalidation Strategy ==
/// Dependency-aware invalidation on top of a [`CacheManager`].
#[derive(Debug)]
pub struct InvalidationStrategy {
    manager: Arc<CacheManager>,
    /// parent key -> dependent keys, in registration order
    dependencies: RwLock<HashMap<String, Vec<String>>>,
}

impl InvalidationStrategy {
    pub fn new(manager: Arc<CacheManager>) -> Self {
        Self {
            manager,
            dependencies: RwLock::new(HashMap::new()),
        }
    }

    pub fn manager(&self) -> &Arc<CacheManager> {
        &self.manager
    }

    // == Register Dependency ==
    /// Records that `dependent` must be invalidated whenever `parent` is.
    /// Registering the same edge twice keeps a single edge.
    pub fn register_dependency(&self, parent: &str, dependent: &str) {
        let mut graph = self.dependencies.write();
        let dependents = graph.entry(parent.to_string()).or_default();
        if !dependents.iter().any(|d| d == dependent) {
            dependents.push(dependent.to_string());
            debug!(parent = parent, dependent = dependent, "Cache dependency registered");
        }
    }

    /// Removes one edge. Returns whether it existed.
    pub fn remove_dependency(&self, parent: &str, dependent: &str) -> bool {
        let mut graph = self.dependencies.write();
        let Some(dependents) = graph.get_mut(parent) else {
            return false;
        };

        let before = dependents.len();
        dependents.retain(|d| d != dependent);
        let removed = dependents.len() != before;
        if dependents.is_empty() {
            graph.remove(parent);
        }
        removed
    }

    // == Invalidate ==
    /// Deletes `key`, then every key reachable from it through registered
    /// edges, depth-first. Each key is deleted once even if the graph has
    /// cycles. Returns the number of keys the cascade visited, whether or not
    /// they were cached.
    pub async fn invalidate(&self, key: &str) -> usize {
        let cascade = self.cascade_order(key);

        for target in &cascade {
            self.manager.delete(target).await;
        }

        debug!(
            key = key,
            cascaded = cascade.len() - 1,
            "Cache key invalidated"
        );
        cascade.len()
    }

    /// Pre-order walk from `root`, skipping keys already visited.
    fn cascade_order(&self, root: &str) -> Vec<String> {
        let graph = self.dependencies.read();
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root.to_string()];

        while let Some(key) = stack.pop() {
            if !visited.insert(key.clone()) {
                continue;
            }
            if let Some(dependents) = graph.get(&key) {
                // Reversed so the first registered dependent is visited first
                stack.extend(dependents.iter().rev().cloned());
            }
            order.push(key);
        }

        order
    }

    // == Pattern Invalidation ==
    /// Deletes every key matching `pattern`. Does not follow dependency edges.
    pub async fn invalidate_pattern(&self, pattern: &str) -> u64 {
        let deleted = self.manager.delete_pattern(pattern).await;
        debug!(pattern = pattern, deleted = deleted, "Cache pattern invalidated");
        deleted
    }

    /// Deletes every key under `<domain>:`.
    pub async fn invalidate_domain(&self, domain: &str) -> u64 {
        self.invalidate_pattern(&CacheKeys::domain_pattern(domain))
            .await
    }

    /// Deletes every key under `<domain>:<entity_id>:`.
    pub async fn invalidate_entity(&self, domain: &str, entity_id: &str) -> u64 {
        self.invalidate_pattern(&CacheKeys::entity_pattern(domain, entity_id))
            .await
    }

    // == Introspection ==
    /// Direct dependents of `key`, in registration order.
    pub fn get_dependencies(&self, key: &str) -> Vec<String> {
        self.dependencies
            .read()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of registered edges.
    pub fn edge_count(&self) -> usize {
        self.dependencies.read().values().map(Vec::len).sum()
    }

    /// Drops the whole dependency graph.
    pub fn clear_mappings(&self) {
        self.dependencies.write().clear();
        debug!("Cache dependency mappings cleared");
    }
}
