//! In-process store
//!
//! HashMap storage with lazy TTL expiry and LRU eviction once the entry limit
//! is reached. Implements the same command set as the Redis adapter, so the
//! cache manager can run against it unchanged.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::entry::MAX_EXPIRE_SECS;
use super::{KeyPattern, LruTracker, StoreClient, StoreEntry, StoreStats};
use crate::error::{CacheError, Result};

// == Memory Store ==
/// In-process [`StoreClient`].
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug)]
struct MemoryState {
    entries: HashMap<String, StoreEntry>,
    lru: LruTracker,
    stats: StoreStats,
    max_entries: usize,
}

impl MemoryStore {
    /// Creates an empty store holding at most `max_entries` keys.
    pub fn new(max_entries: usize) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                entries: HashMap::new(),
                lru: LruTracker::new(),
                stats: StoreStats::new(),
                max_entries: max_entries.max(1),
            }),
        }
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let mut state = self.state.lock();
        state.purge_expired();
        state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the store counters.
    pub fn stats(&self) -> StoreStats {
        self.state.lock().stats.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

/// Rejects expiries Redis would refuse for `command`.
fn check_expire(command: &str, seconds: u64) -> Result<()> {
    if seconds > MAX_EXPIRE_SECS {
        return Err(CacheError::Store(format!(
            "invalid expire time in '{}' command",
            command
        )));
    }
    Ok(())
}

impl MemoryState {
    /// Returns the live entry for `key`, dropping it first if it expired.
    fn live(&mut self, key: &str) -> Option<&mut StoreEntry> {
        if self.entries.get(key).is_some_and(StoreEntry::is_expired) {
            self.remove(key);
            self.stats.record_expired(1);
        }
        self.entries.get_mut(key)
    }

    fn insert(&mut self, key: &str, entry: StoreEntry) {
        let is_overwrite = self.live(key).is_some();

        if !is_overwrite && self.entries.len() >= self.max_entries {
            self.purge_expired();
        }
        while !is_overwrite && self.entries.len() >= self.max_entries {
            match self.lru.evict_oldest() {
                Some(evicted) => {
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                }
                None => break,
            }
        }

        self.entries.insert(key.to_string(), entry);
        self.lru.touch(key);
    }

    fn remove(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }

    fn purge_expired(&mut self) {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        self.stats.record_expired(expired.len() as u64);
        for key in expired {
            self.remove(&key);
        }
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut state = self.state.lock();
        let value = state.live(key).map(|entry| entry.value.clone());
        match value {
            Some(value) => {
                state.stats.record_hit();
                state.lru.touch(key);
                Ok(Some(value))
            }
            None => {
                state.stats.record_miss();
                Ok(None)
            }
        }
    }

    async fn setex(&self, key: &str, seconds: u64, value: &str) -> Result<()> {
        if seconds == 0 {
            return Err(CacheError::Store(
                "invalid expire time in 'setex' command".to_string(),
            ));
        }
        check_expire("setex", seconds)?;
        let mut state = self.state.lock();
        state.insert(key, StoreEntry::new(value.to_string(), Some(seconds)));
        Ok(())
    }

    async fn del(&self, keys: &[String]) -> Result<u64> {
        let mut state = self.state.lock();
        let mut removed = 0;
        for key in keys {
            if state.live(key).is_some() && state.remove(key) {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let pattern = KeyPattern::new(pattern)?;
        let mut state = self.state.lock();
        state.purge_expired();
        Ok(state
            .entries
            .keys()
            .filter(|key| pattern.is_match(key))
            .cloned()
            .collect())
    }

    async fn flushdb(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.entries.clear();
        state.lru.clear();
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.state.lock().live(key).is_some())
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        let mut state = self.state.lock();
        Ok(match state.live(key) {
            None => -2,
            Some(entry) => entry
                .ttl_remaining_secs()
                .map_or(-1, |secs| secs as i64),
        })
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<bool> {
        check_expire("expire", seconds)?;
        let mut state = self.state.lock();
        if state.live(key).is_none() {
            return Ok(false);
        }
        if seconds == 0 {
            // Redis deletes a key given a non-positive expiry
            state.remove(key);
            return Ok(true);
        }
        if let Some(entry) = state.live(key) {
            entry.expire_in(seconds);
        }
        Ok(true)
    }

    async fn incrby(&self, key: &str, amount: i64) -> Result<i64> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let next = match state.live(key) {
            Some(entry) => {
                let current: i64 = entry.value.parse().map_err(|_| {
                    CacheError::Store("value is not an integer or out of range".to_string())
                })?;
                let next = current.checked_add(amount).ok_or_else(|| {
                    CacheError::Store("increment or decrement would overflow".to_string())
                })?;
                entry.value = next.to_string();
                next
            }
            None => {
                state.insert(key, StoreEntry::new(amount.to_string(), None));
                amount
            }
        };
        state.lru.touch(key);
        Ok(next)
    }

    async fn info(&self) -> Result<String> {
        let mut state = self.state.lock();
        state.purge_expired();
        let expires = state
            .entries
            .values()
            .filter(|entry| entry.expires_at.is_some())
            .count();
        Ok(state
            .stats
            .render_info(state.entries.len(), expires, state.max_entries))
    }

    async fn quit(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
