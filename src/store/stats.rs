//! Store Statistics Module
//!
//! Counters kept by the in-process store and rendered in Redis INFO format.

use serde::Serialize;

// == Store Stats ==
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    /// Reads that found a live key
    pub keyspace_hits: u64,
    /// Reads that found nothing (or an expired key)
    pub keyspace_misses: u64,
    /// Keys dropped by the capacity limit
    pub evicted_keys: u64,
    /// Keys dropped because their TTL ran out
    pub expired_keys: u64,
}

impl StoreStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.keyspace_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.keyspace_misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evicted_keys += 1;
    }

    pub fn record_expired(&mut self, count: u64) {
        self.expired_keys += count;
    }

    /// Returns hits / (hits + misses), or 0.0 if nothing was read yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.keyspace_hits + self.keyspace_misses;
        if total == 0 {
            0.0
        } else {
            self.keyspace_hits as f64 / total as f64
        }
    }

    // == Render ==
    /// Renders the counters as an INFO payload.
    pub fn render_info(&self, keys: usize, expires: usize, max_entries: usize) -> String {
        format!(
            "# Server\r\n\
             backend:memory\r\n\
             # Memory\r\n\
             maxmemory_entries:{}\r\n\
             # Stats\r\n\
             keyspace_hits:{}\r\n\
             keyspace_misses:{}\r\n\
             evicted_keys:{}\r\n\
             expired_keys:{}\r\n\
             # Keyspace\r\n\
             db0:keys={},expires={}\r\n",
            max_entries,
            self.keyspace_hits,
            self.keyspace_misses,
            self.evicted_keys,
            self.expired_keys,
            keys,
            expires
        )
    }
}
