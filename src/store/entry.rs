//! Store Entry Module
//!
//! A single value held by the in-process store, with its expiry deadline.

use std::time::Duration;

use tokio::time::Instant;

/// Largest expiry the store accepts, matching Redis' millisecond limit.
pub const MAX_EXPIRE_SECS: u64 = (i64::MAX / 1000) as u64;

// == Store Entry ==
/// Represents a single stored value and its expiry.
///
/// Deadlines use `tokio::time::Instant` so paused-clock tests can drive
/// expiry with `tokio::time::advance`.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// The serialized value
    pub value: String,
    /// Expiration deadline, None = no expiration
    pub expires_at: Option<Instant>,
}

impl StoreEntry {
    // == Constructor ==
    /// Creates a new entry expiring after `ttl_seconds`, or never when `None`.
    ///
    /// A deadline past what the clock can represent means no expiry.
    pub fn new(value: String, ttl_seconds: Option<u64>) -> Self {
        Self {
            value,
            expires_at: ttl_seconds.and_then(deadline_after),
        }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its deadline.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => Instant::now() >= expires,
            None => false,
        }
    }

    /// Replaces the deadline with one `ttl_seconds` from now.
    pub fn expire_in(&mut self, ttl_seconds: u64) {
        self.expires_at = deadline_after(ttl_seconds);
    }

    // == Time To Live ==
    /// Remaining TTL, or None if no expiration is set.
    ///
    /// Returns `Some(Duration::ZERO)` once the deadline has passed.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }

    /// Remaining TTL in whole seconds, rounded like Redis' TTL command.
    pub fn ttl_remaining_secs(&self) -> Option<u64> {
        self.ttl_remaining()
            .map(|remaining| (remaining.as_millis() as u64 + 500) / 1000)
    }
}

fn deadline_after(ttl_seconds: u64) -> Option<Instant> {
    Instant::now().checked_add(Duration::from_secs(ttl_seconds))
}
