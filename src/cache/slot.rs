//! Single-slot response cache with stale fallback
//!
//! A `Slot` holds the last successfully fetched payload for one route together
//! with the time it was fetched. Reads inside the TTL window are served from
//! the slot; reads outside it run the refresh operation, and if that fails the
//! previous payload is served again, marked stale.

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

/// The payload currently held by a slot
#[derive(Debug, Clone)]
struct Entry<T> {
    /// Last successfully fetched value
    payload: T,
    /// When the value was fetched
    fetched_at: DateTime<Utc>,
}

impl<T: Clone> Entry<T> {
    fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.fetched_at) >= ttl
    }

    fn to_cached(&self, stale: bool) -> Cached<T> {
        Cached {
            payload: self.payload.clone(),
            fetched_at: self.fetched_at,
            stale,
        }
    }
}

/// Result of a read through a `Slot`
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    /// The payload being served
    pub payload: T,
    /// When the payload was last fetched successfully
    pub fetched_at: DateTime<Utc>,
    /// True when the payload is served only because a refresh failed
    pub stale: bool,
}

/// Point-in-time view of a slot, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotStatus {
    /// When the held payload was fetched, if the slot has ever been filled
    pub fetched_at: Option<DateTime<Utc>>,
    /// Whether a read at the given time would attempt a refresh
    pub stale: bool,
}

/// Converts a TTL in seconds, `None` if it does not fit in a `Duration`
pub fn ttl_from_secs(ttl_secs: u64) -> Option<Duration> {
    i64::try_from(ttl_secs).ok().and_then(Duration::try_seconds)
}

/// Process-scoped cache for a single route's payload
///
/// The slot starts empty and is filled by the first successful refresh. A
/// failed refresh never clears or replaces the held payload.
///
/// The lock is only held for the freshness check and for the write after a
/// successful refresh, never across the refresh itself. Two readers that both
/// see a stale slot may therefore both refresh; whichever finishes last wins.
#[derive(Debug)]
pub struct Slot<T> {
    ttl: Duration,
    entry: RwLock<Option<Entry<T>>>,
}

impl<T: Clone> Slot<T> {
    /// Creates an empty slot with the given time-to-live
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    /// Creates an empty slot with a TTL given in seconds
    ///
    /// A TTL too large for `Duration` saturates, so the first payload never
    /// goes stale.
    pub fn with_ttl_secs(ttl_secs: u64) -> Self {
        Self::new(ttl_from_secs(ttl_secs).unwrap_or(Duration::MAX))
    }

    /// Returns the slot's time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Reads the slot at time `now`, refreshing it if needed
    ///
    /// # Arguments
    /// * `now` - The current time, also recorded as the fetch time on success
    /// * `refresh` - Produces a fresh payload; only called when the slot is
    ///   empty or stale
    ///
    /// # Returns
    /// * `Ok(Cached)` with `stale = false` on a hit or a successful refresh
    /// * `Ok(Cached)` with `stale = true` if the refresh failed but a previous
    ///   payload exists
    /// * `Err` with the refresh error if the refresh failed and the slot is empty
    pub async fn get<F, Fut, E>(&self, now: DateTime<Utc>, refresh: F) -> Result<Cached<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(entry) = self.entry.read().await.as_ref() {
            if !entry.is_stale(now, self.ttl) {
                return Ok(entry.to_cached(false));
            }
        }

        match refresh().await {
            Ok(payload) => {
                let entry = Entry {
                    payload,
                    fetched_at: now,
                };
                let cached = entry.to_cached(false);
                *self.entry.write().await = Some(entry);
                Ok(cached)
            }
            Err(err) => match self.entry.read().await.as_ref() {
                Some(entry) => Ok(entry.to_cached(true)),
                None => Err(err),
            },
        }
    }

    /// Reports whether the slot is populated and whether it is stale at `now`
    pub async fn status(&self, now: DateTime<Utc>) -> SlotStatus {
        match self.entry.read().await.as_ref() {
            Some(entry) => SlotStatus {
                fetched_at: Some(entry.fetched_at),
                stale: entry.is_stale(now, self.ttl),
            },
            None => SlotStatus {
                fetched_at: None,
                stale: true,
            },
        }
    }
}
