//! A data source read through its own slot

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::slot::{Cached, Slot, SlotStatus};
use crate::data::{Source, SourceError};

/// One route's cache: the slot, the refresh operation, and the optional
/// revalidation hint passed on to the hosting layer
pub struct CachedSource<P> {
    slot: Slot<P>,
    source: Arc<dyn Source<Payload = P>>,
    revalidate_secs: Option<u64>,
}

impl<P: Clone + Send + Sync + 'static> CachedSource<P> {
    /// Creates a cached source with an empty slot
    ///
    /// # Arguments
    /// * `source` - Refresh operation for the route
    /// * `ttl_secs` - Seconds before the held payload becomes stale
    /// * `revalidate_secs` - Optional `Cache-Control` hint for the route's responses
    pub fn new(
        source: Arc<dyn Source<Payload = P>>,
        ttl_secs: u64,
        revalidate_secs: Option<u64>,
    ) -> Self {
        Self {
            slot: Slot::with_ttl_secs(ttl_secs),
            source,
            revalidate_secs,
        }
    }

    /// Route name of the underlying source
    pub fn name(&self) -> &'static str {
        self.source.name()
    }

    /// `s-maxage`/`stale-while-revalidate` seconds advertised on responses, if any
    pub fn revalidate_secs(&self) -> Option<u64> {
        self.revalidate_secs
    }

    /// Slot time-to-live in whole seconds
    pub fn ttl_secs(&self) -> i64 {
        self.slot.ttl().num_seconds()
    }

    /// Reads the route's payload at `now`
    ///
    /// Refresh failures are logged; they only surface as an error when no
    /// payload has ever been fetched.
    pub async fn read(&self, now: DateTime<Utc>) -> Result<Cached<P>, SourceError> {
        let name = self.name();
        let cached = self
            .slot
            .get(now, || async {
                tracing::debug!(source = name, "refreshing");
                self.source.fetch().await.map_err(|err| {
                    tracing::warn!(source = name, error = %err, "refresh failed");
                    err
                })
            })
            .await?;

        if cached.stale {
            tracing::warn!(
                source = name,
                last_updated = %cached.fetched_at,
                "serving stale payload"
            );
        }
        Ok(cached)
    }

    /// Current state of the route's slot
    pub async fn status(&self, now: DateTime<Utc>) -> SlotStatus {
        self.slot.status(now).await
    }
}
