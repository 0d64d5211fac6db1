//! In-process response caching for the data routes
//!
//! Each route owns one `Slot`: a single cached payload with a TTL. Reads
//! within the TTL are served from memory. Reads past it try a refresh and,
//! if the refresh fails, serve the previous payload marked stale. Nothing is
//! persisted across restarts.

mod slot;
mod source;

pub use slot::{ttl_from_secs, Cached, Slot, SlotStatus};
pub use source::CachedSource;
