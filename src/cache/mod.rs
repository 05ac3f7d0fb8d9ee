//! Cache Module
//!
//! Namespaced key-value cache with lazy TTL expiration, persisted through a
//! [`BackingStore`](crate::store::BackingStore).

mod clock;
mod entry;
mod namespaced;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, EntryView};
pub use namespaced::{CacheBuilder, NamespacedCache, PendingWrite};

// == Public Constants ==
/// Namespace used when none is given
pub const DEFAULT_NAMESPACE: &str = "cache";
