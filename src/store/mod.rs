//! Backing Store Module
//!
//! The persistent key-value capability a cache synchronizes with. Each cache
//! namespace occupies exactly one slot in the store.

mod file;
mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

// == Backing Store Trait ==
/// Asynchronous key-value provider owned by the host.
///
/// Implementations must be safe to share between caches; `update` calls are
/// expected to be atomic individually, with no ordering guarantee across calls.
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Returns the value persisted under `key`, or `default` if there is none.
    async fn get(&self, key: &str, default: Value) -> Result<Value>;

    /// Persists `value` under `key`. `None` removes the slot.
    ///
    /// Resolves `Ok(true)` when the write landed and `Ok(false)` when the store
    /// declined it.
    async fn update(&self, key: &str, value: Option<Value>) -> Result<bool>;
}
