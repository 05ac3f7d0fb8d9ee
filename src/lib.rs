//! ns_cache - A namespaced key-value cache with TTL expiration
//!
//! Keeps an in-memory view of one namespace of a persistent key-value store,
//! expires entries lazily at read time and writes every mutation back to the store.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use api::AppState;
pub use cache::{CacheBuilder, NamespacedCache, PendingWrite};
pub use config::Config;
pub use error::{CacheError, Result};
pub use store::{BackingStore, JsonFileStore, MemoryStore};
