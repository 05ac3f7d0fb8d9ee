//! In-memory backing store with call accounting, used by tests and embedders.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::BackingStore;
use crate::error::Result;

// == Memory Store ==
/// Process-local store keeping every slot in a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Persisted slots by key
    slots: RwLock<HashMap<String, Value>>,
    /// Number of `get` calls served
    reads: AtomicUsize,
    /// Number of `update` calls received, rejected ones included
    writes: AtomicUsize,
    /// When set, `update` resolves `false` without writing
    reject_writes: AtomicBool,
}

impl MemoryStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Seed ==
    /// Writes a slot directly, bypassing the call counters.
    pub async fn seed(&self, key: impl Into<String>, value: Value) {
        self.slots.write().await.insert(key.into(), value);
    }

    // == Slot ==
    /// Reads a slot directly, bypassing the call counters.
    pub async fn slot(&self, key: &str) -> Option<Value> {
        self.slots.read().await.get(key).cloned()
    }

    // == Failure Injection ==
    /// Makes subsequent `update` calls resolve `false`.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    // == Counters ==
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackingStore for MemoryStore {
    async fn get(&self, key: &str, default: Value) -> Result<Value> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.slots.read().await.get(key).cloned().unwrap_or(default))
    }

    async fn update(&self, key: &str, value: Option<Value>) -> Result<bool> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.reject_writes.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let mut slots = self.slots.write().await;
        match value {
            Some(value) => {
                slots.insert(key.to_string(), value);
            }
            None => {
                slots.remove(key);
            }
        }
        Ok(true)
    }
}
