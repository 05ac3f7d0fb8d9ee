//! Namespaced Cache Module
//!
//! In-memory view of one namespace of a backing store, with lazy TTL expiration.
//!
//! Reads never touch the store. Mutations change the in-memory view right away
//! and hand back a [`PendingWrite`] that persists the whole namespace when awaited.

use std::fmt;
use std::future::{self, Future};
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::cache::{CacheEntry, Clock, EntryView, SystemClock, DEFAULT_NAMESPACE};
use crate::error::{CacheError, Result};
use crate::store::BackingStore;

/// Persist step of a mutation. Owns its snapshot, so it may outlive the borrow
/// of the cache and be awaited later, or never.
pub type PendingWrite = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

// == Cache Builder ==
/// Configures and opens a [`NamespacedCache`].
#[derive(Default)]
pub struct CacheBuilder {
    store: Option<Arc<dyn BackingStore>>,
    namespace: Option<String>,
    clock: Option<Arc<dyn Clock>>,
}

impl CacheBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backing store. Required.
    pub fn store(mut self, store: Arc<dyn BackingStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the namespace; defaults to [`DEFAULT_NAMESPACE`].
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the time source; defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    // == Build ==
    /// Reads the namespace snapshot from the store and hydrates the cache.
    ///
    /// Never writes to the store.
    pub async fn build(self) -> Result<NamespacedCache> {
        let store = self.store.ok_or(CacheError::MissingStore)?;
        let namespace = self
            .namespace
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };

        let snapshot = store.get(&namespace, Value::Object(Map::new())).await?;
        let entries = hydrate(&namespace, snapshot)?;
        debug!(
            "Hydrated namespace '{}' with {} entries",
            namespace,
            entries.len()
        );

        Ok(NamespacedCache {
            store,
            namespace,
            entries,
            clock,
        })
    }
}

// == Namespaced Cache ==
/// Cache over a single namespace slot of a backing store.
///
/// Expired entries stay in memory until overwritten, forgotten or flushed.
/// `get`, `has` and `expiration` hide them; `keys` and `all` do not.
pub struct NamespacedCache {
    /// Shared backing store
    store: Arc<dyn BackingStore>,
    /// Slot key in the backing store
    namespace: String,
    /// Authoritative view of the namespace: key to persisted record, in
    /// first-insertion order
    entries: Map<String, Value>,
    /// Time source, read once per operation
    clock: Arc<dyn Clock>,
}

impl NamespacedCache {
    // == Open ==
    /// Opens `namespace` (or [`DEFAULT_NAMESPACE`]) on `store` with the system clock.
    pub async fn open(store: Arc<dyn BackingStore>, namespace: Option<&str>) -> Result<Self> {
        let mut builder = CacheBuilder::new().store(store);
        if let Some(namespace) = namespace {
            builder = builder.namespace(namespace);
        }
        builder.build().await
    }

    pub fn builder() -> CacheBuilder {
        CacheBuilder::new()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // == Put ==
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// A non-negative `ttl` sets `expires_at = now + ttl`; a negative or absent
    /// one means the entry never expires. Non-string keys and a `None` value are
    /// rejected without touching memory or the store.
    ///
    /// The in-memory write is not rolled back if persisting fails.
    pub fn put(
        &mut self,
        key: impl Into<Value>,
        value: Option<Value>,
        ttl: Option<i64>,
    ) -> PendingWrite {
        let key = match key.into() {
            Value::String(key) => key,
            other => {
                let kind = json_type(&other);
                warn!(
                    "Rejected put into '{}': key is a {}",
                    self.namespace, kind
                );
                return rejected(CacheError::InvalidKeyType(kind.to_string()));
            }
        };

        let Some(value) = value else {
            warn!("Rejected put into '{}': no value for '{}'", self.namespace, key);
            return rejected(CacheError::MissingValue(key));
        };

        let now = self.clock.now();
        let expires_at = ttl
            .filter(|ttl| *ttl >= 0)
            .map(|ttl| now.saturating_add(ttl));

        debug!(
            "Put '{}' into '{}' (expires_at={:?})",
            key, self.namespace, expires_at
        );
        // Overwriting keeps the key's original position.
        self.entries
            .insert(key, CacheEntry::new(value, expires_at).into_record());

        self.persist()
    }

    // == Get ==
    /// Returns the value under `key` unless it is missing or expired.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let now = self.clock.now();
        self.live(key, now).map(|entry| entry.value)
    }

    /// Like [`get`](Self::get), falling back to `default`.
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).cloned().unwrap_or(default)
    }

    // == Has ==
    /// True iff `key` is present and not expired.
    pub fn has(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.live(key, now).is_some()
    }

    // == Forget ==
    /// Removes `key`. Forgetting a missing key succeeds without a store write.
    pub fn forget(&mut self, key: &str) -> PendingWrite {
        if self.entries.shift_remove(key).is_none() {
            return Box::pin(future::ready(Ok(())));
        }

        debug!("Forgot '{}' in '{}'", key, self.namespace);
        self.persist()
    }

    // == Keys ==
    /// Every stored key, expired ones included, in insertion order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    // == All ==
    /// Every stored key mapped to its raw value, expired ones included.
    pub fn all(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .filter_map(|(key, record)| {
                EntryView::of(record).map(|entry| (key.clone(), entry.value.clone()))
            })
            .collect()
    }

    // == Flush ==
    /// Empties the cache and removes the namespace slot from the store.
    pub fn flush(&mut self) -> PendingWrite {
        debug!(
            "Flushing '{}' ({} entries)",
            self.namespace,
            self.entries.len()
        );
        self.entries.clear();
        self.write(None)
    }

    // == Expiration ==
    /// Expiration timestamp of a live entry. `None` for missing, expired or
    /// never-expiring keys.
    pub fn expiration(&self, key: &str) -> Option<i64> {
        let now = self.clock.now();
        self.live(key, now).and_then(|entry| entry.expires_at)
    }

    // == Is Expired ==
    /// True iff `key` is stored with an expiration that has passed.
    pub fn is_expired(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.view(key).is_some_and(|entry| entry.is_expired_at(now))
    }

    // == Length ==
    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn view(&self, key: &str) -> Option<EntryView<'_>> {
        self.entries.get(key).and_then(EntryView::of)
    }

    fn live(&self, key: &str, now: i64) -> Option<EntryView<'_>> {
        self.view(key).filter(|entry| !entry.is_expired_at(now))
    }

    fn persist(&self) -> PendingWrite {
        self.write(Some(Value::Object(self.entries.clone())))
    }

    fn write(&self, snapshot: Option<Value>) -> PendingWrite {
        let store = Arc::clone(&self.store);
        let namespace = self.namespace.clone();

        Box::pin(async move {
            if store.update(&namespace, snapshot).await? {
                Ok(())
            } else {
                warn!("Backing store rejected write for '{}'", namespace);
                Err(CacheError::PersistRejected(namespace))
            }
        })
    }
}

impl fmt::Debug for NamespacedCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespacedCache")
            .field("namespace", &self.namespace)
            .field("entries", &self.entries.len())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

// == Helpers ==
fn rejected(error: CacheError) -> PendingWrite {
    Box::pin(future::ready(Err(error)))
}

/// Decodes every record once, so stored records always carry a `value`.
fn hydrate(namespace: &str, snapshot: Value) -> Result<Map<String, Value>> {
    let map = match snapshot {
        Value::Object(map) => map,
        // A cleared slot may come back as null rather than the default.
        Value::Null => Map::new(),
        other => {
            return Err(CacheError::CorruptSnapshot {
                namespace: namespace.to_string(),
                reason: format!("expected an object, got {}", json_type(&other)),
            })
        }
    };

    let mut entries = Map::with_capacity(map.len());
    for (key, raw) in map {
        let entry: CacheEntry =
            serde_json::from_value(raw).map_err(|e| CacheError::CorruptSnapshot {
                namespace: namespace.to_string(),
                reason: format!("entry '{}': {}", key, e),
            })?;
        entries.insert(key, entry.into_record());
    }

    Ok(entries)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
