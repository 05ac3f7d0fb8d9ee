//! Cache Entry Module
//!
//! Defines the record stored for each cache key, as persisted in the backing store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const VALUE_FIELD: &str = "value";
const EXPIRES_AT_FIELD: &str = "expiresAt";

// == Cache Entry ==
/// A stored value plus its optional expiration.
///
/// Serialized as `{"value": ..., "expiresAt": ...}`; `expiresAt` is omitted
/// when the entry never expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Expiration timestamp (Unix seconds), None = no expiration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `expires_at` - Absolute expiration in Unix seconds, if any
    pub fn new(value: Value, expires_at: Option<i64>) -> Self {
        Self { value, expires_at }
    }

    // == Into Record ==
    /// Converts the entry into its persisted JSON object.
    pub fn into_record(self) -> Value {
        let mut record = Map::with_capacity(2);
        record.insert(VALUE_FIELD.to_string(), self.value);
        if let Some(expires_at) = self.expires_at {
            record.insert(EXPIRES_AT_FIELD.to_string(), Value::from(expires_at));
        }
        Value::Object(record)
    }

    // == Is Expired ==
    /// Checks whether the entry has expired at the given instant.
    pub fn is_expired_at(&self, now: i64) -> bool {
        expired(self.expires_at, now)
    }
}

// == Entry View ==
/// Borrowed view over a persisted record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryView<'a> {
    pub value: &'a Value,
    pub expires_at: Option<i64>,
}

impl<'a> EntryView<'a> {
    /// Reads a record built by [`CacheEntry::into_record`]. `None` if it has no value.
    pub fn of(record: &'a Value) -> Option<Self> {
        Some(Self {
            value: record.get(VALUE_FIELD)?,
            expires_at: record.get(EXPIRES_AT_FIELD).and_then(Value::as_i64),
        })
    }

    /// Same boundary rule as [`CacheEntry::is_expired_at`].
    pub fn is_expired_at(&self, now: i64) -> bool {
        expired(self.expires_at, now)
    }
}

/// The boundary second counts as expired: `expires_at == now` is already gone.
fn expired(expires_at: Option<i64>, now: i64) -> bool {
    match expires_at {
        Some(expires) => now >= expires,
        None => false,
    }
}
