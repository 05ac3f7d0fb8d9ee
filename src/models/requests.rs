//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Request body for the PUT operation (PUT /set)
///
/// # Fields
/// - `namespace`: Target namespace (server default if not specified)
/// - `key`: The cache key; anything but a string is rejected by the cache
/// - `value`: The value to store; omitting it differs from sending `null`
/// - `ttl`: Optional TTL in seconds; non-integers mean "never expires"
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// Target namespace
    #[serde(default)]
    pub namespace: Option<String>,
    /// The cache key
    pub key: Value,
    /// The value to store
    #[serde(default, deserialize_with = "present")]
    pub value: Option<Value>,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<Value>,
}

impl SetRequest {
    /// Returns the TTL as whole seconds, if it is an integer.
    ///
    /// Integral floats such as `2.0` count; `1.5`, strings and the like do not.
    pub fn ttl_seconds(&self) -> Option<i64> {
        let ttl = self.ttl.as_ref()?;
        if let Some(seconds) = ttl.as_i64() {
            return Some(seconds);
        }
        ttl.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    }

    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match &self.namespace {
            Some(namespace) if namespace.is_empty() => {
                Some("Namespace cannot be empty".to_string())
            }
            _ => None,
        }
    }
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only a missing field is `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "test", "value": "hello"}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, json!("test"));
        assert_eq!(req.value, Some(json!("hello")));
        assert!(req.namespace.is_none());
        assert!(req.ttl_seconds().is_none());
    }

    #[test]
    fn test_missing_value_differs_from_null() {
        let missing: SetRequest = serde_json::from_str(r#"{"key": "k"}"#).unwrap();
        let null: SetRequest = serde_json::from_str(r#"{"key": "k", "value": null}"#).unwrap();

        assert_eq!(missing.value, None);
        assert_eq!(null.value, Some(Value::Null));
    }

    #[test]
    fn test_non_string_key_is_accepted_by_the_parser() {
        let req: SetRequest = serde_json::from_str(r#"{"key": 7, "value": 1}"#).unwrap();
        assert_eq!(req.key, json!(7));
    }

    #[test]
    fn test_ttl_seconds() {
        let with_ttl = |ttl: Value| SetRequest {
            namespace: None,
            key: json!("k"),
            value: Some(json!(1)),
            ttl: Some(ttl),
        };

        assert_eq!(with_ttl(json!(60)).ttl_seconds(), Some(60));
        assert_eq!(with_ttl(json!(2.0)).ttl_seconds(), Some(2));
        assert_eq!(with_ttl(json!(-3)).ttl_seconds(), Some(-3));
        assert_eq!(with_ttl(json!(1.5)).ttl_seconds(), None);
        assert_eq!(with_ttl(json!("10")).ttl_seconds(), None);
    }

    #[test]
    fn test_validate_empty_namespace() {
        let req: SetRequest =
            serde_json::from_str(r#"{"namespace": "", "key": "k", "value": 1}"#).unwrap();
        assert!(req.validate().is_some());
    }
}
