//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::{Map, Value};

/// Response body for the GET operation (GET /get/:namespace/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// Namespace written to
    pub namespace: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully in '{}'", key, namespace),
            namespace,
            key,
        }
    }
}

/// Response body for the DELETE operation (DELETE /del/:namespace/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was forgotten
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for the HAS operation (GET /has/:namespace/:key)
#[derive(Debug, Clone, Serialize)]
pub struct HasResponse {
    pub key: String,
    /// True if the key is stored and not expired
    pub present: bool,
}

/// Response body for the TTL lookup (GET /ttl/:namespace/:key)
#[derive(Debug, Clone, Serialize)]
pub struct ExpirationResponse {
    pub key: String,
    /// Unix seconds at which a live entry expires
    pub expires_at: Option<i64>,
    /// True if the key is stored with a passed expiration
    pub expired: bool,
}

/// Response body for GET /keys/:namespace
#[derive(Debug, Clone, Serialize)]
pub struct KeysResponse {
    pub namespace: String,
    /// All stored keys, expired ones included
    pub keys: Vec<String>,
}

/// Response body for GET /all/:namespace
#[derive(Debug, Clone, Serialize)]
pub struct AllResponse {
    pub namespace: String,
    /// Raw values by key, expired ones included
    pub entries: Map<String, Value>,
}

/// Response body for DELETE /flush/:namespace
#[derive(Debug, Clone, Serialize)]
pub struct FlushResponse {
    /// Success message
    pub message: String,
    pub namespace: String,
}

impl FlushResponse {
    /// Creates a new FlushResponse
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            message: format!("Namespace '{}' flushed", namespace),
            namespace,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("test_key", json!({"nested": [1, 2]}));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, json!({"key": "test_key", "value": {"nested": [1, 2]}}));
    }

    #[test]
    fn test_set_response_serialize() {
        let resp = SetResponse::new("sessions", "my_key");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("my_key"));
        assert!(json.contains("sessions"));
        assert!(json.contains("successfully"));
    }

    #[test]
    fn test_delete_response_serialize() {
        let resp = DeleteResponse::new("deleted_key");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("deleted_key"));
        assert!(json.contains("deleted"));
    }

    #[test]
    fn test_expiration_response_serialize() {
        let resp = ExpirationResponse {
            key: "k".to_string(),
            expires_at: None,
            expired: false,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, json!({"key": "k", "expires_at": null, "expired": false}));
    }

    #[test]
    fn test_flush_response_serialize() {
        let resp = FlushResponse::new("cache");
        assert_eq!(resp.message, "Namespace 'cache' flushed");
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
