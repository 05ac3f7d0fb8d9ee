//! API Handlers
//!
//! HTTP request handlers exposing cache operations over any namespace.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::cache::{NamespacedCache, DEFAULT_NAMESPACE};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    AllResponse, DeleteResponse, ExpirationResponse, FlushResponse, GetResponse, HasResponse,
    HealthResponse, KeysResponse, SetRequest, SetResponse,
};
use crate::store::{BackingStore, JsonFileStore};

/// Application state shared across all handlers.
///
/// Caches are opened lazily, one per namespace, over a single shared store.
#[derive(Clone)]
pub struct AppState {
    /// Shared backing store
    pub store: Arc<dyn BackingStore>,
    /// Open caches by namespace
    pub caches: Arc<RwLock<HashMap<String, NamespacedCache>>>,
    /// Namespace for `PUT /set` requests that name none
    pub default_namespace: String,
}

impl AppState {
    /// Creates a new AppState over the given store.
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self {
            store,
            caches: Arc::new(RwLock::new(HashMap::new())),
            default_namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = namespace.into();
        self
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the JSON file store named by the Config.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store = JsonFileStore::open(&config.store_path).await?;
        Ok(Self::new(Arc::new(store)).with_default_namespace(config.default_namespace.clone()))
    }

    /// Runs `f` against the cache for `namespace` under the read lock.
    ///
    /// Open namespaces are served without blocking other readers.
    async fn read_cache<R>(
        &self,
        namespace: &str,
        f: impl FnOnce(&NamespacedCache) -> R,
    ) -> Result<R> {
        {
            let caches = self.caches.read().await;
            if let Some(cache) = caches.get(namespace) {
                return Ok(f(cache));
            }
        }

        let opened = self.open_cache(namespace).await?;
        let mut caches = self.caches.write().await;
        Ok(f(install(&mut caches, namespace, opened)))
    }

    /// Runs `f` against the cache for `namespace` under the write lock.
    ///
    /// Whatever `f` returns is handed back after the lock is released, so a
    /// [`PendingWrite`](crate::cache::PendingWrite) is awaited outside the lock.
    async fn write_cache<R>(
        &self,
        namespace: &str,
        f: impl FnOnce(&mut NamespacedCache) -> R,
    ) -> Result<R> {
        {
            let mut caches = self.caches.write().await;
            if let Some(cache) = caches.get_mut(namespace) {
                return Ok(f(cache));
            }
        }

        let opened = self.open_cache(namespace).await?;
        let mut caches = self.caches.write().await;
        Ok(f(install(&mut caches, namespace, opened)))
    }

    /// Hydrates `namespace` from the store. Called with no lock held.
    async fn open_cache(&self, namespace: &str) -> Result<NamespacedCache> {
        NamespacedCache::open(self.store.clone(), Some(namespace)).await
    }
}

/// Keeps whichever cache reached the map first; a later duplicate open is dropped.
fn install<'a>(
    caches: &'a mut HashMap<String, NamespacedCache>,
    namespace: &str,
    opened: NamespacedCache,
) -> &'a mut NamespacedCache {
    match caches.entry(namespace.to_string()) {
        Entry::Occupied(slot) => slot.into_mut(),
        Entry::Vacant(slot) => {
            info!("Opened namespace '{}'", namespace);
            slot.insert(opened)
        }
    }
}

/// Handler for PUT /set
///
/// Stores a value in a namespace with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let namespace = req
        .namespace
        .clone()
        .unwrap_or_else(|| state.default_namespace.clone());
    let ttl = req.ttl_seconds();
    let key = req.key.as_str().unwrap_or_default().to_string();

    let pending = state
        .write_cache(&namespace, |cache| cache.put(req.key, req.value, ttl))
        .await?;
    pending.await?;

    Ok(Json(SetResponse::new(namespace, key)))
}

/// Handler for GET /get/:namespace/:key
///
/// Missing and expired keys are both reported as not found.
pub async fn get_handler(
    State(state): State<AppState>,
    Path((namespace, key)): Path<(String, String)>,
) -> Result<Json<GetResponse>> {
    let value = state
        .read_cache(&namespace, |cache| cache.get(&key).cloned())
        .await?
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for GET /has/:namespace/:key
pub async fn has_handler(
    State(state): State<AppState>,
    Path((namespace, key)): Path<(String, String)>,
) -> Result<Json<HasResponse>> {
    let present = state.read_cache(&namespace, |cache| cache.has(&key)).await?;

    Ok(Json(HasResponse { key, present }))
}

/// Handler for GET /ttl/:namespace/:key
pub async fn ttl_handler(
    State(state): State<AppState>,
    Path((namespace, key)): Path<(String, String)>,
) -> Result<Json<ExpirationResponse>> {
    let (expires_at, expired) = state
        .read_cache(&namespace, |cache| {
            (cache.expiration(&key), cache.is_expired(&key))
        })
        .await?;

    Ok(Json(ExpirationResponse {
        key,
        expires_at,
        expired,
    }))
}

/// Handler for DELETE /del/:namespace/:key
///
/// Deleting a key that does not exist succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path((namespace, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    let pending = state
        .write_cache(&namespace, |cache| cache.forget(&key))
        .await?;
    pending.await?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /keys/:namespace
pub async fn keys_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<KeysResponse>> {
    let keys = state
        .read_cache(&namespace, |cache| {
            cache
                .keys()
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .await?;

    Ok(Json(KeysResponse { namespace, keys }))
}

/// Handler for GET /all/:namespace
pub async fn all_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<AllResponse>> {
    let entries = state.read_cache(&namespace, |cache| cache.all()).await?;

    Ok(Json(AllResponse { namespace, entries }))
}

/// Handler for DELETE /flush/:namespace
pub async fn flush_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<FlushResponse>> {
    let pending = state.write_cache(&namespace, |cache| cache.flush()).await?;
    pending.await?;

    Ok(Json(FlushResponse::new(namespace)))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn set_request(key: serde_json::Value, value: Option<serde_json::Value>) -> SetRequest {
        SetRequest {
            namespace: None,
            key,
            value,
            ttl: None,
        }
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = AppState::new(Arc::new(MemoryStore::new()));

        let req = set_request(json!("test_key"), Some(json!("test_value")));
        let result = set_handler(State(state.clone()), Json(req)).await;
        assert!(result.is_ok());

        let result = get_handler(
            State(state.clone()),
            Path(("cache".to_string(), "test_key".to_string())),
        )
        .await;
        let response = result.unwrap();
        assert_eq!(response.value, json!("test_value"));
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let state = AppState::new(Arc::new(MemoryStore::new()));

        let result = get_handler(
            State(state),
            Path(("cache".to_string(), "nonexistent".to_string())),
        )
        .await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_rejects_non_string_key() {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone());

        let req = set_request(json!(12), Some(json!("value")));
        let result = set_handler(State(state), Json(req)).await;

        assert!(matches!(result, Err(CacheError::InvalidKeyType(_))));
        assert_eq!(store.update_count(), 0);
    }

    #[tokio::test]
    async fn test_set_uses_default_namespace() {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone()).with_default_namespace("sessions");

        let req = set_request(json!("k"), Some(json!(1)));
        set_handler(State(state), Json(req)).await.unwrap();

        assert_eq!(store.slot("sessions").await, Some(json!({"k": {"value": 1}})));
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = AppState::new(Arc::new(MemoryStore::new()));

        let req = set_request(json!("to_delete"), Some(json!("value")));
        set_handler(State(state.clone()), Json(req)).await.unwrap();

        let path = ("cache".to_string(), "to_delete".to_string());
        let result = delete_handler(State(state.clone()), Path(path.clone())).await;
        assert!(result.is_ok());

        let result = has_handler(State(state), Path(path)).await.unwrap();
        assert!(!result.present);
    }

    #[tokio::test]
    async fn test_flush_and_keys_handlers() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        for key in ["a", "b"] {
            let req = set_request(json!(key), Some(json!(key)));
            set_handler(State(state.clone()), Json(req)).await.unwrap();
        }

        let keys = keys_handler(State(state.clone()), Path("cache".to_string()))
            .await
            .unwrap();
        assert_eq!(keys.keys, vec!["a", "b"]);

        flush_handler(State(state.clone()), Path("cache".to_string()))
            .await
            .unwrap();
        let all = all_handler(State(state), Path("cache".to_string()))
            .await
            .unwrap();
        assert!(all.entries.is_empty());
    }

    #[tokio::test]
    async fn test_set_persist_rejected() {
        let store = Arc::new(MemoryStore::new());
        store.set_reject_writes(true);
        let state = AppState::new(store);

        let req = set_request(json!("k"), Some(json!(1)));
        let result = set_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(CacheError::PersistRejected(_))));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_reads_share_the_lock() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        let req = set_request(json!("k"), Some(json!("v")));
        set_handler(State(state.clone()), Json(req)).await.unwrap();

        let _reader = state.caches.read().await;
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            get_handler(
                State(state.clone()),
                Path(("cache".to_string(), "k".to_string())),
            ),
        )
        .await
        .expect("read blocked behind another reader");

        assert_eq!(result.unwrap().value, json!("v"));
    }

    #[tokio::test]
    async fn test_read_opens_namespace_without_writing() {
        let store = Arc::new(MemoryStore::new());
        store
            .seed("sessions", json!({"k": {"value": 1}}))
            .await;
        let state = AppState::new(store.clone());

        let keys = keys_handler(State(state.clone()), Path("sessions".to_string()))
            .await
            .unwrap();
        has_handler(
            State(state.clone()),
            Path(("sessions".to_string(), "k".to_string())),
        )
        .await
        .unwrap();

        assert_eq!(keys.keys, vec!["k"]);
        assert_eq!(store.read_count(), 1);
        assert_eq!(store.update_count(), 0);
        assert!(state.caches.read().await.contains_key("sessions"));
    }
}
