//! JSON file backing store
//!
//! Keeps the whole document in memory and rewrites the file on every update.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::BackingStore;
use crate::error::{CacheError, Result};

// == Json File Store ==
/// Store persisting `{slot key: value}` as one pretty-printed JSON object.
#[derive(Debug)]
pub struct JsonFileStore {
    /// Location of the document on disk
    path: PathBuf,
    /// Current document; the lock also serializes file writes
    document: Mutex<Map<String, Value>>,
}

impl JsonFileStore {
    // == Open ==
    /// Loads the document at `path`. A missing or empty file starts an empty store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let document = match fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => Map::new(),
            Ok(contents) => match serde_json::from_str::<Value>(&contents)? {
                Value::Object(map) => map,
                _ => {
                    return Err(CacheError::CorruptSnapshot {
                        namespace: path.display().to_string(),
                        reason: "store document is not a JSON object".to_string(),
                    })
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };

        info!(
            "Opened file store at {} with {} slots",
            path.display(),
            document.len()
        );

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    // == Path ==
    pub fn path(&self) -> &Path {
        &self.path
    }

    // == Write Document ==
    /// Writes to a sibling temp file, then renames it over the document.
    ///
    /// The temp file is removed if either step fails.
    async fn write_document(&self, document: &Map<String, Value>) -> Result<()> {
        let contents = serde_json::to_vec_pretty(document)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let written = match fs::write(&tmp, contents).await {
            Ok(()) => fs::rename(&tmp, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            // Best effort; the original error is the one worth reporting.
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl BackingStore for JsonFileStore {
    async fn get(&self, key: &str, default: Value) -> Result<Value> {
        let document = self.document.lock().await;
        Ok(document.get(key).cloned().unwrap_or(default))
    }

    async fn update(&self, key: &str, value: Option<Value>) -> Result<bool> {
        let mut document = self.document.lock().await;

        // Apply to a copy so a failed write leaves the served document untouched.
        let mut next = document.clone();
        match value {
            Some(value) => {
                next.insert(key.to_string(), value);
            }
            None => {
                next.shift_remove(key);
            }
        }

        self.write_document(&next).await?;
        *document = next;
        debug!("Persisted slot '{}' to {}", key, self.path.display());
        Ok(true)
    }
}
