use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::storage::{Error, Result};

const PREFERENCES_EXTENSION: &str = "json";

/// Key-value storage for small JSON values, in the spirit of platform preference stores.
///
/// Implementations must replace a value atomically: a concurrent or later `get` sees
/// either the old or the new value, never a partial write.
#[async_trait]
pub trait Preferences: Send + Sync + Debug {
    /// Returns the value stored under `key`, or `None` if nothing is stored.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// Preferences persisted as one JSON object in `<dir>/<name>.json`.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    // Serializes writers of this file; the rename keeps readers consistent.
    write_lock: Mutex<()>,
}

impl FilePreferences {
    pub fn new(dir: &Path, name: &str) -> Self {
        FilePreferences {
            path: dir.join(format!("{}.{}", name, PREFERENCES_EXTENSION)),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<Map<String, Value>> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Preference file not found, treating as empty");
                return Ok(Map::new());
            }
            Err(e) => return Err(Error::Io(e)),
        };

        match serde_json::from_slice(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::InvalidPreferences(self.path.clone())),
        }
    }

    /// Writes the file to a sibling temp file, then renames it into place.
    async fn write_map(&self, map: &Map<String, Value>) -> Result<()> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).await.map_err(Error::Io)?;

        let content = serde_json::to_vec_pretty(map)?;
        let temp_path = parent.join(format!(".tmp_{}", Uuid::new_v4()));

        let written = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&content).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &self.path).await
        }
        .await;

        if let Err(e) = written {
            warn!("Failed to replace preference file '{}': {}", self.path.display(), e);
            let _ = fs::remove_file(&temp_path).await;
            return Err(Error::Io(e));
        }
        debug!("Preference file written to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl Preferences for FilePreferences {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut map = self.read_map().await?;
        Ok(map.remove(key))
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = match self.read_map().await {
            Ok(map) => map,
            Err(Error::Io(e)) => return Err(Error::Io(e)),
            Err(e) => {
                // An unreadable file would otherwise block every future write.
                warn!("Discarding unreadable preference file '{}': {}", self.path.display(), e);
                Map::new()
            }
        };
        map.insert(key.to_string(), value);
        self.write_map(&map).await
    }
}

/// Preferences held in memory only.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Preferences for MemoryPreferences {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }
}
