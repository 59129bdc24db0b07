use anyhow::{anyhow, Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Flat string-keyed storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create store directory {:?}", dir))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);

        // Atomic write: write to temp file, then rename
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, value)
            .with_context(|| format!("Failed to write {:?}", temp_path))?;
        std::fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to move {:?} into place", temp_path))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

/// A whole collection serialized as JSON under a single key.
///
/// There are no partial writes: every `save` replaces the stored value.
pub struct ListStore<T> {
    store: Arc<dyn KeyValueStore>,
    key: String,
    _items: PhantomData<fn() -> T>,
}

impl<T> ListStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            _items: PhantomData,
        }
    }

    /// Never fails: a missing, unreadable or corrupt value loads as an empty list.
    pub fn load(&self) -> Vec<T> {
        let content = match self.store.get(&self.key) {
            Ok(Some(content)) => content,
            Ok(None) => {
                debug!("Store miss: {} (no saved value)", self.key);
                return Vec::new();
            }
            Err(e) => {
                warn!("Failed to read {} from store: {:#}", self.key, e);
                return Vec::new();
            }
        };

        // A stored `null` is an empty list
        match serde_json::from_str::<Option<Vec<T>>>(&content) {
            Ok(items) => {
                let items = items.unwrap_or_default();
                info!("Loaded {} ({} items)", self.key, items.len());
                items
            }
            Err(e) => {
                let backup_key = format!("{}.bak", self.key);
                warn!(
                    "Stored {} is corrupt: {}. Starting empty; previous value kept under {}",
                    self.key, e, backup_key
                );
                if let Err(backup_err) = self.store.set(&backup_key, &content) {
                    warn!("Failed to back up corrupt {}: {:#}", self.key, backup_err);
                }
                Vec::new()
            }
        }
    }

    pub fn save(&self, items: &[T]) -> Result<()> {
        let json = serde_json::to_string_pretty(items)
            .map_err(|e| anyhow!("Failed to serialize {}: {}", self.key, e))?;
        self.store.set(&self.key, &json)?;
        debug!("Saved {} ({} items)", self.key, items.len());
        Ok(())
    }
}
