mod config;
pub mod database;

pub use config::{ActivityConfig, Config, NotificationsConfig, TimerConfig};
pub use database::Database;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StorageError};

/// Keys of the independent entries in the key-value store.
pub mod keys {
    pub const TASKS: &str = "tasks";
    pub const REWARDS: &str = "rewards";
    pub const GARDEN_ITEMS: &str = "gardenItems";
    pub const CALENDAR_EVENTS: &str = "calendarEvents";
    pub const ACTIVITY_LOG: &str = "activityLog";
    pub const SESSION: &str = "session";
}

/// Returns the data directory, creating it if needed.
///
/// `STUDYGARDEN_DATA_DIR` wins when set. Otherwise `~/.config/studygarden`,
/// or `~/.config/studygarden-dev` when `STUDYGARDEN_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("STUDYGARDEN_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYGARDEN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studygarden-dev")
            } else {
                base_dir.join("studygarden")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Flat string key-value store. Values are opaque serialized blobs.
pub trait KvStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store. Clones share the same map, so a test can reopen an app
/// over the data a previous instance wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|map| map.get(key).cloned())
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self
            .entries
            .lock()
            .map_err(|_| StorageError::QueryFailed("memory store poisoned".into()))?;
        Ok(map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut map = self
            .entries
            .lock()
            .map_err(|_| StorageError::QueryFailed("memory store poisoned".into()))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read and decode a JSON entry. `Ok(None)` when the key was never written.
pub fn load_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

pub fn save_json<T: Serialize + ?Sized>(store: &mut dyn KvStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}
