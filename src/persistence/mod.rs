//! Key/value persistence slots
//!
//! The game persists two small JSON values (best score and settings). Each
//! backend stores a string per key:
//! - `MemoryStorage`: in-process map (tests, headless runs)
//! - `FileStorage`: one file per key in a directory (native)
//! - `LocalStorage`: browser localStorage (wasm32)

use std::collections::HashMap;

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod local;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

/// Error type for persistence operations
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    /// Backend missing (no window, storage disabled)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Key is not usable by this backend
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),
}

/// Result type for persistence operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// A string slot per key
pub trait Storage {
    /// Read a key; `Ok(None)` if it was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-memory storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Deserialize the JSON value under `key`, if present
pub fn load_json<T: serde::de::DeserializeOwned>(
    storage: &impl Storage,
    key: &str,
) -> Result<Option<T>> {
    match storage.get(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Serialize `value` as JSON under `key`
pub fn save_json<T: serde::Serialize>(
    storage: &mut impl Storage,
    key: &str,
    value: &T,
) -> Result<()> {
    let json = serde_json::to_string(value)?;
    storage.set(key, &json)
}
