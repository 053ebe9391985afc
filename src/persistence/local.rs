//! Browser localStorage backend

use super::{Result, Storage, StorageError};

/// localStorage slot family
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Result<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| StorageError::Unavailable("localStorage not available".into()))
    }
}

fn js_error(err: wasm_bindgen::JsValue) -> StorageError {
    StorageError::Unavailable(format!("{err:?}"))
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Self::storage()?.get_item(key).map_err(js_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        Self::storage()?.set_item(key, value).map_err(js_error)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        Self::storage()?.remove_item(key).map_err(js_error)
    }
}
