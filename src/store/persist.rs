//! YAML persistence for the globals store

use std::fs;
use std::path::Path;

use tracing::debug;

use super::GlobalStore;
use crate::error::StoreError;
use crate::utils::atomic_write;

impl GlobalStore {
    /// Load a store from disk; a missing file yields an empty store
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no store file, starting empty");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let store: GlobalStore = serde_yaml::from_str(&content)?;
        debug!(path = %path.display(), globals = store.len(), "store loaded");
        Ok(store)
    }

    /// Write the whole store atomically
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let content = serde_yaml::to_string(self)?;
        atomic_write(path, &content)?;
        Ok(())
    }
}
