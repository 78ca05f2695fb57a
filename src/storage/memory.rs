use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        RwLock,
    },
};

use crate::errors::StorageError;

use super::{KeyValueStore, Result};

/// In-process key-value map for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
    read_only: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail, emulating a full or locked medium.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("store is read-only".into()));
        }
        Ok(())
    }

    fn poisoned() -> StorageError {
        StorageError::Backend("memory store lock poisoned".into())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_writable()?;
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.ensure_writable()?;
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.keys().cloned().collect())
    }

    fn clear(&self) -> Result<()> {
        self.ensure_writable()?;
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.clear();
        Ok(())
    }

    fn set_all(&self, batch: &[(&str, &str)]) -> Result<()> {
        self.ensure_writable()?;
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        for (key, value) in batch {
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}
