use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use super::{KeyValueStore, Result};
use crate::utils::persistence::{replace_file, with_suffix};

const BACKUP_SUFFIX: &str = "bak";

/// File-backed key-value store. The whole key space lives in a single
/// pretty-printed JSON object so the file stays human-inspectable.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the copy taken before the most recent overwrite. A
    /// batched write takes a single copy.
    pub fn backup_path(&self) -> PathBuf {
        with_suffix(&self.path, BACKUP_SUFFIX)
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&data)?)
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        if self.path.exists() {
            fs::copy(&self.path, self.backup_path())?;
        }
        replace_file(&self.path, &json)?;
        debug!(path = %self.path.display(), keys = entries.len(), "store file written");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.read_entries()?.into_keys().collect())
    }

    fn clear(&self) -> Result<()> {
        self.write_entries(&BTreeMap::new())
    }

    fn set_all(&self, batch: &[(&str, &str)]) -> Result<()> {
        let mut entries = self.read_entries()?;
        for (key, value) in batch {
            entries.insert(key.to_string(), value.to_string());
        }
        self.write_entries(&entries)
    }
}
