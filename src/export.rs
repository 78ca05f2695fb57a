//! Whole-store dump and wipe, offered by the settings panel as an escape
//! hatch. Not part of the subscription core.

use std::{
    collections::BTreeMap,
    fs,
    path::Path,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::{errors::StorageError, storage::KeyValueStore};

/// Every key of the storage medium with its raw value at export time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportBundle {
    pub exported_at: DateTime<Utc>,
    /// Keys whose value vanished between listing and reading map to `None`.
    pub entries: BTreeMap<String, Option<String>>,
}

impl ExportBundle {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the entries as an indented JSON object keyed by storage key.
    pub fn to_pretty_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_pretty_json()?)?;
        info!(path = %path.display(), keys = self.len(), "export written");
        Ok(())
    }
}

pub fn export_all(backend: &dyn KeyValueStore) -> Result<ExportBundle, StorageError> {
    let mut entries = BTreeMap::new();
    for key in backend.keys()? {
        let value = backend.get(&key)?;
        if value.is_none() {
            warn!(key = %key, "key disappeared during export");
        }
        entries.insert(key, value);
    }
    Ok(ExportBundle {
        exported_at: Utc::now(),
        entries,
    })
}

/// Removes every key from the medium, subscriptions and history included.
pub fn clear_all(backend: &dyn KeyValueStore) -> Result<(), StorageError> {
    backend.clear()?;
    info!("all stored data cleared");
    Ok(())
}
