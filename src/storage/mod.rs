pub mod json_backend;
pub mod memory;

use crate::errors::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Abstraction over a string key-value medium. Each `set` replaces the whole
/// value of a key and is all-or-nothing: readers never see a partial write.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;
    fn clear(&self) -> Result<()>;

    /// Writes several keys at once. Backends that can should apply the whole
    /// batch in one all-or-nothing write; the default falls back to `set`.
    fn set_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

pub use json_backend::JsonFileStore;
pub use memory::MemoryStore;
