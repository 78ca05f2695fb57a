use thiserror::Error;

/// Failures raised by a key-value backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Error type surfaced by subscription store operations.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Subscription not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SubscriptionError {
    pub fn is_validation(&self) -> bool {
        matches!(self, SubscriptionError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SubscriptionError::NotFound(_))
    }
}

/// Rejected changes to the in-memory user settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid setting: {0}")]
    Validation(String),
}
