//! Error types for complaint storage.

use std::path::PathBuf;
use uuid::Uuid;

/// Errors returned by the store, cache and repositories.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with this id exists in the cache or on disk.
    #[error("complaint not found: {0}")]
    NotFound(Uuid),
    /// Filesystem read or write failed.
    #[error("storage io error during {operation} ({}): {source}", path.display())]
    StorageIo {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A record could not be encoded. Unparseable stored files are `StorageIo`.
    #[error("serialization error ({}): {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Input rejected at the business boundary.
    #[error("validation failed for {field}: {message}")]
    ValidationFailed {
        field: &'static str,
        message: String,
    },
    /// Cache size or eviction policy outside the allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The caller cancelled before any I/O started.
    #[error("operation cancelled before it started")]
    Cancelled,
    /// A blocking storage task panicked or was aborted.
    #[error("storage task failed: {0}")]
    Task(String),
}

impl StoreError {
    /// Build a storage I/O error with operation and path context.
    pub(crate) fn io(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::StorageIo {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
