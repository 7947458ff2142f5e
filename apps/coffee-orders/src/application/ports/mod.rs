//! Port Interfaces
//!
//! Defines the interfaces (ports) for external systems following
//! the Hexagonal Architecture pattern. These are the contracts that
//! infrastructure adapters must implement.
//!
//! ## Driven Ports (Outbound)
//!
//! - `RecordStore`: Ordered byte-key store holding the order records

/// Ordered key-value store.
///
/// Implementations guarantee per-key atomicity only. Nothing spans
/// multiple keys, so a scan followed by deletes can race with writers.
#[cfg_attr(test, mockall::automock)]
pub trait RecordStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Read` if the store cannot be read.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Write` if the write fails.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Remove `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Delete` if the delete fails.
    fn delete(&self, key: &[u8]) -> Result<(), StoreError>;

    /// Every entry whose key starts with `prefix`, in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Read` if iteration fails.
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;
}

/// Record store errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store could not be opened.
    #[error("failed to open store at {path}: {reason}")]
    Open {
        /// Store location.
        path: String,
        /// Underlying failure.
        reason: String,
    },

    /// A read or scan failed.
    #[error("store read failed: {0}")]
    Read(String),

    /// A write failed.
    #[error("store write failed: {0}")]
    Write(String),

    /// A delete failed.
    #[error("store delete failed: {0}")]
    Delete(String),
}
