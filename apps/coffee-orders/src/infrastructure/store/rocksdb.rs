//! RocksDB record store.

use std::path::{Path, PathBuf};

use rocksdb::{DBWithThreadMode, Direction, IteratorMode, MultiThreaded, Options};

use crate::application::ports::{RecordStore, StoreError};

/// Record store persisted in a RocksDB directory.
///
/// The database is closed when the last handle is dropped.
pub struct RocksDbStore {
    db: DBWithThreadMode<MultiThreaded>,
    path: PathBuf,
}

impl RocksDbStore {
    /// Open (creating if missing) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Open` if RocksDB cannot open the directory,
    /// for example because another process holds its lock.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut options = Options::default();
        options.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&options, &path).map_err(|e| {
            StoreError::Open {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        tracing::info!(path = %path.display(), "Order store opened");
        Ok(Self { db, path })
    }
}

impl std::fmt::Debug for RocksDbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksDbStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Drop for RocksDbStore {
    fn drop(&mut self) {
        tracing::info!(path = %self.path.display(), "Order store closed");
    }
}

impl RecordStore for RocksDbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.db
            .get(key)
            .map_err(|e| StoreError::Read(e.to_string()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.db
            .put(key, value)
            .map_err(|e| StoreError::Write(e.to_string()))
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.db
            .delete(key)
            .map_err(|e| StoreError::Delete(e.to_string()))
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let iter = self
            .db
            .iterator(IteratorMode::From(prefix, Direction::Forward));

        let mut entries = Vec::new();
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Read(e.to_string()))?;
            if !key.starts_with(prefix) {
                break;
            }
            entries.push((key.into_vec(), value.into_vec()));
        }

        Ok(entries)
    }
}
