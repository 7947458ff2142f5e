//! Record Store Adapters
//!
//! Implementations of the `RecordStore` port.
//!
//! - `RocksDbStore`: On-disk store used in production
//! - `InMemoryStore`: Ordered map for tests and throwaway runs

mod memory;
mod rocksdb;

pub use self::memory::InMemoryStore;
pub use self::rocksdb::RocksDbStore;
