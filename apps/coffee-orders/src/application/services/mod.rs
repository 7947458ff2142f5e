//! Application Services
//!
//! Services that orchestrate domain logic and coordinate between ports.
//!
//! - `OrderRepository`: Encodes orders into the record store and scans them back

mod order_repository;

pub use order_repository::{
    ORDER_KEY_PREFIX, OrderRepository, Replacement, RepositoryError, SweepOutcome, order_key,
};
