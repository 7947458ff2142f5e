//! Order Identifiers
//!
//! Twelve-byte identifiers rendered as 24 lowercase hex characters.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────┬──────────────────┬────────────┐
//! │ unix seconds │ process-unique   │ counter    │
//! │ 4 bytes (BE) │ 5 random bytes   │ 3 bytes BE │
//! └──────────────┴──────────────────┴────────────┘
//! ```
//!
//! Ids from one generator sort in generation order, so the store's key
//! order doubles as creation order.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of raw bytes in an [`OrderId`].
pub const ORDER_ID_LEN: usize = 12;

/// Number of hex characters in the rendered form of an [`OrderId`].
pub const ORDER_ID_HEX_LEN: usize = ORDER_ID_LEN * 2;

const COUNTER_MASK: u32 = 0x00FF_FFFF;

/// Unique, time-ordered order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderId([u8; ORDER_ID_LEN]);

impl OrderId {
    /// Build an id from its raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ORDER_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes of the id.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ORDER_ID_LEN] {
        &self.0
    }

    /// Lowercase hex rendering (always 24 characters).
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_string()
    }

    /// Creation time embedded in the id, truncated to seconds.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        let secs = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        Utc.timestamp_opt(i64::from(secs), 0)
            .single()
            .unwrap_or_default()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for OrderId {
    type Err = OrderIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ORDER_ID_HEX_LEN {
            return Err(OrderIdError::InvalidLength(s.len()));
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(OrderIdError::InvalidHex);
        }

        let mut bytes = [0_u8; ORDER_ID_LEN];
        for (slot, pair) in bytes.iter_mut().zip(s.as_bytes().chunks_exact(2)) {
            let pair = std::str::from_utf8(pair).map_err(|_| OrderIdError::InvalidHex)?;
            *slot = u8::from_str_radix(pair, 16).map_err(|_| OrderIdError::InvalidHex)?;
        }

        Ok(Self(bytes))
    }
}

impl Serialize for OrderId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors from parsing an [`OrderId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderIdError {
    /// Input was not 24 characters long.
    #[error("order id must be {ORDER_ID_HEX_LEN} hex characters, got {0}")]
    InvalidLength(usize),
    /// Input contained a non-hex character.
    #[error("order id contains non-hex characters")]
    InvalidHex,
}

// =============================================================================
// Generator
// =============================================================================

/// Produces fresh [`OrderId`]s.
///
/// One generator is shared by the whole process; the random middle bytes are
/// drawn once and the counter starts at a random value.
#[derive(Debug)]
pub struct OrderIdGenerator {
    process_unique: [u8; 5],
    counter: AtomicU32,
}

impl Default for OrderIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderIdGenerator {
    /// Create a generator with random process bytes and counter seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::random(), rand::random())
    }

    /// Create a generator with fixed process bytes and counter seed.
    #[must_use]
    pub const fn with_seed(process_unique: [u8; 5], counter_seed: u32) -> Self {
        Self {
            process_unique,
            counter: AtomicU32::new(counter_seed & COUNTER_MASK),
        }
    }

    /// Generate an id stamped with the current time.
    pub fn generate(&self) -> OrderId {
        self.generate_at(Utc::now())
    }

    /// Generate an id stamped with `at`.
    ///
    /// Times before the epoch or past 2106 are clamped into the 32-bit range.
    pub fn generate_at(&self, at: DateTime<Utc>) -> OrderId {
        let secs = u32::try_from(at.timestamp().max(0)).unwrap_or(u32::MAX);
        let count = self.counter.fetch_add(1, Ordering::SeqCst) & COUNTER_MASK;

        let mut bytes = [0_u8; ORDER_ID_LEN];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&self.process_unique);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        OrderId(bytes)
    }
}
