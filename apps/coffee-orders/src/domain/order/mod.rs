//! Coffee Order Types
//!
//! The single entity managed by the service, plus the client-supplied draft
//! it is created from.
//!
//! # Wire Shape
//!
//! ```json
//! {"_id":"654fa100abcdef010200000a","coffee":"latte","emailAddress":"a@x.com","flavor":"vanilla","strength":3}
//! ```
//!
//! `_id` is always present. The other fields are omitted when empty or zero.

mod id;

pub use id::{ORDER_ID_HEX_LEN, ORDER_ID_LEN, OrderId, OrderIdError, OrderIdGenerator};

use serde::{Deserialize, Deserializer, Serialize};

/// A stored coffee order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeOrder {
    /// Server-assigned identifier.
    #[serde(rename = "_id")]
    pub id: OrderId,
    /// Coffee name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub coffee: String,
    /// Owner's email address, used for lookups.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email_address: String,
    /// Flavor shot.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub flavor: String,
    /// Strength level.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub strength: u8,
}

impl CoffeeOrder {
    /// Whether this order belongs to `email` (exact, case-sensitive).
    #[must_use]
    pub fn belongs_to(&self, email: &str) -> bool {
        self.email_address == email
    }
}

/// Order fields as submitted by a client.
///
/// Any `_id` in the submission is ignored. `null` values count as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderDraft {
    /// Coffee name.
    #[serde(deserialize_with = "null_as_default")]
    pub coffee: String,
    /// Owner's email address.
    #[serde(deserialize_with = "null_as_default")]
    pub email_address: String,
    /// Flavor shot.
    #[serde(deserialize_with = "null_as_default")]
    pub flavor: String,
    /// Strength level.
    #[serde(deserialize_with = "null_as_default")]
    pub strength: u8,
}

impl OrderDraft {
    /// Turn the draft into an order carrying `id`.
    #[must_use]
    pub fn into_order(self, id: OrderId) -> CoffeeOrder {
        CoffeeOrder {
            id,
            coffee: self.coffee,
            email_address: self.email_address,
            flavor: self.flavor,
            strength: self.strength,
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &u8) -> bool {
    *value == 0
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
