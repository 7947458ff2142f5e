//! Domain Layer - Core order types and schedule rules.
//!
//! This layer contains the coffee order entity, its identifier scheme and
//! the calendar rules behind the monthly sweep. Nothing here touches
//! storage or HTTP.

/// Coffee order entity, drafts and identifiers.
pub mod order;

/// Clock abstraction and sweep calendar rules.
pub mod schedule;
