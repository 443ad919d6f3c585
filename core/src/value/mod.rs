//! value/mod.rs
//! Value model: the closed set of encodable variants and their wire tags.
//!
//! Responsibilities:
//! - Define `Value`, `ValueKind`, `Address` and `Length`
//! - Define the tag registry and per-tag payload shapes
//!
//! Non-responsibilities:
//! - Byte transfer (see `codec`)
//! - Metering (see `meter`)

pub mod tag;
pub mod types;

pub use tag::{PayloadShape, Tag};
pub use types::{Address, Length, Value, ValueKind};
