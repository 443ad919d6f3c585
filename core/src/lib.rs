//! objcodec-core
//!
//! Metered, canonical, self-describing binary value codec.
//! Every byte read or written is charged to a caller-supplied cost meter.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod config;

// Model and bookkeeping
pub mod value;
pub mod frame;
pub mod meter;
pub mod telemetry;

// Codec
pub mod codec;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::codec::{
        decode_value, encode_value, Decoder, Encoder, FieldType, Readable, RecordSchema, Schema, Writable,
    };
    pub use crate::config::{CodecConfig, CodecLimits};
    pub use crate::meter::{BudgetMeter, CostMeter, FeeSchedule, OutOfBudget, Unmetered};
    pub use crate::telemetry::CodecCounters;
    pub use crate::types::{CodecError, MalformedKind};
    pub use crate::value::{Address, Length, Tag, Value, ValueKind};
}
