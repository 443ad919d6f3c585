//! codec/mod.rs
//! Encoder, decoder, skipping and composite schemas.
//!
//! Responsibilities:
//! - Move values between the `Value` model (or typed Rust values) and canonical bytes
//! - Charge every byte moved to a `CostMeter`
//! - Enforce frame discipline and nullability
//!
//! Non-responsibilities:
//! - Fee policy (see `meter::FeeSchedule`)
//! - Budget ownership (the caller supplies the meter)

pub mod decode;
pub mod encode;
pub mod schema;
pub mod skip;
pub mod traits;

pub use decode::Decoder;
pub use encode::Encoder;
pub use schema::{FieldType, RecordSchema, Schema};
pub use skip::value_span;
pub use traits::{Readable, Writable};

use crate::config::CodecConfig;
use crate::meter::CostMeter;
use crate::types::CodecError;
use crate::value::Value;

/// Encode one value with the default configuration.
pub fn encode_value(value: &Value, meter: &mut dyn CostMeter) -> Result<Vec<u8>, CodecError> {
    encode_value_with(value, meter, &CodecConfig::default())
}

pub fn encode_value_with(value: &Value, meter: &mut dyn CostMeter, config: &CodecConfig) -> Result<Vec<u8>, CodecError> {
    let mut enc = Encoder::with_config(meter, config);
    enc.write_value(value)?;
    enc.finish()
}

/// Decode exactly one value; trailing bytes are an error.
pub fn decode_value(bytes: &[u8], meter: &mut dyn CostMeter) -> Result<Value, CodecError> {
    decode_value_with(bytes, meter, &CodecConfig::default())
}

pub fn decode_value_with(bytes: &[u8], meter: &mut dyn CostMeter, config: &CodecConfig) -> Result<Value, CodecError> {
    let mut dec = Decoder::with_config(bytes, meter, config);
    let value = dec.read_value()?;
    dec.finish()?;
    Ok(value)
}
