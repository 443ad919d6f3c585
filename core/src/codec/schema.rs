//! codec/schema.rs
//! Composite schemas: ordered, unmarked field sequences.
//!
//! Design notes:
//! - A composite is written as its fields back to back with no header and no closer.
//!   Only the schema knows where it ends.
//! - The codec opens a record frame around every schema call, so a schema that
//!   writes or reads a different number of fields than `arity()` fails with `Arity`.
//! - `RecordSchema` is the dynamic form; typed schemas implement `Schema` directly.

use crate::codec::decode::Decoder;
use crate::codec::encode::{map_pairs, Encoder};
use crate::frame::FrameKind;
use crate::types::CodecError;
use crate::value::{Length, Value, ValueKind};

pub trait Schema {
    type Target;

    /// Number of logical fields. Fixed for a given schema.
    fn arity(&self) -> usize;

    fn write_fields(&self, enc: &mut Encoder<'_>, value: &Self::Target) -> Result<(), CodecError>;

    fn read_fields(&self, dec: &mut Decoder<'_>) -> Result<Self::Target, CodecError>;

    /// Pass over the fields without materializing them.
    ///
    /// The default assumes every field is one wire value. Schemas with nested
    /// composite fields override it and call `skip_object` for those.
    fn skip_fields(&self, dec: &mut Decoder<'_>) -> Result<(), CodecError> {
        dec.skip_many(self.arity())
    }
}

/// Declared type of one composite field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// A non-null scalar of the given kind.
    Scalar(ValueKind),
    /// Null, or a present value of the inner type.
    Nullable(Box<FieldType>),
    List(Box<FieldType>),
    Map(Box<FieldType>, Box<FieldType>),
    /// A nested composite; occupies as many wire values as it has fields.
    Record(RecordSchema),
    /// Any self-describing value (no composites).
    Any,
}

impl FieldType {
    pub fn nullable(inner: FieldType) -> Self {
        FieldType::Nullable(Box::new(inner))
    }

    pub fn list(elem: FieldType) -> Self {
        FieldType::List(Box::new(elem))
    }

    pub fn map(key: FieldType, value: FieldType) -> Self {
        FieldType::Map(Box::new(key), Box::new(value))
    }
}

/// Dynamic composite schema over `Value::Composite` field vectors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordSchema {
    fields: Vec<FieldType>,
}

impl RecordSchema {
    pub fn new(fields: Vec<FieldType>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldType] {
        &self.fields
    }
}

impl Schema for RecordSchema {
    type Target = Vec<Value>;

    fn arity(&self) -> usize {
        self.fields.len()
    }

    fn write_fields(&self, enc: &mut Encoder<'_>, value: &Vec<Value>) -> Result<(), CodecError> {
        if value.len() != self.fields.len() {
            return Err(CodecError::Arity { expected: self.fields.len(), actual: value.len() });
        }
        self.fields
            .iter()
            .zip(value)
            .try_for_each(|(ty, v)| write_field(enc, ty, v))
    }

    fn read_fields(&self, dec: &mut Decoder<'_>) -> Result<Vec<Value>, CodecError> {
        self.fields.iter().map(|ty| read_field(dec, ty)).collect()
    }

    fn skip_fields(&self, dec: &mut Decoder<'_>) -> Result<(), CodecError> {
        self.fields.iter().try_for_each(|ty| skip_field(dec, ty))
    }
}

fn mismatch(expected: &'static str, found: &Value) -> CodecError {
    CodecError::SchemaMismatch { expected, found: found.kind().name() }
}

fn write_field(enc: &mut Encoder<'_>, ty: &FieldType, value: &Value) -> Result<(), CodecError> {
    match (ty, value) {
        (FieldType::Scalar(kind), v) => {
            if kind.scalar_tag().is_none() || v.kind() != *kind {
                return Err(mismatch(kind.name(), v));
            }
            enc.put_value(v)
        }
        (FieldType::Nullable(_), Value::Null) => enc.put_null(),
        (FieldType::Nullable(inner), v) => enc.with_marker(|enc| write_field(enc, inner, v)),
        (FieldType::List(elem), Value::List(items)) => {
            let wire = items.iter().map(Value::wire_width).sum();
            enc.open(FrameKind::List, Length::Known(wire))?;
            items.iter().try_for_each(|item| write_field(enc, elem, item))?;
            enc.close()
        }
        (FieldType::Map(kt, vt), Value::Map(entries)) => {
            let wire = entries.iter().map(|(k, v)| k.wire_width() + v.wire_width()).sum();
            enc.open(FrameKind::Map, Length::Known(map_pairs(wire)?))?;
            for (k, v) in entries {
                write_field(enc, kt, k)?;
                write_field(enc, vt, v)?;
            }
            enc.close()
        }
        (FieldType::Record(schema), Value::Composite(fields)) => enc.put_object(schema, fields),
        (FieldType::Any, Value::Composite(_)) => Err(mismatch("self-describing value", value)),
        (FieldType::Any, v) => enc.put_value(v),
        (FieldType::List(_), v) => Err(mismatch("list", v)),
        (FieldType::Map(..), v) => Err(mismatch("map", v)),
        (FieldType::Record(_), v) => Err(mismatch("composite", v)),
    }
}

fn read_scalar(dec: &mut Decoder<'_>, kind: ValueKind) -> Result<Value, CodecError> {
    Ok(match kind {
        ValueKind::Bool => Value::Bool(dec.take_bool()?),
        ValueKind::Byte => Value::Byte(dec.take_byte()?),
        ValueKind::Short => Value::Short(dec.take_short()?),
        ValueKind::Char => Value::Char(dec.take_char()?),
        ValueKind::Int => Value::Int(dec.take_int()?),
        ValueKind::Float => Value::Float(dec.take_float()?),
        ValueKind::Long => Value::Long(dec.take_long()?),
        ValueKind::Double => Value::Double(dec.take_double()?),
        ValueKind::BigInt => Value::BigInt(dec.take_bigint()?),
        ValueKind::String => Value::String(dec.take_string()?),
        ValueKind::Bytes => Value::Bytes(dec.take_bytes()?),
        ValueKind::Address => Value::Address(dec.take_address()?),
        ValueKind::Null | ValueKind::List | ValueKind::Map | ValueKind::Composite => {
            return Err(CodecError::SchemaMismatch { expected: "scalar kind", found: kind.name() })
        }
    })
}

fn read_field(dec: &mut Decoder<'_>, ty: &FieldType) -> Result<Value, CodecError> {
    match ty {
        FieldType::Scalar(kind) => read_scalar(dec, *kind),
        FieldType::Nullable(inner) => {
            Ok(dec.take_nullable(|dec| read_field(dec, inner))?.unwrap_or(Value::Null))
        }
        FieldType::List(elem) => {
            let len = dec.open(FrameKind::List)?;
            let mut items = Vec::with_capacity(len.known().unwrap_or(0));
            while dec.more()? {
                items.push(read_field(dec, elem)?);
            }
            dec.close()?;
            Ok(Value::List(items))
        }
        FieldType::Map(kt, vt) => {
            let len = dec.open(FrameKind::Map)?;
            let mut entries = Vec::with_capacity(len.known().unwrap_or(0));
            while dec.more()? {
                let k = read_field(dec, kt)?;
                let v = read_field(dec, vt)?;
                entries.push((k, v));
            }
            dec.close()?;
            Ok(Value::Map(entries))
        }
        FieldType::Record(schema) => Ok(Value::Composite(dec.take_object(schema)?)),
        FieldType::Any => dec.take_value(),
    }
}

fn skip_field(dec: &mut Decoder<'_>, ty: &FieldType) -> Result<(), CodecError> {
    match ty {
        FieldType::Record(schema) => dec.skip_object(schema),
        // A present composite carries its marker on its first field.
        FieldType::Nullable(inner) => {
            if dec.try_read_null()? {
                Ok(())
            } else {
                skip_field(dec, inner)
            }
        }
        _ => dec.skip(),
    }
}
