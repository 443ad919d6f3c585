//! value/types.rs
//! The closed value model shared by encoder and decoder.
//!
//! Design notes:
//! - `Value` has one constructor per wire variant; codecs match on it exhaustively.
//! - `Length` replaces the "-1 means unknown" convention with two explicit cases.
//! - `Value::Composite` carries no field names. Field order is agreed out-of-band
//!   through a schema (see `codec::schema`).

use std::fmt;
use num_bigint::BigInt;

use crate::constants::ADDRESS_LEN;
use crate::types::{CodecError, MalformedKind};
use crate::utils::fmt_bytes;
use crate::value::tag::Tag;

/// Declared length of a list or map frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Length {
    /// Element count for lists, pair count for maps.
    Known(usize),
    /// Closed by a terminator; iterate with `has_next`.
    Unknown,
}

impl Length {
    pub fn known(self) -> Option<usize> {
        match self {
            Length::Known(n) => Some(n),
            Length::Unknown => None,
        }
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, Length::Unknown)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Known(n) => write!(f, "{}", n),
            Length::Unknown => f.write_str("unknown"),
        }
    }
}

/// Fixed-width account or contract address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const LEN: usize = ADDRESS_LEN;

    pub const fn new(raw: [u8; ADDRESS_LEN]) -> Self {
        Self(raw)
    }

    /// Build from a slice; the width must match exactly.
    pub fn from_slice(raw: &[u8]) -> Result<Self, CodecError> {
        let arr: [u8; ADDRESS_LEN] = raw.try_into().map_err(|_| {
            CodecError::Malformed(MalformedKind::AddressWidth { have: raw.len(), need: ADDRESS_LEN })
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Kind of a value, independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Byte,
    Short,
    Char,
    Int,
    Float,
    Long,
    Double,
    BigInt,
    String,
    Bytes,
    Address,
    Null,
    List,
    Map,
    Composite,
}

impl ValueKind {
    /// Wire tag of a scalar kind. Containers and null have no single scalar tag.
    pub const fn scalar_tag(self) -> Option<Tag> {
        match self {
            ValueKind::Bool => Some(Tag::Bool),
            ValueKind::Byte => Some(Tag::Byte),
            ValueKind::Short => Some(Tag::Short),
            ValueKind::Char => Some(Tag::Char),
            ValueKind::Int => Some(Tag::Int),
            ValueKind::Float => Some(Tag::Float),
            ValueKind::Long => Some(Tag::Long),
            ValueKind::Double => Some(Tag::Double),
            ValueKind::BigInt => Some(Tag::BigInt),
            ValueKind::String => Some(Tag::String),
            ValueKind::Bytes => Some(Tag::Bytes),
            ValueKind::Address => Some(Tag::Address),
            ValueKind::Null | ValueKind::List | ValueKind::Map | ValueKind::Composite => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Byte => "byte",
            ValueKind::Short => "short",
            ValueKind::Char => "char",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Long => "long",
            ValueKind::Double => "double",
            ValueKind::BigInt => "bigint",
            ValueKind::String => "string",
            ValueKind::Bytes => "bytes",
            ValueKind::Address => "address",
            ValueKind::Null => "null",
            ValueKind::List => "list",
            ValueKind::Map => "map",
            ValueKind::Composite => "composite",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single encodable value.
#[derive(Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(i8),
    Short(i16),
    /// UTF-16 code unit.
    Char(u16),
    Int(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    BigInt(BigInt),
    String(String),
    Bytes(Vec<u8>),
    Address(Address),
    Null,
    /// Always re-encoded with a known length.
    List(Vec<Value>),
    /// Entries in wire order; keys are not deduplicated or sorted.
    Map(Vec<(Value, Value)>),
    /// Positional fields, no frame markers of its own.
    Composite(Vec<Value>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Byte(_) => ValueKind::Byte,
            Value::Short(_) => ValueKind::Short,
            Value::Char(_) => ValueKind::Char,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Long(_) => ValueKind::Long,
            Value::Double(_) => ValueKind::Double,
            Value::BigInt(_) => ValueKind::BigInt,
            Value::String(_) => ValueKind::String,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Address(_) => ValueKind::Address,
            Value::Null => ValueKind::Null,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
            Value::Composite(_) => ValueKind::Composite,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Number of wire values this value occupies in an enclosing list or map.
    ///
    /// One for every self-describing value; a composite is the sum of its fields.
    pub fn wire_width(&self) -> usize {
        match self {
            Value::Composite(fields) => fields.iter().map(Value::wire_width).sum(),
            _ => 1,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Byte(v) => write!(f, "Byte({})", v),
            Value::Short(v) => write!(f, "Short({})", v),
            Value::Char(v) => write!(f, "Char(0x{:04x})", v),
            Value::Int(v) => write!(f, "Int({})", v),
            Value::Float(v) => write!(f, "Float({})", v),
            Value::Long(v) => write!(f, "Long({})", v),
            Value::Double(v) => write!(f, "Double({})", v),
            Value::BigInt(v) => write!(f, "BigInt({})", v),
            Value::String(v) => write!(f, "String({:?})", v),
            Value::Bytes(v) => write!(f, "Bytes({})", fmt_bytes(v)),
            Value::Address(v) => write!(f, "{:?}", v),
            Value::Null => f.write_str("Null"),
            Value::List(v) => f.debug_tuple("List").field(v).finish(),
            Value::Map(v) => f.debug_tuple("Map").field(v).finish(),
            Value::Composite(v) => f.debug_tuple("Composite").field(v).finish(),
        }
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => Byte,
    i16 => Short,
    u16 => Char,
    i32 => Int,
    f32 => Float,
    i64 => Long,
    f64 => Double,
    BigInt => BigInt,
    String => String,
    Vec<u8> => Bytes,
    Address => Address,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
