//! value/tag.rs
//! Wire tags and their payload shapes.
//!
//! Design notes:
//! - One byte per tag; the registry lives in `constants::tag_ids`.
//! - `Tag::payload_shape` is the single source of truth for how many bytes follow a tag.
//!   Encoder, decoder and skip all route through it to avoid format drift.

use std::fmt;
use num_enum::TryFromPrimitive;

use crate::constants::{tag_ids, ADDRESS_LEN};
use crate::types::{CodecError, MalformedKind};

/// Wire tag identifiers.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum Tag {
    Null        = tag_ids::NULL,
    Bool        = tag_ids::BOOL,
    Byte        = tag_ids::BYTE,
    Short       = tag_ids::SHORT,
    Char        = tag_ids::CHAR,
    Int         = tag_ids::INT,
    Float       = tag_ids::FLOAT,
    Long        = tag_ids::LONG,
    Double      = tag_ids::DOUBLE,
    BigInt      = tag_ids::BIGINT,
    String      = tag_ids::STRING,
    Bytes       = tag_ids::BYTES,
    Address     = tag_ids::ADDRESS,
    List        = tag_ids::LIST,
    ListUnknown = tag_ids::LIST_UNKNOWN,
    Map         = tag_ids::MAP,
    MapUnknown  = tag_ids::MAP_UNKNOWN,
    End         = tag_ids::END,
    Terminator  = tag_ids::TERMINATOR,
    Present     = tag_ids::PRESENT,
}

/// What follows a tag on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// Nothing (null, unknown-length frame openers, closers, presence marker).
    Empty,
    /// Exactly `n` raw bytes.
    Fixed(usize),
    /// LEB128 byte count followed by that many bytes.
    Prefixed,
    /// LEB128 element (or pair) count opening a known-length frame.
    FrameCount,
}

impl Tag {
    /// Canonical wire byte.
    #[inline(always)]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Decode a tag byte, rejecting anything outside the registry.
    #[inline]
    pub fn try_from_u8(raw: u8) -> Result<Self, CodecError> {
        Tag::try_from_primitive(raw).map_err(|_| CodecError::Malformed(MalformedKind::UnknownTag(raw)))
    }

    pub const fn payload_shape(self) -> PayloadShape {
        match self {
            Tag::Bool | Tag::Byte => PayloadShape::Fixed(1),
            Tag::Short | Tag::Char => PayloadShape::Fixed(2),
            Tag::Int | Tag::Float => PayloadShape::Fixed(4),
            Tag::Long | Tag::Double => PayloadShape::Fixed(8),
            Tag::Address => PayloadShape::Fixed(ADDRESS_LEN),
            Tag::BigInt | Tag::String | Tag::Bytes => PayloadShape::Prefixed,
            Tag::List | Tag::Map => PayloadShape::FrameCount,
            Tag::Null
            | Tag::ListUnknown
            | Tag::MapUnknown
            | Tag::End
            | Tag::Terminator
            | Tag::Present => PayloadShape::Empty,
        }
    }

    /// True for tags that may start a value (everything except closers).
    pub const fn starts_value(self) -> bool {
        !matches!(self, Tag::End | Tag::Terminator)
    }

    /// True for the four frame-opening tags.
    pub const fn opens_frame(self) -> bool {
        matches!(self, Tag::List | Tag::ListUnknown | Tag::Map | Tag::MapUnknown)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Tag::Null => "null",
            Tag::Bool => "bool",
            Tag::Byte => "byte",
            Tag::Short => "short",
            Tag::Char => "char",
            Tag::Int => "int",
            Tag::Float => "float",
            Tag::Long => "long",
            Tag::Double => "double",
            Tag::BigInt => "bigint",
            Tag::String => "string",
            Tag::Bytes => "bytes",
            Tag::Address => "address",
            Tag::List => "list",
            Tag::ListUnknown => "list(unknown)",
            Tag::Map => "map",
            Tag::MapUnknown => "map(unknown)",
            Tag::End => "end",
            Tag::Terminator => "terminator",
            Tag::Present => "present",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
