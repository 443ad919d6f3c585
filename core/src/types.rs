//! types.rs
//! Unified codec error.
//!
//! Design notes:
//! - Every public encoder/decoder operation returns `Result<_, CodecError>`.
//! - All variants are fatal for the current top-level value: the codec that raised
//!   one is poisoned and the caller discards any partial output.
//! - Messages aim to be stable and contextual for logs.

use thiserror::Error;

use crate::meter::OutOfBudget;
use crate::value::Tag;

/// Why a byte stream was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedKind {
    /// Fewer bytes remain than the next token requires.
    #[error("truncated input: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    /// Byte outside the tag registry.
    #[error("unknown tag byte 0x{0:02x}")]
    UnknownTag(u8),

    /// Known tag in a position where it cannot appear.
    #[error("unexpected {found} tag {context}")]
    UnexpectedTag { found: Tag, context: &'static str },

    /// Length prefix with redundant continuation groups.
    #[error("non-canonical length prefix")]
    NonCanonicalVarint,

    /// Length prefix longer than a u64 or larger than usize.
    #[error("length prefix overflow")]
    VarintOverflow,

    /// Declared length larger than what the remaining input could hold.
    #[error("declared length {declared} exceeds remaining input {remaining}")]
    LengthExceedsInput { declared: usize, remaining: usize },

    /// Boolean payload other than 0 or 1.
    #[error("invalid boolean byte 0x{0:02x}")]
    InvalidBool(u8),

    /// BigInteger payload with a redundant sign byte or a non-empty zero.
    #[error("non-canonical big integer encoding")]
    NonCanonicalBigInt,

    /// String payload is not UTF-8.
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    /// Address with the wrong width.
    #[error("address width {have}, need {need}")]
    AddressWidth { have: usize, need: usize },

    /// Bytes left after the top-level value.
    #[error("{0} trailing bytes after top-level value")]
    TrailingBytes(usize),
}

/// Codec failure taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The cost meter refused a charge.
    #[error(transparent)]
    OutOfBudget(#[from] OutOfBudget),

    /// Unrecognized tag, truncated buffer, or inconsistent length prefix.
    #[error("malformed stream: {0}")]
    Malformed(#[from] MalformedKind),

    /// `end()` without an open frame or before the frame is satisfied,
    /// a write/read past a declared length, or completion with open frames.
    #[error("frame imbalance: {0}")]
    FrameImbalance(&'static str),

    /// The requested kind does not match what is encoded (or what a schema declares).
    #[error("schema mismatch: expected {expected}, found {found}")]
    SchemaMismatch { expected: &'static str, found: &'static str },

    /// A composite schema wrote/read a different number of fields than it declares.
    #[error("composite arity mismatch: schema declares {expected} fields, got {actual}")]
    Arity { expected: usize, actual: usize },

    /// Null where a value is required, or nullable framing where none was written.
    #[error("nullability violation: found {found}")]
    NullabilityViolation { found: Tag },

    /// A configured limit (nesting depth, payload length) was exceeded.
    #[error("{what} exceeds limit {limit}")]
    LimitExceeded { what: &'static str, limit: usize },

    /// A previous call on this codec failed; the codec accepts no further calls.
    #[error("codec is poisoned by an earlier failure")]
    Poisoned,
}

impl CodecError {
    pub(crate) fn truncated(need: usize, have: usize) -> Self {
        CodecError::Malformed(MalformedKind::Truncated { need, have })
    }

    pub(crate) fn unexpected(found: Tag, context: &'static str) -> Self {
        CodecError::Malformed(MalformedKind::UnexpectedTag { found, context })
    }

    /// True when the failure came from the cost meter.
    pub fn is_out_of_budget(&self) -> bool {
        matches!(self, CodecError::OutOfBudget(_))
    }
}
