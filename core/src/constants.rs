//! constants.rs
//! Wire tag registry, fixed widths, and default policy values.
//!
//! Design notes:
//! - Tag numbers are part of the interoperability contract. Never renumber.
//! - Defaults here feed `FeeSchedule::default()` and `CodecLimits::default()`.

/// Width of an account/contract address in bytes. Addresses are never length-prefixed.
pub const ADDRESS_LEN: usize = 21;

/// Wire tag identifiers (mirrored by `value::Tag`).
pub mod tag_ids {
    pub const NULL: u8         = 0x00;
    pub const BOOL: u8         = 0x01;
    pub const BYTE: u8         = 0x02;
    pub const SHORT: u8        = 0x03;
    pub const CHAR: u8         = 0x04;
    pub const INT: u8          = 0x05;
    pub const FLOAT: u8        = 0x06;
    pub const LONG: u8         = 0x07;
    pub const DOUBLE: u8       = 0x08;
    pub const BIGINT: u8       = 0x09;
    pub const STRING: u8       = 0x0A;
    pub const BYTES: u8        = 0x0B;
    pub const ADDRESS: u8      = 0x0C;

    pub const LIST: u8         = 0x10;
    pub const LIST_UNKNOWN: u8 = 0x11;
    pub const MAP: u8          = 0x12;
    pub const MAP_UNKNOWN: u8  = 0x13;

    pub const END: u8          = 0x1E;
    pub const TERMINATOR: u8   = 0x1F;
    pub const PRESENT: u8      = 0x20;
}

/// Default energy prices (see `meter::FeeSchedule`).
pub mod fee_defaults {
    pub const WRITE_BASE: u64     = 16;
    pub const WRITE_PER_BYTE: u64 = 1;
    pub const READ_BASE: u64      = 16;
    pub const READ_PER_BYTE: u64  = 1;
    pub const SKIP_PER_BYTE: u64  = 1;
    pub const BEGIN_BASE: u64     = 8;
    pub const END_BASE: u64       = 8;
    pub const HAS_NEXT: u64       = 4;
    pub const OBJECT_BASE: u64    = 32;
}

/// Maximum number of nested frames (lists, maps, composite records).
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Upper bound for any single length prefix (string, byte array, bigint, sequence count).
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 16 * 1024 * 1024; // 16 MiB

/// Longest accepted LEB128 length prefix (enough for a u64).
pub const MAX_VARINT_LEN: usize = 10;
