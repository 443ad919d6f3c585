//! utils.rs
//! Shared wire helpers: length prefixes, canonical big integers, display.

use bytes::BufMut;
use num_bigint::BigInt;

use crate::constants::MAX_VARINT_LEN;
use crate::types::{CodecError, MalformedKind};

pub fn fmt_bytes(b: &[u8]) -> String {
    if !b.is_empty() && b.iter().all(|&c| c.is_ascii_graphic() || c == b' ') {
        format!("b\"{}\"", String::from_utf8_lossy(b))
    } else {
        format!("0x{}", hex::encode(b))
    }
}

// ---------------------------------------------------------------------------
// LEB128 length prefixes
// ---------------------------------------------------------------------------

/// Number of bytes `write_varint` emits for `v`.
pub fn varint_len(mut v: u64) -> usize {
    let mut n = 1;
    while v >= 0x80 {
        v >>= 7;
        n += 1;
    }
    n
}

pub fn write_varint<B: BufMut>(out: &mut B, mut v: u64) {
    while v >= 0x80 {
        out.put_u8((v as u8 & 0x7f) | 0x80);
        v >>= 7;
    }
    out.put_u8(v as u8);
}

/// Parse a minimal unsigned LEB128 at the start of `buf`.
///
/// Returns the value and the number of bytes it occupies.
pub fn read_varint(buf: &[u8]) -> Result<(u64, usize), CodecError> {
    let mut value: u64 = 0;
    for (i, &byte) in buf.iter().enumerate() {
        if i >= MAX_VARINT_LEN {
            return Err(MalformedKind::VarintOverflow.into());
        }
        let low = u64::from(byte & 0x7f);
        let shift = 7 * i as u32;
        // 10th group may only carry the top bit of a u64.
        if i == MAX_VARINT_LEN - 1 && low > 1 {
            return Err(MalformedKind::VarintOverflow.into());
        }
        value |= low << shift;
        if byte & 0x80 == 0 {
            if i > 0 && byte == 0 {
                return Err(MalformedKind::NonCanonicalVarint.into());
            }
            return Ok((value, i + 1));
        }
    }
    Err(CodecError::truncated(buf.len() + 1, buf.len()))
}

/// Parse a length prefix and narrow it to `usize`.
pub fn read_length(buf: &[u8]) -> Result<(usize, usize), CodecError> {
    let (v, n) = read_varint(buf)?;
    let len = usize::try_from(v).map_err(|_| CodecError::Malformed(MalformedKind::VarintOverflow))?;
    Ok((len, n))
}

// ---------------------------------------------------------------------------
// Canonical big integers
// ---------------------------------------------------------------------------

/// Minimal two's-complement big-endian bytes; zero is the empty payload.
pub fn bigint_to_canonical(v: &BigInt) -> Vec<u8> {
    if v.sign() == num_bigint::Sign::NoSign {
        return Vec::new();
    }
    v.to_signed_bytes_be()
}

/// Inverse of `bigint_to_canonical`, rejecting every non-minimal form.
pub fn bigint_from_canonical(payload: &[u8]) -> Result<BigInt, CodecError> {
    match payload {
        [] => Ok(BigInt::default()),
        [0x00] => Err(MalformedKind::NonCanonicalBigInt.into()),
        [0x00, next, ..] if next & 0x80 == 0 => Err(MalformedKind::NonCanonicalBigInt.into()),
        [0xff, next, ..] if next & 0x80 != 0 => Err(MalformedKind::NonCanonicalBigInt.into()),
        _ => Ok(BigInt::from_signed_bytes_be(payload)),
    }
}
