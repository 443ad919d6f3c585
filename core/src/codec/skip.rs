//! codec/skip.rs
//! Wire-value span measurement.
//!
//! Design notes:
//! - Iterative: open containers live on an explicit stack, so hostile nesting costs
//!   heap bounded by `max_depth`, never call-stack depth.
//! - Measures without moving anything; the decoder charges the span before advancing.
//! - A wire value is any number of presence markers followed by one value.

use crate::config::CodecLimits;
use crate::types::{CodecError, MalformedKind};
use crate::utils::read_length;
use crate::value::{PayloadShape, Tag};

#[derive(Debug)]
enum Pending {
    /// Slots still owed; closes with `END`.
    Known(usize),
    /// Closes with `TERMINATOR`; maps must hold whole pairs.
    Unknown { map: bool, children: usize },
}

pub(crate) fn tag_at(buf: &[u8], pos: usize) -> Result<Tag, CodecError> {
    match buf.get(pos) {
        Some(&raw) => Tag::try_from_u8(raw),
        None => Err(CodecError::truncated(pos + 1, buf.len())),
    }
}

fn need(buf: &[u8], pos: usize, n: usize) -> Result<(), CodecError> {
    let have = buf.len().saturating_sub(pos);
    if have < n {
        return Err(CodecError::truncated(n, have));
    }
    Ok(())
}

/// Parse a frame count at `pos` and verify the input could hold that many slots plus a closer.
///
/// Returns the declared count (pairs for maps) and the prefix width.
pub(crate) fn sequence_count(buf: &[u8], pos: usize, map: bool, limits: &CodecLimits) -> Result<(usize, usize), CodecError> {
    let (count, header) = read_length(buf.get(pos..).unwrap_or_default())?;
    if count > limits.max_payload_len {
        return Err(CodecError::LimitExceeded { what: "sequence length", limit: limits.max_payload_len });
    }
    let slots = if map { count.saturating_mul(2) } else { count };
    let remaining = buf.len().saturating_sub(pos + header);
    if slots >= remaining {
        return Err(MalformedKind::LengthExceedsInput { declared: count, remaining }.into());
    }
    Ok((count, header))
}

/// Byte length of the wire value starting at `buf[0]`.
///
/// `depth_budget` is the number of additional frames that may be opened.
pub fn value_span(buf: &[u8], depth_budget: usize, limits: &CodecLimits) -> Result<usize, CodecError> {
    let mut pos = 0usize;
    let mut open: Vec<Pending> = Vec::new();

    loop {
        let mut tag = tag_at(buf, pos)?;

        // A terminator closes the innermost unknown-length container.
        let mut completed = if tag == Tag::Terminator {
            match open.last() {
                Some(Pending::Unknown { map, children }) => {
                    if *map && children % 2 != 0 {
                        return Err(CodecError::unexpected(tag, "after a dangling map key"));
                    }
                    pos += 1;
                    open.pop();
                    true
                }
                _ => return Err(CodecError::unexpected(tag, "where a value was expected")),
            }
        } else {
            while tag == Tag::Present {
                pos += 1;
                tag = tag_at(buf, pos)?;
            }
            match (tag, tag.payload_shape()) {
                (Tag::Null, _) => {
                    pos += 1;
                    true
                }
                (_, PayloadShape::Fixed(n)) => {
                    need(buf, pos + 1, n)?;
                    pos += 1 + n;
                    true
                }
                (_, PayloadShape::Prefixed) => {
                    let (len, header) = read_length(&buf[pos + 1..])?;
                    if len > limits.max_payload_len {
                        return Err(CodecError::LimitExceeded { what: "payload length", limit: limits.max_payload_len });
                    }
                    need(buf, pos + 1 + header, len)?;
                    pos += 1 + header + len;
                    true
                }
                (Tag::List | Tag::Map, PayloadShape::FrameCount) => {
                    if open.len() >= depth_budget {
                        return Err(CodecError::LimitExceeded { what: "nesting depth", limit: limits.max_depth });
                    }
                    let map = tag == Tag::Map;
                    let (count, header) = sequence_count(buf, pos + 1, map, limits)?;
                    pos += 1 + header;
                    open.push(Pending::Known(if map { count * 2 } else { count }));
                    false
                }
                (Tag::ListUnknown | Tag::MapUnknown, _) => {
                    if open.len() >= depth_budget {
                        return Err(CodecError::LimitExceeded { what: "nesting depth", limit: limits.max_depth });
                    }
                    pos += 1;
                    open.push(Pending::Unknown { map: tag == Tag::MapUnknown, children: 0 });
                    false
                }
                _ => return Err(CodecError::unexpected(tag, "where a value was expected")),
            }
        };

        // An empty known-length container closes straight away.
        if !completed {
            if let Some(Pending::Known(0)) = open.last() {
                expect_end(buf, pos)?;
                pos += 1;
                open.pop();
                completed = true;
            }
        }

        while completed {
            match open.last_mut() {
                None => return Ok(pos),
                Some(Pending::Known(rem)) => {
                    *rem -= 1;
                    if *rem == 0 {
                        expect_end(buf, pos)?;
                        pos += 1;
                        open.pop();
                    } else {
                        completed = false;
                    }
                }
                Some(Pending::Unknown { children, .. }) => {
                    *children += 1;
                    completed = false;
                }
            }
        }
    }
}

fn expect_end(buf: &[u8], pos: usize) -> Result<(), CodecError> {
    match tag_at(buf, pos)? {
        Tag::End => Ok(()),
        other => Err(CodecError::unexpected(other, "where end of a known-length frame was expected")),
    }
}
