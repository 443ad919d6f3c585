//! codec/decode.rs
//! Metered decoder.
//!
//! Design notes:
//! - Each token is fully located and bounds-checked, then charged, then consumed.
//!   A refused charge leaves the position on the token boundary.
//! - Nullable entry points peek a presence marker and leave it pending; the next
//!   token read consumes it as part of its own charge.
//! - `end()` never skips unread children. Known frames must be exhausted; an
//!   unknown frame must sit on its terminator.
//! - After any failure the decoder is poisoned and rejects every further call.

use byteorder::{BigEndian, ByteOrder};
use num_bigint::BigInt;
use tracing::{debug, trace};

use crate::codec::schema::Schema;
use crate::codec::skip::{sequence_count, tag_at, value_span};
use crate::codec::traits::Readable;
use crate::config::{CodecConfig, CodecLimits};
use crate::frame::{FrameKind, FrameStack, FrameState};
use crate::meter::{CostMeter, FeeSchedule};
use crate::telemetry::CodecCounters;
use crate::types::{CodecError, MalformedKind};
use crate::utils::{bigint_from_canonical, read_length};
use crate::value::{Address, Length, PayloadShape, Tag, Value};

/// Reads exactly one top-level value from a borrowed buffer, charging a cost meter.
pub struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
    frames: FrameStack,
    meter: &'a mut dyn CostMeter,
    fees: FeeSchedule,
    limits: CodecLimits,
    counters: CodecCounters,
    /// Presence markers already observed in front of the next token.
    pending_markers: usize,
    poisoned: bool,
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8], meter: &'a mut dyn CostMeter) -> Self {
        Self::with_config(input, meter, &CodecConfig::default())
    }

    pub fn with_config(input: &'a [u8], meter: &'a mut dyn CostMeter, config: &CodecConfig) -> Self {
        Self {
            input,
            pos: 0,
            frames: FrameStack::new(config.limits.max_depth),
            meter,
            fees: config.fees,
            limits: config.limits,
            counters: CodecCounters::default(),
            pending_markers: 0,
            poisoned: false,
        }
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    pub fn depth(&self) -> usize {
        self.frames.depth()
    }

    pub fn counters(&self) -> &CodecCounters {
        &self.counters
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Verify the top-level value was consumed and nothing follows it.
    pub fn finish(self) -> Result<CodecCounters, CodecError> {
        if self.poisoned {
            return Err(CodecError::Poisoned);
        }
        if !self.frames.is_complete() {
            return Err(CodecError::FrameImbalance("top-level value not fully read"));
        }
        if self.pos < self.input.len() {
            return Err(MalformedKind::TrailingBytes(self.input.len() - self.pos).into());
        }
        debug!(
            bytes = self.pos,
            energy = self.counters.energy_charged,
            "decoder finished"
        );
        Ok(self.counters)
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    fn guard<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, CodecError>) -> Result<T, CodecError> {
        if self.poisoned {
            return Err(CodecError::Poisoned);
        }
        let res = f(self);
        if let Err(e) = &res {
            if !self.poisoned {
                debug!(error = %e, offset = self.pos, "decoder poisoned");
            }
            self.poisoned = true;
        }
        res
    }

    fn charge(&mut self, cost: u64) -> Result<(), CodecError> {
        self.meter.charge(cost)?;
        self.counters.add_charge(cost);
        Ok(())
    }

    fn advance(&mut self, bytes: usize) {
        self.pos += bytes;
        self.pending_markers = 0;
    }

    /// Tag of the next token, past any pending presence markers.
    fn peek_tag(&self) -> Result<Tag, CodecError> {
        tag_at(self.input, self.pos + self.pending_markers)
    }

    fn closer_error(&self, found: Tag) -> CodecError {
        if self.pending_markers > 0 {
            return CodecError::unexpected(found, "after a presence marker");
        }
        match (found, self.frames.top().state) {
            (Tag::Terminator, FrameState::Unknown { .. }) => CodecError::FrameImbalance("read past terminator"),
            _ => CodecError::unexpected(found, "where a value was expected"),
        }
    }

    fn mismatch(&self, found: Tag, expected: &'static str) -> CodecError {
        match found {
            Tag::Null | Tag::Present => CodecError::NullabilityViolation { found },
            Tag::End | Tag::Terminator => self.closer_error(found),
            _ => CodecError::SchemaMismatch { expected, found: found.name() },
        }
    }

    /// Locate the next value token. Returns the offset of its tag byte and the tag.
    fn value_start(&self) -> Result<(usize, Tag), CodecError> {
        self.frames.ensure_room()?;
        let tag_pos = self.pos + self.pending_markers;
        Ok((tag_pos, tag_at(self.input, tag_pos)?))
    }

    /// Consume one scalar token of kind `tag` and return its payload.
    fn take_scalar(&mut self, tag: Tag) -> Result<&'a [u8], CodecError> {
        let input = self.input;
        let (tag_pos, found) = self.value_start()?;
        if found != tag {
            return Err(self.mismatch(found, tag.name()));
        }
        let (body, header) = match tag.payload_shape() {
            PayloadShape::Fixed(n) => (n, 0),
            PayloadShape::Prefixed => {
                let (len, header) = read_length(&input[tag_pos + 1..])?;
                if len > self.limits.max_payload_len {
                    return Err(CodecError::LimitExceeded { what: "payload length", limit: self.limits.max_payload_len });
                }
                (len, header)
            }
            PayloadShape::Empty | PayloadShape::FrameCount => {
                return Err(CodecError::SchemaMismatch { expected: "scalar tag", found: tag.name() })
            }
        };
        let start = tag_pos + 1 + header;
        let have = input.len().saturating_sub(start);
        if have < body {
            return Err(CodecError::truncated(body, have));
        }
        let total = start + body - self.pos;

        self.charge(self.fees.read_cost(total))?;
        self.advance(total);
        self.frames.claim(1)?;
        self.counters.add_value(total);
        Ok(&input[start..start + body])
    }

    pub(crate) fn take_null(&mut self) -> Result<(), CodecError> {
        let (tag_pos, found) = self.value_start()?;
        if found != Tag::Null {
            return Err(self.mismatch(found, "null"));
        }
        let total = tag_pos + 1 - self.pos;
        self.charge(self.fees.read_cost(total))?;
        self.advance(total);
        self.frames.claim(1)?;
        self.counters.add_null(total);
        Ok(())
    }

    /// Peek a nullable head. `false` means a null sentinel is next (not consumed);
    /// `true` means a presence marker was found and is now pending.
    fn nullable_head(&mut self) -> Result<bool, CodecError> {
        self.frames.ensure_room()?;
        match self.peek_tag()? {
            Tag::Null => Ok(false),
            Tag::Present => {
                self.pending_markers += 1;
                Ok(true)
            }
            found @ (Tag::End | Tag::Terminator) => Err(self.closer_error(found)),
            found => Err(CodecError::NullabilityViolation { found }),
        }
    }

    /// Run `f` on a value whose presence marker is pending; `f` must consume a token.
    fn with_marker<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, CodecError>) -> Result<T, CodecError> {
        let out = f(self)?;
        if self.pending_markers != 0 {
            return Err(CodecError::NullabilityViolation { found: Tag::Present });
        }
        Ok(out)
    }

    // -----------------------------------------------------------------------
    // Scalars
    // -----------------------------------------------------------------------

    pub(crate) fn take_bool(&mut self) -> Result<bool, CodecError> {
        match self.take_scalar(Tag::Bool)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(MalformedKind::InvalidBool(other).into()),
        }
    }

    pub(crate) fn take_byte(&mut self) -> Result<i8, CodecError> {
        Ok(self.take_scalar(Tag::Byte)?[0] as i8)
    }

    pub(crate) fn take_short(&mut self) -> Result<i16, CodecError> {
        Ok(BigEndian::read_i16(self.take_scalar(Tag::Short)?))
    }

    pub(crate) fn take_char(&mut self) -> Result<u16, CodecError> {
        Ok(BigEndian::read_u16(self.take_scalar(Tag::Char)?))
    }

    pub(crate) fn take_int(&mut self) -> Result<i32, CodecError> {
        Ok(BigEndian::read_i32(self.take_scalar(Tag::Int)?))
    }

    pub(crate) fn take_float(&mut self) -> Result<f32, CodecError> {
        Ok(f32::from_bits(BigEndian::read_u32(self.take_scalar(Tag::Float)?)))
    }

    pub(crate) fn take_long(&mut self) -> Result<i64, CodecError> {
        Ok(BigEndian::read_i64(self.take_scalar(Tag::Long)?))
    }

    pub(crate) fn take_double(&mut self) -> Result<f64, CodecError> {
        Ok(f64::from_bits(BigEndian::read_u64(self.take_scalar(Tag::Double)?)))
    }

    pub(crate) fn take_bigint(&mut self) -> Result<BigInt, CodecError> {
        bigint_from_canonical(self.take_scalar(Tag::BigInt)?)
    }

    pub(crate) fn take_string(&mut self) -> Result<String, CodecError> {
        let raw = self.take_scalar(Tag::String)?;
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|_| MalformedKind::InvalidUtf8.into())
    }

    pub(crate) fn take_bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        Ok(self.take_scalar(Tag::Bytes)?.to_vec())
    }

    pub(crate) fn take_address(&mut self) -> Result<Address, CodecError> {
        Address::from_slice(self.take_scalar(Tag::Address)?)
    }

    /// Dynamic read; composites never appear.
    ///
    /// A presence marker not already consumed by a nullable entry point is a
    /// `NullabilityViolation`.
    pub(crate) fn take_value(&mut self) -> Result<Value, CodecError> {
        let (_, tag) = self.value_start()?;
        Ok(match tag {
            Tag::Null => {
                self.take_null()?;
                Value::Null
            }
            Tag::Bool => Value::Bool(self.take_bool()?),
            Tag::Byte => Value::Byte(self.take_byte()?),
            Tag::Short => Value::Short(self.take_short()?),
            Tag::Char => Value::Char(self.take_char()?),
            Tag::Int => Value::Int(self.take_int()?),
            Tag::Float => Value::Float(self.take_float()?),
            Tag::Long => Value::Long(self.take_long()?),
            Tag::Double => Value::Double(self.take_double()?),
            Tag::BigInt => Value::BigInt(self.take_bigint()?),
            Tag::String => Value::String(self.take_string()?),
            Tag::Bytes => Value::Bytes(self.take_bytes()?),
            Tag::Address => Value::Address(self.take_address()?),
            Tag::List | Tag::ListUnknown => {
                let len = self.open(FrameKind::List)?;
                let mut items = Vec::with_capacity(len.known().unwrap_or(0));
                while self.more()? {
                    items.push(self.take_value()?);
                }
                self.close()?;
                Value::List(items)
            }
            Tag::Map | Tag::MapUnknown => {
                let len = self.open(FrameKind::Map)?;
                let mut entries = Vec::with_capacity(len.known().unwrap_or(0));
                while self.more()? {
                    let key = self.take_value()?;
                    let value = self.take_value()?;
                    entries.push((key, value));
                }
                self.close()?;
                Value::Map(entries)
            }
            Tag::Present => return Err(CodecError::NullabilityViolation { found: Tag::Present }),
            found @ (Tag::End | Tag::Terminator) => return Err(self.closer_error(found)),
        })
    }

    // -----------------------------------------------------------------------
    // Public read API
    // -----------------------------------------------------------------------

    pub fn read<T: Readable>(&mut self) -> Result<T, CodecError> {
        self.guard(|dec| T::read_from(dec))
    }

    /// `default` when the current frame has no further element; charges nothing in that case.
    pub fn read_or_default<T: Readable>(&mut self, default: T) -> Result<T, CodecError> {
        self.guard(|dec| if dec.peek_more()? { T::read_from(dec) } else { Ok(default) })
    }

    pub fn read_nullable<T: Readable>(&mut self) -> Result<Option<T>, CodecError> {
        self.guard(|dec| dec.take_nullable(T::read_from))
    }

    pub fn read_nullable_or_default<T: Readable>(&mut self, default: Option<T>) -> Result<Option<T>, CodecError> {
        self.guard(|dec| {
            if dec.peek_more()? {
                dec.take_nullable(T::read_from)
            } else {
                Ok(default)
            }
        })
    }

    pub(crate) fn take_nullable<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, CodecError>) -> Result<Option<T>, CodecError> {
        if self.nullable_head()? {
            self.with_marker(f).map(Some)
        } else {
            self.take_null().map(|_| None)
        }
    }

    /// Read any value of the closed model.
    pub fn read_value(&mut self) -> Result<Value, CodecError> {
        self.guard(|dec| dec.take_value())
    }

    /// Consume a null sentinel if one is next. Consumes nothing otherwise.
    pub fn try_read_null(&mut self) -> Result<bool, CodecError> {
        self.guard(|dec| {
            if !dec.frames.has_room() || dec.peek_tag()? != Tag::Null {
                return Ok(false);
            }
            dec.take_null()?;
            Ok(true)
        })
    }

    // -----------------------------------------------------------------------
    // Composites
    // -----------------------------------------------------------------------

    pub fn read_object<S: Schema + ?Sized>(&mut self, schema: &S) -> Result<S::Target, CodecError> {
        self.guard(|dec| dec.take_object(schema))
    }

    pub fn read_nullable_object<S: Schema + ?Sized>(&mut self, schema: &S) -> Result<Option<S::Target>, CodecError> {
        self.guard(|dec| dec.take_nullable(|dec| dec.take_object(schema)))
    }

    pub(crate) fn take_object<S: Schema + ?Sized>(&mut self, schema: &S) -> Result<S::Target, CodecError> {
        self.frames.open_record(schema.arity())?;
        self.charge(self.fees.object_base)?;
        self.counters.add_record();
        let value = schema.read_fields(self)?;
        self.frames.close_record()?;
        Ok(value)
    }

    // -----------------------------------------------------------------------
    // Frames
    // -----------------------------------------------------------------------

    pub fn begin_list(&mut self) -> Result<Length, CodecError> {
        self.guard(|dec| dec.open(FrameKind::List))
    }

    /// Pair count for known-length maps.
    pub fn begin_map(&mut self) -> Result<Length, CodecError> {
        self.guard(|dec| dec.open(FrameKind::Map))
    }

    /// Like `begin_list` but expects the nullable form; a null here is an error.
    pub fn begin_nullable_list(&mut self) -> Result<Length, CodecError> {
        self.guard(|dec| dec.open_present(FrameKind::List))
    }

    pub fn begin_nullable_map(&mut self) -> Result<Length, CodecError> {
        self.guard(|dec| dec.open_present(FrameKind::Map))
    }

    /// `None` (null consumed) or the length of the opened list.
    pub fn try_begin_nullable_list(&mut self) -> Result<Option<Length>, CodecError> {
        self.guard(|dec| dec.take_nullable(|dec| dec.open(FrameKind::List)))
    }

    pub fn try_begin_nullable_map(&mut self) -> Result<Option<Length>, CodecError> {
        self.guard(|dec| dec.take_nullable(|dec| dec.open(FrameKind::Map)))
    }

    /// Whether the innermost frame has another element.
    pub fn has_next(&mut self) -> Result<bool, CodecError> {
        self.guard(|dec| dec.more())
    }

    pub fn end(&mut self) -> Result<(), CodecError> {
        self.guard(|dec| dec.close())
    }

    fn open_present(&mut self, kind: FrameKind) -> Result<Length, CodecError> {
        if !self.nullable_head()? {
            return Err(CodecError::NullabilityViolation { found: Tag::Null });
        }
        self.with_marker(|dec| dec.open(kind))
    }

    pub(crate) fn open(&mut self, kind: FrameKind) -> Result<Length, CodecError> {
        let input = self.input;
        let (tag_pos, found) = self.value_start()?;
        let known = match (kind, found) {
            (FrameKind::List, Tag::List) | (FrameKind::Map, Tag::Map) => true,
            (FrameKind::List, Tag::ListUnknown) | (FrameKind::Map, Tag::MapUnknown) => false,
            (FrameKind::Map, _) => return Err(self.mismatch(found, "map")),
            _ => return Err(self.mismatch(found, "list")),
        };
        let (length, count_len) = if known {
            let (count, width) = sequence_count(input, tag_pos + 1, kind == FrameKind::Map, &self.limits)?;
            (Length::Known(count), width)
        } else {
            (Length::Unknown, 0)
        };
        let header = tag_pos + 1 + count_len - self.pos;

        self.frames.ensure_can_open()?;
        self.charge(self.fees.begin_read_cost(header))?;
        self.frames.open_sequence(kind, length)?;
        self.advance(header);
        self.counters.add_open(header);
        trace!(kind = %kind, length = %length, depth = self.frames.depth(), "begin");
        Ok(length)
    }

    pub(crate) fn more(&mut self) -> Result<bool, CodecError> {
        self.charge(self.fees.has_next)?;
        self.peek_more()
    }

    /// Uncharged lookahead. Observing a terminator marks the frame terminated.
    fn peek_more(&mut self) -> Result<bool, CodecError> {
        let top = *self.frames.top();
        match top.state {
            FrameState::Known { remaining } => {
                Ok(remaining > 0 && (top.kind != FrameKind::Root || self.pos < self.input.len()))
            }
            FrameState::Unknown { terminated: true } => Ok(false),
            FrameState::Unknown { terminated: false } => {
                if self.pending_markers == 0 && tag_at(self.input, self.pos)? == Tag::Terminator {
                    self.frames.mark_terminated();
                    return Ok(false);
                }
                Ok(true)
            }
        }
    }

    pub(crate) fn close(&mut self) -> Result<(), CodecError> {
        if self.pending_markers != 0 {
            return Err(CodecError::NullabilityViolation { found: Tag::Present });
        }
        let top = *self.frames.top();
        if top.kind.is_sequence() && top.state == (FrameState::Unknown { terminated: false }) {
            // Sitting on the terminator counts as observing it; unread children do not.
            if tag_at(self.input, self.pos)? == Tag::Terminator {
                self.frames.mark_terminated();
            }
        }
        let frame = self.frames.check_close_sequence()?;
        let closer = match frame.state {
            FrameState::Known { .. } => Tag::End,
            FrameState::Unknown { .. } => Tag::Terminator,
        };
        let found = tag_at(self.input, self.pos)?;
        if found != closer {
            return Err(CodecError::unexpected(found, "where a frame closer was expected"));
        }
        self.charge(self.fees.end_base)?;
        self.advance(1);
        self.frames.close_sequence()?;
        self.counters.add_close(1);
        trace!(kind = %frame.kind, children = frame.children, depth = self.frames.depth(), "end");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Skipping
    // -----------------------------------------------------------------------

    /// Pass over the next wire value without materializing it.
    pub fn skip(&mut self) -> Result<(), CodecError> {
        self.guard(|dec| dec.skip_one())
    }

    pub fn skip_many(&mut self, count: usize) -> Result<(), CodecError> {
        self.guard(|dec| (0..count).try_for_each(|_| dec.skip_one()))
    }

    /// Pass over a composite laid out by `schema`.
    pub fn skip_object<S: Schema + ?Sized>(&mut self, schema: &S) -> Result<(), CodecError> {
        self.guard(|dec| {
            dec.frames.open_record(schema.arity())?;
            schema.skip_fields(dec)?;
            dec.frames.close_record()?;
            Ok(())
        })
    }

    /// Skip every unread element of the innermost list or map; `end()` still closes it.
    pub fn skip_remaining(&mut self) -> Result<(), CodecError> {
        self.guard(|dec| {
            let top = *dec.frames.top();
            match (top.kind, top.state) {
                (FrameKind::Record, _) => Err(CodecError::FrameImbalance("skip_remaining inside a composite record")),
                (_, FrameState::Known { remaining }) => (0..remaining).try_for_each(|_| dec.skip_one()),
                (_, FrameState::Unknown { .. }) => {
                    while dec.peek_more()? {
                        dec.skip_one()?;
                    }
                    Ok(())
                }
            }
        })
    }

    fn skip_one(&mut self) -> Result<(), CodecError> {
        self.frames.ensure_room()?;
        let top = *self.frames.top();
        if self.pending_markers == 0
            && matches!(top.state, FrameState::Unknown { .. })
            && tag_at(self.input, self.pos)? == Tag::Terminator
        {
            return Err(CodecError::FrameImbalance("skip past terminator"));
        }
        let depth_budget = self.limits.max_depth.saturating_sub(self.frames.depth());
        let span = value_span(&self.input[self.pos..], depth_budget, &self.limits)?;

        self.charge(self.fees.skip_cost(span))?;
        self.advance(span);
        self.frames.claim(1)?;
        self.counters.add_skip(span);
        trace!(bytes = span, depth = self.frames.depth(), "skip");
        Ok(())
    }
}
