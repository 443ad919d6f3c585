//! codec/encode.rs
//! Metered encoder.
//!
//! Design notes:
//! - Every emission computes its byte count first, charges the meter, and only then
//!   appends. A refused charge leaves the buffer ending at the last charged byte.
//! - Presence markers (`PRESENT`) are queued by the nullable entry points and emitted
//!   in front of the next token, inside that token's charge.
//! - After any failure the encoder is poisoned and rejects every further call.

use bytes::BufMut;
use num_bigint::BigInt;
use tracing::{debug, trace};

use crate::codec::schema::Schema;
use crate::codec::traits::Writable;
use crate::config::{CodecConfig, CodecLimits};
use crate::frame::{FrameKind, FrameStack, FrameState};
use crate::meter::{CostMeter, FeeSchedule};
use crate::telemetry::CodecCounters;
use crate::types::CodecError;
use crate::utils::{bigint_to_canonical, varint_len, write_varint};
use crate::value::{Address, Length, PayloadShape, Tag, Value};

/// Writes exactly one top-level value into an owned buffer, charging a cost meter.
pub struct Encoder<'m> {
    out: Vec<u8>,
    frames: FrameStack,
    meter: &'m mut dyn CostMeter,
    fees: FeeSchedule,
    limits: CodecLimits,
    counters: CodecCounters,
    /// Presence markers owed in front of the next token.
    pending_markers: usize,
    poisoned: bool,
}

impl<'m> Encoder<'m> {
    pub fn new(meter: &'m mut dyn CostMeter) -> Self {
        Self::with_config(meter, &CodecConfig::default())
    }

    pub fn with_config(meter: &'m mut dyn CostMeter, config: &CodecConfig) -> Self {
        Self {
            out: Vec::new(),
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

    /// Bytes physically emitted so far (including any truncated tail after a failure).
    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }

    pub fn bytes_written(&self) -> usize {
        self.out.len()
    }

    pub fn counters(&self) -> &CodecCounters {
        &self.counters
    }

    /// Number of open lists, maps and records.
    pub fn depth(&self) -> usize {
        self.frames.depth()
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Verify the top-level value is complete and hand over the bytes.
    pub fn finish(self) -> Result<Vec<u8>, CodecError> {
        if self.poisoned {
            return Err(CodecError::Poisoned);
        }
        if !self.frames.is_complete() || self.pending_markers != 0 {
            return Err(CodecError::FrameImbalance("top-level value incomplete or frames left open"));
        }
        debug!(
            bytes = self.out.len(),
            energy = self.counters.energy_charged,
            "encoder finished"
        );
        Ok(self.out)
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
                debug!(error = %e, offset = self.out.len(), "encoder poisoned");
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

    fn check_len(&self, len: usize, what: &'static str) -> Result<(), CodecError> {
        if len > self.limits.max_payload_len {
            return Err(CodecError::LimitExceeded { what, limit: self.limits.max_payload_len });
        }
        Ok(())
    }

    fn put_markers(&mut self) {
        for _ in 0..self.pending_markers {
            self.out.put_u8(Tag::Present.to_u8());
        }
        self.pending_markers = 0;
    }

    /// Emit one scalar token: markers, tag, optional length prefix, payload.
    pub(crate) fn put_scalar(&mut self, tag: Tag, payload: &[u8]) -> Result<(), CodecError> {
        self.frames.ensure_room()?;
        let prefixed = match tag.payload_shape() {
            PayloadShape::Fixed(n) => {
                debug_assert_eq!(n, payload.len(), "fixed payload width drift for {}", tag);
                false
            }
            PayloadShape::Prefixed => {
                self.check_len(payload.len(), "payload length")?;
                true
            }
            PayloadShape::Empty | PayloadShape::FrameCount => {
                return Err(CodecError::SchemaMismatch { expected: "scalar tag", found: tag.name() })
            }
        };
        let prefix = if prefixed { varint_len(payload.len() as u64) } else { 0 };
        let bytes = self.pending_markers + 1 + prefix + payload.len();
        self.charge(self.fees.write_cost(bytes))?;

        self.out.reserve(bytes);
        self.put_markers();
        self.out.put_u8(tag.to_u8());
        if prefixed {
            write_varint(&mut self.out, payload.len() as u64);
        }
        self.out.put_slice(payload);

        self.frames.claim(1)?;
        self.counters.add_value(bytes);
        Ok(())
    }

    /// Run `f` with one extra presence marker queued; `f` must emit a token.
    pub(crate) fn with_marker(&mut self, f: impl FnOnce(&mut Self) -> Result<(), CodecError>) -> Result<(), CodecError> {
        let before = self.pending_markers;
        self.pending_markers += 1;
        f(self)?;
        if self.pending_markers > before {
            return Err(CodecError::NullabilityViolation { found: Tag::Present });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Scalars
    // -----------------------------------------------------------------------

    pub(crate) fn put_bool(&mut self, v: bool) -> Result<(), CodecError> {
        self.put_scalar(Tag::Bool, &[u8::from(v)])
    }

    pub(crate) fn put_byte(&mut self, v: i8) -> Result<(), CodecError> {
        self.put_scalar(Tag::Byte, &v.to_be_bytes())
    }

    pub(crate) fn put_short(&mut self, v: i16) -> Result<(), CodecError> {
        self.put_scalar(Tag::Short, &v.to_be_bytes())
    }

    pub(crate) fn put_char(&mut self, v: u16) -> Result<(), CodecError> {
        self.put_scalar(Tag::Char, &v.to_be_bytes())
    }

    pub(crate) fn put_int(&mut self, v: i32) -> Result<(), CodecError> {
        self.put_scalar(Tag::Int, &v.to_be_bytes())
    }

    pub(crate) fn put_float(&mut self, v: f32) -> Result<(), CodecError> {
        self.put_scalar(Tag::Float, &v.to_bits().to_be_bytes())
    }

    pub(crate) fn put_long(&mut self, v: i64) -> Result<(), CodecError> {
        self.put_scalar(Tag::Long, &v.to_be_bytes())
    }

    pub(crate) fn put_double(&mut self, v: f64) -> Result<(), CodecError> {
        self.put_scalar(Tag::Double, &v.to_bits().to_be_bytes())
    }

    pub(crate) fn put_bigint(&mut self, v: &BigInt) -> Result<(), CodecError> {
        self.put_scalar(Tag::BigInt, &bigint_to_canonical(v))
    }

    pub(crate) fn put_str(&mut self, v: &str) -> Result<(), CodecError> {
        self.put_scalar(Tag::String, v.as_bytes())
    }

    pub(crate) fn put_bytes(&mut self, v: &[u8]) -> Result<(), CodecError> {
        self.put_scalar(Tag::Bytes, v)
    }

    pub(crate) fn put_address(&mut self, v: &Address) -> Result<(), CodecError> {
        self.put_scalar(Tag::Address, v.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Public write API
    // -----------------------------------------------------------------------

    /// Append the canonical encoding of `value`.
    pub fn write<T: Writable + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        self.guard(|enc| value.write_to(enc))
    }

    /// Presence marker then the value, or the null sentinel alone.
    pub fn write_nullable<T: Writable + ?Sized>(&mut self, value: Option<&T>) -> Result<(), CodecError> {
        self.guard(|enc| match value {
            None => enc.put_null(),
            Some(v) => enc.with_marker(|enc| v.write_to(enc)),
        })
    }

    /// Write each value positionally into the current frame.
    pub fn write_all<T: Writable>(&mut self, values: &[T]) -> Result<(), CodecError> {
        self.guard(|enc| values.iter().try_for_each(|v| v.write_to(enc)))
    }

    pub fn write_all_nullable<T: Writable>(&mut self, values: &[Option<T>]) -> Result<(), CodecError> {
        for v in values {
            self.write_nullable(v.as_ref())?;
        }
        Ok(())
    }

    /// Explicit null element, independent of the nullable wrapper path.
    pub fn write_null(&mut self) -> Result<(), CodecError> {
        self.guard(|enc| enc.put_null())
    }

    pub(crate) fn put_null(&mut self) -> Result<(), CodecError> {
        self.frames.ensure_room()?;
        let bytes = self.pending_markers + 1;
        self.charge(self.fees.write_cost(bytes))?;
        self.put_markers();
        self.out.put_u8(Tag::Null.to_u8());
        self.frames.claim(1)?;
        self.counters.add_null(bytes);
        Ok(())
    }

    /// Write any value of the closed model.
    pub fn write_value(&mut self, value: &Value) -> Result<(), CodecError> {
        self.guard(|enc| enc.put_value(value))
    }

    pub(crate) fn put_value(&mut self, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Bool(v) => self.put_bool(*v),
            Value::Byte(v) => self.put_byte(*v),
            Value::Short(v) => self.put_short(*v),
            Value::Char(v) => self.put_char(*v),
            Value::Int(v) => self.put_int(*v),
            Value::Float(v) => self.put_float(*v),
            Value::Long(v) => self.put_long(*v),
            Value::Double(v) => self.put_double(*v),
            Value::BigInt(v) => self.put_bigint(v),
            Value::String(v) => self.put_str(v),
            Value::Bytes(v) => self.put_bytes(v),
            Value::Address(v) => self.put_address(v),
            Value::Null => self.put_null(),
            Value::List(items) => {
                let wire = items.iter().map(Value::wire_width).sum();
                self.open(FrameKind::List, Length::Known(wire))?;
                items.iter().try_for_each(|v| self.put_value(v))?;
                self.close()
            }
            Value::Map(entries) => {
                let wire = entries.iter().map(|(k, v)| k.wire_width() + v.wire_width()).sum();
                self.open(FrameKind::Map, Length::Known(map_pairs(wire)?))?;
                for (k, v) in entries {
                    self.put_value(k)?;
                    self.put_value(v)?;
                }
                self.close()
            }
            Value::Composite(fields) => {
                self.open_record(fields.len())?;
                fields.iter().try_for_each(|v| self.put_value(v))?;
                self.close_record()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Composites
    // -----------------------------------------------------------------------

    /// Write a composite through its schema. Fields are positional and unmarked.
    pub fn write_object<S: Schema + ?Sized>(&mut self, schema: &S, value: &S::Target) -> Result<(), CodecError> {
        self.guard(|enc| enc.put_object(schema, value))
    }

    pub fn write_nullable_object<S: Schema + ?Sized>(
        &mut self,
        schema: &S,
        value: Option<&S::Target>,
    ) -> Result<(), CodecError> {
        self.guard(|enc| match value {
            None => enc.put_null(),
            Some(v) => enc.with_marker(|enc| enc.put_object(schema, v)),
        })
    }

    pub(crate) fn put_object<S: Schema + ?Sized>(&mut self, schema: &S, value: &S::Target) -> Result<(), CodecError> {
        self.open_record(schema.arity())?;
        schema.write_fields(self, value)?;
        self.close_record()
    }

    fn open_record(&mut self, arity: usize) -> Result<(), CodecError> {
        self.frames.open_record(arity)?;
        self.charge(self.fees.object_base)?;
        self.counters.add_record();
        Ok(())
    }

    fn close_record(&mut self) -> Result<(), CodecError> {
        self.frames.close_record()?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Frames
    // -----------------------------------------------------------------------

    pub fn begin_list(&mut self, length: Length) -> Result<(), CodecError> {
        self.guard(|enc| enc.open(FrameKind::List, length))
    }

    /// Presence marker, then a list header.
    pub fn begin_nullable_list(&mut self, length: Length) -> Result<(), CodecError> {
        self.guard(|enc| enc.with_marker(|enc| enc.open(FrameKind::List, length)))
    }

    /// `length` counts key/value pairs.
    pub fn begin_map(&mut self, length: Length) -> Result<(), CodecError> {
        self.guard(|enc| enc.open(FrameKind::Map, length))
    }

    pub fn begin_nullable_map(&mut self, length: Length) -> Result<(), CodecError> {
        self.guard(|enc| enc.with_marker(|enc| enc.open(FrameKind::Map, length)))
    }

    /// Open a known-length list, write every item, close it.
    pub fn write_list_of<T: Writable>(&mut self, items: &[T]) -> Result<(), CodecError> {
        self.guard(|enc| {
            let wire = items.iter().map(Writable::wire_width).sum();
            enc.open(FrameKind::List, Length::Known(wire))?;
            items.iter().try_for_each(|v| v.write_to(enc))?;
            enc.close()
        })
    }

    pub fn write_list_of_nullable<T: Writable>(&mut self, items: &[Option<T>]) -> Result<(), CodecError> {
        self.guard(|enc| {
            let wire = items.iter().map(|v| v.as_ref().map_or(1, Writable::wire_width)).sum();
            enc.open(FrameKind::List, Length::Known(wire))?;
            for item in items {
                match item {
                    None => enc.put_null()?,
                    Some(v) => enc.with_marker(|enc| v.write_to(enc))?,
                }
            }
            enc.close()
        })
    }

    /// Close the innermost list or map.
    pub fn end(&mut self) -> Result<(), CodecError> {
        self.guard(|enc| enc.close())
    }

    pub(crate) fn open(&mut self, kind: FrameKind, length: Length) -> Result<(), CodecError> {
        let (tag, count_len) = match (kind, length) {
            (FrameKind::List, Length::Known(n)) => (Tag::List, Some(n)),
            (FrameKind::List, Length::Unknown) => (Tag::ListUnknown, None),
            (FrameKind::Map, Length::Known(n)) => (Tag::Map, Some(n)),
            (FrameKind::Map, Length::Unknown) => (Tag::MapUnknown, None),
            _ => return Err(CodecError::FrameImbalance("only lists and maps open on the wire")),
        };
        if let Some(n) = count_len {
            self.check_len(n, "sequence length")?;
        }
        let header = self.pending_markers + 1 + count_len.map_or(0, |n| varint_len(n as u64));

        self.frames.ensure_can_open()?;
        self.charge(self.fees.begin_write_cost(header))?;
        self.frames.open_sequence(kind, length)?;

        self.put_markers();
        self.out.put_u8(tag.to_u8());
        if let Some(n) = count_len {
            write_varint(&mut self.out, n as u64);
        }
        self.counters.add_open(header);
        trace!(kind = %kind, length = %length, depth = self.frames.depth(), "begin");
        Ok(())
    }

    pub(crate) fn close(&mut self) -> Result<(), CodecError> {
        if self.pending_markers != 0 {
            return Err(CodecError::NullabilityViolation { found: Tag::Present });
        }
        let top = *self.frames.top();
        if top.kind.is_sequence() && matches!(top.state, FrameState::Unknown { .. }) {
            self.frames.mark_terminated();
        }
        let frame = self.frames.check_close_sequence()?;
        let closer = match frame.state {
            FrameState::Known { .. } => Tag::End,
            FrameState::Unknown { .. } => Tag::Terminator,
        };
        self.charge(self.fees.end_base)?;
        self.out.put_u8(closer.to_u8());
        self.frames.close_sequence()?;
        self.counters.add_close(1);
        trace!(kind = %frame.kind, children = frame.children, depth = self.frames.depth(), "end");
        Ok(())
    }
}

/// Pair count of a known-length map whose keys and values span `wire` values.
pub(crate) fn map_pairs(wire: usize) -> Result<usize, CodecError> {
    if wire % 2 != 0 {
        return Err(CodecError::FrameImbalance("map entries span an odd number of wire values"));
    }
    Ok(wire / 2)
}
