//! frame/stack.rs
//! LIFO ledger of open frames shared by encoder and decoder.
//!
//! Design notes:
//! - The root frame is always present and is never popped.
//! - List and map frames count wire values; a composite with k wire values
//!   occupies k slots of its enclosing sequence.
//! - Record frames count logical fields and forward their wire-value count to the
//!   parent when they close.

use crate::frame::types::{Frame, FrameKind, FrameState};
use crate::types::CodecError;
use crate::value::Length;

#[derive(Debug, Clone)]
pub struct FrameStack {
    frames: Vec<Frame>,
    max_depth: usize,
}

impl FrameStack {
    pub fn new(max_depth: usize) -> Self {
        Self { frames: vec![Frame::root()], max_depth }
    }

    /// Number of open frames above the root.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn top(&self) -> &Frame {
        // Root is pushed in `new` and never popped.
        &self.frames[self.frames.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Top-level value fully written/read and no frame left open.
    pub fn is_complete(&self) -> bool {
        self.depth() == 0 && self.top().is_satisfied()
    }

    /// Whether the current frame can take one more child without error.
    pub fn has_room(&self) -> bool {
        match self.top().state {
            FrameState::Known { remaining } => remaining > 0,
            FrameState::Unknown { terminated } => !terminated,
        }
    }

    /// Fail unless the current frame can accept another child value.
    pub fn ensure_room(&self) -> Result<(), CodecError> {
        if self.has_room() {
            return Ok(());
        }
        let top = self.top();
        Err(match (top.kind, top.state) {
            (FrameKind::Root, _) => CodecError::FrameImbalance("top-level value already complete"),
            (FrameKind::Record, _) => CodecError::Arity {
                expected: top.declared,
                actual: top.declared + 1,
            },
            (_, FrameState::Known { .. }) => CodecError::FrameImbalance("child past declared length"),
            (_, FrameState::Unknown { .. }) => CodecError::FrameImbalance("child after terminator"),
        })
    }

    /// Record one direct child occupying `wire` wire values.
    pub fn claim(&mut self, wire: usize) -> Result<(), CodecError> {
        let top = self.top_mut();
        match (top.kind, &mut top.state) {
            (FrameKind::Root | FrameKind::Record, FrameState::Known { remaining }) => {
                if *remaining == 0 {
                    return self.ensure_room();
                }
                *remaining -= 1;
            }
            (_, FrameState::Known { remaining }) => {
                if wire > *remaining {
                    return Err(CodecError::FrameImbalance("child past declared length"));
                }
                *remaining -= wire;
            }
            (_, FrameState::Unknown { terminated }) => {
                if *terminated {
                    return Err(CodecError::FrameImbalance("child after terminator"));
                }
            }
        }
        top.children += wire;
        Ok(())
    }

    fn check_depth(&self) -> Result<(), CodecError> {
        if self.depth() >= self.max_depth {
            return Err(CodecError::LimitExceeded { what: "nesting depth", limit: self.max_depth });
        }
        Ok(())
    }

    /// Fail unless a list or map could open here. Mutates nothing.
    pub fn ensure_can_open(&self) -> Result<(), CodecError> {
        self.check_depth()?;
        self.ensure_room()
    }

    /// Open a list or map as one child of the current frame.
    ///
    /// Map lengths are pair counts; the frame owes two slots per pair.
    pub fn open_sequence(&mut self, kind: FrameKind, length: Length) -> Result<(), CodecError> {
        debug_assert!(kind.is_sequence());
        self.check_depth()?;
        let frame = match length {
            Length::Known(n) => {
                let slots = if kind == FrameKind::Map {
                    n.checked_mul(2).ok_or(CodecError::LimitExceeded {
                        what: "map pair count",
                        limit: usize::MAX / 2,
                    })?
                } else {
                    n
                };
                Frame::known(kind, slots)
            }
            Length::Unknown => Frame::unknown(kind),
        };
        self.claim(1)?;
        self.frames.push(frame);
        Ok(())
    }

    /// Mark the current unknown-length frame as terminated.
    pub fn mark_terminated(&mut self) {
        if let FrameState::Unknown { terminated } = &mut self.top_mut().state {
            *terminated = true;
        }
    }

    /// Validate that the current list or map could close, without popping it.
    pub fn check_close_sequence(&self) -> Result<Frame, CodecError> {
        let top = *self.top();
        match top.kind {
            FrameKind::Root => return Err(CodecError::FrameImbalance("end without an open frame")),
            FrameKind::Record => return Err(CodecError::FrameImbalance("end inside a composite record")),
            FrameKind::List | FrameKind::Map => {}
        }
        if !top.is_satisfied() {
            return Err(CodecError::FrameImbalance(match top.state {
                FrameState::Known { .. } => "end before declared length is satisfied",
                FrameState::Unknown { terminated: false } => "end before terminator",
                FrameState::Unknown { terminated: true } => "map closed with a dangling key",
            }));
        }
        Ok(top)
    }

    /// Close the current list or map. The frame must be satisfied.
    pub fn close_sequence(&mut self) -> Result<Frame, CodecError> {
        let top = self.check_close_sequence()?;
        self.frames.pop();
        Ok(top)
    }

    /// Open a composite record of `arity` fields. Claims nothing until it closes.
    pub fn open_record(&mut self, arity: usize) -> Result<(), CodecError> {
        self.check_depth()?;
        self.ensure_room()?;
        self.frames.push(Frame::known(FrameKind::Record, arity));
        Ok(())
    }

    /// Close the current record and charge its wire values to the parent.
    pub fn close_record(&mut self) -> Result<Frame, CodecError> {
        let top = *self.top();
        if top.kind != FrameKind::Record {
            return Err(CodecError::FrameImbalance("composite closed while a sequence is open"));
        }
        if let FrameState::Known { remaining } = top.state {
            if remaining != 0 {
                return Err(CodecError::Arity {
                    expected: top.declared,
                    actual: top.declared - remaining,
                });
            }
        }
        self.frames.pop();
        self.claim(top.children)?;
        Ok(top)
    }
}
