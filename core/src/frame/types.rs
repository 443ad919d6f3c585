//! frame/types.rs
//! Nesting contexts tracked by `FrameStack`.

use std::fmt;

/// What opened a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Implicit outermost context; accepts exactly one logical value.
    Root,
    List,
    Map,
    /// Composite record. Counts logical fields, has no wire markers.
    Record,
}

impl FrameKind {
    pub const fn is_sequence(self) -> bool {
        matches!(self, FrameKind::List | FrameKind::Map)
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FrameKind::Root => "root",
            FrameKind::List => "list",
            FrameKind::Map => "map",
            FrameKind::Record => "record",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Child slots still owed. Maps owe two slots per declared pair.
    Known { remaining: usize },
    /// Closed by a terminator; `terminated` once it has been written or observed.
    Unknown { terminated: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub state: FrameState,
    /// Wire values written/read directly inside this frame.
    pub children: usize,
    /// Declared slot count (fields for records); zero for unknown-length frames.
    pub declared: usize,
}

impl Frame {
    pub(crate) fn root() -> Self {
        Self {
            kind: FrameKind::Root,
            state: FrameState::Known { remaining: 1 },
            children: 0,
            declared: 1,
        }
    }

    pub(crate) fn known(kind: FrameKind, slots: usize) -> Self {
        Self {
            kind,
            state: FrameState::Known { remaining: slots },
            children: 0,
            declared: slots,
        }
    }

    pub(crate) fn unknown(kind: FrameKind) -> Self {
        Self {
            kind,
            state: FrameState::Unknown { terminated: false },
            children: 0,
            declared: 0,
        }
    }

    /// Remaining slots for known-length frames.
    pub fn remaining(&self) -> Option<usize> {
        match self.state {
            FrameState::Known { remaining } => Some(remaining),
            FrameState::Unknown { .. } => None,
        }
    }

    /// True when `end()` (or record completion) would be accepted.
    pub fn is_satisfied(&self) -> bool {
        match self.state {
            FrameState::Known { remaining } => remaining == 0,
            FrameState::Unknown { terminated } => {
                terminated && (self.kind != FrameKind::Map || self.children % 2 == 0)
            }
        }
    }
}
