//! telemetry/counters.rs
//! Deterministic counters collected by one encoder or decoder.
//!
//! Summary: counts values, frames and bytes, and sums every energy charge.
//! Two runs over the same input produce identical counters.
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecCounters {
    pub values: u64,
    pub nulls: u64,
    pub frames_opened: u64,
    pub frames_closed: u64,
    pub records: u64,
    pub bytes_transferred: u64,
    pub bytes_skipped: u64,
    pub charges: u64,
    pub energy_charged: u64,
}

impl CodecCounters {
    /// Record one scalar value moved across the wire.
    pub fn add_value(&mut self, bytes: usize) {
        self.values += 1;
        self.bytes_transferred += bytes as u64;
    }

    pub fn add_null(&mut self, bytes: usize) {
        self.nulls += 1;
        self.bytes_transferred += bytes as u64;
    }

    pub fn add_open(&mut self, header_len: usize) {
        self.frames_opened += 1;
        self.bytes_transferred += header_len as u64;
    }

    pub fn add_close(&mut self, closer_len: usize) {
        self.frames_closed += 1;
        self.bytes_transferred += closer_len as u64;
    }

    pub fn add_record(&mut self) {
        self.records += 1;
    }

    pub fn add_skip(&mut self, bytes: usize) {
        self.bytes_skipped += bytes as u64;
    }

    pub fn add_charge(&mut self, cost: u64) {
        self.charges += 1;
        self.energy_charged = self.energy_charged.saturating_add(cost);
    }

    /// Total bytes moved past, read or written.
    pub fn total_bytes(&self) -> u64 {
        self.bytes_transferred + self.bytes_skipped
    }

    pub fn merge(&mut self, other: &CodecCounters) {
        *self += other.clone();
    }
}

impl AddAssign for CodecCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.values            += rhs.values;
        self.nulls             += rhs.nulls;
        self.frames_opened     += rhs.frames_opened;
        self.frames_closed     += rhs.frames_closed;
        self.records           += rhs.records;

        self.bytes_transferred += rhs.bytes_transferred;
        self.bytes_skipped     += rhs.bytes_skipped;
        self.charges           += rhs.charges;
        self.energy_charged     = self.energy_charged.saturating_add(rhs.energy_charged);
    }
}
