//! meter/schedule.rs
//! Configurable energy prices for codec operations.
//!
//! Design notes:
//! - The tag byte of a value or frame header is covered by its base fee; the per-byte
//!   rate applies to every byte after it. `true` therefore costs `write_base + 1`.
//! - Skips pay per byte advanced (tag included) and no base fee.
//! - All arithmetic saturates so hostile lengths cannot wrap a price.

use serde::{Deserialize, Serialize};

use crate::constants::fee_defaults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    pub write_base: u64,
    pub write_per_byte: u64,
    pub read_base: u64,
    pub read_per_byte: u64,
    pub skip_per_byte: u64,
    pub begin_base: u64,
    pub end_base: u64,
    pub has_next: u64,
    pub object_base: u64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            write_base: fee_defaults::WRITE_BASE,
            write_per_byte: fee_defaults::WRITE_PER_BYTE,
            read_base: fee_defaults::READ_BASE,
            read_per_byte: fee_defaults::READ_PER_BYTE,
            skip_per_byte: fee_defaults::SKIP_PER_BYTE,
            begin_base: fee_defaults::BEGIN_BASE,
            end_base: fee_defaults::END_BASE,
            has_next: fee_defaults::HAS_NEXT,
            object_base: fee_defaults::OBJECT_BASE,
        }
    }
}

impl FeeSchedule {
    /// A schedule that charges nothing at all.
    pub const fn free() -> Self {
        Self {
            write_base: 0,
            write_per_byte: 0,
            read_base: 0,
            read_per_byte: 0,
            skip_per_byte: 0,
            begin_base: 0,
            end_base: 0,
            has_next: 0,
            object_base: 0,
        }
    }

    /// Cost of emitting one value occupying `bytes` bytes (tag included).
    pub fn write_cost(&self, bytes: usize) -> u64 {
        per_byte(self.write_base, self.write_per_byte, bytes)
    }

    /// Cost of consuming one value occupying `bytes` bytes (tag included).
    pub fn read_cost(&self, bytes: usize) -> u64 {
        per_byte(self.read_base, self.read_per_byte, bytes)
    }

    /// Cost of emitting a frame header of `bytes` bytes.
    pub fn begin_write_cost(&self, bytes: usize) -> u64 {
        per_byte(self.begin_base, self.write_per_byte, bytes)
    }

    /// Cost of consuming a frame header of `bytes` bytes.
    pub fn begin_read_cost(&self, bytes: usize) -> u64 {
        per_byte(self.begin_base, self.read_per_byte, bytes)
    }

    pub fn skip_cost(&self, bytes: usize) -> u64 {
        self.skip_per_byte.saturating_mul(bytes as u64)
    }
}

fn per_byte(base: u64, rate: u64, bytes: usize) -> u64 {
    let body = bytes.saturating_sub(1) as u64;
    base.saturating_add(rate.saturating_mul(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_byte_is_covered_by_base() {
        let fees = FeeSchedule::default();
        assert_eq!(fees.write_cost(2), fees.write_base + fees.write_per_byte);
        assert_eq!(fees.write_cost(1), fees.write_base);
        assert_eq!(fees.skip_cost(5), 5 * fees.skip_per_byte);
    }

    #[test]
    fn cost_is_monotonic_in_bytes() {
        let fees = FeeSchedule::default();
        let mut last = 0;
        for n in 1..64 {
            let c = fees.read_cost(n);
            assert!(c >= last);
            last = c;
        }
    }
}
