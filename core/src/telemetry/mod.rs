//! telemetry/mod.rs
//! Codec telemetry: deterministic per-instance counters.
//!
//! Notes:
//! - Counters are plain data owned by one encoder/decoder; no atomics, no locks.
//! - Independent codecs can be merged after the fact with `merge`.

pub mod counters;

pub use counters::*;
