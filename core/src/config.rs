//! config.rs
//! Codec configuration: fee schedule and input limits.
//!
//! Design notes:
//! - Every field has a default from `constants`, so a partial JSON document is valid.
//! - The same configuration must be used on both sides of a message for costs to agree.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_PAYLOAD_LEN};
use crate::meter::FeeSchedule;

/// Bounds applied to both encoding and decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecLimits {
    /// Maximum number of nested frames (lists, maps, records).
    pub max_depth: usize,
    /// Maximum value of any single length prefix.
    pub max_payload_len: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub fees: FeeSchedule,
    pub limits: CodecLimits,
}

impl CodecConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn with_fees(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_limits(mut self, limits: CodecLimits) -> Self {
        self.limits = limits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = CodecConfig::from_json(r#"{ "fees": { "write_base": 3 }, "limits": { "max_depth": 4 } }"#).unwrap();
        assert_eq!(cfg.fees.write_base, 3);
        assert_eq!(cfg.fees.read_base, FeeSchedule::default().read_base);
        assert_eq!(cfg.limits.max_depth, 4);
        assert_eq!(cfg.limits.max_payload_len, DEFAULT_MAX_PAYLOAD_LEN);
    }

    #[test]
    fn json_round_trip() {
        let cfg = CodecConfig::default();
        let text = cfg.to_json().unwrap();
        assert_eq!(CodecConfig::from_json(&text).unwrap(), cfg);
    }
}
