//! Configuration for symbol recovery.
//!
//! The per-format entry caps bound the work done on malformed or hostile
//! input. Wire-format constants live here too so that the decoders and the
//! producer agree on a single definition.

use crate::io::IOLimits;
use serde::{Deserialize, Serialize};

/// Maximum number of names decoded from `.symbol_names`.
pub const MAX_SYMBOL_NAMES: usize = 20;
/// Maximum number of records decoded from `.address_table`.
pub const MAX_ADDRESS_RECORDS: usize = 10;
/// Terminator string of the `.symbol_names` catalog.
pub const SYMBOL_NAMES_SENTINEL: &str = "END_SYMBOLS";

/// Width of the fixed name field of an address-table record.
pub const ADDRESS_NAME_LEN: usize = 32;
/// Full size of one address-table record (name + u64 address).
pub const ADDRESS_RECORD_LEN: usize = ADDRESS_NAME_LEN + 8;

/// Length of the tag at the end of `.custom_symtab`.
pub const MAGIC_TRAILER_LEN: usize = 16;
/// Tag a well-formed `.custom_symtab` carries.
pub const EXPECTED_MAGIC_TAG: &str = "SYMBOLS_HERE";

/// Size of the `.custom_data` word.
pub const RAW_WORD_LEN: usize = 4;

/// First line of a `.symbol_registry` block.
pub const REGISTRY_START: &str = "SYMBOL_START";
/// Last line of a `.symbol_registry` block.
pub const REGISTRY_END: &str = "SYMBOL_END";

/// Decoder limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeLimits {
    /// Cap on `.symbol_names` entries.
    pub max_symbol_names: usize,
    /// Cap on `.address_table` records.
    pub max_address_records: usize,
    /// String that ends the `.symbol_names` catalog.
    pub symbol_names_sentinel: String,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_symbol_names: MAX_SYMBOL_NAMES,
            max_address_records: MAX_ADDRESS_RECORDS,
            symbol_names_sentinel: SYMBOL_NAMES_SENTINEL.to_string(),
        }
    }
}

/// Master configuration for a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Loader limits.
    pub io: IOLimits,
    /// Decoder limits.
    pub limits: DecodeLimits,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RecoveryConfig::default();
        assert_eq!(config.limits.max_symbol_names, 20);
        assert_eq!(config.limits.max_address_records, 10);
        assert_eq!(config.limits.symbol_names_sentinel, "END_SYMBOLS");
        assert_eq!(config.io.max_file_size, 100 * 1024 * 1024);
        assert_eq!(ADDRESS_RECORD_LEN, 40);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: RecoveryConfig =
            serde_json::from_str(r#"{"limits": {"max_symbol_names": 5}}"#).unwrap();
        assert_eq!(config.limits.max_symbol_names, 5);
        assert_eq!(config.limits.max_address_records, MAX_ADDRESS_RECORDS);
        assert_eq!(config.io, IOLimits::default());
    }

    #[test]
    fn test_roundtrip_json() {
        let config = RecoveryConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: RecoveryConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
