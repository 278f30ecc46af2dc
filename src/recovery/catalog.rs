//! Catalog of recognised custom sections.
//!
//! Two tiers of matching: a section is *interesting* when its name contains
//! one of [`INTERESTING_SUBSTRINGS`], and *decodable* only when its name is
//! exactly one of the five known layouts.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const SYMBOL_NAMES: &str = ".symbol_names";
pub const ADDRESS_TABLE: &str = ".address_table";
pub const SYMBOL_REGISTRY: &str = ".symbol_registry";
pub const CUSTOM_SYMTAB: &str = ".custom_symtab";
pub const CUSTOM_DATA: &str = ".custom_data";

/// Section carrying producer-placed function code; reported but not decoded.
pub const CUSTOM_FUNCTIONS: &str = ".custom_functions";

pub const INTERESTING_SUBSTRINGS: [&str; 3] = ["custom", "symbol", "address"];

/// The decodable layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionFormat {
    /// NUL-separated names ending in a sentinel
    NameList,
    /// Repeating 32-byte name + u64 address records
    AddressTable,
    /// Line-oriented text block
    TextRegistry,
    /// Opaque record with a trailing 16-byte tag
    MagicTrailer,
    /// Single signed 32-bit word
    RawWord,
}

impl SectionFormat {
    pub const ALL: [SectionFormat; 5] = [
        SectionFormat::NameList,
        SectionFormat::AddressTable,
        SectionFormat::TextRegistry,
        SectionFormat::MagicTrailer,
        SectionFormat::RawWord,
    ];

    /// Exact section name this layout is decoded from.
    pub fn section_name(&self) -> &'static str {
        match self {
            SectionFormat::NameList => SYMBOL_NAMES,
            SectionFormat::AddressTable => ADDRESS_TABLE,
            SectionFormat::TextRegistry => SYMBOL_REGISTRY,
            SectionFormat::MagicTrailer => CUSTOM_SYMTAB,
            SectionFormat::RawWord => CUSTOM_DATA,
        }
    }

    /// Exact-name lookup.
    pub fn from_section_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.section_name() == name)
    }
}

impl fmt::Display for SectionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SectionFormat::NameList => "name list",
            SectionFormat::AddressTable => "address table",
            SectionFormat::TextRegistry => "text registry",
            SectionFormat::MagicTrailer => "magic trailer",
            SectionFormat::RawWord => "raw word",
        };
        f.write_str(s)
    }
}

/// Loose filter: does the name look like it carries recoverable metadata?
pub fn is_interesting(name: &str) -> bool {
    INTERESTING_SUBSTRINGS.iter().any(|s| name.contains(s))
}
