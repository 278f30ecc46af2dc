//! Error types for symbol recovery.
//!
//! Errors come in two tiers. File-level problems ([`RecoveryError`]) abort the
//! scan and become the process outcome. Section-level problems
//! ([`SectionFault`]) are attached to the offending section and folded into
//! the report; they never stop the scan of the remaining sections.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for recovery operations.
#[derive(Debug, Error)]
pub enum RecoveryError {
    /// File could not be opened, stat'd or mapped
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File exceeds the configured size limit
    #[error("File size of {found} bytes exceeds the maximum allowed size of {limit} bytes")]
    FileTooLarge { limit: u64, found: u64 },

    /// Container header invalid or truncated
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Header-level container problems. Fatal for the whole scan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("not a recognized container")]
    NotRecognized,

    #[error("truncated header")]
    TruncatedHeader,

    #[error("invalid string table index")]
    InvalidStringTableIndex,

    #[error("malformed header: {0}")]
    MalformedHeader(String),
}

/// Problems confined to a single section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionFault {
    /// Declared range reaches past the end of the file
    #[error("section range {offset:#x}+{size:#x} exceeds file length {file_len:#x}")]
    Bounds { offset: u64, size: u64, file_len: u64 },

    /// Name offset does not fall inside the section-name string table
    #[error("name offset {name_offset:#x} outside string table of {table_size} bytes")]
    NameOutOfRange { name_offset: u32, table_size: u64 },

    /// Content violates the structure of its recognised format
    #[error("decode error: {reason}")]
    Decode { reason: String },
}

impl SectionFault {
    pub fn decode(reason: impl Into<String>) -> Self {
        SectionFault::Decode {
            reason: reason.into(),
        }
    }
}

/// Result type alias for recovery operations
pub type Result<T> = std::result::Result<T, RecoveryError>;
