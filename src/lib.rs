//! Recover symbol metadata from stripped ELF64 binaries.
//!
//! Producers can embed names and addresses in custom sections that survive
//! `strip`. This crate reads those sections back: it validates the container,
//! walks the section header table and decodes each recognised layout into a
//! [`recovery::ScanReport`].

/// Error taxonomy
pub mod error;
/// ELF64 section-table parsing
pub mod formats;
/// Container loading
pub mod io;
/// Tracing setup
pub mod logging;
/// Producer-side image synthesis
pub mod producer;
/// Classification, decoding and reporting
pub mod recovery;

pub use error::{FormatError, RecoveryError, Result, SectionFault};
pub use recovery::{scan_bytes, scan_file, RecoveryConfig, ScanReport, Verdict};
