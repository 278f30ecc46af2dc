//! Report aggregation and rendering.

use crate::formats::elf::SectionRecord;
use crate::recovery::catalog::{CUSTOM_FUNCTIONS, CUSTOM_SYMTAB};
use crate::recovery::config::EXPECTED_MAGIC_TAG;
use crate::recovery::decoders::{registry_entries, DecodedContent};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An interesting section together with what it decoded to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveredSection {
    pub record: SectionRecord,
    pub content: DecodedContent,
}

/// Overall outcome of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    RecoveryPossible,
    RecoveryFailed,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::RecoveryPossible => f.write_str("recovery possible"),
            Verdict::RecoveryFailed => f.write_str("recovery failed"),
        }
    }
}

/// Result of one full scan of one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Whether a SHT_SYMTAB or SHT_DYNSYM section exists
    pub standard_symbols_present: bool,
    /// Interesting sections, in section-header-table order
    pub sections: Vec<RecoveredSection>,
}

impl ScanReport {
    /// Number of sections whose name matched the interesting-substring filter.
    pub fn matched_count(&self) -> usize {
        self.sections.len()
    }

    /// Number of sections a decoder accepted.
    pub fn decoded_count(&self) -> usize {
        self.sections
            .iter()
            .filter(|s| s.content.is_recognized())
            .count()
    }

    pub fn verdict(&self) -> Verdict {
        if self.matched_count() > 0 {
            Verdict::RecoveryPossible
        } else {
            Verdict::RecoveryFailed
        }
    }

    pub fn section(&self, name: &str) -> Option<&RecoveredSection> {
        self.sections.iter().find(|s| s.record.name == name)
    }
}

/// Build the report from the full scan and the decoded interesting sections.
pub fn aggregate(records: &[SectionRecord], decoded: Vec<RecoveredSection>) -> ScanReport {
    ScanReport {
        standard_symbols_present: records.iter().any(|r| r.kind.is_symbol_table()),
        sections: decoded,
    }
}

/// JSON form of a report, as emitted by `--json`.
#[derive(Serialize)]
pub struct ReportDocument<'a> {
    pub path: &'a str,
    #[serde(flatten)]
    pub report: &'a ScanReport,
    pub matched_sections: usize,
    pub decoded_sections: usize,
    pub verdict: Verdict,
}

impl<'a> ReportDocument<'a> {
    pub fn new(path: &'a str, report: &'a ScanReport) -> Self {
        Self {
            path,
            report,
            matched_sections: report.matched_count(),
            decoded_sections: report.decoded_count(),
            verdict: report.verdict(),
        }
    }
}

/// JSON form of a scan that could not start, as emitted by `--json`.
#[derive(Serialize)]
pub struct FailureDocument<'a> {
    pub path: &'a str,
    pub error: String,
    /// Always null: no verdict is reached without a readable container
    pub verdict: Option<Verdict>,
}

impl<'a> FailureDocument<'a> {
    pub fn new(path: &'a str, error: &impl fmt::Display) -> Self {
        Self {
            path,
            error: error.to_string(),
            verdict: None,
        }
    }
}

fn write_content(f: &mut fmt::Formatter<'_>, section: &RecoveredSection) -> fmt::Result {
    match &section.content {
        DecodedContent::NameList(names) => {
            writeln!(f, "  Symbol names found:")?;
            for (i, name) in names.iter().enumerate() {
                writeln!(f, "    [{i}] {name}")?;
            }
        }
        DecodedContent::AddressTable(entries) => {
            writeln!(f, "  Parsing address table:")?;
            for entry in entries {
                writeln!(
                    f,
                    "    Symbol: {:<30} Address: {:#018x}",
                    entry.name, entry.address
                )?;
            }
        }
        DecodedContent::TextRegistry(text) => {
            writeln!(f, "  Symbol registry:")?;
            let entries = registry_entries(text);
            if entries.is_empty() {
                // No markers: show the block as stored
                for line in text.trim_end_matches('\0').lines() {
                    writeln!(f, "    {}", line.trim_end_matches('\r'))?;
                }
            }
            for entry in entries {
                writeln!(f, "    {entry}")?;
            }
        }
        DecodedContent::MagicTrailer(tag) => {
            let status = if tag == EXPECTED_MAGIC_TAG {
                "expected"
            } else {
                "unexpected"
            };
            writeln!(f, "    Magic string check: '{tag}' ({status})")?;
        }
        DecodedContent::RawWord(value) => {
            writeln!(f, "    Contains data: {value} ({value:#x})")?;
        }
        DecodedContent::Unrecognized { reason } => {
            if let Some(reason) = reason {
                writeln!(f, "    Not decoded: {reason}")?;
            } else if section.record.name == CUSTOM_FUNCTIONS {
                writeln!(
                    f,
                    "    Contains function code ({} bytes)",
                    section.record.size
                )?;
            } else if section.record.name == CUSTOM_SYMTAB {
                writeln!(f, "    Magic string check: unavailable")?;
            }
        }
    }
    Ok(())
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "1. Regular symbol table check:")?;
        writeln!(
            f,
            "   Regular symbols: {}",
            if self.standard_symbols_present {
                "PRESENT"
            } else {
                "STRIPPED"
            }
        )?;

        writeln!(f)?;
        writeln!(f, "2. Custom sections analysis:")?;
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "  Section: {}", section.record.name)?;
            writeln!(
                f,
                "    Offset: {:#x}, Size: {} bytes",
                section.record.offset, section.record.size
            )?;
            write_content(f, section)?;
        }

        writeln!(f)?;
        writeln!(f, "3. Summary:")?;
        writeln!(f, "   Custom sections found: {}", self.matched_count())?;
        writeln!(f, "   Sections decoded: {}", self.decoded_count())?;
        writeln!(f, "   Symbol recovery: {}", self.verdict())
    }
}
