//! Decoders for the custom-section layouts.
//!
//! Every decoder takes the section's bytes as a slice that has already been
//! bounds-checked against the file, and never indexes outside it. Structural
//! problems surface as [`SectionFault::Decode`] and degrade the section to
//! [`DecodedContent::Unrecognized`].

use crate::error::SectionFault;
use crate::formats::elf::utils::{read_cstring, trim_nul, EndianRead};
use crate::formats::elf::ElfData;
use crate::recovery::catalog::SectionFormat;
use crate::recovery::config::{
    DecodeLimits, ADDRESS_NAME_LEN, ADDRESS_RECORD_LEN, MAGIC_TRAILER_LEN, RAW_WORD_LEN,
    REGISTRY_END, REGISTRY_START,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One record of an address table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressEntry {
    pub name: String,
    pub address: u64,
}

/// What a section decoded to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", content = "value", rename_all = "snake_case")]
pub enum DecodedContent {
    NameList(Vec<String>),
    AddressTable(Vec<AddressEntry>),
    TextRegistry(String),
    MagicTrailer(String),
    RawWord(i32),
    /// No decoder applied, or the decoder rejected the content
    Unrecognized { reason: Option<SectionFault> },
}

impl DecodedContent {
    pub fn unrecognized(reason: SectionFault) -> Self {
        DecodedContent::Unrecognized {
            reason: Some(reason),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, DecodedContent::Unrecognized { .. })
    }
}

/// Decode `data` as `format`. Never fails; rejected content comes back as
/// `Unrecognized` with the reason attached.
pub fn decode(
    format: SectionFormat,
    data: &[u8],
    endian: ElfData,
    limits: &DecodeLimits,
) -> DecodedContent {
    let decoded = match format {
        SectionFormat::NameList => Ok(DecodedContent::NameList(decode_name_list(data, limits))),
        SectionFormat::AddressTable => {
            decode_address_table(data, endian, limits).map(DecodedContent::AddressTable)
        }
        SectionFormat::TextRegistry => Ok(DecodedContent::TextRegistry(decode_text_registry(data))),
        SectionFormat::MagicTrailer => decode_magic_trailer(data).map(DecodedContent::MagicTrailer),
        SectionFormat::RawWord => decode_raw_word(data, endian).map(DecodedContent::RawWord),
    };
    decoded.unwrap_or_else(DecodedContent::unrecognized)
}

/// NUL-separated name catalog.
///
/// Empty strings are skipped without counting. Decoding stops at the end of
/// the data, after `max_symbol_names` entries, or after the sentinel (which is
/// included), whichever comes first.
pub fn decode_name_list(data: &[u8], limits: &DecodeLimits) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = 0;
    let mut terminated = false;

    while cursor < data.len() && names.len() < limits.max_symbol_names {
        if data[cursor] == 0 {
            cursor += 1;
            continue;
        }
        let Some(bytes) = read_cstring(data, cursor) else {
            break;
        };
        cursor += bytes.len() + 1;
        let name = String::from_utf8_lossy(bytes).into_owned();
        terminated = name == limits.symbol_names_sentinel;
        names.push(name);
        if terminated {
            break;
        }
    }

    if !terminated {
        debug!(
            entries = names.len(),
            sentinel = %limits.symbol_names_sentinel,
            "Name list ended without its sentinel"
        );
    }
    names
}

/// Fixed 40-byte records: 32-byte NUL-padded name, then a u64 address.
///
/// A trailing partial record is ignored. Records with an empty name are
/// padding and are skipped without counting toward `max_address_records`.
pub fn decode_address_table(
    data: &[u8],
    endian: ElfData,
    limits: &DecodeLimits,
) -> Result<Vec<AddressEntry>, SectionFault> {
    let mut entries = Vec::new();
    for record in data.chunks_exact(ADDRESS_RECORD_LEN) {
        if entries.len() >= limits.max_address_records {
            break;
        }
        let name = trim_nul(&record[..ADDRESS_NAME_LEN]);
        if name.is_empty() {
            continue;
        }
        let address = record
            .read_u64(ADDRESS_NAME_LEN, endian)
            .ok_or_else(|| SectionFault::decode("address field truncated"))?;
        entries.push(AddressEntry {
            name: String::from_utf8_lossy(name).into_owned(),
            address,
        });
    }
    Ok(entries)
}

/// The whole range, verbatim.
pub fn decode_text_registry(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

/// Names listed between the registry's start and end marker lines.
///
/// Empty lines and trailing NUL padding are ignored. Without a start marker
/// nothing is returned; without an end marker the list runs to the end.
pub fn registry_entries(text: &str) -> Vec<&str> {
    let mut lines = text
        .trim_end_matches('\0')
        .lines()
        .map(|line| line.trim_end_matches('\r'));
    if !lines.any(|line| line == REGISTRY_START) {
        return Vec::new();
    }
    lines
        .take_while(|line| *line != REGISTRY_END)
        .filter(|line| !line.is_empty())
        .collect()
}

/// The final 16 bytes, read as a NUL-padded tag.
pub fn decode_magic_trailer(data: &[u8]) -> Result<String, SectionFault> {
    if data.len() < MAGIC_TRAILER_LEN {
        return Err(SectionFault::decode(format!(
            "magic trailer needs {} bytes, section has {}",
            MAGIC_TRAILER_LEN,
            data.len()
        )));
    }
    let tag = trim_nul(&data[data.len() - MAGIC_TRAILER_LEN..]);
    Ok(String::from_utf8_lossy(tag).into_owned())
}

/// The first 4 bytes as a signed integer in the container's byte order.
pub fn decode_raw_word(data: &[u8], endian: ElfData) -> Result<i32, SectionFault> {
    data.read_i32(0, endian).ok_or_else(|| {
        SectionFault::decode(format!(
            "raw word needs {} bytes, section has {}",
            RAW_WORD_LEN,
            data.len()
        ))
    })
}
