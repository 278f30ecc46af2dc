//! Section table scanning

use crate::error::{FormatError, SectionFault};
use crate::formats::elf::types::*;
use crate::formats::elf::utils::{read_cstring, EndianRead};
use crate::io::ContainerHandle;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// One entry of the section header table, with its name resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    /// Position in the section header table
    pub index: usize,
    pub name: String,
    pub offset: u64,
    pub size: u64,
    pub sh_type: u32,
    pub kind: SectionKind,
    /// Set when this entry could not be fully resolved. Out-of-bounds
    /// ranges take precedence over unresolvable names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<SectionFault>,
}

impl SectionRecord {
    /// Whether the section occupies bytes in the file.
    pub fn has_file_bytes(&self) -> bool {
        self.sh_type != SHT_NOBITS
    }

    /// The section's bytes, or the fault recorded for its range.
    pub fn data<'a>(&self, handle: &'a ContainerHandle) -> Result<&'a [u8], SectionFault> {
        if let Some(fault @ SectionFault::Bounds { .. }) = &self.fault {
            return Err(fault.clone());
        }
        if !self.has_file_bytes() {
            return Ok(&[]);
        }
        handle.range(self.offset, self.size)
    }
}

/// Walk the section header table in order, resolving every name.
///
/// Fails only when the section-name string table index is unusable. Entries
/// whose range or name cannot be resolved are kept, with `fault` set.
pub fn scan(handle: &ContainerHandle) -> Result<Vec<SectionRecord>, FormatError> {
    let header = handle.header();
    let count = header.e_shnum as usize;
    if count == 0 {
        debug!("Container has no section header table");
        return Ok(Vec::new());
    }

    let shstrndx = header.e_shstrndx as usize;
    if shstrndx >= count {
        return Err(FormatError::InvalidStringTableIndex);
    }

    let data = handle.bytes();
    let mut headers = Vec::with_capacity(count);
    for i in 0..count {
        let offset = header.e_shoff as usize + i * ELF64_SHDR_SIZE;
        headers.push(
            parse_section_header(data, offset, header.data).ok_or(FormatError::TruncatedHeader)?,
        );
    }

    let str_header = &headers[shstrndx];
    let strings = match handle.range(str_header.sh_offset, str_header.sh_size) {
        Ok(strings) => strings,
        Err(fault) => {
            warn!(error = %fault, "Section name string table lies outside the file");
            &[]
        }
    };

    let records = headers
        .iter()
        .enumerate()
        .map(|(index, sh)| {
            let (name, name_fault) = resolve_name(strings, sh.sh_name);
            let mut record = SectionRecord {
                index,
                name,
                offset: sh.sh_offset,
                size: sh.sh_size,
                sh_type: sh.sh_type,
                kind: SectionKind::from(sh.sh_type),
                fault: None,
            };
            let range_fault = if record.has_file_bytes() {
                handle.range(sh.sh_offset, sh.sh_size).err()
            } else {
                None
            };
            record.fault = range_fault.or(name_fault);
            if let Some(fault) = &record.fault {
                debug!(index, section = %record.name, error = %fault, "Section entry faulted");
            } else {
                trace!(
                    index,
                    section = %record.name,
                    offset = record.offset,
                    size = record.size,
                    "Scanned section"
                );
            }
            record
        })
        .collect();

    Ok(records)
}

/// A name must start inside the table; an offset equal to its size is out of range.
fn resolve_name(strings: &[u8], name_offset: u32) -> (String, Option<SectionFault>) {
    let start = name_offset as usize;
    let name = if start < strings.len() {
        read_cstring(strings, start)
    } else {
        None
    };
    match name {
        Some(bytes) => (String::from_utf8_lossy(bytes).into_owned(), None),
        None => (
            String::new(),
            Some(SectionFault::NameOutOfRange {
                name_offset,
                table_size: strings.len() as u64,
            }),
        ),
    }
}

/// Parse a single ELF64 section header
fn parse_section_header(data: &[u8], offset: usize, endian: ElfData) -> Option<SectionHeader> {
    Some(SectionHeader {
        sh_name: data.read_u32(offset, endian)?,
        sh_type: data.read_u32(offset + 4, endian)?,
        sh_flags: data.read_u64(offset + 8, endian)?,
        sh_addr: data.read_u64(offset + 16, endian)?,
        sh_offset: data.read_u64(offset + 24, endian)?,
        sh_size: data.read_u64(offset + 32, endian)?,
    })
}
