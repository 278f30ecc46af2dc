//! ELF64 header parsing and validation

use crate::error::FormatError;
use crate::formats::elf::types::*;
use crate::formats::elf::utils::EndianRead;

/// Parse and validate the ELF64 file header.
///
/// Only what is needed to reach the section header table is read. The table
/// itself must lie within `data`.
pub fn parse_header(data: &[u8]) -> Result<ElfHeader, FormatError> {
    if data.len() < ELF_MAGIC.len() || &data[0..4] != ELF_MAGIC {
        return Err(FormatError::NotRecognized);
    }
    if data.len() < 16 {
        return Err(FormatError::TruncatedHeader);
    }
    if data[4] != ELFCLASS64 {
        return Err(FormatError::NotRecognized);
    }
    let endian = ElfData::from_u8(data[5]).ok_or(FormatError::NotRecognized)?;

    if data.len() < ELF64_EHDR_SIZE {
        return Err(FormatError::TruncatedHeader);
    }

    let field16 = |off| data.read_u16(off, endian).ok_or(FormatError::TruncatedHeader);
    let e_type = field16(16)?;
    let e_machine = field16(18)?;
    let e_shoff = data
        .read_u64(40, endian)
        .ok_or(FormatError::TruncatedHeader)?;
    let e_ehsize = field16(52)?;
    let e_shentsize = field16(58)?;
    let e_shnum = field16(60)?;
    let e_shstrndx = field16(62)?;

    if e_ehsize as usize != ELF64_EHDR_SIZE {
        return Err(FormatError::MalformedHeader(format!(
            "Invalid e_ehsize: expected {}, got {}",
            ELF64_EHDR_SIZE, e_ehsize
        )));
    }
    if e_shnum > 0 && e_shentsize as usize != ELF64_SHDR_SIZE {
        return Err(FormatError::MalformedHeader(format!(
            "Invalid e_shentsize: expected {}, got {}",
            ELF64_SHDR_SIZE, e_shentsize
        )));
    }

    if e_shnum > 0 {
        let table_size = e_shnum as u64 * ELF64_SHDR_SIZE as u64;
        let table_end = e_shoff
            .checked_add(table_size)
            .ok_or(FormatError::TruncatedHeader)?;
        if table_end > data.len() as u64 {
            return Err(FormatError::TruncatedHeader);
        }
    }

    Ok(ElfHeader {
        data: endian,
        e_type,
        e_machine,
        e_shoff,
        e_ehsize,
        e_shentsize,
        e_shnum,
        e_shstrndx,
    })
}
