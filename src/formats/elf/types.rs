//! Core ELF64 types and constants

use serde::{Deserialize, Serialize};

/// ELF magic number
pub const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

/// EI_CLASS value for 64-bit objects
pub const ELFCLASS64: u8 = 2;

/// Size of the ELF64 file header
pub const ELF64_EHDR_SIZE: usize = 64;

/// Size of one ELF64 section header
pub const ELF64_SHDR_SIZE: usize = 64;

/// ELF data encoding (endianness)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElfData {
    Little = 1,
    Big = 2,
}

impl ElfData {
    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            1 => Some(ElfData::Little),
            2 => Some(ElfData::Big),
            _ => None,
        }
    }

    pub fn is_little_endian(&self) -> bool {
        matches!(self, ElfData::Little)
    }
}

/// The parts of the ELF64 header needed to reach the section table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElfHeader {
    pub data: ElfData,
    pub e_type: u16,
    pub e_machine: u16,
    pub e_shoff: u64,
    pub e_ehsize: u16,
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
}

/// Section header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u64,
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
}

/// Section types
pub const SHT_NULL: u32 = 0;
pub const SHT_PROGBITS: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_NOBITS: u32 = 8;
pub const SHT_DYNSYM: u32 = 11;

/// Coarse classification of a section's declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionKind {
    Symtab,
    Dynsym,
    Other,
}

impl From<u32> for SectionKind {
    fn from(sh_type: u32) -> Self {
        match sh_type {
            SHT_SYMTAB => SectionKind::Symtab,
            SHT_DYNSYM => SectionKind::Dynsym,
            _ => SectionKind::Other,
        }
    }
}

impl SectionKind {
    /// True for the conventional symbol tables that stripping removes.
    pub fn is_symbol_table(&self) -> bool {
        matches!(self, SectionKind::Symtab | SectionKind::Dynsym)
    }
}
