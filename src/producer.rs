//! Producer side: synthesising ELF64 images that carry custom sections.
//!
//! A real producer embeds these sections with compiler attributes. This module
//! writes the same on-disk layout directly, which is what the scanner sees
//! after linking and stripping. Used by tests, benches and fuzz seeds.

use crate::formats::elf::types::*;
use crate::recovery::catalog::{
    ADDRESS_TABLE, CUSTOM_DATA, CUSTOM_SYMTAB, SYMBOL_NAMES, SYMBOL_REGISTRY,
};
use crate::recovery::config::{
    ADDRESS_NAME_LEN, EXPECTED_MAGIC_TAG, MAGIC_TRAILER_LEN, REGISTRY_END, REGISTRY_START,
    SYMBOL_NAMES_SENTINEL,
};

const SHSTRTAB: &str = ".shstrtab";

/// Most user sections one image can hold: `e_shnum` is 16 bits wide and the
/// table also carries the null entry and `.shstrtab`.
pub const MAX_SECTIONS: usize = u16::MAX as usize - 2;

/// Editable view of a section header, for producing malformed tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPatch {
    pub name: u32,
    pub sh_type: u32,
    pub offset: u64,
    pub size: u64,
}

type Patch = Box<dyn FnOnce(&mut EntryPatch)>;

struct PendingSection {
    name: String,
    sh_type: u32,
    bytes: Vec<u8>,
}

/// Builds a minimal ELF64 image: header, section contents, a `.shstrtab`
/// and the section header table, in that order.
///
/// Table index 0 is the null section, user sections follow in insertion
/// order and `.shstrtab` comes last. Sections past [`MAX_SECTIONS`] are
/// dropped.
pub struct ImageBuilder {
    endian: ElfData,
    sections: Vec<PendingSection>,
    patches: Vec<(usize, Patch)>,
    shstrndx: Option<u16>,
    section_table: bool,
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuilder {
    /// A little-endian image with no user sections.
    pub fn new() -> Self {
        Self {
            endian: ElfData::Little,
            sections: Vec::new(),
            patches: Vec::new(),
            shstrndx: None,
            section_table: true,
        }
    }

    pub fn endian(mut self, endian: ElfData) -> Self {
        self.endian = endian;
        self
    }

    pub fn section(mut self, name: &str, sh_type: u32, bytes: Vec<u8>) -> Self {
        self.sections.push(PendingSection {
            name: name.to_string(),
            sh_type,
            bytes,
        });
        self
    }

    /// Rewrite the header of table entry `index` after layout.
    pub fn patch_section(
        mut self,
        index: usize,
        patch: impl FnOnce(&mut EntryPatch) + 'static,
    ) -> Self {
        self.patches.push((index, Box::new(patch)));
        self
    }

    /// Override `e_shstrndx`.
    pub fn shstrndx(mut self, index: u16) -> Self {
        self.shstrndx = Some(index);
        self
    }

    /// Emit only the file header, with `e_shnum = 0`.
    pub fn without_section_table(mut self) -> Self {
        self.section_table = false;
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        let endian = self.endian;
        self.sections.truncate(MAX_SECTIONS);
        let mut out = vec![0u8; ELF64_EHDR_SIZE];

        // Name table: NUL, user names, ".shstrtab"
        let mut shstrtab = vec![0u8];
        let mut name_offsets = Vec::with_capacity(self.sections.len());
        for name in self.sections.iter().map(|s| s.name.as_str()).chain([SHSTRTAB]) {
            name_offsets.push(shstrtab.len() as u32);
            shstrtab.extend_from_slice(name.as_bytes());
            shstrtab.push(0);
        }

        let mut entries = vec![EntryPatch {
            name: 0,
            sh_type: SHT_NULL,
            offset: 0,
            size: 0,
        }];
        let contents = self
            .sections
            .iter()
            .map(|s| (s.sh_type, s.bytes.as_slice()))
            .chain([(SHT_STRTAB, shstrtab.as_slice())]);
        for ((sh_type, bytes), name) in contents.zip(&name_offsets) {
            align8(&mut out);
            let offset = out.len() as u64;
            if sh_type != SHT_NOBITS {
                out.extend_from_slice(bytes);
            }
            entries.push(EntryPatch {
                name: *name,
                sh_type,
                offset,
                size: bytes.len() as u64,
            });
        }

        for (index, patch) in self.patches {
            if let Some(entry) = entries.get_mut(index) {
                patch(entry);
            }
        }

        align8(&mut out);
        let shoff = out.len() as u64;
        // At most MAX_SECTIONS + 2 entries after the truncate above
        let shnum = u16::try_from(entries.len()).unwrap_or(u16::MAX);
        let shstrndx = self.shstrndx.unwrap_or(shnum.saturating_sub(1));

        if self.section_table {
            for entry in &entries {
                put_u32(&mut out, entry.name, endian);
                put_u32(&mut out, entry.sh_type, endian);
                put_u64(&mut out, 0, endian); // sh_flags
                put_u64(&mut out, 0, endian); // sh_addr
                put_u64(&mut out, entry.offset, endian);
                put_u64(&mut out, entry.size, endian);
                put_u32(&mut out, 0, endian); // sh_link
                put_u32(&mut out, 0, endian); // sh_info
                put_u64(&mut out, 1, endian); // sh_addralign
                put_u64(&mut out, 0, endian); // sh_entsize
            }
        }

        let mut header = Vec::with_capacity(ELF64_EHDR_SIZE);
        header.extend_from_slice(ELF_MAGIC);
        header.extend_from_slice(&[ELFCLASS64, endian as u8, 1, 0]);
        header.resize(16, 0);
        put_u16(&mut header, 3, endian); // e_type = ET_DYN
        put_u16(&mut header, 62, endian); // e_machine = EM_X86_64
        put_u32(&mut header, 1, endian); // e_version
        put_u64(&mut header, 0, endian); // e_entry
        put_u64(&mut header, 0, endian); // e_phoff
        put_u64(&mut header, if self.section_table { shoff } else { 0 }, endian);
        put_u32(&mut header, 0, endian); // e_flags
        put_u16(&mut header, ELF64_EHDR_SIZE as u16, endian);
        put_u16(&mut header, 0, endian); // e_phentsize
        put_u16(&mut header, 0, endian); // e_phnum
        put_u16(&mut header, ELF64_SHDR_SIZE as u16, endian);
        put_u16(&mut header, if self.section_table { shnum } else { 0 }, endian);
        put_u16(&mut header, if self.section_table { shstrndx } else { 0 }, endian);
        out[..ELF64_EHDR_SIZE].copy_from_slice(&header);

        out
    }
}

fn align8(buf: &mut Vec<u8>) {
    let padded = (buf.len() + 7) & !7;
    buf.resize(padded, 0);
}

fn put_u16(buf: &mut Vec<u8>, v: u16, endian: ElfData) {
    match endian {
        ElfData::Little => buf.extend_from_slice(&v.to_le_bytes()),
        ElfData::Big => buf.extend_from_slice(&v.to_be_bytes()),
    }
}

fn put_u32(buf: &mut Vec<u8>, v: u32, endian: ElfData) {
    match endian {
        ElfData::Little => buf.extend_from_slice(&v.to_le_bytes()),
        ElfData::Big => buf.extend_from_slice(&v.to_be_bytes()),
    }
}

fn put_u64(buf: &mut Vec<u8>, v: u64, endian: ElfData) {
    match endian {
        ElfData::Little => buf.extend_from_slice(&v.to_le_bytes()),
        ElfData::Big => buf.extend_from_slice(&v.to_be_bytes()),
    }
}

/// `.symbol_names` payload: each name NUL-terminated, then the sentinel.
pub fn symbol_names(names: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    for name in names.iter().copied().chain([SYMBOL_NAMES_SENTINEL]) {
        out.extend_from_slice(name.as_bytes());
        out.push(0);
    }
    out
}

/// `.address_table` payload: 32-byte NUL-padded name then a u64 address.
/// Names longer than the field are truncated.
pub fn address_table(entries: &[(&str, u64)], endian: ElfData) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, addr) in entries {
        let mut field = [0u8; ADDRESS_NAME_LEN];
        let len = name.len().min(ADDRESS_NAME_LEN);
        field[..len].copy_from_slice(&name.as_bytes()[..len]);
        out.extend_from_slice(&field);
        put_u64(&mut out, *addr, endian);
    }
    out
}

/// `.symbol_registry` payload, including the C string terminator.
pub fn symbol_registry(names: &[&str]) -> Vec<u8> {
    let mut text = String::from(REGISTRY_START);
    text.push('\n');
    for name in names {
        text.push_str(name);
        text.push('\n');
    }
    text.push_str(REGISTRY_END);
    text.push('\n');
    let mut out = text.into_bytes();
    out.push(0);
    out
}

/// `.custom_symtab` payload: leading address words followed by the
/// 16-byte tag field.
pub fn custom_symtab(addresses: &[u64], tag: &str, endian: ElfData) -> Vec<u8> {
    let mut out = Vec::new();
    for addr in addresses {
        put_u64(&mut out, *addr, endian);
    }
    let mut field = [0u8; MAGIC_TRAILER_LEN];
    let len = tag.len().min(MAGIC_TRAILER_LEN);
    field[..len].copy_from_slice(&tag.as_bytes()[..len]);
    out.extend_from_slice(&field);
    out
}

/// `.custom_data` payload: one signed 32-bit word.
pub fn custom_data(value: i32, endian: ElfData) -> Vec<u8> {
    match endian {
        ElfData::Little => value.to_le_bytes().to_vec(),
        ElfData::Big => value.to_be_bytes().to_vec(),
    }
}

/// Symbols the reference library keeps recoverable.
pub const LIBRARY_SYMBOLS: [&str; 3] = [
    "unused_but_visible_function",
    "global_visible_variable",
    "function_pointer",
];

/// Link-time addresses written into the reference library's address table.
pub const LIBRARY_ADDRESSES: [u64; 3] = [0x401136, 0x404028, 0x404030];

/// An image laid out like the reference library linked into an executable.
///
/// The `.custom_symtab` address words are zero, as they are on disk before
/// the producer's load-time constructor runs. With `stripped == false` a
/// `.symtab`/`.strtab` pair is also emitted.
pub fn annotated_library(endian: ElfData, stripped: bool) -> Vec<u8> {
    let entries: Vec<(&str, u64)> = LIBRARY_SYMBOLS
        .iter()
        .copied()
        .zip(LIBRARY_ADDRESSES)
        .collect();

    let mut builder = ImageBuilder::new()
        .endian(endian)
        .section(".text", SHT_PROGBITS, vec![0x90; 32])
        // push rbp; mov rbp,rsp; ... ret
        .section(
            ".custom_functions",
            SHT_PROGBITS,
            vec![0x55, 0x48, 0x89, 0xe5, 0x89, 0x7d, 0xfc, 0x5d, 0xc3],
        )
        .section(CUSTOM_DATA, SHT_PROGBITS, custom_data(42, endian))
        .section(SYMBOL_NAMES, SHT_PROGBITS, symbol_names(&LIBRARY_SYMBOLS))
        .section(
            CUSTOM_SYMTAB,
            SHT_PROGBITS,
            custom_symtab(&[0, 0, 0], EXPECTED_MAGIC_TAG, endian),
        )
        .section(ADDRESS_TABLE, SHT_PROGBITS, address_table(&entries, endian))
        .section(SYMBOL_REGISTRY, SHT_PROGBITS, symbol_registry(&LIBRARY_SYMBOLS))
        .section(".data", SHT_PROGBITS, vec![0; 16]);

    if !stripped {
        builder = builder
            .section(".symtab", SHT_SYMTAB, vec![0; 24 * 4])
            .section(".strtab", SHT_STRTAB, symbol_names(&LIBRARY_SYMBOLS));
    }
    builder.build()
}
