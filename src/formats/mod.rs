//! Container format parsers.

pub mod elf;
