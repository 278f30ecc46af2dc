//! ELF64 subset parser
//!
//! Only the structures needed to reach and walk the section header table are
//! parsed. Program headers, symbol tables, relocations and dynamic linking
//! information are never interpreted.

pub mod headers;
pub mod sections;
pub mod types;
pub mod utils;

pub use sections::{scan, SectionRecord};
pub use types::*;
