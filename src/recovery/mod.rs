//! Symbol recovery from custom sections.
//!
//! A scan is strictly linear: load the container, walk its section table,
//! keep the sections whose names look interesting, decode the ones with a
//! known layout and fold everything into a [`ScanReport`].

pub mod catalog;
pub mod config;
pub mod decoders;
pub mod report;

pub use catalog::SectionFormat;
pub use config::{DecodeLimits, RecoveryConfig};
pub use decoders::{AddressEntry, DecodedContent};
pub use report::{aggregate, RecoveredSection, ScanReport, Verdict};

use crate::error::Result;
use crate::formats::elf::{self, SectionRecord};
use crate::io::ContainerHandle;
use std::path::Path;
use tracing::{debug, info_span};

/// Filter the interesting records and decode those with a known layout.
///
/// Section-level faults stay attached to their section; nothing here aborts.
pub fn classify_and_decode(
    handle: &ContainerHandle,
    records: &[SectionRecord],
    limits: &DecodeLimits,
) -> Vec<RecoveredSection> {
    let endian = handle.header().data;
    records
        .iter()
        .filter(|record| catalog::is_interesting(&record.name))
        .map(|record| {
            let content = match SectionFormat::from_section_name(&record.name) {
                Some(format) => match record.data(handle) {
                    Ok(data) => decoders::decode(format, data, endian, limits),
                    Err(fault) => DecodedContent::unrecognized(fault),
                },
                None => DecodedContent::Unrecognized { reason: None },
            };
            debug!(
                section = %record.name,
                offset = record.offset,
                size = record.size,
                recognized = content.is_recognized(),
                "Classified section"
            );
            RecoveredSection {
                record: record.clone(),
                content,
            }
        })
        .collect()
}

/// Scan an already-loaded container.
pub fn scan_container(handle: &ContainerHandle, config: &RecoveryConfig) -> Result<ScanReport> {
    let records = elf::scan(handle)?;
    let decoded = classify_and_decode(handle, &records, &config.limits);
    Ok(aggregate(&records, decoded))
}

/// Load and scan a file. The mapping is released before this returns.
pub fn scan_file<P: AsRef<Path>>(path: P, config: &RecoveryConfig) -> Result<ScanReport> {
    let path = path.as_ref();
    let span = info_span!("scan_file", path = %path.display());
    let _guard = span.enter();

    let handle = ContainerHandle::open(path, &config.io)?;
    scan_container(&handle, config)
}

/// Scan an in-memory image.
pub fn scan_bytes(data: Vec<u8>, config: &RecoveryConfig) -> Result<ScanReport> {
    let handle = ContainerHandle::from_bytes(data)?;
    scan_container(&handle, config)
}
