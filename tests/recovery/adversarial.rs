use symrecover::formats::elf::{ElfData, SHT_PROGBITS};
use symrecover::producer::{annotated_library, ImageBuilder};
use symrecover::recovery::DecodedContent;
use symrecover::{scan_bytes, scan_file, FormatError, RecoveryConfig, RecoveryError, SectionFault};

use crate::common::create_temp_file;

#[test]
fn non_container_input_is_format_error() {
    let file = create_temp_file(b"MZ\x90\x00 this is not an elf file at all");
    let result = scan_file(file.path(), &RecoveryConfig::default());
    match result {
        Err(RecoveryError::Format(err)) => {
            assert_eq!(err, FormatError::NotRecognized);
            assert_eq!(err.to_string(), "not a recognized container");
        }
        other => panic!("expected format error, got {other:?}"),
    }
}

#[test]
fn truncated_images_never_panic() {
    let image = annotated_library(ElfData::Little, true);
    for len in 0..image.len() {
        let _ = scan_bytes(image[..len].to_vec(), &RecoveryConfig::default());
    }
}

#[test]
fn section_table_cut_short_is_truncated_header() {
    let image = annotated_library(ElfData::Little, true);
    let result = scan_bytes(image[..image.len() - 1].to_vec(), &RecoveryConfig::default());
    assert!(matches!(
        result,
        Err(RecoveryError::Format(FormatError::TruncatedHeader))
    ));
}

#[test]
fn bounds_violation_only_affects_that_section() {
    let image = ImageBuilder::new()
        .section(".custom_data", SHT_PROGBITS, 5i32.to_le_bytes().to_vec())
        .section(".symbol_registry", SHT_PROGBITS, b"SYMBOL_START\n".to_vec())
        .section(".address_table", SHT_PROGBITS, vec![0; 40])
        .patch_section(1, |sh| sh.size = 1 << 40)
        .patch_section(3, |sh| sh.offset = 1 << 20)
        .build();
    let report = scan_bytes(image, &RecoveryConfig::default()).unwrap();

    let faults: Vec<bool> = report
        .sections
        .iter()
        .map(|s| {
            matches!(
                s.content,
                DecodedContent::Unrecognized {
                    reason: Some(SectionFault::Bounds { .. })
                }
            )
        })
        .collect();
    assert_eq!(faults, [true, false, true]);
    assert_eq!(report.decoded_count(), 1);
}

#[test]
fn hostile_name_offsets_are_contained() {
    let image = ImageBuilder::new()
        .section(".custom_data", SHT_PROGBITS, vec![0; 4])
        .patch_section(1, |sh| sh.name = u32::MAX)
        .build();
    let report = scan_bytes(image, &RecoveryConfig::default()).unwrap();
    assert_eq!(report.matched_count(), 0);
}

#[test]
fn every_decode_failing_still_reports_verdict() {
    let image = ImageBuilder::new()
        .section(".custom_symtab", SHT_PROGBITS, vec![0; 3])
        .section(".custom_data", SHT_PROGBITS, vec![0; 2])
        .build();
    let report = scan_bytes(image, &RecoveryConfig::default()).unwrap();
    assert_eq!(report.decoded_count(), 0);
    let text = report.to_string();
    assert!(text.contains("Regular symbols: STRIPPED"));
    assert!(text.contains("Symbol recovery: recovery possible"));
}
