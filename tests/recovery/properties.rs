use symrecover::formats::elf::{ElfData, SHT_DYNSYM, SHT_PROGBITS};
use symrecover::producer::{self, annotated_library, ImageBuilder};
use symrecover::recovery::{AddressEntry, DecodedContent};
use symrecover::{scan_file, RecoveryConfig, SectionFault, Verdict};

use crate::common::create_temp_file;

fn scan_image(image: &[u8]) -> symrecover::ScanReport {
    let file = create_temp_file(image);
    scan_file(file.path(), &RecoveryConfig::default()).unwrap()
}

#[test]
fn idempotent_scan_of_same_file() {
    let file = create_temp_file(&annotated_library(ElfData::Little, true));
    let config = RecoveryConfig::default();
    let first = scan_file(file.path(), &config).unwrap();
    let second = scan_file(file.path(), &config).unwrap();
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn name_list_terminates_at_sentinel() {
    let image = ImageBuilder::new()
        .section(
            ".symbol_names",
            SHT_PROGBITS,
            b"foo\0bar\0END_SYMBOLS\0extra\0".to_vec(),
        )
        .build();
    let report = scan_image(&image);
    assert_eq!(
        report.section(".symbol_names").unwrap().content,
        DecodedContent::NameList(vec!["foo".into(), "bar".into(), "END_SYMBOLS".into()])
    );
}

#[test]
fn address_table_round_trip() {
    let table = producer::address_table(&[("alpha", 0x1000), ("beta", 0x2000)], ElfData::Little);
    let image = ImageBuilder::new()
        .section(".address_table", SHT_PROGBITS, table)
        .build();
    let report = scan_image(&image);
    assert_eq!(
        report.section(".address_table").unwrap().content,
        DecodedContent::AddressTable(vec![
            AddressEntry {
                name: "alpha".into(),
                address: 0x1000
            },
            AddressEntry {
                name: "beta".into(),
                address: 0x2000
            },
        ])
    );
}

#[test]
fn magic_extraction_sizes() {
    let mut tag = b"SYMBOLS_HERE".to_vec();
    tag.resize(16, 0);
    let image = ImageBuilder::new()
        .section(".custom_symtab", SHT_PROGBITS, tag.clone())
        .build();
    assert_eq!(
        scan_image(&image).section(".custom_symtab").unwrap().content,
        DecodedContent::MagicTrailer("SYMBOLS_HERE".into())
    );

    tag.truncate(15);
    let image = ImageBuilder::new()
        .section(".custom_symtab", SHT_PROGBITS, tag)
        .build();
    assert!(matches!(
        scan_image(&image).section(".custom_symtab").unwrap().content,
        DecodedContent::Unrecognized {
            reason: Some(SectionFault::Decode { .. })
        }
    ));
}

#[test]
fn stripped_but_annotated_binary() {
    let report = scan_image(&annotated_library(ElfData::Little, true));
    assert!(!report.standard_symbols_present);
    assert_eq!(report.verdict(), Verdict::RecoveryPossible);
    assert_eq!(report.verdict().to_string(), "recovery possible");
}

#[test]
fn dynsym_counts_as_standard_symbols() {
    let image = ImageBuilder::new()
        .section(".dynsym", SHT_DYNSYM, vec![0; 24])
        .build();
    let report = scan_image(&image);
    assert!(report.standard_symbols_present);
    assert_eq!(report.verdict(), Verdict::RecoveryFailed);
}

#[test]
fn unknown_custom_section_is_counted_but_not_decoded() {
    let image = ImageBuilder::new()
        .section("customXYZ", SHT_PROGBITS, vec![1, 2, 3, 4, 5])
        .build();
    let report = scan_image(&image);
    assert_eq!(report.matched_count(), 1);
    let section = report.section("customXYZ").unwrap();
    assert_eq!(section.content, DecodedContent::Unrecognized { reason: None });
    assert_eq!(section.record.size, 5);
    assert!(section.record.offset > 0);
    assert_eq!(report.verdict(), Verdict::RecoveryPossible);
}

#[test]
fn registry_round_trip() {
    let image = ImageBuilder::new()
        .section(
            ".symbol_registry",
            SHT_PROGBITS,
            producer::symbol_registry(&["one", "two"]),
        )
        .build();
    let report = scan_image(&image);
    let DecodedContent::TextRegistry(text) = &report.section(".symbol_registry").unwrap().content
    else {
        panic!("registry not decoded");
    };
    assert!(text.starts_with("SYMBOL_START\n"));
    assert_eq!(symrecover::recovery::decoders::registry_entries(text), ["one", "two"]);
}
