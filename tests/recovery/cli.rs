use std::process::Command;
use symrecover::formats::elf::ElfData;
use symrecover::producer::annotated_library;

use crate::common::create_temp_file;

fn symrecover() -> Command {
    Command::new(env!("CARGO_BIN_EXE_symrecover"))
}

#[test]
fn cli_reports_annotated_binary() {
    let file = create_temp_file(&annotated_library(ElfData::Little, true));
    let output = symrecover().arg(file.path()).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Regular symbols: STRIPPED"));
    assert!(stdout.contains("[0] unused_but_visible_function"));
    assert!(stdout.contains("Magic string check: 'SYMBOLS_HERE' (expected)"));
    assert!(stdout.contains("Contains data: 42 (0x2a)"));
    assert!(stdout.contains("Contains function code (9 bytes)"));
    assert!(stdout.contains("Symbol recovery: recovery possible"));
}

#[test]
fn cli_json_output() {
    let file = create_temp_file(&annotated_library(ElfData::Little, false));
    let output = symrecover().arg("--json").arg(file.path()).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["standard_symbols_present"], true);
    assert_eq!(value["verdict"], "recovery_possible");
    assert_eq!(value["matched_sections"], 6);
    assert_eq!(value["sections"][1]["content"]["format"], "raw_word");
    assert_eq!(value["sections"][1]["content"]["value"], 42);
}

#[test]
fn cli_usage_error_is_nonzero() {
    let output = symrecover().output().unwrap();
    assert!(!output.status.success());
    let output = symrecover().args(["a", "b"]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn cli_non_container_is_nonzero_without_crash() {
    let file = create_temp_file(b"plain text, no magic here");
    let output = symrecover().arg(file.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Scan aborted: not a recognized container"));
}

#[test]
fn cli_missing_file_is_nonzero() {
    let output = symrecover().arg("/no/such/file/anywhere").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn cli_config_file_overrides_limits() {
    let file = create_temp_file(&annotated_library(ElfData::Little, true));
    let config = create_temp_file(br#"{"limits": {"max_symbol_names": 1}}"#);
    let output = symrecover()
        .arg("--config")
        .arg(config.path())
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("[0] unused_but_visible_function"));
    assert!(!stdout.contains("[1] global_visible_variable"));
}

#[test]
fn cli_non_container_json_reports_error() {
    let file = create_temp_file(b"plain text, no magic here");
    let output = symrecover().arg("--json").arg(file.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["error"], "not a recognized container");
    assert!(value["verdict"].is_null());
    assert!(value["path"].as_str().unwrap().ends_with(
        file.path().file_name().unwrap().to_str().unwrap()
    ));
}
