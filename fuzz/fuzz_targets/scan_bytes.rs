#![no_main]
use libfuzzer_sys::fuzz_target;
use symrecover::{scan_bytes, RecoveryConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(report) = scan_bytes(data.to_vec(), &RecoveryConfig::default()) {
        let _ = report.to_string();
    }
});
