#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Anything accepted must print back to a line that parses to the same record.
    if let Ok(record) = camhelper_config::CalibrationRecord::parse(data) {
        let text = record.to_string();
        let again = camhelper_config::CalibrationRecord::parse(&text).expect("reparse");
        assert_eq!(record, again);
    }
});
