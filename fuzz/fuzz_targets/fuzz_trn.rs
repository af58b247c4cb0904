#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let result = emarat_einvoice::validate_trn(s);
        assert_eq!(result.is_valid(), result.errors().is_empty());
        assert!(result.score() <= 100);
    }
});
