#![no_main]

use libfuzzer_sys::fuzz_target;

use emarat_einvoice::{ComplianceConfig, ComplianceService};

fuzz_target!(|data: &[u8]| {
    let Ok(document) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let service = ComplianceService::new(ComplianceConfig::default());
    for tag in ["TRN", "INVOICE", "VAT_RETURN", "CIT_RETURN"] {
        let result = service.check_raw(tag, &document);
        assert_eq!(result.is_valid(), result.errors().is_empty());
    }
});
