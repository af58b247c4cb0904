use chrono::NaiveDate;
use emarat_einvoice::core::*;
use rust_decimal_macros::dec;

fn print_verdict(label: &str, verdict: &ValidationResult) {
    println!(
        "{label}: {} (score {})",
        if verdict.is_valid() { "valid" } else { "INVALID" },
        verdict.score()
    );
    for error in verdict.errors() {
        println!("  error:   {error}");
    }
    for warning in verdict.warnings() {
        println!("  warning: {warning}");
    }
}

fn main() {
    let service = ComplianceService::new(
        ComplianceConfig::default().with_reference_date(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()),
    );

    // TRN checksums
    for trn in ["100123456700005", "100-1234-5670-0009", "4ABC"] {
        print_verdict(&format!("TRN {trn}"), &service.check(&ComplianceSubject::Trn(trn.into())));
    }

    // Quarterly VAT return with a total that does not add up
    let vat_return = VatReturnData {
        trn: "100123456700005".into(),
        tax_period: "2025-03".into(),
        standard_rated_supplies: dec!(200000),
        zero_rated_supplies: dec!(50000),
        exempt_supplies: dec!(10000),
        total_supplies: dec!(261000),
        vat_due: dec!(10000),
    };
    print_verdict("VAT return", &service.check(&ComplianceSubject::VatReturn(vat_return)));

    // CIT return: 9% above the 375,000 AED threshold
    let taxable = expected_taxable_income(dec!(500000), dec!(50000)).unwrap_or_default();
    let cit_return = CitReturnData {
        trn: "100123456700005".into(),
        tax_year: "2024".into(),
        revenue: dec!(500000),
        deductible_expenses: dec!(50000),
        taxable_income: taxable,
        cit_due: expected_cit(taxable).unwrap_or_default(),
        advance_payments: dec!(0),
    };
    print_verdict("CIT return", &service.check(&ComplianceSubject::CitReturn(cit_return)));

    // Unknown entity tags are rejected without running a validator
    #[cfg(feature = "json")]
    print_verdict(
        "PAYSLIP",
        &service.check_raw("PAYSLIP", &serde_json::json!({})),
    );
}
