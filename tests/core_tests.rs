#![cfg(feature = "core")]

use chrono::NaiveDate;
use emarat_einvoice::core::*;
use rust_decimal_macros::dec;

const SELLER_TRN: &str = "100123456700005";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn service() -> ComplianceService {
    ComplianceService::new(ComplianceConfig::default().with_reference_date(date(2025, 6, 30)))
}

fn seller() -> Party {
    PartyBuilder::new(
        "Gulf Trading LLC",
        AddressBuilder::new("Dubai", "Dubai")
            .street("Sheikh Zayed Road, Office 1204")
            .postal_code("P.O. Box 12345")
            .build(),
    )
    .trn(SELLER_TRN)
    .contact(Some("+971 4 123 4567".into()), Some("billing@gulftrading.ae".into()))
    .build()
}

fn buyer() -> Party {
    PartyBuilder::new("Desert Supplies FZE", AddressBuilder::new("Sharjah", "Sharjah").build())
        .trn("200000000000001")
        .build()
}

fn vat_return() -> VatReturnData {
    VatReturnData {
        trn: SELLER_TRN.into(),
        tax_period: "2025-03".into(),
        standard_rated_supplies: dec!(200000),
        zero_rated_supplies: dec!(50000),
        exempt_supplies: dec!(10000),
        total_supplies: dec!(260000),
        vat_due: dec!(10000),
    }
}

fn cit_return() -> CitReturnData {
    CitReturnData {
        trn: SELLER_TRN.into(),
        tax_year: "2024".into(),
        revenue: dec!(500000),
        deductible_expenses: dec!(50000),
        taxable_income: dec!(75000),
        cit_due: dec!(6750.00),
        advance_payments: dec!(0),
    }
}

// ---------------------------------------------------------------------------
// TRN
// ---------------------------------------------------------------------------

#[test]
fn trn_reference_values() {
    assert!(validate_trn("100123456700005").is_valid());

    let bad_checksum = validate_trn("100123456700009");
    assert!(!bad_checksum.is_valid());
    assert_eq!(bad_checksum.errors(), ["TRN checksum digit is invalid"]);
    assert_eq!(bad_checksum.score(), 75);

    let short = validate_trn("10012345670000");
    assert!(!short.is_valid());
    assert!(short.errors()[0].contains("15 digits"));
}

#[test]
fn trn_formatting_is_stripped() {
    assert!(is_valid_trn("100-1234-5670-0005"));
    assert!(is_valid_trn(" 100 123 456 700 005 "));
}

#[test]
fn trn_reports_each_failed_check() {
    let result = validate_trn("4ABC");
    assert_eq!(result.errors().len(), 3);
    assert_eq!(result.score(), 25);
    assert!(result.warnings().is_empty());
}

// ---------------------------------------------------------------------------
// Returns
// ---------------------------------------------------------------------------

#[test]
fn vat_return_consistent() {
    let result = validate_vat_return(&vat_return(), date(2025, 6, 30));
    assert!(result.is_valid(), "{:?}", result.errors());
    assert_eq!(result.score(), 100);
}

#[test]
fn vat_return_total_off_by_one_is_an_error() {
    let mut data = vat_return();
    data.total_supplies += dec!(1.00);
    let result = validate_vat_return(&data, date(2025, 6, 30));
    assert!(!result.is_valid());
    assert!(result.errors().iter().any(|e| e.starts_with("Total supplies")));
}

#[test]
fn vat_return_within_tolerance() {
    let mut data = vat_return();
    data.total_supplies += dec!(0.01);
    assert!(validate_vat_return(&data, date(2025, 6, 30)).is_valid());
}

#[test]
fn cit_reference_computation() {
    assert_eq!(expected_taxable_income(dec!(500000), dec!(50000)), Some(dec!(75000)));
    assert_eq!(expected_cit(dec!(75000)), Some(dec!(6750.00)));

    let result = validate_cit_return(&cit_return(), date(2025, 6, 30));
    assert!(result.is_valid(), "{:?}", result.errors());

    let mut wrong = cit_return();
    wrong.cit_due = dec!(6000);
    let result = validate_cit_return(&wrong, date(2025, 6, 30));
    assert!(!result.is_valid());
    assert!(result.errors().iter().any(|e| e.starts_with("CIT due")));
}

#[test]
fn cit_below_threshold_owes_nothing() {
    let data = CitReturnData {
        revenue: dec!(300000),
        deductible_expenses: dec!(100000),
        taxable_income: dec!(0),
        cit_due: dec!(0),
        ..cit_return()
    };
    assert!(validate_cit_return(&data, date(2025, 6, 30)).is_valid());
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

#[test]
fn invoice_line_total_mismatch() {
    let data = TaxInvoiceData {
        invoice_number: "INV-2025-001".into(),
        issue_date: "2025-06-01".into(),
        seller_trn: SELLER_TRN.into(),
        buyer_trn: None,
        total_amount: dec!(524.95),
        vat_amount: dec!(24.95),
        items: vec![InvoiceItem {
            description: "Consulting".into(),
            quantity: dec!(2),
            unit_price: dec!(250.00),
            vat_rate: dec!(5),
            total_amount: dec!(499),
        }],
    };
    let result = validate_tax_invoice(&data, date(2025, 6, 30));
    assert!(!result.is_valid());
    assert!(result.errors().iter().any(|e| e.starts_with("Item 1:")));
}

#[test]
fn built_invoice_passes_validation() {
    let invoice = InvoiceBuilder::new("INV-2025-042", date(2025, 6, 1))
        .seller(seller())
        .buyer(buyer())
        .add_line(LineBuilder::new("1", "Consulting", dec!(2), dec!(250)).build())
        .add_line(
            LineBuilder::new("2", "Export freight", dec!(1), dec!(120))
                .tax(TaxCategory::ZeroRated, dec!(0))
                .build(),
        )
        .build()
        .unwrap();

    let data = TaxInvoiceData::from(&invoice);
    assert_eq!(data.buyer_trn.as_deref(), Some("200000000000001"));
    let verdict = service().check(&ComplianceSubject::Invoice(data));
    // Buyer TRN 200000000000001 fails its checksum.
    assert!(!verdict.is_valid());
    assert!(verdict.errors().iter().all(|e| e.starts_with("Buyer TRN:")));
}

#[test]
fn b2c_invoice_passes_validation() {
    let invoice = InvoiceBuilder::new("INV-2025-043", date(2025, 6, 1))
        .seller(seller())
        .add_line(LineBuilder::new("1", "Consulting", dec!(3), dec!(99.99)).build())
        .build()
        .unwrap();
    let verdict = service().check(&ComplianceSubject::Invoice(TaxInvoiceData::from(&invoice)));
    assert!(verdict.is_valid(), "{:?}", verdict.errors());
    assert_eq!(verdict.score(), 100);
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

#[test]
fn orchestrator_merges_rule_warnings() {
    let data = VatReturnData {
        standard_rated_supplies: dec!(0),
        zero_rated_supplies: dec!(0),
        exempt_supplies: dec!(0),
        total_supplies: dec!(0),
        vat_due: dec!(0),
        ..vat_return()
    };
    let verdict = service().check(&ComplianceSubject::VatReturn(data));
    assert!(verdict.is_valid());
    assert!(verdict.warnings().iter().any(|w| w.starts_with("Nil return")));
    assert_eq!(verdict.score(), 90);
}

#[test]
fn orchestrator_takes_minimum_score() {
    let mut data = cit_return();
    data.trn = "123".into();
    let subject = ComplianceSubject::CitReturn(data);
    let structural = service().validate(&subject);
    let rules = service().business_rules(&subject);
    let verdict = service().check(&subject);
    assert_eq!(verdict.score(), structural.score().min(rules.score()));
    assert_eq!(
        verdict.errors().len(),
        structural.errors().len() + rules.errors().len()
    );
}

#[cfg(feature = "json")]
#[test]
fn raw_documents_by_tag() {
    let service = service();

    let verdict = service.check_raw("TRN", &serde_json::json!("100123456700005"));
    assert!(verdict.is_valid());

    let verdict = service.check_raw(
        "CIT_RETURN",
        &serde_json::json!({
            "trn": "100123456700005",
            "taxYear": "2024",
            "revenue": "500000",
            "deductibleExpenses": "50000",
            "taxableIncome": "75000",
            "citDue": "6750",
            "advancePayments": "0"
        }),
    );
    assert!(verdict.is_valid(), "{:?}", verdict.errors());

    let unknown = service.check_raw("PAYSLIP", &serde_json::json!({}));
    assert!(!unknown.is_valid());
    assert_eq!(unknown.score(), 0);
    assert_eq!(unknown.errors(), ["Unknown entity type: PAYSLIP"]);
    assert!(unknown.warnings().is_empty());
}

#[cfg(feature = "json")]
const DECIMAL_MAX: &str = "79228162514264337593543950335";

#[cfg(feature = "json")]
#[test]
fn raw_invoice_at_decimal_limit_is_rejected() {
    let verdict = service().check_raw(
        "INVOICE",
        &serde_json::json!({
            "invoiceNumber": "INV-2025-900",
            "issueDate": "2025-06-01",
            "sellerTrn": SELLER_TRN,
            "totalAmount": DECIMAL_MAX,
            "vatAmount": "1",
            "items": [{
                "description": "Bulk order",
                "quantity": DECIMAL_MAX,
                "unitPrice": "2",
                "vatRate": "5",
                "totalAmount": DECIMAL_MAX
            }]
        }),
    );
    assert!(!verdict.is_valid());
    assert!(verdict.errors().contains(&"Item 1: amount out of range".to_string()));
    assert!(verdict.errors().contains(&"Item VAT total out of range".to_string()));
}

#[cfg(feature = "json")]
#[test]
fn raw_vat_return_at_decimal_limit_is_rejected() {
    let verdict = service().check_raw(
        "VAT_RETURN",
        &serde_json::json!({
            "trn": SELLER_TRN,
            "taxPeriod": "2025-03",
            "standardRatedSupplies": DECIMAL_MAX,
            "zeroRatedSupplies": DECIMAL_MAX,
            "exemptSupplies": "0",
            "totalSupplies": DECIMAL_MAX,
            "vatDue": "0"
        }),
    );
    assert!(!verdict.is_valid());
    assert!(verdict.errors().contains(&"Supplies out of range".to_string()));
    assert!(verdict.errors().contains(&"Standard-rated supplies out of range".to_string()));
}

#[cfg(feature = "json")]
#[test]
fn raw_cit_return_at_decimal_limit_is_rejected() {
    let verdict = service().check_raw(
        "CIT_RETURN",
        &serde_json::json!({
            "trn": SELLER_TRN,
            "taxYear": "2024",
            "revenue": DECIMAL_MAX,
            "deductibleExpenses": format!("-{DECIMAL_MAX}"),
            "taxableIncome": "0",
            "citDue": "0",
            "advancePayments": "0"
        }),
    );
    assert!(!verdict.is_valid());
    assert!(verdict
        .errors()
        .contains(&"Revenue and deductible expenses out of range".to_string()));
    assert!(verdict.errors().contains(&"Deductible expenses cannot be negative".to_string()));
}

// ---------------------------------------------------------------------------
// Integrity hash
// ---------------------------------------------------------------------------

fn hashed_invoice(number: &str) -> Invoice {
    InvoiceBuilder::new(number, date(2025, 6, 1))
        .seller(seller())
        .buyer(buyer())
        .add_line(LineBuilder::new("1", "Consulting", dec!(2), dec!(250)).build())
        .build()
        .unwrap()
}

#[test]
fn hash_depends_only_on_canonical_fields() {
    let a = hashed_invoice("INV-1");
    let mut b = hashed_invoice("INV-1");
    b.lines[0].description = "Different description".into();
    b.seller.name = "Renamed LLC".into();
    assert_eq!(integrity_hash(&a), integrity_hash(&b));

    assert_ne!(integrity_hash(&a), integrity_hash(&hashed_invoice("INV-2")));
    assert_eq!(
        canonical_content(&a),
        "INV-1|2025-06-01|100123456700005|200000000000001|525.00|25.00"
    );
}
