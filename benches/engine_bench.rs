use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use emarat_einvoice::core::*;
use emarat_einvoice::xml;

fn bench_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn seller() -> Party {
    PartyBuilder::new(
        "Gulf Trading LLC",
        AddressBuilder::new("Dubai", "Dubai")
            .street("Sheikh Zayed Road")
            .build(),
    )
    .trn("100123456700005")
    .build()
}

fn build_invoice(lines: usize) -> Invoice {
    let mut builder = InvoiceBuilder::new("BENCH-001", bench_date())
        .seller(seller())
        .buyer(
            PartyBuilder::new("Desert Supplies FZE", AddressBuilder::new("Sharjah", "Sharjah").build())
                .trn("200000000000002")
                .build(),
        );
    for i in 1..=lines {
        builder = builder.add_line(
            LineBuilder::new(i.to_string(), format!("Item {i}"), dec!(2), dec!(9.99)).build(),
        );
    }
    builder.build().unwrap()
}

fn vat_return() -> VatReturnData {
    VatReturnData {
        trn: "100123456700005".into(),
        tax_period: "2025-03".into(),
        standard_rated_supplies: dec!(200000),
        zero_rated_supplies: dec!(50000),
        exempt_supplies: dec!(10000),
        total_supplies: dec!(260000),
        vat_due: dec!(10000),
    }
}

fn bench_trn(c: &mut Criterion) {
    c.bench_function("validate_trn", |b| {
        b.iter(|| black_box(validate_trn(black_box("100-1234-5670-0005"))));
    });
}

fn bench_compliance_check(c: &mut Criterion) {
    let service = ComplianceService::new(ComplianceConfig::default().with_reference_date(bench_date()));
    let subject = ComplianceSubject::VatReturn(vat_return());
    c.bench_function("compliance_check_vat_return", |b| {
        b.iter(|| black_box(service.check(black_box(&subject))));
    });
}

fn bench_build_invoice(c: &mut Criterion) {
    c.bench_function("build_invoice_10_lines", |b| {
        b.iter(|| black_box(build_invoice(10)));
    });
}

fn bench_integrity_hash(c: &mut Criterion) {
    let invoice = build_invoice(10);
    c.bench_function("integrity_hash", |b| {
        b.iter(|| black_box(integrity_hash(black_box(&invoice))));
    });
}

fn bench_xml(c: &mut Criterion) {
    let small = build_invoice(10);
    let large = build_invoice(1000);
    c.bench_function("xml_serialize_10_lines", |b| {
        b.iter(|| black_box(xml::to_invoice_xml(black_box(&small))));
    });
    c.bench_function("xml_serialize_1000_lines", |b| {
        b.iter(|| black_box(xml::to_invoice_xml(black_box(&large))));
    });

    let unsigned = xml::to_invoice_xml(&small).unwrap();
    c.bench_function("xml_sign_placeholder", |b| {
        b.iter(|| black_box(xml::sign_document(black_box(&unsigned), &PlaceholderSigner)));
    });

    let signed = xml::sign_document(&unsigned, &PlaceholderSigner).unwrap();
    c.bench_function("xml_read_summary", |b| {
        b.iter(|| black_box(xml::read_summary(black_box(&signed))));
    });
}

criterion_group!(
    benches,
    bench_trn,
    bench_compliance_check,
    bench_build_invoice,
    bench_integrity_hash,
    bench_xml,
);
criterion_main!(benches);
