use chrono::NaiveDate;
use emarat_einvoice::core::*;
use emarat_einvoice::output::{AssemblerOptions, OutputAssembler};
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), EngineError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let invoice = InvoiceBuilder::new("INV-2025-0042", NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
        .due_date(NaiveDate::from_ymd_opt(2025, 7, 15).unwrap())
        .seller(
            PartyBuilder::new(
                "Gulf Trading LLC",
                AddressBuilder::new("Dubai", "Dubai")
                    .street("Sheikh Zayed Road, Office 1204")
                    .postal_code("P.O. Box 12345")
                    .build(),
            )
            .trn("100123456700005")
            .contact(Some("+971 4 123 4567".into()), Some("billing@gulftrading.ae".into()))
            .build(),
        )
        .buyer(
            PartyBuilder::new("Desert Supplies FZE", AddressBuilder::new("Sharjah", "Sharjah").build())
                .trn("200000000000002")
                .build(),
        )
        .add_line(
            LineBuilder::new("1", "Laptop", dec!(2), dec!(3000))
                .product_code("LP-14")
                .build(),
        )
        .add_line(LineBuilder::new("2", "Installation", dec!(4), dec!(150)).unit("HUR").build())
        .add_line(
            LineBuilder::new("3", "Export freight", dec!(1), dec!(800))
                .tax(TaxCategory::ZeroRated, dec!(0))
                .build(),
        )
        .build()?;

    let assembler = OutputAssembler::new(AssemblerOptions::default());

    let english = assembler.generate(&invoice, "en").await?;
    println!("{}\n", english.page.to_text());
    println!("{}\n", english.canonical_json);
    println!("signed XML: {} bytes, PDF: {} bytes", english.signed_xml.len(), english.pdf.len());
    if let Some(verdict) = &english.phase2_verdict {
        println!("phase-2 verdict: valid={} score={}", verdict.is_valid(), verdict.score());
    }

    let arabic = assembler.generate(&invoice, "ar-AE").await?;
    println!("\n{}", arabic.page.to_text());
    Ok(())
}
