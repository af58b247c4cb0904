//! Output assembler.
//!
//! Produces every artifact for one invoice from the same source data: the
//! signed XML, canonical JSON, the rendered page and its PDF, and (when
//! integrity is on) the phase-2 record. Either all artifacts are returned or
//! a single [`EngineError::Generation`] naming the failed stage.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::core::{EngineError, Invoice, InvoiceSigner, PlaceholderSigner, ValidationResult};
use crate::json::{from_canonical_json, to_canonical_json};
use crate::phase2::{IntegrityPipeline, Phase2ComplianceRecord, QrCodeEncoder, validate_phase2};
use crate::render::RenderedPage;
use crate::render::pdf::{PdfAttachment, to_pdf};
use crate::xml::{IntegrityReference, read_summary, sign_document, to_invoice_xml, to_invoice_xml_with_integrity};

/// Assembler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerOptions {
    /// Run the integrity pipeline and embed its artifacts in the XML.
    pub integrity: bool,
    /// Pixels per QR module.
    pub qr_scale: u32,
    /// Attach the signed XML to the PDF.
    pub embed_xml_in_pdf: bool,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            integrity: true,
            qr_scale: 4,
            embed_xml_in_pdf: true,
        }
    }
}

/// Every artifact generated for one invoice.
#[derive(Debug, Clone)]
pub struct InvoiceOutputs {
    pub signed_xml: String,
    pub canonical_json: String,
    pub page: RenderedPage,
    pub pdf: Vec<u8>,
    /// Present when integrity is on.
    pub phase2: Option<Phase2ComplianceRecord>,
    /// Phase-2 check of `phase2`. A failing verdict does not fail generation.
    pub phase2_verdict: Option<ValidationResult>,
}

/// Generates signed multi-format invoices.
pub struct OutputAssembler<S = PlaceholderSigner> {
    pipeline: IntegrityPipeline<S, QrCodeEncoder>,
    options: AssemblerOptions,
}

impl OutputAssembler<PlaceholderSigner> {
    /// Assembler with the placeholder signer.
    pub fn new(options: AssemblerOptions) -> Self {
        Self::with_signer(PlaceholderSigner, options)
    }
}

impl Default for OutputAssembler<PlaceholderSigner> {
    fn default() -> Self {
        Self::new(AssemblerOptions::default())
    }
}

fn failed<'a>(stage: &'static str, invoice: &'a str) -> impl FnOnce(EngineError) -> EngineError + 'a {
    move |e| {
        warn!(invoice, stage, error = %e, "invoice generation failed");
        EngineError::generation(stage, e)
    }
}

impl<S: InvoiceSigner> OutputAssembler<S> {
    pub fn with_signer(signer: S, options: AssemblerOptions) -> Self {
        Self {
            pipeline: IntegrityPipeline::new(signer, QrCodeEncoder::new(options.qr_scale)),
            options,
        }
    }

    pub fn options(&self) -> &AssemblerOptions {
        &self.options
    }

    /// Generate all artifacts for `invoice`, labelling the page for
    /// `language` (a BCP 47 tag; `ar*` renders right-to-left).
    pub async fn generate(&self, invoice: &Invoice, language: &str) -> Result<InvoiceOutputs, EngineError> {
        let number = invoice.number.as_str();
        debug!(invoice = number, language, integrity = self.options.integrity, "generating invoice outputs");

        let (phase2, unsigned) = if self.options.integrity {
            let record = self
                .pipeline
                .process(invoice)
                .await
                .map_err(failed("integrity", number))?;
            let xml = to_invoice_xml_with_integrity(
                invoice,
                IntegrityReference {
                    hash: &record.hash,
                    signature: &record.signature,
                    scannable_code: &record.scannable_code,
                },
            )
            .map_err(failed("serialization", number))?;
            (Some(record), xml)
        } else {
            let xml = to_invoice_xml(invoice).map_err(failed("serialization", number))?;
            (None, xml)
        };

        let signed_xml =
            sign_document(&unsigned, self.pipeline.signer()).map_err(failed("xml-signature", number))?;
        let canonical_json = to_canonical_json(invoice).map_err(failed("canonical-json", number))?;
        let page = RenderedPage::render(invoice, language);

        let attachment_name = format!("{number}.xml");
        let attachment = self.options.embed_xml_in_pdf.then(|| PdfAttachment {
            filename: &attachment_name,
            mime_type: "text/xml",
            description: "Signed e-invoice XML",
            data: signed_xml.as_bytes(),
        });
        let pdf = to_pdf(&page, attachment).map_err(failed("pdf", number))?;

        reconcile(invoice, &signed_xml, &canonical_json, &page).map_err(failed("reconciliation", number))?;

        let phase2_verdict = phase2.as_ref().map(validate_phase2);
        info!(
            invoice = number,
            total = %invoice.totals.total_amount,
            phase2_valid = phase2_verdict.as_ref().map(ValidationResult::is_valid),
            "invoice outputs generated"
        );

        Ok(InvoiceOutputs {
            signed_xml,
            canonical_json,
            page,
            pdf,
            phase2,
            phase2_verdict,
        })
    }
}

/// Check that XML, JSON and page all carry the invoice total.
fn reconcile(
    invoice: &Invoice,
    signed_xml: &str,
    canonical_json: &str,
    page: &RenderedPage,
) -> Result<(), EngineError> {
    let expected = invoice.totals.total_amount;
    let figures: [(&str, Decimal); 3] = [
        ("XML", read_summary(signed_xml)?.total_amount),
        ("JSON", from_canonical_json(canonical_json)?.total_amount),
        (
            "page",
            page.grand_total().ok_or_else(|| {
                EngineError::Reconciliation("page grand total line is unreadable".into())
            })?,
        ),
    ];
    for (artifact, total) in figures {
        if total != expected {
            return Err(EngineError::Reconciliation(format!(
                "{artifact} total {total} differs from invoice total {expected}"
            )));
        }
    }
    Ok(())
}
