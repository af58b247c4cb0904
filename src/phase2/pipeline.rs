use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{debug, info};

use super::qr::{QrCodeEncoder, ScannableCodeEncoder, scannable_payload};
use super::record::Phase2ComplianceRecord;
use crate::core::{EngineError, Invoice, InvoiceSigner, PlaceholderSigner, integrity_hash};
use crate::xml::to_invoice_xml;

/// Produces the hash, signature artifact and scannable code for an invoice.
///
/// ```no_run
/// # async fn run(invoice: &emarat_einvoice::Invoice) -> Result<(), emarat_einvoice::EngineError> {
/// use emarat_einvoice::phase2::{IntegrityPipeline, validate_phase2};
///
/// let pipeline: IntegrityPipeline = IntegrityPipeline::default();
/// let record = pipeline.process(invoice).await?;
/// assert!(validate_phase2(&record).is_valid());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct IntegrityPipeline<S = PlaceholderSigner, Q = QrCodeEncoder> {
    signer: S,
    encoder: Q,
}

impl<S: InvoiceSigner, Q: ScannableCodeEncoder> IntegrityPipeline<S, Q> {
    pub fn new(signer: S, encoder: Q) -> Self {
        Self { signer, encoder }
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    /// Sign the integrity hash, returning the base64 artifact.
    pub fn sign_hash(&self, hash: &str) -> Result<String, EngineError> {
        self.signer.sign(hash.as_bytes()).map(|raw| BASE64.encode(raw))
    }

    /// Run the pipeline. Only the scannable-code step suspends.
    pub async fn process(&self, invoice: &Invoice) -> Result<Phase2ComplianceRecord, EngineError> {
        let serialized_document = to_invoice_xml(invoice)?;
        let hash = integrity_hash(invoice);
        debug!(invoice = %invoice.number, hash = %hash, "computed integrity hash");

        let signature = self.sign_hash(&hash)?;
        let payload = scannable_payload(invoice)?;
        let scannable_code = self.encoder.encode(&payload).await?;

        info!(
            invoice = %invoice.number,
            algorithm = self.signer.algorithm(),
            "phase-2 artifacts ready"
        );

        Ok(Phase2ComplianceRecord {
            serialized_document,
            hash,
            signature,
            scannable_code,
            scannable_payload: payload,
            seller_id: invoice.seller_trn().to_string(),
            buyer_id: invoice.buyer_trn().to_string(),
            issue_date: invoice.issue_date,
            total_amount: invoice.totals.total_amount,
        })
    }
}
