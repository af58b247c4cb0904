use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::result::Findings;
use crate::core::{Invoice, ScoreWeights, TRN_LENGTH, ValidationResult, verify_integrity_hash};

const PHASE2_WEIGHTS: ScoreWeights = ScoreWeights::new(20, 5);

/// Integrity artifacts produced once per invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase2ComplianceRecord {
    /// Unsigned XML the artifacts were produced alongside.
    pub serialized_document: String,
    /// Lowercase hex SHA-256 of the canonical content.
    pub hash: String,
    /// Base64 signature over the hash.
    pub signature: String,
    /// PNG data URL of the QR code.
    pub scannable_code: String,
    /// Base64 TLV payload carried by the QR code.
    pub scannable_payload: String,
    pub seller_id: String,
    /// Empty when the invoice has no buyer TRN.
    pub buyer_id: String,
    pub issue_date: NaiveDate,
    pub total_amount: Decimal,
}

impl Phase2ComplianceRecord {
    /// Whether the stored hash still matches `invoice`.
    pub fn matches(&self, invoice: &Invoice) -> bool {
        verify_integrity_hash(invoice, &self.hash)
    }
}

/// Check that a record carries every phase-2 artifact.
///
/// One error per missing artifact or malformed identifier.
pub fn validate_phase2(record: &Phase2ComplianceRecord) -> ValidationResult {
    let mut f = Findings::default();

    if record.hash.trim().is_empty() {
        f.error("Invoice hash is missing");
    }
    if record.signature.trim().is_empty() {
        f.error("Digital signature is missing");
    }
    if record.scannable_code.trim().is_empty() {
        f.error("QR code is missing");
    }
    let seller_len = record.seller_id.chars().count();
    if seller_len != TRN_LENGTH {
        f.error(format!(
            "Seller TRN must be {TRN_LENGTH} characters, got {seller_len}"
        ));
    }
    let buyer_len = record.buyer_id.chars().count();
    if buyer_len != TRN_LENGTH {
        f.error(format!("Buyer TRN must be {TRN_LENGTH} characters, got {buyer_len}"));
    }

    f.finish(PHASE2_WEIGHTS)
}
