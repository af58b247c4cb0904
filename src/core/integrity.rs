//! Integrity hash over the canonical invoice fields.
//!
//! ```text
//! SHA-256( number | issue_date | seller_trn | buyer_trn | total(2dp) | vat(2dp) )
//! ```
//!
//! The buyer TRN is the empty string when absent.

use sha2::{Digest, Sha256};

use super::builder::format_amount;
use super::types::Invoice;

/// Build the pipe-joined canonical content string.
pub fn canonical_content(invoice: &Invoice) -> String {
    let issue_date = invoice.issue_date.format("%Y-%m-%d").to_string();
    let total = format_amount(invoice.totals.total_amount);
    let vat = format_amount(invoice.totals.vat_amount);
    [
        invoice.number.as_str(),
        issue_date.as_str(),
        invoice.seller_trn(),
        invoice.buyer_trn(),
        total.as_str(),
        vat.as_str(),
    ]
    .join("|")
}

/// Lowercase hex SHA-256 of [`canonical_content`].
pub fn integrity_hash(invoice: &Invoice) -> String {
    sha256_hex(canonical_content(invoice).as_bytes())
}

/// Check a stored hash against the invoice it claims to cover.
pub fn verify_integrity_hash(invoice: &Invoice, hash: &str) -> bool {
    integrity_hash(invoice).eq_ignore_ascii_case(hash.trim())
}

pub(crate) fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
