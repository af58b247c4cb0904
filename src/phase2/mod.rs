//! Phase-2 integrity pipeline.
//!
//! For a finalized invoice this produces the integrity hash over its
//! canonical fields, a signature artifact over that hash, and a QR code
//! carrying seller TRN, buyer TRN, issue date and total. The QR step runs on
//! a blocking worker and is the only suspending operation.

mod pipeline;
mod qr;
mod record;

pub use pipeline::IntegrityPipeline;
pub use qr::{
    QrCodeEncoder, ScannableCodeEncoder, TAG_BUYER_TRN, TAG_ISSUE_DATE, TAG_SELLER_TRN,
    TAG_TOTAL_AMOUNT, decode_payload, png_base64, render_png, scannable_payload,
};
pub use record::{Phase2ComplianceRecord, validate_phase2};
