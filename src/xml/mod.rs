//! Invoice XML serialization and enveloped signing.
//!
//! The document is rooted at `Invoice` in the UBL 2.1 invoice namespace and
//! uses the `cac`/`cbc` component prefixes.
//!
//! # Example
//!
//! ```no_run
//! use emarat_einvoice::core::*;
//! use emarat_einvoice::xml;
//!
//! let invoice: Invoice = todo!(); // build via InvoiceBuilder
//! let unsigned = xml::to_invoice_xml(&invoice).unwrap();
//! let signed = xml::sign_document(&unsigned, &PlaceholderSigner).unwrap();
//! assert!(xml::verify_document_digest(&signed).unwrap());
//! ```

mod invoice;
mod reader;
mod signature;
mod writer;

pub use invoice::{IntegrityReference, to_invoice_xml, to_invoice_xml_with_integrity};
pub use reader::{DocumentSummary, read_summary};
pub use signature::{
    SignatureParts, read_signature, sign_document, signed_info_bytes, strip_signature,
    verify_document_digest,
};
pub use writer::format_decimal;

/// Root element name.
pub const ROOT_ELEMENT: &str = "Invoice";

/// `cbc:ID` of the reference carrying the integrity hash.
pub const HASH_REFERENCE_ID: &str = "INVOICE-HASH";
/// `cbc:ID` of the reference carrying the signature artifact.
pub const SIGNATURE_REFERENCE_ID: &str = "INVOICE-SIGNATURE";
/// `cbc:ID` of the reference carrying the QR code image.
pub const QR_REFERENCE_ID: &str = "QR";

/// Namespace URIs.
pub mod ns {
    pub const INVOICE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";
    pub const CAC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
    pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
}
