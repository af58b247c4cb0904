//! # emarat-einvoice
//!
//! UAE tax-compliance engine: TRN checksums, tax invoice / VAT return /
//! corporate income tax return validation with compliance scoring, and a
//! signed multi-format e-invoice (XML, canonical JSON, rendered page) from a
//! single invoice entity.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! The engine produces documents and verdicts; it does not transmit or store
//! them.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use emarat_einvoice::core::*;
//! use rust_decimal_macros::dec;
//!
//! let service = ComplianceService::new(
//!     ComplianceConfig::default().with_reference_date(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()),
//! );
//!
//! let verdict = service.check(&ComplianceSubject::CitReturn(CitReturnData {
//!     trn: "100123456700005".into(),
//!     tax_year: "2024".into(),
//!     revenue: dec!(500000),
//!     deductible_expenses: dec!(50000),
//!     taxable_income: dec!(75000),
//!     cit_due: dec!(6750),
//!     advance_payments: dec!(0),
//! }));
//! assert!(verdict.is_valid());
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Types, TRN, validators, business rules, compliance service, integrity hash |
//! | `xml` | UBL-style invoice XML and enveloped signature |
//! | `phase2` | Integrity pipeline: hash, signature artifact, QR code |
//! | `pdf` | PDF rendering of the invoice page |
//! | `json` | Canonical JSON mapping, raw JSON compliance checks |
//! | `ed25519` | Ed25519 signing backend |
//! | `output` | Output assembler producing all artifacts at once |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "xml")]
pub mod xml;

#[cfg(feature = "phase2")]
pub mod phase2;

#[cfg(feature = "core")]
pub mod render;

#[cfg(feature = "json")]
pub mod json;

#[cfg(feature = "output")]
pub mod output;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
