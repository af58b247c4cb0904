//! Core types, validators, business rules, and compliance verdicts.
//!
//! Everything here is synchronous and side-effect free. Monetary values are
//! [`rust_decimal::Decimal`] throughout.

mod builder;
mod compliance;
mod config;
mod documents;
mod emirates;
mod error;
pub(crate) mod integrity;
pub(crate) mod result;
mod rules;
mod signing;
mod trn;
mod types;
mod validation;

pub use builder::*;
pub use compliance::*;
pub use config::*;
pub use documents::*;
pub use emirates::Emirate;
pub use error::*;
pub use integrity::{canonical_content, integrity_hash, verify_integrity_hash};
pub use result::{ScoreWeights, ValidationResult};
pub use rules::apply_business_rules;
pub use signing::*;
pub use trn::*;
pub use types::*;
pub use validation::*;
