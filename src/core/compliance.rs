//! Compliance verdicts: structural validation merged with business rules.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::ComplianceConfig;
use super::documents::*;
use super::result::ValidationResult;
use super::rules::apply_business_rules;
use super::trn::validate_trn;
use super::validation::{validate_cit_return, validate_tax_invoice, validate_vat_return};

/// Kind of document a verdict is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Trn,
    Invoice,
    VatReturn,
    CitReturn,
}

impl EntityType {
    /// Wire tag (`TRN`, `INVOICE`, `VAT_RETURN`, `CIT_RETURN`).
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Trn => "TRN",
            Self::Invoice => "INVOICE",
            Self::VatReturn => "VAT_RETURN",
            Self::CitReturn => "CIT_RETURN",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Returned when a tag is not one of the known entity types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEntityType(pub String);

impl fmt::Display for UnknownEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown entity type: {}", self.0)
    }
}

impl std::error::Error for UnknownEntityType {}

impl FromStr for EntityType {
    type Err = UnknownEntityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "TRN" => Ok(Self::Trn),
            "INVOICE" => Ok(Self::Invoice),
            "VAT_RETURN" => Ok(Self::VatReturn),
            "CIT_RETURN" => Ok(Self::CitReturn),
            other => Err(UnknownEntityType(other.to_string())),
        }
    }
}

/// A document together with its type.
#[derive(Debug, Clone, PartialEq)]
pub enum ComplianceSubject {
    Trn(String),
    Invoice(TaxInvoiceData),
    VatReturn(VatReturnData),
    CitReturn(CitReturnData),
}

impl ComplianceSubject {
    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::Trn(_) => EntityType::Trn,
            Self::Invoice(_) => EntityType::Invoice,
            Self::VatReturn(_) => EntityType::VatReturn,
            Self::CitReturn(_) => EntityType::CitReturn,
        }
    }
}

/// Produces compliance verdicts.
///
/// Holds configuration only; every check is a pure function of its input,
/// so one service can be shared across threads by reference.
///
/// ```
/// use emarat_einvoice::core::*;
///
/// let service = ComplianceService::new(ComplianceConfig::default());
/// let verdict = service.check(&ComplianceSubject::Trn("100123456700005".into()));
/// assert!(verdict.is_valid());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ComplianceService {
    config: ComplianceConfig,
}

impl ComplianceService {
    pub fn new(config: ComplianceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComplianceConfig {
        &self.config
    }

    /// Structural validation only (no business rules).
    pub fn validate(&self, subject: &ComplianceSubject) -> ValidationResult {
        validate_subject(subject, self.config.today())
    }

    /// Business rules only.
    pub fn business_rules(&self, subject: &ComplianceSubject) -> ValidationResult {
        apply_business_rules(subject, &self.config.rules)
    }

    /// Full verdict: structural validation merged with business rules.
    pub fn check(&self, subject: &ComplianceSubject) -> ValidationResult {
        let entity = subject.entity_type();
        let structural = self.validate(subject);
        let heuristics = self.business_rules(subject);
        let verdict = structural.merge(heuristics);
        debug!(
            %entity,
            valid = verdict.is_valid(),
            score = verdict.score(),
            errors = verdict.errors().len(),
            warnings = verdict.warnings().len(),
            "compliance check complete"
        );
        verdict
    }

    /// Verdict for a raw JSON document with a string entity tag.
    ///
    /// An unknown tag or a payload that does not fit the tagged type yields
    /// an invalid result with a single error and a score of 0; no validator
    /// runs in that case.
    #[cfg(feature = "json")]
    pub fn check_raw(&self, tag: &str, document: &serde_json::Value) -> ValidationResult {
        let entity = match tag.parse::<EntityType>() {
            Ok(entity) => entity,
            Err(unknown) => {
                tracing::warn!(tag, "rejecting document with unknown entity type");
                return ValidationResult::rejected(unknown.to_string());
            }
        };

        match subject_from_json(entity, document) {
            Ok(subject) => self.check(&subject),
            Err(e) => {
                tracing::warn!(%entity, error = %e, "rejecting malformed document");
                ValidationResult::rejected(format!("Malformed {entity} document: {e}"))
            }
        }
    }
}

fn validate_subject(subject: &ComplianceSubject, today: NaiveDate) -> ValidationResult {
    match subject {
        ComplianceSubject::Trn(trn) => validate_trn(trn),
        ComplianceSubject::Invoice(invoice) => validate_tax_invoice(invoice, today),
        ComplianceSubject::VatReturn(vat_return) => validate_vat_return(vat_return, today),
        ComplianceSubject::CitReturn(cit_return) => validate_cit_return(cit_return, today),
    }
}

#[cfg(feature = "json")]
fn subject_from_json(
    entity: EntityType,
    document: &serde_json::Value,
) -> Result<ComplianceSubject, serde_json::Error> {
    Ok(match entity {
        EntityType::Trn => {
            // Accept either a bare string or an object with a `trn` field.
            let trn = match document {
                serde_json::Value::Object(map) => map
                    .get("trn")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                other => String::deserialize(other)?,
            };
            ComplianceSubject::Trn(trn)
        }
        EntityType::Invoice => ComplianceSubject::Invoice(TaxInvoiceData::deserialize(document)?),
        EntityType::VatReturn => {
            ComplianceSubject::VatReturn(VatReturnData::deserialize(document)?)
        }
        EntityType::CitReturn => {
            ComplianceSubject::CitReturn(CitReturnData::deserialize(document)?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn service() -> ComplianceService {
        ComplianceService::new(
            ComplianceConfig::default()
                .with_reference_date(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()),
        )
    }

    #[test]
    fn tags_round_trip() {
        for entity in [
            EntityType::Trn,
            EntityType::Invoice,
            EntityType::VatReturn,
            EntityType::CitReturn,
        ] {
            assert_eq!(entity.tag().parse::<EntityType>(), Ok(entity));
        }
        assert!("PAYSLIP".parse::<EntityType>().is_err());
    }

    #[test]
    fn merged_verdict_takes_lower_score() {
        let invoice = TaxInvoiceData {
            invoice_number: "INV-1".into(),
            issue_date: "2025-03-01".into(),
            seller_trn: "100123456700005".into(),
            buyer_trn: None,
            total_amount: dec!(2000),
            vat_amount: dec!(0),
            items: vec![InvoiceItem {
                description: "Export goods".into(),
                quantity: dec!(1),
                unit_price: dec!(2000),
                vat_rate: dec!(0),
                total_amount: dec!(2000),
            }],
        };
        let subject = ComplianceSubject::Invoice(invoice);
        let structural = service().validate(&subject);
        assert_eq!(structural.score(), 100);

        let verdict = service().check(&subject);
        assert!(verdict.is_valid());
        // zero VAT on a large invoice + round total
        assert_eq!(verdict.warnings().len(), 2);
        assert_eq!(verdict.score(), 80);
    }

    #[test]
    fn validator_findings_come_first() {
        let vat_return = VatReturnData {
            trn: "100123456700005".into(),
            tax_period: "2025-01".into(),
            vat_due: dec!(1),
            ..Default::default()
        };
        let verdict = service().check(&ComplianceSubject::VatReturn(vat_return));
        // non-zero VAT due: not a nil return
        assert_eq!(verdict.warnings().len(), 1);
        assert!(verdict.warnings()[0].starts_with("VAT due"));
    }
}
