use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Thresholds used by the business rule engine.
///
/// These are heuristics, not statutory values, so they can be tuned per
/// deployment. Statutory rates live in `validation` as constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    /// Invoice total at or above which zero VAT is flagged.
    pub large_invoice_amount: Decimal,
    /// Round totals are only flagged above this amount.
    pub round_number_floor: Decimal,
    /// Totals that are a multiple of this are considered round.
    pub round_number_step: Decimal,
    /// VAT due above this amount needs supporting documentation.
    pub high_vat_due: Decimal,
    /// Profit margin (fraction of revenue) above which transfer-pricing
    /// documentation is recommended.
    pub high_profit_margin: Decimal,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            large_invoice_amount: dec!(1000),
            round_number_floor: dec!(500),
            round_number_step: dec!(100),
            high_vat_due: dec!(100000),
            high_profit_margin: dec!(0.5),
        }
    }
}

/// Configuration for a [`ComplianceService`](super::ComplianceService).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    /// Business rule thresholds.
    pub rules: RuleThresholds,
    /// Fixed "today" for date checks. Uses the local clock when unset.
    pub reference_date: Option<NaiveDate>,
}

impl ComplianceConfig {
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn with_rules(mut self, rules: RuleThresholds) -> Self {
        self.rules = rules;
        self
    }

    /// The date validators treat as today.
    pub fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}
