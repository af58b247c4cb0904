//! Heuristic business rules layered on top of structural validation.
//!
//! The rules only ever produce warnings. They flag documents a reviewer
//! should look at twice; they do not decide legal validity.

use rust_decimal::Decimal;

use super::compliance::ComplianceSubject;
use super::config::RuleThresholds;
use super::documents::*;
use super::result::{Findings, ScoreWeights, ValidationResult};

const RULE_WEIGHTS: ScoreWeights = ScoreWeights::new(25, 10);

/// Run the business rules that apply to `subject`.
///
/// A bare TRN has no business rules and always scores 100.
pub fn apply_business_rules(
    subject: &ComplianceSubject,
    thresholds: &RuleThresholds,
) -> ValidationResult {
    let mut f = Findings::default();
    match subject {
        ComplianceSubject::Trn(_) => {}
        ComplianceSubject::Invoice(invoice) => invoice_rules(invoice, thresholds, &mut f),
        ComplianceSubject::VatReturn(vat_return) => vat_return_rules(vat_return, thresholds, &mut f),
        ComplianceSubject::CitReturn(cit_return) => cit_return_rules(cit_return, thresholds, &mut f),
    }
    f.finish(RULE_WEIGHTS)
}

fn invoice_rules(invoice: &TaxInvoiceData, t: &RuleThresholds, f: &mut Findings) {
    if invoice.total_amount >= t.large_invoice_amount && invoice.vat_amount.is_zero() {
        f.warning(format!(
            "Invoice total {} has no VAT; confirm the supply is zero-rated or exempt",
            invoice.total_amount
        ));
    }

    if invoice.total_amount > t.round_number_floor
        && !t.round_number_step.is_zero()
        && invoice
            .total_amount
            .checked_rem(t.round_number_step)
            .is_some_and(|r| r.is_zero())
    {
        f.warning(format!(
            "Invoice total {} is a round number; verify it reflects actual line items",
            invoice.total_amount
        ));
    }
}

fn vat_return_rules(vat_return: &VatReturnData, t: &RuleThresholds, f: &mut Findings) {
    let nil = [
        vat_return.standard_rated_supplies,
        vat_return.zero_rated_supplies,
        vat_return.exempt_supplies,
        vat_return.total_supplies,
        vat_return.vat_due,
    ]
    .iter()
    .all(Decimal::is_zero);
    if nil {
        f.warning("Nil return: no supplies declared for this period");
    }

    if vat_return.vat_due > t.high_vat_due {
        f.warning(format!(
            "VAT due {} exceeds {}; keep supporting documentation ready for review",
            vat_return.vat_due, t.high_vat_due
        ));
    }
}

fn cit_return_rules(cit_return: &CitReturnData, t: &RuleThresholds, f: &mut Findings) {
    // Out-of-range figures are reported by the structural validator.
    let profit = cit_return.revenue.checked_sub(cit_return.deductible_expenses);

    if profit.is_some_and(|p| p < Decimal::ZERO) || cit_return.taxable_income < Decimal::ZERO {
        f.warning("Tax loss for the year; it may be carried forward to offset future taxable income");
    }

    if cit_return.revenue > Decimal::ZERO {
        let margin = profit.and_then(|p| p.checked_div(cit_return.revenue));
        if let Some(margin) = margin.filter(|m| *m > t.high_profit_margin) {
            let percent = margin
                .checked_mul(Decimal::ONE_HUNDRED)
                .map_or_else(|| "over 100".to_string(), |p| p.round_dp(1).normalize().to_string());
            f.warning(format!(
                "Profit margin of {percent}% is unusually high; prepare transfer pricing documentation"
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn extreme_cit_figures_do_not_overflow() {
        let result = rules(ComplianceSubject::CitReturn(CitReturnData {
            revenue: dec!(0.0000000000000000000000000001),
            deductible_expenses: -Decimal::MAX,
            ..Default::default()
        }));
        assert!(result.is_valid());
    }

    fn rules(subject: ComplianceSubject) -> ValidationResult {
        apply_business_rules(&subject, &RuleThresholds::default())
    }

    #[test]
    fn trn_has_no_rules() {
        let result = rules(ComplianceSubject::Trn("100123456700005".into()));
        assert_eq!(result, ValidationResult::valid());
    }

    #[test]
    fn large_round_invoice_without_vat() {
        let invoice = TaxInvoiceData {
            total_amount: dec!(2000),
            vat_amount: dec!(0),
            ..Default::default()
        };
        let result = rules(ComplianceSubject::Invoice(invoice));
        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 2);
        assert_eq!(result.score(), 80);
    }

    #[test]
    fn round_number_needs_to_exceed_floor() {
        let invoice = TaxInvoiceData {
            total_amount: dec!(500),
            vat_amount: dec!(23.81),
            ..Default::default()
        };
        assert!(rules(ComplianceSubject::Invoice(invoice)).warnings().is_empty());
    }

    #[test]
    fn nil_vat_return() {
        let result = rules(ComplianceSubject::VatReturn(VatReturnData::default()));
        assert_eq!(result.warnings().len(), 1);
        assert!(result.warnings()[0].starts_with("Nil return"));
    }

    #[test]
    fn high_vat_due() {
        let vat_return = VatReturnData {
            standard_rated_supplies: dec!(3000000),
            total_supplies: dec!(3000000),
            vat_due: dec!(150000),
            ..Default::default()
        };
        assert_eq!(rules(ComplianceSubject::VatReturn(vat_return)).warnings().len(), 1);
    }

    #[test]
    fn loss_and_margin() {
        let loss = CitReturnData {
            revenue: dec!(100),
            deductible_expenses: dec!(150),
            ..Default::default()
        };
        let result = rules(ComplianceSubject::CitReturn(loss));
        assert_eq!(result.warnings().len(), 1);
        assert!(result.warnings()[0].contains("carried forward"));

        let rich = CitReturnData {
            revenue: dec!(1000000),
            deductible_expenses: dec!(400000),
            ..Default::default()
        };
        let result = rules(ComplianceSubject::CitReturn(rich));
        assert_eq!(result.warnings().len(), 1);
        assert!(result.warnings()[0].contains("60%"));
    }
}
