use chrono::{DateTime, Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::documents::*;
use super::result::{Findings, ScoreWeights, ValidationResult};
use super::trn::validate_trn;

/// Standard VAT rate in percent (Federal Decree-Law No. 8 of 2017).
pub const STANDARD_VAT_RATE: Decimal = dec!(5);
/// Corporate income tax rate in percent on income above the threshold.
pub const CIT_RATE: Decimal = dec!(9);
/// Taxable income up to this amount (AED) is taxed at 0%.
pub const CIT_THRESHOLD: Decimal = dec!(375000);
/// First year VAT applied.
pub const VAT_INTRODUCTION_YEAR: i32 = 2018;
/// First tax year CIT applied.
pub const CIT_INTRODUCTION_YEAR: i32 = 2023;
/// Absolute tolerance for all monetary reconciliation checks.
pub const AMOUNT_TOLERANCE: Decimal = dec!(0.01);

const INVOICE_WEIGHTS: ScoreWeights = ScoreWeights::new(15, 5);
const RETURN_WEIGHTS: ScoreWeights = ScoreWeights::new(20, 5);

const MAX_INVOICE_NUMBER_LEN: usize = 20;

fn differs(a: Decimal, b: Decimal) -> bool {
    // A difference too large to represent is certainly above tolerance.
    a.checked_sub(b).is_none_or(|d| d.abs() > AMOUNT_TOLERANCE)
}

/// Parse a document date. Accepts `YYYY-MM-DD` and RFC 3339 timestamps.
fn parse_document_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|d| d.date_naive()))
}

/// Parse a `YYYY-MM` tax period into `(year, month)`.
fn parse_tax_period(value: &str) -> Option<(i32, u32)> {
    let (year, month) = value.trim().split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

fn parse_tax_year(value: &str) -> Option<i32> {
    let value = value.trim();
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn is_well_formed_invoice_number(number: &str) -> bool {
    (1..=MAX_INVOICE_NUMBER_LEN).contains(&number.len())
        && number
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'-')
}

/// Validate a tax invoice as of `today`.
///
/// Each error costs 15 points and each warning 5.
pub fn validate_tax_invoice(invoice: &TaxInvoiceData, today: NaiveDate) -> ValidationResult {
    let mut f = Findings::default();

    let number = invoice.invoice_number.trim();
    if number.is_empty() {
        f.error("Invoice number is required");
    } else if !is_well_formed_invoice_number(number) {
        f.warning(format!(
            "Invoice number '{number}' should use only A-Z, 0-9 and '-' (max {MAX_INVOICE_NUMBER_LEN} characters)"
        ));
    }

    if invoice.issue_date.trim().is_empty() {
        f.error("Issue date is required");
    } else {
        match parse_document_date(&invoice.issue_date) {
            None => f.error(format!(
                "Issue date '{}' is not a valid date (expected YYYY-MM-DD)",
                invoice.issue_date
            )),
            Some(date) if date > today => f.error("Issue date cannot be in the future"),
            Some(date) => {
                if today
                    .checked_sub_months(Months::new(12))
                    .is_some_and(|year_ago| date < year_ago)
                {
                    f.warning("Issue date is more than one year old");
                }
            }
        }
    }

    if invoice.seller_trn.trim().is_empty() {
        f.error("Seller TRN is required");
    } else {
        f.absorb_errors("Seller TRN", &validate_trn(&invoice.seller_trn));
    }

    if let Some(buyer) = invoice.buyer_trn.as_deref().filter(|t| !t.trim().is_empty()) {
        f.absorb_errors("Buyer TRN", &validate_trn(buyer));
    }

    if invoice.total_amount <= Decimal::ZERO {
        f.error("Total amount must be greater than zero");
    }
    if invoice.vat_amount < Decimal::ZERO {
        f.error("VAT amount cannot be negative");
    }

    if invoice.items.is_empty() {
        f.error("Invoice must have at least one item");
    }

    let mut computed_vat = Some(Decimal::ZERO);
    for (i, item) in invoice.items.iter().enumerate() {
        let n = i + 1;
        if item.description.trim().is_empty() {
            f.error(format!("Item {n}: description is required"));
        }
        if item.quantity <= Decimal::ZERO {
            f.error(format!("Item {n}: quantity must be greater than zero"));
        }
        if item.unit_price < Decimal::ZERO {
            f.error(format!("Item {n}: unit price cannot be negative"));
        }
        match item.quantity.checked_mul(item.unit_price) {
            None => f.error(format!("Item {n}: amount out of range")),
            Some(expected) if differs(expected, item.total_amount) => f.error(format!(
                "Item {n}: total amount {} does not match quantity x unit price {}",
                item.total_amount,
                expected.round_dp(2)
            )),
            Some(_) => {}
        }
        if item.vat_rate != Decimal::ZERO && item.vat_rate != STANDARD_VAT_RATE {
            f.warning(format!(
                "Item {n}: VAT rate {}% is neither 0% nor the standard {STANDARD_VAT_RATE}%",
                item.vat_rate.normalize()
            ));
        }
        computed_vat = computed_vat.and_then(|sum| {
            item.total_amount
                .checked_mul(item.vat_rate)?
                .checked_div(dec!(100))
                .and_then(|vat| sum.checked_add(vat))
        });
    }

    match computed_vat {
        None => f.error("Item VAT total out of range"),
        Some(computed) if !invoice.items.is_empty() && differs(computed, invoice.vat_amount) => {
            f.warning(format!(
                "VAT amount {} does not match the sum of item VAT {}",
                invoice.vat_amount,
                computed.round_dp(2)
            ))
        }
        Some(_) => {}
    }

    f.finish(INVOICE_WEIGHTS)
}

/// Validate a VAT return as of `today`.
///
/// Each error costs 20 points and each warning 5.
pub fn validate_vat_return(vat_return: &VatReturnData, today: NaiveDate) -> ValidationResult {
    let mut f = Findings::default();

    f.absorb_errors("TRN", &validate_trn(&vat_return.trn));

    match parse_tax_period(&vat_return.tax_period) {
        None => f.error(format!(
            "Tax period '{}' must be in YYYY-MM format",
            vat_return.tax_period
        )),
        Some((year, month)) => {
            if (year, month) > (today.year(), today.month()) {
                f.error("Tax period cannot be in the future");
            }
            if year < VAT_INTRODUCTION_YEAR {
                f.error(format!(
                    "Tax period cannot be before VAT introduction ({VAT_INTRODUCTION_YEAR})"
                ));
            }
        }
    }

    let categories = [
        ("Standard-rated supplies", vat_return.standard_rated_supplies),
        ("Zero-rated supplies", vat_return.zero_rated_supplies),
        ("Exempt supplies", vat_return.exempt_supplies),
        ("Total supplies", vat_return.total_supplies),
    ];
    for (label, amount) in categories {
        if amount < Decimal::ZERO {
            f.error(format!("{label} cannot be negative"));
        }
    }

    let sum = vat_return
        .standard_rated_supplies
        .checked_add(vat_return.zero_rated_supplies)
        .and_then(|s| s.checked_add(vat_return.exempt_supplies));
    match sum {
        None => f.error("Supplies out of range"),
        Some(sum) if differs(sum, vat_return.total_supplies) => f.error(format!(
            "Total supplies {} does not equal standard + zero-rated + exempt ({sum})",
            vat_return.total_supplies
        )),
        Some(_) => {}
    }

    let expected_vat = vat_return
        .standard_rated_supplies
        .checked_mul(STANDARD_VAT_RATE)
        .and_then(|v| v.checked_div(dec!(100)));
    match expected_vat {
        None => f.error("Standard-rated supplies out of range"),
        Some(expected) if differs(expected, vat_return.vat_due) => f.warning(format!(
            "VAT due {} differs from {STANDARD_VAT_RATE}% of standard-rated supplies ({})",
            vat_return.vat_due,
            expected.round_dp(2)
        )),
        Some(_) => {}
    }

    f.finish(RETURN_WEIGHTS)
}

/// Taxable income under the CIT regime: `max(0, revenue - expenses - 375,000)`.
///
/// `None` when the difference leaves the `Decimal` range.
pub fn expected_taxable_income(revenue: Decimal, expenses: Decimal) -> Option<Decimal> {
    revenue
        .checked_sub(expenses)?
        .checked_sub(CIT_THRESHOLD)
        .map(|income| income.max(Decimal::ZERO))
}

/// CIT payable on a taxable income, `None` on overflow.
pub fn expected_cit(taxable_income: Decimal) -> Option<Decimal> {
    taxable_income.checked_mul(CIT_RATE)?.checked_div(dec!(100))
}

/// Validate a corporate income tax return as of `today`.
///
/// Each error costs 20 points and each warning 5.
pub fn validate_cit_return(cit_return: &CitReturnData, today: NaiveDate) -> ValidationResult {
    let mut f = Findings::default();

    f.absorb_errors("TRN", &validate_trn(&cit_return.trn));

    match parse_tax_year(&cit_return.tax_year) {
        None => f.error(format!(
            "Tax year '{}' must be a 4-digit year",
            cit_return.tax_year
        )),
        Some(year) => {
            if year < CIT_INTRODUCTION_YEAR {
                f.error(format!(
                    "Tax year cannot be before CIT introduction ({CIT_INTRODUCTION_YEAR})"
                ));
            }
            if year > today.year() {
                f.error("Tax year cannot be in the future");
            }
        }
    }

    if cit_return.revenue < Decimal::ZERO {
        f.error("Revenue cannot be negative");
    }
    if cit_return.deductible_expenses < Decimal::ZERO {
        f.error("Deductible expenses cannot be negative");
    }

    match expected_taxable_income(cit_return.revenue, cit_return.deductible_expenses) {
        None => f.error("Revenue and deductible expenses out of range"),
        Some(taxable) => {
            if differs(taxable, cit_return.taxable_income) {
                f.error(format!(
                    "Taxable income {} does not match revenue - expenses - {CIT_THRESHOLD} ({taxable})",
                    cit_return.taxable_income
                ));
            }
            match expected_cit(taxable) {
                None => f.error("Taxable income out of range"),
                Some(cit) if differs(cit, cit_return.cit_due) => f.error(format!(
                    "CIT due {} does not match {CIT_RATE}% of taxable income ({})",
                    cit_return.cit_due,
                    cit.round_dp(2)
                )),
                Some(_) => {}
            }
        }
    }

    if cit_return.advance_payments < Decimal::ZERO {
        f.error("Advance payments cannot be negative");
    }

    if cit_return.deductible_expenses > cit_return.revenue {
        f.warning("Deductible expenses exceed revenue");
    }
    if cit_return.advance_payments > cit_return.cit_due {
        f.warning("Advance payments exceed CIT due; a refund claim may be required");
    }

    f.finish(RETURN_WEIGHTS)
}
