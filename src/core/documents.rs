//! Raw tax documents as submitted for validation.
//!
//! Fields that come from user input (identifiers, dates, periods) stay as
//! strings so that malformed values surface as validation errors instead of
//! deserialization failures. Missing fields deserialize to empty/zero and are
//! reported by the validators.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line on a tax invoice submitted for validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// VAT rate in percent (e.g. `5`).
    pub vat_rate: Decimal,
    /// Net line amount; must equal `quantity * unit_price`.
    pub total_amount: Decimal,
}

/// Tax invoice submitted for validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxInvoiceData {
    pub invoice_number: String,
    /// Issue date as `YYYY-MM-DD`.
    pub issue_date: String,
    pub seller_trn: String,
    pub buyer_trn: Option<String>,
    pub total_amount: Decimal,
    pub vat_amount: Decimal,
    pub items: Vec<InvoiceItem>,
}

/// VAT return for one tax period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VatReturnData {
    pub trn: String,
    /// Tax period as `YYYY-MM`.
    pub tax_period: String,
    pub standard_rated_supplies: Decimal,
    pub zero_rated_supplies: Decimal,
    pub exempt_supplies: Decimal,
    pub total_supplies: Decimal,
    pub vat_due: Decimal,
}

/// Corporate income tax return for one tax year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CitReturnData {
    pub trn: String,
    /// Four-digit tax year.
    pub tax_year: String,
    pub revenue: Decimal,
    pub deductible_expenses: Decimal,
    pub taxable_income: Decimal,
    pub cit_due: Decimal,
    pub advance_payments: Decimal,
}
