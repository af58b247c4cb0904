use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::documents::{InvoiceItem, TaxInvoiceData};

/// A finalized tax invoice, the input to document generation.
///
/// Built through [`InvoiceBuilder`](super::InvoiceBuilder), which computes
/// line amounts and totals. Treat it as immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice number, unique per seller.
    pub number: String,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    /// ISO 4217 currency code (default "AED").
    pub currency_code: String,
    pub seller: Party,
    /// Absent on simplified (B2C) invoices.
    pub buyer: Option<Party>,
    pub lines: Vec<InvoiceLine>,
    pub totals: Totals,
}

/// Seller or buyer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// Registered legal name.
    pub name: String,
    /// Tax Registration Number.
    pub trn: Option<String>,
    pub address: Address,
    pub contact: Option<Contact>,
}

/// Postal address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: String,
    pub postal_code: Option<String>,
    /// Emirate name as supplied (see [`Emirate::parse`](super::Emirate::parse)).
    pub emirate: String,
    /// ISO 3166-1 alpha-2 (default "AE").
    pub country_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Invoice line with its computed amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub id: String,
    /// Seller's item code.
    pub product_code: Option<String>,
    pub description: String,
    pub quantity: Decimal,
    /// UN/ECE Rec 20 unit code (default "C62", one).
    pub unit_code: String,
    pub unit_price: Decimal,
    /// `quantity * unit_price`, rounded half-up to 2 decimals.
    pub net_amount: Decimal,
    pub tax: TaxBreakdown,
}

impl InvoiceLine {
    /// Net amount plus tax.
    pub fn gross_amount(&self) -> Decimal {
        self.net_amount + self.tax.tax_amount
    }
}

/// Tax applied to one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub category: TaxCategory,
    /// Rate in percent.
    pub rate: Decimal,
    pub taxable_amount: Decimal,
    pub tax_amount: Decimal,
    pub exemption_reason: Option<String>,
}

/// UNTDID 5305 tax category codes used for UAE VAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaxCategory {
    /// S: standard rate (5%).
    StandardRate,
    /// Z: zero rated (exports, international transport, first supply of
    /// residential property, ...).
    ZeroRated,
    /// E: exempt (local passenger transport, bare land, some financial
    /// services, ...).
    Exempt,
    /// O: outside the scope of VAT.
    OutOfScope,
}

impl TaxCategory {
    pub fn code(&self) -> &'static str {
        match self {
            Self::StandardRate => "S",
            Self::ZeroRated => "Z",
            Self::Exempt => "E",
            Self::OutOfScope => "O",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(Self::StandardRate),
            "Z" => Some(Self::ZeroRated),
            "E" => Some(Self::Exempt),
            "O" => Some(Self::OutOfScope),
            _ => None,
        }
    }

    /// Default exemption reason text for categories that need one.
    pub fn default_exemption_reason(&self) -> Option<&'static str> {
        match self {
            Self::Exempt => Some("Exempt supply under Article 46 of Federal Decree-Law No. 8 of 2017"),
            Self::OutOfScope => Some("Supply outside the scope of UAE VAT"),
            Self::StandardRate | Self::ZeroRated => None,
        }
    }
}

/// Invoice totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line net amounts.
    pub subtotal: Decimal,
    /// Sum of line tax amounts.
    pub vat_amount: Decimal,
    /// `subtotal + vat_amount`.
    pub total_amount: Decimal,
}

/// Taxable and tax amounts summed over all lines sharing a rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatRateGroup {
    pub rate: Decimal,
    /// Category of the first line seen at this rate.
    pub category: TaxCategory,
    pub taxable_amount: Decimal,
    pub tax_amount: Decimal,
}

impl Invoice {
    /// Seller TRN, or `""` when missing.
    pub fn seller_trn(&self) -> &str {
        self.seller.trn.as_deref().unwrap_or_default()
    }

    /// Buyer TRN, or `""` when there is no buyer or it has no TRN.
    pub fn buyer_trn(&self) -> &str {
        self.buyer
            .as_ref()
            .and_then(|b| b.trn.as_deref())
            .unwrap_or_default()
    }

    /// Group lines by tax rate, ascending.
    pub fn vat_breakdown(&self) -> Vec<VatRateGroup> {
        let mut groups: BTreeMap<Decimal, VatRateGroup> = BTreeMap::new();
        for line in &self.lines {
            let group = groups.entry(line.tax.rate).or_insert_with(|| VatRateGroup {
                rate: line.tax.rate,
                category: line.tax.category,
                taxable_amount: Decimal::ZERO,
                tax_amount: Decimal::ZERO,
            });
            group.taxable_amount += line.tax.taxable_amount;
            group.tax_amount += line.tax.tax_amount;
        }
        groups.into_values().collect()
    }
}

impl From<&Invoice> for TaxInvoiceData {
    fn from(invoice: &Invoice) -> Self {
        let buyer_trn = invoice.buyer_trn();
        TaxInvoiceData {
            invoice_number: invoice.number.clone(),
            issue_date: invoice.issue_date.to_string(),
            seller_trn: invoice.seller_trn().to_string(),
            buyer_trn: (!buyer_trn.is_empty()).then(|| buyer_trn.to_string()),
            total_amount: invoice.totals.total_amount,
            vat_amount: invoice.totals.vat_amount,
            items: invoice
                .lines
                .iter()
                .map(|line| InvoiceItem {
                    description: line.description.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    vat_rate: line.tax.rate,
                    total_amount: line.net_amount,
                })
                .collect(),
        }
    }
}
