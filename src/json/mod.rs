//! Canonical JSON mapping of an invoice.
//!
//! Field names follow the exchange format (`supplierTRN`, `vatBreakdown`,
//! ...). Monetary amounts are decimal strings with two places so they round
//! trip exactly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{Emirate, EngineError, Invoice, Party, round_half_up};

fn money(value: Decimal) -> Decimal {
    let mut rounded = round_half_up(value, 2);
    rounded.rescale(2);
    rounded
}

/// Canonical JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalInvoice {
    #[serde(rename = "supplierTRN")]
    pub supplier_trn: String,
    #[serde(rename = "buyerTRN")]
    pub buyer_trn: Option<String>,
    pub issue_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub invoice_number: String,
    pub currency: String,
    pub subtotal: Decimal,
    pub vat_amount: Decimal,
    pub total_amount: Decimal,
    pub items: Vec<CanonicalItem>,
    pub seller: CanonicalParty,
    pub buyer: Option<CanonicalParty>,
    pub vat_breakdown: Vec<CanonicalVatGroup>,
}

/// One invoice line, flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    /// Net amount plus tax.
    pub total_amount: Decimal,
    pub product_code: Option<String>,
    pub units_of_measure: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalParty {
    pub name: String,
    pub trn: Option<String>,
    pub address: CanonicalAddress,
    pub contact: Option<CanonicalContact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalAddress {
    pub street: Option<String>,
    pub city: String,
    pub postal_code: Option<String>,
    pub emirate: String,
    /// ISO 3166-2 code when the emirate is recognised.
    pub emirate_code: Option<String>,
    pub country_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalContact {
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Lines sharing one tax rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalVatGroup {
    pub taxable_amount: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    /// Category code (`S`, `Z`, `E`, `O`).
    pub tax_category: String,
}

impl From<&Party> for CanonicalParty {
    fn from(party: &Party) -> Self {
        let address = &party.address;
        let emirate = Emirate::parse(&address.emirate);
        Self {
            name: party.name.clone(),
            trn: party.trn.clone(),
            address: CanonicalAddress {
                street: address.street.clone(),
                city: address.city.clone(),
                postal_code: address.postal_code.clone(),
                emirate: emirate
                    .map(|e| e.english_name().to_string())
                    .unwrap_or_else(|| address.emirate.clone()),
                emirate_code: emirate.map(|e| e.code().to_string()),
                country_code: address.country_code.clone(),
            },
            contact: party.contact.as_ref().map(|c| CanonicalContact {
                phone: c.phone.clone(),
                email: c.email.clone(),
            }),
        }
    }
}

impl From<&Invoice> for CanonicalInvoice {
    fn from(invoice: &Invoice) -> Self {
        let buyer_trn = invoice.buyer_trn();
        Self {
            supplier_trn: invoice.seller_trn().to_string(),
            buyer_trn: (!buyer_trn.is_empty()).then(|| buyer_trn.to_string()),
            issue_date: invoice.issue_date.to_string(),
            due_date: invoice.due_date.map(|d| d.to_string()),
            invoice_number: invoice.number.clone(),
            currency: invoice.currency_code.clone(),
            subtotal: money(invoice.totals.subtotal),
            vat_amount: money(invoice.totals.vat_amount),
            total_amount: money(invoice.totals.total_amount),
            items: invoice
                .lines
                .iter()
                .map(|line| CanonicalItem {
                    description: line.description.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    tax_rate: line.tax.rate,
                    tax_amount: money(line.tax.tax_amount),
                    total_amount: money(line.gross_amount()),
                    product_code: line.product_code.clone(),
                    units_of_measure: line.unit_code.clone(),
                })
                .collect(),
            seller: CanonicalParty::from(&invoice.seller),
            buyer: invoice.buyer.as_ref().map(CanonicalParty::from),
            vat_breakdown: invoice
                .vat_breakdown()
                .into_iter()
                .map(|group| CanonicalVatGroup {
                    taxable_amount: money(group.taxable_amount),
                    tax_rate: group.rate,
                    tax_amount: money(group.tax_amount),
                    tax_category: group.category.code().to_string(),
                })
                .collect(),
        }
    }
}

impl CanonicalInvoice {
    /// Sum of item totals; equals `total_amount` for a built invoice.
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(|i| i.total_amount).sum()
    }

    /// Sum of the per-rate tax amounts; equals `vat_amount`.
    pub fn breakdown_tax_total(&self) -> Decimal {
        self.vat_breakdown.iter().map(|g| g.tax_amount).sum()
    }
}

/// Serialize an invoice to pretty-printed canonical JSON.
pub fn to_canonical_json(invoice: &Invoice) -> Result<String, EngineError> {
    serde_json::to_string_pretty(&CanonicalInvoice::from(invoice))
        .map_err(|e| EngineError::Json(format!("serialization failed: {e}")))
}

/// Parse canonical JSON back into its typed form.
pub fn from_canonical_json(json: &str) -> Result<CanonicalInvoice, EngineError> {
    serde_json::from_str(json).map_err(|e| EngineError::Json(format!("parse failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn invoice() -> Invoice {
        InvoiceBuilder::new("INV-5", NaiveDate::from_ymd_opt(2025, 2, 14).unwrap())
            .seller(
                PartyBuilder::new("Seller", AddressBuilder::new("Abu Dhabi", "abu dhabi").build())
                    .trn("100123456700005")
                    .build(),
            )
            .add_line(LineBuilder::new("1", "Laptop", dec!(2), dec!(3000)).product_code("LP-1").build())
            .add_line(LineBuilder::new("2", "Mouse", dec!(3), dec!(45.50)).unit("H87").build())
            .add_line(
                LineBuilder::new("3", "Export freight", dec!(1), dec!(800))
                    .tax(TaxCategory::ZeroRated, dec!(0))
                    .build(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn field_names() {
        let value: serde_json::Value = serde_json::from_str(&to_canonical_json(&invoice()).unwrap()).unwrap();
        for key in [
            "supplierTRN",
            "buyerTRN",
            "issueDate",
            "invoiceNumber",
            "currency",
            "subtotal",
            "vatAmount",
            "totalAmount",
            "items",
            "seller",
            "buyer",
            "vatBreakdown",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        let item = &value["items"][0];
        for key in [
            "description",
            "quantity",
            "unitPrice",
            "taxRate",
            "taxAmount",
            "totalAmount",
            "productCode",
            "unitsOfMeasure",
        ] {
            assert!(item.get(key).is_some(), "missing item {key}");
        }
        assert_eq!(value["totalAmount"], "7243.33");
        assert_eq!(value["seller"]["address"]["emirateCode"], "AE-AZ");
        assert!(value["buyer"].is_null());
    }

    #[test]
    fn breakdown_groups_by_rate() {
        let canonical = CanonicalInvoice::from(&invoice());
        assert_eq!(canonical.vat_breakdown.len(), 2);
        let standard = &canonical.vat_breakdown[1];
        assert_eq!(standard.tax_category, "S");
        assert_eq!(standard.taxable_amount, dec!(6136.50));
        assert_eq!(standard.tax_amount, dec!(306.83));
        assert_eq!(canonical.breakdown_tax_total(), canonical.vat_amount);
        assert_eq!(canonical.items_total(), canonical.total_amount);
    }

    #[test]
    fn json_round_trips() {
        let json = to_canonical_json(&invoice()).unwrap();
        assert_eq!(from_canonical_json(&json).unwrap(), CanonicalInvoice::from(&invoice()));
        assert!(from_canonical_json("{}").is_err());
    }
}
