use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::error::EngineError;
use super::types::*;
use super::validation::STANDARD_VAT_RATE;

/// Builder for finalized invoices.
///
/// ```
/// use emarat_einvoice::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let invoice = InvoiceBuilder::new("INV-2025-001", NaiveDate::from_ymd_opt(2025, 1, 15).unwrap())
///     .seller(PartyBuilder::new("Gulf Trading LLC", AddressBuilder::new("Dubai", "Dubai").build())
///         .trn("100123456700005")
///         .build())
///     .add_line(LineBuilder::new("1", "Consulting", dec!(10), dec!(150)).build())
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.totals.total_amount, dec!(1575.00));
/// ```
pub struct InvoiceBuilder {
    number: String,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    currency_code: String,
    seller: Option<Party>,
    buyer: Option<Party>,
    lines: Vec<InvoiceLine>,
}

impl InvoiceBuilder {
    pub fn new(number: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            number: number.into(),
            issue_date,
            due_date: None,
            currency_code: "AED".to_string(),
            seller: None,
            buyer: None,
            lines: Vec::new(),
        }
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency_code = code.into();
        self
    }

    pub fn seller(mut self, party: Party) -> Self {
        self.seller = Some(party);
        self
    }

    pub fn buyer(mut self, party: Party) -> Self {
        self.buyer = Some(party);
        self
    }

    pub fn add_line(mut self, line: InvoiceLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Build the invoice and compute its totals.
    pub fn build(self) -> Result<Invoice, EngineError> {
        let seller = self
            .seller
            .ok_or_else(|| EngineError::Builder("seller is required".into()))?;

        if self.number.trim().is_empty() {
            return Err(EngineError::Builder("invoice number is required".into()));
        }
        if seller.name.trim().is_empty() {
            return Err(EngineError::Builder("seller name is required".into()));
        }
        if self.lines.is_empty() {
            return Err(EngineError::Builder(
                "at least one line item is required".into(),
            ));
        }

        // Input limits to prevent abuse
        if self.lines.len() > 10_000 {
            return Err(EngineError::Builder(
                "invoice cannot have more than 10,000 line items".into(),
            ));
        }
        if self.number.len() > 200 {
            return Err(EngineError::Builder(
                "invoice number cannot exceed 200 characters".into(),
            ));
        }
        if self.currency_code.len() != 3 || !self.currency_code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(EngineError::Builder(format!(
                "currency code '{}' must be 3 uppercase letters (ISO 4217)",
                self.currency_code
            )));
        }
        if let Some(due) = self.due_date {
            if due < self.issue_date {
                return Err(EngineError::Builder(
                    "due date cannot be before the issue date".into(),
                ));
            }
        }

        for line in &self.lines {
            if line_amounts(line.quantity, line.unit_price, line.tax.rate).is_none() {
                return Err(EngineError::Builder(format!(
                    "line {}: amount out of range",
                    line.id
                )));
            }
        }
        let totals = calculate_totals(&self.lines)?;

        Ok(Invoice {
            number: self.number,
            issue_date: self.issue_date,
            due_date: self.due_date,
            currency_code: self.currency_code,
            seller,
            buyer: self.buyer,
            lines: self.lines,
            totals,
        })
    }
}

/// Sum line amounts into invoice totals.
///
/// Tax is rounded per line, so the totals always equal the sum of the
/// per-rate breakdown. Fails if a sum leaves the `Decimal` range.
pub fn calculate_totals(lines: &[InvoiceLine]) -> Result<Totals, EngineError> {
    let out_of_range = || EngineError::Builder("invoice totals out of range".into());
    let mut subtotal = Decimal::ZERO;
    let mut vat_amount = Decimal::ZERO;
    for line in lines {
        subtotal = subtotal.checked_add(line.net_amount).ok_or_else(out_of_range)?;
        vat_amount = vat_amount
            .checked_add(line.tax.tax_amount)
            .ok_or_else(out_of_range)?;
    }
    Ok(Totals {
        subtotal,
        vat_amount,
        total_amount: subtotal.checked_add(vat_amount).ok_or_else(out_of_range)?,
    })
}

/// Rounded net and tax amounts, or `None` when the product overflows.
fn line_amounts(quantity: Decimal, unit_price: Decimal, rate: Decimal) -> Option<(Decimal, Decimal)> {
    let net = round_half_up(quantity.checked_mul(unit_price)?, 2);
    let tax = round_half_up(net.checked_mul(rate)?.checked_div(dec!(100))?, 2);
    Some((net, tax))
}

/// Round a Decimal to `dp` decimal places using half-up (commercial rounding).
pub(crate) fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a monetary amount with exactly two decimals (`105` → `"105.00"`).
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = round_half_up(value, 2);
    rounded.rescale(2);
    rounded.to_string()
}

/// Builder for Party (seller/buyer).
pub struct PartyBuilder {
    name: String,
    trn: Option<String>,
    address: Address,
    contact: Option<Contact>,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            trn: None,
            address,
            contact: None,
        }
    }

    pub fn trn(mut self, trn: impl Into<String>) -> Self {
        self.trn = Some(trn.into());
        self
    }

    pub fn contact(mut self, phone: Option<String>, email: Option<String>) -> Self {
        self.contact = Some(Contact { phone, email });
        self
    }

    pub fn build(self) -> Party {
        Party {
            name: self.name,
            trn: self.trn,
            address: self.address,
            contact: self.contact,
        }
    }
}

/// Builder for Address.
pub struct AddressBuilder {
    street: Option<String>,
    city: String,
    postal_code: Option<String>,
    emirate: String,
    country_code: String,
}

impl AddressBuilder {
    pub fn new(city: impl Into<String>, emirate: impl Into<String>) -> Self {
        Self {
            street: None,
            city: city.into(),
            postal_code: None,
            emirate: emirate.into(),
            country_code: "AE".to_string(),
        }
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    /// P.O. Box or postal code.
    pub fn postal_code(mut self, code: impl Into<String>) -> Self {
        self.postal_code = Some(code.into());
        self
    }

    pub fn country(mut self, code: impl Into<String>) -> Self {
        self.country_code = code.into();
        self
    }

    pub fn build(self) -> Address {
        Address {
            street: self.street,
            city: self.city,
            postal_code: self.postal_code,
            emirate: self.emirate,
            country_code: self.country_code,
        }
    }
}

/// Builder for InvoiceLine. Defaults to standard-rated (5%) per unit.
pub struct LineBuilder {
    id: String,
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    unit_code: String,
    product_code: Option<String>,
    category: TaxCategory,
    rate: Decimal,
    exemption_reason: Option<String>,
}

impl LineBuilder {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            quantity,
            unit_price,
            unit_code: "C62".to_string(),
            product_code: None,
            category: TaxCategory::StandardRate,
            rate: STANDARD_VAT_RATE,
            exemption_reason: None,
        }
    }

    /// Tax category and rate. Zero-rated, exempt and out-of-scope lines
    /// should pass a rate of 0.
    pub fn tax(mut self, category: TaxCategory, rate: Decimal) -> Self {
        self.category = category;
        self.rate = rate;
        self
    }

    pub fn unit(mut self, code: impl Into<String>) -> Self {
        self.unit_code = code.into();
        self
    }

    pub fn product_code(mut self, code: impl Into<String>) -> Self {
        self.product_code = Some(code.into());
        self
    }

    pub fn exemption_reason(mut self, reason: impl Into<String>) -> Self {
        self.exemption_reason = Some(reason.into());
        self
    }

    /// Compute net and tax amounts for the line.
    ///
    /// Amounts that overflow saturate; [`InvoiceBuilder::build`] rejects
    /// such lines.
    pub fn build(self) -> InvoiceLine {
        let (net_amount, tax_amount) = line_amounts(self.quantity, self.unit_price, self.rate)
            .unwrap_or((Decimal::MAX, Decimal::MAX));
        let exemption_reason = self.exemption_reason.or_else(|| {
            self.category
                .default_exemption_reason()
                .map(String::from)
        });
        InvoiceLine {
            id: self.id,
            product_code: self.product_code,
            description: self.description,
            quantity: self.quantity,
            unit_code: self.unit_code,
            unit_price: self.unit_price,
            net_amount,
            tax: TaxBreakdown {
                category: self.category,
                rate: self.rate,
                taxable_amount: net_amount,
                tax_amount,
                exemption_reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seller() -> Party {
        PartyBuilder::new("Gulf Trading LLC", AddressBuilder::new("Dubai", "Dubai").build())
            .trn("100123456700005")
            .build()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn line_amounts_round_half_up() {
        let line = LineBuilder::new("1", "Widget", dec!(3), dec!(0.335)).build();
        assert_eq!(line.net_amount, dec!(1.01));
        assert_eq!(line.tax.tax_amount, dec!(0.05));
    }

    #[test]
    fn totals_sum_lines() {
        let invoice = InvoiceBuilder::new("INV-1", date())
            .seller(seller())
            .add_line(LineBuilder::new("1", "Design", dec!(2), dec!(250)).build())
            .add_line(
                LineBuilder::new("2", "Export freight", dec!(1), dec!(99.99))
                    .tax(TaxCategory::ZeroRated, dec!(0))
                    .build(),
            )
            .build()
            .unwrap();
        assert_eq!(invoice.totals.subtotal, dec!(599.99));
        assert_eq!(invoice.totals.vat_amount, dec!(25));
        assert_eq!(invoice.totals.total_amount, dec!(624.99));

        let groups = invoice.vat_breakdown();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].rate, dec!(0));
        assert_eq!(groups[1].tax_amount, dec!(25));
    }

    #[test]
    fn exempt_line_gets_default_reason() {
        let line = LineBuilder::new("1", "Residential rent", dec!(1), dec!(5000))
            .tax(TaxCategory::Exempt, dec!(0))
            .build();
        assert!(line.tax.exemption_reason.is_some());
        assert_eq!(line.gross_amount(), dec!(5000));
    }

    #[test]
    fn amounts_format_to_two_places() {
        assert_eq!(format_amount(dec!(105)), "105.00");
        assert_eq!(format_amount(dec!(0.005)), "0.01");
        assert_eq!(format_amount(dec!(12.3456)), "12.35");
    }

    #[test]
    fn rejects_missing_pieces() {
        assert!(InvoiceBuilder::new("INV-1", date()).build().is_err());
        assert!(InvoiceBuilder::new("INV-1", date()).seller(seller()).build().is_err());
        let err = InvoiceBuilder::new("INV-1", date())
            .seller(seller())
            .currency("aed")
            .add_line(LineBuilder::new("1", "x", dec!(1), dec!(1)).build())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("currency"));
    }

    #[test]
    fn rejects_amounts_out_of_range() {
        let err = InvoiceBuilder::new("INV-1", date())
            .seller(seller())
            .add_line(LineBuilder::new("7", "x", Decimal::MAX, dec!(2)).build())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("line 7: amount out of range"));

        let half = Decimal::MAX / dec!(2);
        let err = InvoiceBuilder::new("INV-1", date())
            .seller(seller())
            .add_line(LineBuilder::new("1", "x", dec!(1), half).tax(TaxCategory::ZeroRated, dec!(0)).build())
            .add_line(LineBuilder::new("2", "y", dec!(1), half).tax(TaxCategory::ZeroRated, dec!(0)).build())
            .add_line(LineBuilder::new("3", "z", dec!(1), half).tax(TaxCategory::ZeroRated, dec!(0)).build())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("totals out of range"));
    }
}
