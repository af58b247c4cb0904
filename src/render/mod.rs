//! Human-readable invoice page.
//!
//! [`RenderedPage`] lays an invoice out as title and header, seller block,
//! optional buyer block, item table, and totals. Arabic language tags get
//! Arabic labels and right-to-left direction.

#[cfg(feature = "pdf")]
pub mod pdf;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::{Emirate, Invoice, Party, format_amount};

/// Character width of a plain-text page.
pub const PAGE_WIDTH: usize = 96;

const RIGHT_TO_LEFT_MARK: char = '\u{200F}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    /// Direction for a BCP 47 language tag such as `ar-AE` or `en`.
    pub fn from_language(tag: &str) -> Self {
        match primary_subtag(tag).as_str() {
            "ar" | "fa" | "he" | "ur" => Self::Rtl,
            _ => Self::Ltr,
        }
    }
}

fn primary_subtag(tag: &str) -> String {
    tag.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

struct Labels {
    title: &'static str,
    invoice_number: &'static str,
    issue_date: &'static str,
    due_date: &'static str,
    seller: &'static str,
    buyer: &'static str,
    trn: &'static str,
    phone: &'static str,
    email: &'static str,
    description: &'static str,
    quantity: &'static str,
    unit_price: &'static str,
    vat_rate: &'static str,
    vat: &'static str,
    line_total: &'static str,
    subtotal: &'static str,
    vat_total: &'static str,
    grand_total: &'static str,
}

const ENGLISH: Labels = Labels {
    title: "Tax Invoice",
    invoice_number: "Invoice No.",
    issue_date: "Issue Date",
    due_date: "Due Date",
    seller: "Seller",
    buyer: "Buyer",
    trn: "TRN",
    phone: "Phone",
    email: "Email",
    description: "Description",
    quantity: "Qty",
    unit_price: "Unit Price",
    vat_rate: "VAT %",
    vat: "VAT",
    line_total: "Total",
    subtotal: "Subtotal",
    vat_total: "VAT Total",
    grand_total: "Grand Total",
};

const ARABIC: Labels = Labels {
    title: "فاتورة ضريبية",
    invoice_number: "رقم الفاتورة",
    issue_date: "تاريخ الإصدار",
    due_date: "تاريخ الاستحقاق",
    seller: "البائع",
    buyer: "المشتري",
    trn: "رقم التسجيل الضريبي",
    phone: "الهاتف",
    email: "البريد الإلكتروني",
    description: "الوصف",
    quantity: "الكمية",
    unit_price: "سعر الوحدة",
    vat_rate: "نسبة الضريبة",
    vat: "الضريبة",
    line_total: "الإجمالي",
    subtotal: "المجموع الفرعي",
    vat_total: "إجمالي ضريبة القيمة المضافة",
    grand_total: "الإجمالي المستحق",
};

/// Seller or buyer block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyBlock {
    pub heading: String,
    pub lines: Vec<String>,
}

/// Item table in logical column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Totals block; amounts are kept as decimals for reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalsBlock {
    pub currency: String,
    pub subtotal: Decimal,
    pub vat_amount: Decimal,
    pub total_amount: Decimal,
    /// Labels for subtotal, VAT and grand total, in that order.
    pub labels: [String; 3],
}

/// A laid-out invoice page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPage {
    pub language: String,
    pub direction: TextDirection,
    pub title: String,
    /// Label/value pairs: invoice number, issue date, optional due date.
    pub header: Vec<(String, String)>,
    pub seller: PartyBlock,
    pub buyer: Option<PartyBlock>,
    pub items: ItemTable,
    pub totals: TotalsBlock,
}

impl RenderedPage {
    /// Lay out `invoice` for `language`.
    pub fn render(invoice: &Invoice, language: &str) -> Self {
        let arabic = primary_subtag(language) == "ar";
        let labels = if arabic { &ARABIC } else { &ENGLISH };
        let currency = invoice.currency_code.clone();

        let mut header = vec![
            (labels.invoice_number.to_string(), invoice.number.clone()),
            (labels.issue_date.to_string(), invoice.issue_date.to_string()),
        ];
        if let Some(due) = invoice.due_date {
            header.push((labels.due_date.to_string(), due.to_string()));
        }

        let rows = invoice
            .lines
            .iter()
            .map(|line| {
                vec![
                    line.description.clone(),
                    line.quantity.normalize().to_string(),
                    format_amount(line.unit_price),
                    format!("{}%", line.tax.rate.normalize()),
                    format_amount(line.tax.tax_amount),
                    format_amount(line.gross_amount()),
                ]
            })
            .collect();

        Self {
            language: language.to_string(),
            direction: TextDirection::from_language(language),
            title: labels.title.to_string(),
            header,
            seller: party_block(labels.seller, &invoice.seller, labels, arabic),
            buyer: invoice
                .buyer
                .as_ref()
                .map(|b| party_block(labels.buyer, b, labels, arabic)),
            items: ItemTable {
                columns: [
                    labels.description,
                    labels.quantity,
                    labels.unit_price,
                    labels.vat_rate,
                    labels.vat,
                    labels.line_total,
                ]
                .map(String::from)
                .to_vec(),
                rows,
            },
            totals: TotalsBlock {
                currency,
                subtotal: invoice.totals.subtotal,
                vat_amount: invoice.totals.vat_amount,
                total_amount: invoice.totals.total_amount,
                labels: [labels.subtotal, labels.vat_total, labels.grand_total].map(String::from),
            },
        }
    }

    /// Grand total as printed on the last line of the page, `None` if that
    /// line does not carry the grand-total label, an amount and the currency.
    pub fn grand_total(&self) -> Option<Decimal> {
        let lines = self.lines();
        let amount = lines
            .last()?
            .strip_prefix(self.totals.labels[2].as_str())?
            .strip_prefix(": ")?
            .strip_suffix(self.totals.currency.as_str())?
            .strip_suffix(' ')?;
        amount.parse().ok()
    }

    /// Page content as lines in logical order, top to bottom.
    pub fn lines(&self) -> Vec<String> {
        let mut out = vec![self.title.clone()];
        out.extend(self.header.iter().map(|(k, v)| format!("{k}: {v}")));

        for block in std::iter::once(&self.seller).chain(self.buyer.as_ref()) {
            out.push(String::new());
            out.push(block.heading.clone());
            out.extend(block.lines.iter().cloned());
        }

        out.push(String::new());
        out.push(self.items.columns.join(" | "));
        out.extend(self.items.rows.iter().map(|row| row.join(" | ")));

        out.push(String::new());
        let amounts = [self.totals.subtotal, self.totals.vat_amount, self.totals.total_amount];
        for (label, amount) in self.totals.labels.iter().zip(amounts) {
            out.push(format!("{label}: {} {}", format_amount(amount), self.totals.currency));
        }
        out
    }

    /// Plain-text page. Right-to-left pages are right-aligned and each line
    /// starts with a right-to-left mark.
    pub fn to_text(&self) -> String {
        let lines = self.lines();
        match self.direction {
            TextDirection::Ltr => lines.join("\n"),
            TextDirection::Rtl => lines
                .iter()
                .map(|line| {
                    let pad = PAGE_WIDTH.saturating_sub(line.chars().count());
                    format!("{}{RIGHT_TO_LEFT_MARK}{line}", " ".repeat(pad))
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

fn party_block(heading: &str, party: &Party, labels: &Labels, arabic: bool) -> PartyBlock {
    let mut lines = vec![party.name.clone()];
    if let Some(trn) = &party.trn {
        lines.push(format!("{}: {trn}", labels.trn));
    }
    let address = &party.address;
    if let Some(street) = &address.street {
        lines.push(street.clone());
    }
    let emirate = match Emirate::parse(&address.emirate) {
        Some(e) if arabic => e.arabic_name().to_string(),
        Some(e) => e.english_name().to_string(),
        None => address.emirate.clone(),
    };
    let locality: Vec<&str> = [
        Some(address.city.as_str()),
        address.postal_code.as_deref(),
        Some(emirate.as_str()),
        Some(address.country_code.as_str()),
    ]
    .into_iter()
    .flatten()
    .filter(|s| !s.trim().is_empty())
    .collect();
    lines.push(locality.join(", "));
    if let Some(contact) = &party.contact {
        if let Some(phone) = &contact.phone {
            lines.push(format!("{}: {phone}", labels.phone));
        }
        if let Some(email) = &contact.email {
            lines.push(format!("{}: {email}", labels.email));
        }
    }
    PartyBlock {
        heading: heading.to_string(),
        lines,
    }
}
