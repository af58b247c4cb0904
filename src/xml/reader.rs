use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::events::Event;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::ROOT_ELEMENT;
use crate::core::EngineError;

/// Header figures read back from a serialized invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub currency_code: Option<String>,
    pub total_amount: Decimal,
    /// Document-level VAT total.
    pub vat_amount: Option<Decimal>,
    pub seller_trn: Option<String>,
    pub buyer_trn: Option<String>,
    /// Sum of line extension amounts.
    pub line_net_total: Decimal,
    pub line_count: usize,
    /// Hash from the integrity reference, if embedded.
    pub integrity_hash: Option<String>,
    pub signed: bool,
}

#[derive(Default)]
struct Parsed {
    root_seen: bool,
    invoice_number: Option<String>,
    issue_date: Option<String>,
    due_date: Option<String>,
    currency_code: Option<String>,
    total_amount: Option<String>,
    vat_amount: Option<String>,
    seller_trn: Option<String>,
    buyer_trn: Option<String>,
    line_net_total: Decimal,
    line_count: usize,
    reference_id: Option<String>,
    integrity_hash: Option<String>,
    signed: bool,
}

fn parse_amount(field: &str, value: &str) -> Result<Decimal, EngineError> {
    Decimal::from_str(value.trim())
        .map_err(|e| EngineError::Xml(format!("{field} '{value}' is not a decimal: {e}")))
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, EngineError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| EngineError::Xml(format!("{field} '{value}' is not a date: {e}")))
}

impl Parsed {
    fn handle_text(&mut self, path: &[String], text: &str) -> Result<(), EngineError> {
        let leaf = path.last().map(String::as_str).unwrap_or("");
        let parent = path.len().checked_sub(2).map_or("", |i| path[i].as_str());
        let in_party = |wrapper: &str| path.iter().any(|p| p == wrapper);

        match (path.len(), leaf) {
            (2, "InvoiceNumber") => self.invoice_number = Some(text.to_string()),
            (2, "IssueDate") => self.issue_date = Some(text.to_string()),
            (2, "DueDate") => self.due_date = Some(text.to_string()),
            (2, "DocumentCurrencyCode") => self.currency_code = Some(text.to_string()),
            (2, "TotalAmount") => self.total_amount = Some(text.to_string()),
            (3, "TaxAmount") if parent == "TaxTotal" => self.vat_amount = Some(text.to_string()),
            (_, "LineExtensionAmount") if parent == "InvoiceLine" => {
                self.line_net_total += parse_amount("LineExtensionAmount", text)?;
            }
            (_, "ID") if parent == "PartyIdentification" => {
                if in_party("AccountingSupplierParty") {
                    self.seller_trn = Some(text.to_string());
                } else if in_party("AccountingCustomerParty") {
                    self.buyer_trn = Some(text.to_string());
                }
            }
            (3, "ID") if parent == "AdditionalDocumentReference" => {
                self.reference_id = Some(text.to_string());
            }
            (3, "DocumentDescription")
                if self.reference_id.as_deref() == Some(super::HASH_REFERENCE_ID) =>
            {
                self.integrity_hash = Some(text.to_string());
            }
            _ => {}
        }
        Ok(())
    }

    fn into_summary(self) -> Result<DocumentSummary, EngineError> {
        if !self.root_seen {
            return Err(EngineError::Xml(format!("missing <{ROOT_ELEMENT}> root element")));
        }
        let invoice_number = self
            .invoice_number
            .ok_or_else(|| EngineError::Xml("missing InvoiceNumber".into()))?;
        let issue_date = self
            .issue_date
            .ok_or_else(|| EngineError::Xml("missing IssueDate".into()))?;
        let total_amount = self
            .total_amount
            .ok_or_else(|| EngineError::Xml("missing TotalAmount".into()))?;

        Ok(DocumentSummary {
            invoice_number,
            issue_date: parse_date("IssueDate", &issue_date)?,
            due_date: self
                .due_date
                .map(|d| parse_date("DueDate", &d))
                .transpose()?,
            currency_code: self.currency_code,
            total_amount: parse_amount("TotalAmount", &total_amount)?,
            vat_amount: self
                .vat_amount
                .map(|v| parse_amount("TaxAmount", &v))
                .transpose()?,
            seller_trn: self.seller_trn,
            buyer_trn: self.buyer_trn,
            line_net_total: self.line_net_total,
            line_count: self.line_count,
            integrity_hash: self.integrity_hash,
            signed: self.signed,
        })
    }
}

/// Read the header figures of a serialized (optionally signed) invoice.
///
/// Element names are matched on their local part, so any namespace prefix
/// is accepted.
pub fn read_summary(xml: &str) -> Result<DocumentSummary, EngineError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parsed = Parsed::default();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if path.is_empty() {
                    if name != ROOT_ELEMENT {
                        return Err(EngineError::Xml(format!(
                            "expected <{ROOT_ELEMENT}> root element, found <{name}>"
                        )));
                    }
                    parsed.root_seen = true;
                }
                match name.as_str() {
                    "InvoiceLine" => parsed.line_count += 1,
                    "Signature" if path.len() == 1 => parsed.signed = true,
                    "AdditionalDocumentReference" => parsed.reference_id = None,
                    _ => {}
                }
                path.push(name);
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| EngineError::Xml(format!("text decode error: {err}")))?;
                if !text.is_empty() {
                    parsed.handle_text(&path, &text)?;
                }
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(EngineError::Xml(format!(
                    "parse error at position {}: {e}",
                    reader.error_position()
                )));
            }
        }
    }

    parsed.into_summary()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::*;
    use crate::xml::{sign_document, to_invoice_xml};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn invoice() -> Invoice {
        let address = AddressBuilder::new("Sharjah", "Sharjah").build();
        InvoiceBuilder::new("INV-42", NaiveDate::from_ymd_opt(2025, 4, 2).unwrap())
            .seller(PartyBuilder::new("Seller", address.clone()).trn("100123456700005").build())
            .buyer(PartyBuilder::new("Buyer", address).trn("200000000000001").build())
            .add_line(LineBuilder::new("1", "A", dec!(3), dec!(10)).build())
            .add_line(LineBuilder::new("2", "B", dec!(1), dec!(70)).tax(TaxCategory::ZeroRated, dec!(0)).build())
            .build()
            .unwrap()
    }

    #[test]
    fn reads_back_header() {
        let source = invoice();
        let summary = read_summary(&to_invoice_xml(&source).unwrap()).unwrap();
        assert_eq!(summary.invoice_number, "INV-42");
        assert_eq!(summary.issue_date, source.issue_date);
        assert_eq!(summary.total_amount, source.totals.total_amount);
        assert_eq!(summary.vat_amount, Some(source.totals.vat_amount));
        assert_eq!(summary.line_net_total, source.totals.subtotal);
        assert_eq!(summary.line_count, 2);
        assert_eq!(summary.seller_trn.as_deref(), Some("100123456700005"));
        assert_eq!(summary.buyer_trn.as_deref(), Some("200000000000001"));
        assert!(!summary.signed);
    }

    #[test]
    fn detects_signature() {
        let xml = to_invoice_xml(&invoice()).unwrap();
        let signed = sign_document(&xml, &PlaceholderSigner).unwrap();
        assert!(read_summary(&signed).unwrap().signed);
    }

    #[test]
    fn rejects_foreign_documents() {
        assert!(read_summary("<CreditNote/>").is_err());
        assert!(read_summary("").is_err());
        assert!(read_summary("<Invoice><cbc:IssueDate>x</cbc:IssueDate></Invoice>").is_err());
    }
}
