use super::writer::{XmlResult, XmlWriter, format_decimal};
use super::{ROOT_ELEMENT, ns};
use crate::core::*;

/// Integrity artifacts embedded as additional document references.
#[derive(Debug, Clone, Copy)]
pub struct IntegrityReference<'a> {
    /// Lowercase hex SHA-256 of the canonical content.
    pub hash: &'a str,
    /// Signature artifact (base64).
    pub signature: &'a str,
    /// Scannable code, either a `data:image/png;base64,...` URL or bare
    /// base64 PNG data.
    pub scannable_code: &'a str,
}

/// Serialize an invoice to XML.
pub fn to_invoice_xml(invoice: &Invoice) -> XmlResult {
    write_invoice(invoice, None)
}

/// Serialize an invoice to XML, embedding its hash, signature artifact and
/// scannable code.
pub fn to_invoice_xml_with_integrity(invoice: &Invoice, integrity: IntegrityReference<'_>) -> XmlResult {
    write_invoice(invoice, Some(integrity))
}

fn write_invoice(invoice: &Invoice, integrity: Option<IntegrityReference<'_>>) -> XmlResult {
    let currency = invoice.currency_code.as_str();
    let mut w = XmlWriter::new()?;

    w.start_element_with_attrs(
        ROOT_ELEMENT,
        &[
            ("xmlns", ns::INVOICE),
            ("xmlns:cac", ns::CAC),
            ("xmlns:cbc", ns::CBC),
        ],
    )?;

    w.text_element("cbc:InvoiceNumber", &invoice.number)?;
    w.text_element("cbc:IssueDate", &invoice.issue_date.to_string())?;
    if let Some(due) = &invoice.due_date {
        w.text_element("cbc:DueDate", &due.to_string())?;
    }
    w.text_element("cbc:DocumentCurrencyCode", currency)?;
    w.amount_element("cbc:TotalAmount", invoice.totals.total_amount, currency)?;

    w.start_element("cac:TaxTotal")?;
    w.amount_element("cbc:TaxAmount", invoice.totals.vat_amount, currency)?;
    w.end_element("cac:TaxTotal")?;

    if let Some(integrity) = integrity {
        write_integrity(&mut w, invoice, integrity)?;
    }

    write_party(&mut w, &invoice.seller, "cac:AccountingSupplierParty")?;
    if let Some(buyer) = &invoice.buyer {
        write_party(&mut w, buyer, "cac:AccountingCustomerParty")?;
    }

    for line in &invoice.lines {
        write_line(&mut w, line, currency)?;
    }

    w.end_element(ROOT_ELEMENT)?;
    w.into_string()
}

fn write_integrity(
    w: &mut XmlWriter,
    invoice: &Invoice,
    integrity: IntegrityReference<'_>,
) -> Result<(), EngineError> {
    w.start_element("cac:AdditionalDocumentReference")?;
    w.text_element("cbc:ID", super::HASH_REFERENCE_ID)?;
    w.text_element("cbc:DocumentDescription", integrity.hash)?;
    w.end_element("cac:AdditionalDocumentReference")?;

    w.start_element("cac:AdditionalDocumentReference")?;
    w.text_element("cbc:ID", super::SIGNATURE_REFERENCE_ID)?;
    w.text_element("cbc:DocumentDescription", integrity.signature)?;
    w.end_element("cac:AdditionalDocumentReference")?;

    let png = integrity
        .scannable_code
        .strip_prefix("data:image/png;base64,")
        .unwrap_or(integrity.scannable_code);
    let filename = format!("{}-qr.png", invoice.number);
    w.start_element("cac:AdditionalDocumentReference")?;
    w.text_element("cbc:ID", super::QR_REFERENCE_ID)?;
    w.start_element("cac:Attachment")?;
    w.text_element_with_attrs(
        "cbc:EmbeddedDocumentBinaryObject",
        png,
        &[("mimeCode", "image/png"), ("filename", &filename)],
    )?;
    w.end_element("cac:Attachment")?;
    w.end_element("cac:AdditionalDocumentReference")?;
    Ok(())
}

fn write_party(w: &mut XmlWriter, party: &Party, wrapper: &str) -> Result<(), EngineError> {
    w.start_element(wrapper)?;
    w.start_element("cac:Party")?;

    if let Some(trn) = &party.trn {
        w.start_element("cac:PartyIdentification")?;
        w.text_element_with_attrs("cbc:ID", trn, &[("schemeID", "TRN")])?;
        w.end_element("cac:PartyIdentification")?;
    }

    w.start_element("cac:PartyName")?;
    w.text_element("cbc:Name", &party.name)?;
    w.end_element("cac:PartyName")?;

    let address = &party.address;
    w.start_element("cac:PostalAddress")?;
    if let Some(street) = &address.street {
        w.text_element("cbc:StreetName", street)?;
    }
    w.text_element("cbc:CityName", &address.city)?;
    if let Some(postal) = &address.postal_code {
        w.text_element("cbc:PostalZone", postal)?;
    }
    match Emirate::parse(&address.emirate) {
        Some(emirate) => {
            w.text_element("cbc:CountrySubentity", emirate.english_name())?;
            w.text_element("cbc:CountrySubentityCode", emirate.code())?;
        }
        None if !address.emirate.trim().is_empty() => {
            w.text_element("cbc:CountrySubentity", &address.emirate)?;
        }
        None => {}
    }
    w.start_element("cac:Country")?;
    w.text_element("cbc:IdentificationCode", &address.country_code)?;
    w.end_element("cac:Country")?;
    w.end_element("cac:PostalAddress")?;

    if let Some(trn) = &party.trn {
        w.start_element("cac:PartyTaxScheme")?;
        w.text_element("cbc:CompanyID", trn)?;
        w.start_element("cac:TaxScheme")?;
        w.text_element("cbc:ID", "VAT")?;
        w.end_element("cac:TaxScheme")?;
        w.end_element("cac:PartyTaxScheme")?;
    }

    if let Some(contact) = &party.contact {
        if contact.phone.is_some() || contact.email.is_some() {
            w.start_element("cac:Contact")?;
            if let Some(phone) = &contact.phone {
                w.text_element("cbc:Telephone", phone)?;
            }
            if let Some(email) = &contact.email {
                w.text_element("cbc:ElectronicMail", email)?;
            }
            w.end_element("cac:Contact")?;
        }
    }

    w.end_element("cac:Party")?;
    w.end_element(wrapper)?;
    Ok(())
}

fn write_line(w: &mut XmlWriter, line: &InvoiceLine, currency: &str) -> Result<(), EngineError> {
    w.start_element("cac:InvoiceLine")?;
    w.text_element("cbc:ID", &line.id)?;
    w.quantity_element("cbc:InvoicedQuantity", line.quantity, &line.unit_code)?;
    w.amount_element("cbc:LineExtensionAmount", line.net_amount, currency)?;

    w.start_element("cac:Item")?;
    w.text_element("cbc:Name", &line.description)?;
    if let Some(code) = &line.product_code {
        w.start_element("cac:SellersItemIdentification")?;
        w.text_element("cbc:ID", code)?;
        w.end_element("cac:SellersItemIdentification")?;
    }
    w.end_element("cac:Item")?;

    w.start_element("cac:Price")?;
    w.text_element_with_attrs(
        "cbc:PriceAmount",
        &format_decimal(line.unit_price),
        &[("currencyID", currency)],
    )?;
    w.end_element("cac:Price")?;

    let tax = &line.tax;
    w.start_element("cac:TaxTotal")?;
    w.start_element("cac:TaxSubtotal")?;
    w.amount_element("cbc:TaxableAmount", tax.taxable_amount, currency)?;
    w.amount_element("cbc:TaxAmount", tax.tax_amount, currency)?;
    w.start_element("cac:TaxCategory")?;
    w.text_element("cbc:ID", tax.category.code())?;
    w.text_element("cbc:Percent", &format_decimal(tax.rate))?;
    if let Some(reason) = &tax.exemption_reason {
        w.text_element("cbc:TaxExemptionReason", reason)?;
    }
    w.start_element("cac:TaxScheme")?;
    w.text_element("cbc:ID", "VAT")?;
    w.end_element("cac:TaxScheme")?;
    w.end_element("cac:TaxCategory")?;
    w.end_element("cac:TaxSubtotal")?;
    w.end_element("cac:TaxTotal")?;

    w.end_element("cac:InvoiceLine")?;
    Ok(())
}
