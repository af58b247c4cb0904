//! Enveloped XML signature.
//!
//! The `ds:Signature` element is inserted as the last child of the root.
//! Its reference digest covers the document without the signature element
//! (the enveloped-signature transform), so removing the element restores the
//! exact bytes that were digested.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use quick_xml::Reader;
use quick_xml::events::Event;
use sha2::{Digest, Sha256};

use super::ROOT_ELEMENT;
use super::writer::XmlWriter;
use crate::core::{EngineError, InvoiceSigner};

const DSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";
const C14N_11: &str = "http://www.w3.org/2006/12/xml-c14n11";
const ENVELOPED: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";
const SHA256_URI: &str = "http://www.w3.org/2001/04/xmlenc#sha256";

const SIGNATURE_START: &str = "<ds:Signature";
const SIGNATURE_END: &str = "</ds:Signature>";

fn closing_root() -> String {
    format!("</{ROOT_ELEMENT}>")
}

/// Base64 SHA-256 of the document bytes.
fn document_digest(xml: &str) -> String {
    BASE64.encode(Sha256::digest(xml.as_bytes()))
}

fn write_signed_info(w: &mut XmlWriter, algorithm: &str, digest: &str) -> Result<(), EngineError> {
    w.start_element("ds:SignedInfo")?;
    w.empty_element_with_attrs("ds:CanonicalizationMethod", &[("Algorithm", C14N_11)])?;
    w.empty_element_with_attrs("ds:SignatureMethod", &[("Algorithm", algorithm)])?;
    w.start_element_with_attrs("ds:Reference", &[("URI", "")])?;
    w.start_element("ds:Transforms")?;
    w.empty_element_with_attrs("ds:Transform", &[("Algorithm", ENVELOPED)])?;
    w.end_element("ds:Transforms")?;
    w.empty_element_with_attrs("ds:DigestMethod", &[("Algorithm", SHA256_URI)])?;
    w.text_element("ds:DigestValue", digest)?;
    w.end_element("ds:Reference")?;
    w.end_element("ds:SignedInfo")?;
    Ok(())
}

/// Compact `ds:SignedInfo` bytes that the signer signs.
pub fn signed_info_bytes(algorithm: &str, digest: &str) -> Result<Vec<u8>, EngineError> {
    let mut w = XmlWriter::compact();
    write_signed_info(&mut w, algorithm, digest)?;
    Ok(w.into_string()?.into_bytes())
}

/// Sign a serialized invoice with an enveloped signature.
///
/// Fails with [`EngineError::Xml`] if the document has no closing root
/// element, or with the signer's error if signing fails.
pub fn sign_document(xml: &str, signer: &impl InvoiceSigner) -> Result<String, EngineError> {
    let root_end = xml
        .rfind(&closing_root())
        .ok_or_else(|| EngineError::Xml(format!("document has no closing </{ROOT_ELEMENT}> element")))?;
    if xml.contains(SIGNATURE_START) {
        return Err(EngineError::Xml("document is already signed".into()));
    }

    let algorithm = signer.algorithm();
    let digest = document_digest(xml);
    let signature = signer.sign(&signed_info_bytes(algorithm, &digest)?)?;

    let mut w = XmlWriter::fragment();
    w.start_element_with_attrs("ds:Signature", &[("xmlns:ds", DSIG_NS), ("Id", "invoice-signature")])?;
    write_signed_info(&mut w, algorithm, &digest)?;
    w.text_element("ds:SignatureValue", &BASE64.encode(&signature))?;
    if let Some(key) = signer.public_key() {
        w.start_element("ds:KeyInfo")?;
        w.text_element("ds:KeyValue", &BASE64.encode(key))?;
        w.end_element("ds:KeyInfo")?;
    }
    w.end_element("ds:Signature")?;
    let fragment = w.into_string()?;

    let mut signed = String::with_capacity(xml.len() + fragment.len() + 1);
    signed.push_str(&xml[..root_end]);
    signed.push_str(fragment.trim());
    signed.push('\n');
    signed.push_str(&xml[root_end..]);

    tracing::debug!(algorithm, digest = %digest, "signed invoice document");
    Ok(signed)
}

/// Values carried by an enveloped signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParts {
    pub algorithm: String,
    pub digest_value: String,
    /// Raw signature bytes.
    pub signature_value: Vec<u8>,
    /// Raw public key bytes, if present.
    pub public_key: Option<Vec<u8>>,
}

fn split_signature(signed: &str) -> Result<(String, &str), EngineError> {
    let start = signed
        .find(SIGNATURE_START)
        .ok_or_else(|| EngineError::Xml("document carries no ds:Signature".into()))?;
    let end = signed[start..]
        .find(SIGNATURE_END)
        .map(|i| start + i + SIGNATURE_END.len())
        .ok_or_else(|| EngineError::Xml("unterminated ds:Signature element".into()))?;
    let rest = &signed[end..];
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    Ok((format!("{}{rest}", &signed[..start]), &signed[start..end]))
}

/// Extract the algorithm, digest, signature and key from a signed document.
pub fn read_signature(signed: &str) -> Result<SignatureParts, EngineError> {
    let (_, fragment) = split_signature(signed)?;
    let mut reader = Reader::from_str(fragment);
    reader.config_mut().trim_text(true);

    let mut algorithm = None;
    let mut digest_value = None;
    let mut signature_value = None;
    let mut public_key = None;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                current = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
            }
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"SignatureMethod" {
                    if let Some(attr) = e.try_get_attribute("Algorithm").ok().flatten() {
                        algorithm = Some(String::from_utf8_lossy(&attr.value).into_owned());
                    }
                }
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| EngineError::Xml(format!("signature text: {e}")))?
                    .into_owned();
                let decode = |v: &str| {
                    BASE64
                        .decode(v)
                        .map_err(|e| EngineError::Xml(format!("{current} is not base64: {e}")))
                };
                match current.as_str() {
                    "DigestValue" => digest_value = Some(text),
                    "SignatureValue" => signature_value = Some(decode(&text)?),
                    "KeyValue" => public_key = Some(decode(&text)?),
                    _ => {}
                }
            }
            Ok(Event::End(_)) => current.clear(),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(EngineError::Xml(format!("signature parse error: {e}"))),
        }
    }

    Ok(SignatureParts {
        algorithm: algorithm.ok_or_else(|| EngineError::Xml("missing SignatureMethod".into()))?,
        digest_value: digest_value.ok_or_else(|| EngineError::Xml("missing DigestValue".into()))?,
        signature_value: signature_value
            .ok_or_else(|| EngineError::Xml("missing SignatureValue".into()))?,
        public_key,
    })
}

/// Recompute the enveloped digest and compare it with the stored one.
///
/// `Ok(false)` means the document was modified after signing.
pub fn verify_document_digest(signed: &str) -> Result<bool, EngineError> {
    let (unsigned, _) = split_signature(signed)?;
    let parts = read_signature(signed)?;
    Ok(document_digest(&unsigned) == parts.digest_value)
}

/// Remove the enveloped signature, returning the document that was digested.
pub fn strip_signature(signed: &str) -> Result<String, EngineError> {
    split_signature(signed).map(|(unsigned, _)| unsigned)
}
