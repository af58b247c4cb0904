//! Scannable-code payload and QR rendering.
//!
//! The payload is a TLV sequence (one tag byte, one length byte, UTF-8
//! value) encoded as base64:
//!
//! | Tag | Value |
//! |-----|-------|
//! | 1 | seller TRN |
//! | 2 | buyer TRN (may be empty) |
//! | 3 | issue date `YYYY-MM-DD` |
//! | 4 | total amount, 2 decimals |

use std::future::Future;
use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, QrCode};

use crate::core::{EngineError, Invoice, format_amount};

pub const TAG_SELLER_TRN: u8 = 1;
pub const TAG_BUYER_TRN: u8 = 2;
pub const TAG_ISSUE_DATE: u8 = 3;
pub const TAG_TOTAL_AMOUNT: u8 = 4;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";
const QUIET_ZONE_MODULES: u32 = 4;

fn push_tlv(out: &mut Vec<u8>, tag: u8, value: &str) -> Result<(), EngineError> {
    let len = u8::try_from(value.len()).map_err(|_| {
        EngineError::Encoding(format!("TLV tag {tag} value is {} bytes (max 255)", value.len()))
    })?;
    out.push(tag);
    out.push(len);
    out.extend_from_slice(value.as_bytes());
    Ok(())
}

/// Base64 TLV payload for an invoice.
pub fn scannable_payload(invoice: &Invoice) -> Result<String, EngineError> {
    let mut tlv = Vec::with_capacity(64);
    push_tlv(&mut tlv, TAG_SELLER_TRN, invoice.seller_trn())?;
    push_tlv(&mut tlv, TAG_BUYER_TRN, invoice.buyer_trn())?;
    push_tlv(&mut tlv, TAG_ISSUE_DATE, &invoice.issue_date.format("%Y-%m-%d").to_string())?;
    push_tlv(&mut tlv, TAG_TOTAL_AMOUNT, &format_amount(invoice.totals.total_amount))?;
    Ok(BASE64.encode(tlv))
}

/// Decode a base64 TLV payload into `(tag, value)` pairs.
pub fn decode_payload(payload: &str) -> Result<Vec<(u8, String)>, EngineError> {
    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|e| EngineError::Encoding(format!("payload is not base64: {e}")))?;
    let mut fields = Vec::new();
    let mut rest = bytes.as_slice();
    while let [tag, len, tail @ ..] = rest {
        let len = usize::from(*len);
        if tail.len() < len {
            return Err(EngineError::Encoding(format!(
                "TLV tag {tag} declares {len} bytes, {} remain",
                tail.len()
            )));
        }
        let value = std::str::from_utf8(&tail[..len])
            .map_err(|e| EngineError::Encoding(format!("TLV tag {tag} is not UTF-8: {e}")))?;
        fields.push((*tag, value.to_string()));
        rest = &tail[len..];
    }
    if !rest.is_empty() {
        return Err(EngineError::Encoding("trailing byte after last TLV field".into()));
    }
    Ok(fields)
}

/// Turns a payload into a scannable image.
///
/// Encoding may suspend; callers must await it before using the artifact.
pub trait ScannableCodeEncoder: Send + Sync {
    fn encode(&self, payload: &str) -> impl Future<Output = Result<String, EngineError>> + Send;
}

/// QR code rendered to a PNG `data:` URL on a blocking worker thread.
///
/// Requires a Tokio runtime.
#[derive(Debug, Clone, Copy)]
pub struct QrCodeEncoder {
    /// Pixels per QR module.
    pub scale: u32,
}

impl Default for QrCodeEncoder {
    fn default() -> Self {
        Self { scale: 4 }
    }
}

impl QrCodeEncoder {
    pub fn new(scale: u32) -> Self {
        Self { scale: scale.max(1) }
    }
}

impl ScannableCodeEncoder for QrCodeEncoder {
    async fn encode(&self, payload: &str) -> Result<String, EngineError> {
        let payload = payload.to_owned();
        let scale = self.scale.max(1);
        tokio::task::spawn_blocking(move || render_png(&payload, scale))
            .await
            .map_err(|e| EngineError::Encoding(format!("QR worker failed: {e}")))?
            .map(|png| format!("{PNG_DATA_URL_PREFIX}{}", BASE64.encode(png)))
    }
}

/// Render `payload` as a QR code PNG.
pub fn render_png(payload: &str, scale: u32) -> Result<Vec<u8>, EngineError> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| EngineError::Encoding(format!("QR encoding failed: {e}")))?;
    let modules = code.width() as u32;
    let size = (modules + 2 * QUIET_ZONE_MODULES) * scale;

    let mut img = GrayImage::from_pixel(size, size, Luma([255u8]));
    for (i, color) in code.to_colors().into_iter().enumerate() {
        if color != Color::Dark {
            continue;
        }
        let mx = (i as u32 % modules + QUIET_ZONE_MODULES) * scale;
        let my = (i as u32 / modules + QUIET_ZONE_MODULES) * scale;
        for y in my..my + scale {
            for x in mx..mx + scale {
                img.put_pixel(x, y, Luma([0u8]));
            }
        }
    }

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| EngineError::Encoding(format!("PNG encoding failed: {e}")))?;
    Ok(png)
}

/// Strip the data-URL prefix, returning the base64 PNG data.
pub fn png_base64(scannable_code: &str) -> &str {
    scannable_code
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .unwrap_or(scannable_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn invoice() -> Invoice {
        InvoiceBuilder::new("INV-1", NaiveDate::from_ymd_opt(2025, 5, 20).unwrap())
            .seller(
                PartyBuilder::new("Seller", AddressBuilder::new("Dubai", "Dubai").build())
                    .trn("100123456700005")
                    .build(),
            )
            .add_line(LineBuilder::new("1", "Item", dec!(1), dec!(1000)).build())
            .build()
            .unwrap()
    }

    #[test]
    fn payload_fields_in_tag_order() {
        let fields = decode_payload(&scannable_payload(&invoice()).unwrap()).unwrap();
        assert_eq!(
            fields,
            vec![
                (TAG_SELLER_TRN, "100123456700005".to_string()),
                (TAG_BUYER_TRN, String::new()),
                (TAG_ISSUE_DATE, "2025-05-20".to_string()),
                (TAG_TOTAL_AMOUNT, "1050.00".to_string()),
            ]
        );
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let truncated = BASE64.encode([1u8, 5, b'a']);
        assert!(decode_payload(&truncated).is_err());
        assert!(decode_payload(&BASE64.encode([1u8])).is_err());
    }

    #[test]
    fn png_has_signature_and_quiet_zone() {
        let png = render_png("hello", 2).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let img = image::load_from_memory_with_format(&png, ImageFormat::Png)
            .unwrap()
            .to_luma8();
        assert_eq!(img.width(), img.height());
        assert_eq!(img.get_pixel(0, 0).0, [255]);
    }

    #[tokio::test]
    async fn encoder_returns_data_url() {
        let url = QrCodeEncoder::default().encode("payload").await.unwrap();
        assert!(url.starts_with(PNG_DATA_URL_PREFIX));
        assert!(BASE64.decode(png_base64(&url)).is_ok());
    }
}
