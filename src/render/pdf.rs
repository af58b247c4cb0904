//! Single-font PDF output of a [`RenderedPage`].
//!
//! Text uses the standard Helvetica font with WinAnsi encoding and no font is
//! embedded, so the PDF is Latin-only. Characters outside Latin-1 print as
//! `?`: on an Arabic page the labels and Arabic names come out as runs of `?`
//! while numbers, dates, TRNs and the currency stay readable. The full
//! Unicode page is [`RenderedPage::to_text`].
//!
//! Right-to-left pages are right-aligned with table columns in visual
//! (right-to-left) order.

use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use super::{RenderedPage, TextDirection};
use crate::core::EngineError;

const PAGE_WIDTH_PT: i64 = 595;
const PAGE_HEIGHT_PT: i64 = 842;
const MARGIN_PT: i64 = 40;
const FONT_SIZE_PT: i64 = 10;
const LINE_HEIGHT_PT: i64 = 14;
/// Rough Helvetica advance width at 10pt, for right alignment.
const AVG_CHAR_WIDTH_PT: f64 = 5.0;

/// File attached to the PDF, e.g. the signed XML.
#[derive(Debug, Clone, Copy)]
pub struct PdfAttachment<'a> {
    pub filename: &'a str,
    pub mime_type: &'a str,
    pub description: &'a str,
    pub data: &'a [u8],
}

/// Render the page to PDF bytes.
pub fn to_pdf(page: &RenderedPage, attachment: Option<PdfAttachment<'_>>) -> Result<Vec<u8>, EngineError> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => Object::Reference(font_id),
        },
    });

    let lines = visual_lines(page);
    let per_page = ((PAGE_HEIGHT_PT - 2 * MARGIN_PT) / LINE_HEIGHT_PT).max(1) as usize;
    let mut kids = Vec::new();
    for chunk in lines.chunks(per_page) {
        let content = Stream::new(dictionary! {}, content_stream(chunk, page.direction));
        let content_id = doc.add_object(content);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH_PT.into(), PAGE_HEIGHT_PT.into()],
            "Contents" => Object::Reference(content_id),
            "Resources" => Object::Reference(resources_id),
        });
        kids.push(Object::Reference(page_id));
    }
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(latin1(&page.title)),
        "Producer" => Object::string_literal("emarat-einvoice"),
    });
    doc.trailer.set("Info", Object::Reference(info_id));

    if let Some(attachment) = attachment {
        attach(&mut doc, catalog_id, attachment)?;
    }

    doc.compress();
    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| EngineError::Pdf(format!("failed to save PDF: {e}")))?;
    Ok(output)
}

/// Lines in the order they are drawn. Right-to-left tables are mirrored so
/// the first logical column sits at the right edge.
fn visual_lines(page: &RenderedPage) -> Vec<String> {
    if page.direction == TextDirection::Ltr {
        return page.lines();
    }
    let mut mirrored = page.clone();
    mirrored.items.columns.reverse();
    for row in &mut mirrored.items.rows {
        row.reverse();
    }
    mirrored.lines()
}

fn content_stream(lines: &[String], direction: TextDirection) -> Vec<u8> {
    let mut out = String::new();
    let mut y = PAGE_HEIGHT_PT - MARGIN_PT;
    for line in lines {
        if !line.is_empty() {
            let x = match direction {
                TextDirection::Ltr => MARGIN_PT as f64,
                TextDirection::Rtl => {
                    let width = line.chars().count() as f64 * AVG_CHAR_WIDTH_PT;
                    (PAGE_WIDTH_PT - MARGIN_PT) as f64 - width
                }
            }
            .max(MARGIN_PT as f64);
            out.push_str(&format!(
                "BT /F1 {FONT_SIZE_PT} Tf {x:.1} {y} Td ({}) Tj ET\n",
                escape_pdf_text(line)
            ));
        }
        y -= LINE_HEIGHT_PT;
    }
    out.into_bytes()
}

/// Latin-1 bytes of `text`, `?` for anything else.
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// PDF literal-string body: escapes delimiters and writes non-ASCII bytes
/// as octal.
fn escape_pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for b in latin1(text) {
        match b {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\{b:03o}")),
        }
    }
    out
}

fn attach(doc: &mut Document, catalog_id: ObjectId, file: PdfAttachment<'_>) -> Result<(), EngineError> {
    let subtype = file.mime_type.replace('/', "#2F");
    let ef_stream_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "EmbeddedFile",
            "Subtype" => Object::Name(subtype.into_bytes()),
            "Params" => dictionary! {
                "Size" => Object::Integer(file.data.len() as i64),
            },
        },
        file.data.to_vec(),
    ));
    let filespec_id = doc.add_object(dictionary! {
        "Type" => "Filespec",
        "F" => Object::string_literal(file.filename),
        "UF" => Object::string_literal(file.filename),
        "Desc" => Object::string_literal(file.description),
        "AFRelationship" => Object::Name(b"Source".to_vec()),
        "EF" => dictionary! {
            "F" => Object::Reference(ef_stream_id),
            "UF" => Object::Reference(ef_stream_id),
        },
    });
    let name_tree_id = doc.add_object(dictionary! {
        "Names" => Object::Array(vec![
            Object::string_literal(file.filename),
            Object::Reference(filespec_id),
        ]),
    });
    let names_id = doc.add_object(dictionary! {
        "EmbeddedFiles" => Object::Reference(name_tree_id),
    });

    let catalog = doc
        .get_object_mut(catalog_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| EngineError::Pdf(format!("failed to get catalog: {e}")))?;
    catalog.set("AF", Object::Array(vec![Object::Reference(filespec_id)]));
    catalog.set("Names", Object::Reference(names_id));
    Ok(())
}
