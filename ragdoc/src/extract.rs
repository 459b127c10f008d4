//! Text extraction for supported document formats.
//!
//! PDFs are extracted page by page with `pdf-extract`. DOCX files are ZIP
//! containers; the text lives in `word/document.xml`, which is read with
//! the `zip` crate and reduced to plain text without a full XML parser:
//! only `<w:t>` runs carry text, `</w:p>` closes a paragraph, and
//! `<w:tab>`/`<w:br>` map to whitespace.

use std::io::Read;
use std::path::Path;

use crate::error::{RagError, Result};

/// Extract the text of each page of a PDF, in page order.
///
/// The returned vector index is the native 0-based page index. Pages
/// without extractable text yield empty strings.
pub fn pdf_pages(path: &Path) -> Result<Vec<String>> {
    pdf_extract::extract_text_by_pages(path)
        .map_err(|e| RagError::Extraction(format!("{}: {e}", path.display())))
}

/// Extract the whole-document text of a DOCX file, trimmed.
pub fn docx_text(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| RagError::Extraction(format!("{}: not a DOCX container: {e}", path.display())))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| {
            RagError::Extraction(format!("{}: missing word/document.xml: {e}", path.display()))
        })?
        .read_to_string(&mut xml)?;

    Ok(plaintext_from_document_xml(&xml).trim().to_string())
}

/// True if `tag` (the content between `<` and `>`) names `name`, i.e. it is
/// exactly the name or the name followed by an attribute list or `/`.
fn tag_is(tag: &str, name: &str) -> bool {
    match tag.strip_prefix(name) {
        Some(rest) => rest.is_empty() || rest.starts_with(' ') || rest.starts_with('/'),
        None => false,
    }
}

/// Reduce WordprocessingML to plain text.
fn plaintext_from_document_xml(xml: &str) -> String {
    let mut out = String::new();
    let mut rest = xml;

    while let Some(lt) = rest.find('<') {
        let after = &rest[lt + 1..];
        let Some(gt) = after.find('>') else { break };
        let tag = &after[..gt];
        let remainder = &after[gt + 1..];

        if tag_is(tag, "w:t") && !tag.ends_with('/') {
            // Text run: capture until the matching close tag.
            let Some(end) = remainder.find("</w:t>") else { break };
            unescape_xml_into(&remainder[..end], &mut out);
            rest = &remainder[end + "</w:t>".len()..];
            continue;
        }

        if tag == "/w:p" {
            out.push('\n');
        } else if tag_is(tag, "w:tab") {
            out.push('\t');
        } else if tag_is(tag, "w:br") || tag_is(tag, "w:cr") {
            out.push('\n');
        }
        rest = remainder;
    }

    out
}

/// Append `text` with the five predefined XML entities decoded.
fn unescape_xml_into(text: &str, out: &mut String) {
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let entity = &rest[amp..];
        let (replacement, len) = if entity.starts_with("&amp;") {
            ('&', 5)
        } else if entity.starts_with("&lt;") {
            ('<', 4)
        } else if entity.starts_with("&gt;") {
            ('>', 4)
        } else if entity.starts_with("&quot;") {
            ('"', 6)
        } else if entity.starts_with("&apos;") {
            ('\'', 6)
        } else {
            ('&', 1)
        };
        out.push(replacement);
        rest = &entity[len..];
    }
    out.push_str(rest);
}
