//! PDF metadata extraction
//!
//! Reads the document information dictionary (trailer `/Info`) with lopdf.
//! Every field is best-effort: a missing or undecodable entry is `None`,
//! while a file that does not parse as PDF at all is an `Extraction` error.

use crate::errors::IngestionError;
use lopdf::{Dictionary, Document, Object};
use std::path::Path;
use tracing::debug;

/// Bibliographic fields recovered from a PDF
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub authors: Option<String>,
    /// The info dictionary has no abstract entry; kept for the catalog shape
    pub abstract_text: Option<String>,
    pub year: Option<i32>,
}

/// Source of bibliographic metadata for a file on disk
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<PdfMetadata, IngestionError>;
}

/// Extractor backed by lopdf
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

impl MetadataExtractor for LopdfExtractor {
    fn extract(&self, path: &Path) -> Result<PdfMetadata, IngestionError> {
        extract_metadata(path)
    }
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata, IngestionError> {
    let doc = Document::load(path)
        .map_err(|e| IngestionError::extraction(path, format!("Failed to load PDF: {}", e)))?;

    let metadata = metadata_from_document(&doc);
    debug!(
        path = %path.display(),
        has_title = metadata.title.is_some(),
        has_authors = metadata.authors.is_some(),
        year = ?metadata.year,
        "Metadata extracted"
    );

    Ok(metadata)
}

/// Metadata from an already-parsed document
pub fn metadata_from_document(doc: &Document) -> PdfMetadata {
    let Some(info) = info_dictionary(doc) else {
        return PdfMetadata::default();
    };

    PdfMetadata {
        title: text_entry(doc, info, b"Title"),
        authors: text_entry(doc, info, b"Author"),
        abstract_text: None,
        year: text_entry(doc, info, b"CreationDate")
            .as_deref()
            .and_then(parse_year),
    }
}

/// Year from a PDF date string such as `D:20210615093000+02'00'`
///
/// Takes the four characters after the optional `D:` prefix; anything that
/// is not four ASCII digits yields `None`.
pub fn parse_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix("D:").unwrap_or(trimmed);
    let candidate = digits.get(..4)?;

    if candidate.bytes().all(|b| b.is_ascii_digit()) {
        candidate.parse().ok()
    } else {
        None
    }
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    let info = doc.trailer.get(b"Info").ok()?;
    let (_, info) = doc.dereference(info).ok()?;
    info.as_dict().ok()
}

fn text_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    let value = dict.get(key).ok()?;
    let (_, value) = doc.dereference(value).ok()?;

    match value {
        Object::String(bytes, _) => non_empty(decode_text_string(bytes)),
        _ => None,
    }
}

fn non_empty(text: String) -> Option<String> {
    let cleaned = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Decode a PDF text string
///
/// UTF-16BE when it starts with the FE FF byte order mark, UTF-8 when it
/// starts with EF BB BF or is otherwise valid UTF-8, else PDFDocEncoding
/// approximated as Latin-1.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        return char::decode_utf16(units)
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
    }

    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
