//! PDF backend abstraction layer.
//!
//! The conversion pipeline only needs a handful of capabilities from a PDF
//! library: page enumeration, a null-page check, whole-page text extraction
//! and content stream operations. [`PdfBackend`] captures exactly that, so
//! the pipeline never touches `lopdf` types and tests can run against
//! in-memory documents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::detect::sniff_path;
use crate::error::{Error, Result};

/// Handle to one page of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHandle {
    /// 1-indexed page number
    pub number: u32,
    /// Backend object identifier: (object number, generation number)
    pub id: (u32, u16),
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Create an operation.
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }
}

/// Abstract interface for PDF document access.
pub trait PdfBackend {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Handle for the 1-indexed page `number`.
    ///
    /// Returns `None` for a null or missing page.
    fn page(&self, number: u32) -> Option<PageHandle>;

    /// Whole-page text as produced by the backend's own text extraction.
    fn page_text(&self, page: &PageHandle) -> Result<String>;

    /// Decoded content stream operations of a page.
    fn page_operations(&self, page: &PageHandle) -> Result<Vec<ContentOp>>;

    /// Decode a text byte sequence using the font's encoding on the given page.
    fn decode_text(&self, page: &PageHandle, font_name: &[u8], bytes: &[u8]) -> String {
        let _ = (page, font_name);
        decode_text_simple(bytes)
    }
}

/// Simple text decoding fallback when no font encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
///
/// The document is loaded once and released when the backend is dropped.
pub struct LopdfBackend {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfBackend {
    /// Open a PDF file.
    ///
    /// Any failure, including a missing `%PDF-` header, is reported as
    /// [`Error::OpenFailed`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let open_failed = |err: Error| Error::OpenFailed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        };

        let header = sniff_path(path).map_err(open_failed)?;
        log::debug!("{}: {}", path.display(), header);

        let doc = LopdfDocument::load(path)
            .map_err(Error::from)
            .map_err(open_failed)?;
        Ok(Self::from_document(doc))
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data).map_err(|e| Error::OpenFailed {
            path: PathBuf::from("<memory>"),
            reason: Error::from(e).to_string(),
        })?;
        Ok(Self::from_document(doc))
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        let pages = doc.get_pages();
        Self { doc, pages }
    }

    /// PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }
}

impl PdfBackend for LopdfBackend {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page(&self, number: u32) -> Option<PageHandle> {
        let id = *self.pages.get(&number)?;
        // A page reference that does not resolve to a dictionary is a null page.
        self.doc.get_dictionary(id).ok()?;
        Some(PageHandle { number, id })
    }

    fn page_text(&self, page: &PageHandle) -> Result<String> {
        self.doc
            .extract_text(&[page.number])
            .map_err(|e| Error::PdfParse(e.to_string()))
    }

    fn page_operations(&self, page: &PageHandle) -> Result<Vec<ContentOp>> {
        let data = self.doc.get_page_content(page.id)?;
        let content = lopdf::content::Content::decode(&data)?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operands: op.operands.iter().map(convert_object).collect(),
                operator: op.operator,
            })
            .collect())
    }

    fn decode_text(&self, page: &PageHandle, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(fonts) = self.doc.get_page_fonts(page.id) {
            if let Some(font_dict) = fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

/// Extract a number from a [`PdfValue`].
pub fn number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_simple_utf8() {
        assert_eq!(decode_text_simple("Größe".as_bytes()), "Größe");
    }

    #[test]
    fn test_decode_text_simple_latin1() {
        // 0xE9 = 'é' in Latin-1
        let bytes = vec![0x48, 0x65, 0x6C, 0x6C, 0xE9];
        assert_eq!(decode_text_simple(&bytes), "Hellé");
    }

    #[test]
    fn test_decode_text_simple_utf16be() {
        // UTF-16BE BOM + "表"
        let bytes = vec![0xFE, 0xFF, 0x88, 0x68];
        assert_eq!(decode_text_simple(&bytes), "表");
    }

    #[test]
    fn test_number_from_value() {
        assert_eq!(number_from_value(&PdfValue::Integer(-250)), Some(-250.0));
        assert_eq!(number_from_value(&PdfValue::Real(1.5)), Some(1.5));
        assert_eq!(number_from_value(&PdfValue::Name(b"F1".to_vec())), None);
    }

    #[test]
    fn test_open_rejects_non_pdf() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"Name,Age\nBob,42\n").unwrap();

        let err = LopdfBackend::open(file.path()).err().unwrap();
        assert!(matches!(err, Error::OpenFailed { .. }));
        assert_eq!(err.stage(), "open");
    }

    #[test]
    fn test_load_bytes_rejects_garbage() {
        let err = LopdfBackend::load_bytes(b"definitely not a pdf").err().unwrap();
        assert!(matches!(err, Error::OpenFailed { .. }));
    }
}
