//! PDF access and page text extraction.

mod backend;
mod extract;

pub use backend::{
    decode_text_simple, number_from_value, ContentOp, LopdfBackend, PageHandle, PdfBackend,
    PdfValue,
};
pub use extract::{extract, ExtractMode, PlainTextExtractor, TextExtractor, TextItemExtractor};
