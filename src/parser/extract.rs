//! Page text extraction strategies.
//!
//! Both strategies produce the same thing, an ordered list of
//! [`TextFragment`]s, so the rest of the pipeline does not care which one
//! was used.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::{fragments_from, TextFragment};

use super::backend::{number_from_value, PageHandle, PdfBackend, PdfValue};

/// Kerning adjustment (thousandths of an em) above which a `TJ` gap becomes a space.
const DEFAULT_SPACE_THRESHOLD: f32 = 200.0;

/// Produces the text fragments of a single page.
pub trait TextExtractor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Extract fragments from a non-null page.
    fn extract_page(&self, backend: &dyn PdfBackend, page: &PageHandle)
        -> Result<Vec<TextFragment>>;
}

/// Extract the fragments of page `number`.
///
/// A null page yields no fragments. Any backend failure is reported as
/// [`Error::ExtractionFailed`] for that page.
pub fn extract(
    extractor: &dyn TextExtractor,
    backend: &dyn PdfBackend,
    number: u32,
) -> Result<Vec<TextFragment>> {
    let Some(page) = backend.page(number) else {
        log::warn!("Page {} is null, skipping", number);
        return Ok(Vec::new());
    };

    extractor
        .extract_page(backend, &page)
        .map_err(|err| match err {
            Error::ExtractionFailed { .. } => err,
            other => Error::ExtractionFailed {
                page: number,
                reason: other.to_string(),
            },
        })
}

/// Which extraction strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractMode {
    /// The backend's whole-page text, one fragment per page
    #[default]
    PlainText,
    /// One fragment per text-showing operator in the content stream
    TextItems,
}

impl ExtractMode {
    /// Build the extractor for this mode.
    pub fn extractor(self) -> Box<dyn TextExtractor> {
        match self {
            ExtractMode::PlainText => Box::new(PlainTextExtractor),
            ExtractMode::TextItems => Box::new(TextItemExtractor::default()),
        }
    }
}

impl fmt::Display for ExtractMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractMode::PlainText => f.write_str("plain"),
            ExtractMode::TextItems => f.write_str("items"),
        }
    }
}

impl FromStr for ExtractMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(ExtractMode::PlainText),
            "items" | "content" => Ok(ExtractMode::TextItems),
            other => Err(format!("unknown extraction mode: {other}")),
        }
    }
}

/// Uses the backend's own page text extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn extract_page(
        &self,
        backend: &dyn PdfBackend,
        page: &PageHandle,
    ) -> Result<Vec<TextFragment>> {
        let text = backend.page_text(page)?;
        if text.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![TextFragment::new(text, 0)])
    }
}

/// Walks the content stream and emits every shown string as its own line.
#[derive(Debug, Clone, Copy)]
pub struct TextItemExtractor {
    space_threshold: f32,
}

impl TextItemExtractor {
    fn show_array(
        &self,
        backend: &dyn PdfBackend,
        page: &PageHandle,
        font: &[u8],
        items: &[PdfValue],
    ) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                PdfValue::Str(bytes) => combined.push_str(&backend.decode_text(page, font, bytes)),
                other => {
                    // Negative adjustments move the next glyph to the right.
                    let Some(adjustment) = number_from_value(other).map(|n| -n) else {
                        continue;
                    };
                    let needs_space = adjustment > self.space_threshold
                        && combined
                            .chars()
                            .last()
                            .is_some_and(|c| !c.is_whitespace() && !is_spaceless_script_char(c));
                    if needs_space {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }
}

impl Default for TextItemExtractor {
    fn default() -> Self {
        Self {
            space_threshold: DEFAULT_SPACE_THRESHOLD,
        }
    }
}

impl TextExtractor for TextItemExtractor {
    fn name(&self) -> &'static str {
        "items"
    }

    fn extract_page(
        &self,
        backend: &dyn PdfBackend,
        page: &PageHandle,
    ) -> Result<Vec<TextFragment>> {
        let mut items = Vec::new();
        let mut font: Vec<u8> = Vec::new();

        for op in backend.page_operations(page)? {
            let text = match op.operator.as_str() {
                "Tf" => {
                    if let Some(PdfValue::Name(name)) = op.operands.first() {
                        font = name.clone();
                    }
                    continue;
                }
                "Tj" | "'" => match op.operands.first() {
                    Some(PdfValue::Str(bytes)) => backend.decode_text(page, &font, bytes),
                    _ => continue,
                },
                "\"" => match op.operands.get(2) {
                    Some(PdfValue::Str(bytes)) => backend.decode_text(page, &font, bytes),
                    _ => continue,
                },
                "TJ" => match op.operands.first() {
                    Some(PdfValue::Array(arr)) => self.show_array(backend, page, &font, arr),
                    _ => continue,
                },
                _ => continue,
            };

            if !text.trim().is_empty() {
                items.push(text + "\n");
            }
        }

        Ok(fragments_from(items))
    }
}

/// Check if a character belongs to a script written without word spaces.
///
/// Chinese and Japanese qualify; Korean uses word spaces and does not.
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF         // CJK Unified Ideographs
        | 0x3400..=0x4DBF       // Extension A
        | 0x20000..=0x2EBEF     // Extensions B-F
        | 0x3040..=0x309F       // Hiragana
        | 0x30A0..=0x30FF       // Katakana
        | 0x3000..=0x303F       // CJK Symbols and Punctuation
    )
}
