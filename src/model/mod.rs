//! Transient values flowing through the conversion pipeline.
//!
//! None of these outlive the processing of a single page.

mod line;
mod row;

pub use line::Line;
pub use row::Row;

/// A piece of extracted text, before line or column reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    /// Text as delivered by the extractor
    pub text: String,

    /// Position in extraction order within the page (0-indexed)
    pub index: usize,
}

impl TextFragment {
    /// Create a new fragment.
    pub fn new(text: impl Into<String>, index: usize) -> Self {
        Self {
            text: text.into(),
            index,
        }
    }

    /// Check if the fragment carries no text at all.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Number fragments in order.
pub fn fragments_from<I, S>(texts: I) -> Vec<TextFragment>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| TextFragment::new(text, index))
        .collect()
}
