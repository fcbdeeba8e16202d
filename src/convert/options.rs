//! Conversion options and configuration.

use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::parser::ExtractMode;
use crate::render::{EncodingMode, RecordTerminator};
use crate::table::{BoundaryStrategy, ColumnSplitter, WhitespaceRun, DEFAULT_BOUNDARY_PATTERN};

/// Options for one conversion run.
///
/// The value is handed to [`TableConverter::new`](super::TableConverter::new)
/// and never changes afterwards.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Column boundary rule
    pub boundary: Boundary,

    /// Output character encoding
    pub encoding: EncodingMode,

    /// Field delimiter (single ASCII byte)
    pub delimiter: u8,

    /// Record terminator
    pub terminator: RecordTerminator,

    /// Page text extraction strategy
    pub extract_mode: ExtractMode,

    /// Page selection (which pages to convert)
    pub pages: PageSelection,
}

impl ConvertOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a regular expression as column boundary.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.boundary = Boundary::Pattern(pattern.into());
        self
    }

    /// Split at whitespace runs of at least `min_run` characters or any tab.
    pub fn with_whitespace_run(mut self, min_run: usize) -> Self {
        self.boundary = Boundary::WhitespaceRun(min_run);
        self
    }

    /// Use a custom boundary strategy.
    pub fn with_strategy(mut self, strategy: Arc<dyn BoundaryStrategy>) -> Self {
        self.boundary = Boundary::Strategy(strategy);
        self
    }

    /// Set output encoding.
    pub fn with_encoding(mut self, encoding: EncodingMode) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set record terminator.
    pub fn with_terminator(mut self, terminator: RecordTerminator) -> Self {
        self.terminator = terminator;
        self
    }

    /// Set extraction mode.
    pub fn with_extract_mode(mut self, mode: ExtractMode) -> Self {
        self.extract_mode = mode;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            boundary: Boundary::default(),
            encoding: EncodingMode::Utf8WithMarker,
            delimiter: b',',
            terminator: RecordTerminator::Lf,
            extract_mode: ExtractMode::PlainText,
            pages: PageSelection::All,
        }
    }
}

/// How column boundaries are found.
#[derive(Debug, Clone)]
pub enum Boundary {
    /// Regular expression matched against each line
    Pattern(String),
    /// Whitespace runs of at least this many characters, or any tab run
    WhitespaceRun(usize),
    /// Caller-supplied strategy
    Strategy(Arc<dyn BoundaryStrategy>),
}

impl Boundary {
    /// Build the splitter for this rule.
    pub fn splitter(&self) -> Result<ColumnSplitter> {
        match self {
            Boundary::Pattern(pattern) => ColumnSplitter::from_pattern(pattern),
            Boundary::WhitespaceRun(min_run) => {
                Ok(ColumnSplitter::new(Arc::new(WhitespaceRun::new(*min_run))))
            }
            Boundary::Strategy(strategy) => Ok(ColumnSplitter::new(Arc::clone(strategy))),
        }
    }
}

impl Default for Boundary {
    fn default() -> Self {
        Boundary::Pattern(DEFAULT_BOUNDARY_PATTERN.to_string())
    }
}

/// Page selection for conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Convert all pages
    #[default]
    All,
    /// Convert a range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Convert several ranges (1-indexed, sorted, non-overlapping)
    Pages(Vec<RangeInclusive<u32>>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(ranges) => ranges.iter().any(|r| r.contains(&page)),
        }
    }

    /// Parse a page selection string (e.g., "all", "1-10", "1,3,5-7").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        if !s.contains(',') {
            if let Some((start, end)) = s.split_once('-') {
                return Ok(PageSelection::Range(parse_range(start, end)?));
            }
        }

        let mut ranges = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            ranges.push(match part.split_once('-') {
                Some((start, end)) => parse_range(start, end)?,
                None => {
                    let page = parse_page(part)?;
                    page..=page
                }
            });
        }

        Ok(PageSelection::Pages(merge_ranges(ranges)))
    }
}

/// Sort ranges and merge overlapping or adjacent ones.
fn merge_ranges(mut ranges: Vec<RangeInclusive<u32>>) -> Vec<RangeInclusive<u32>> {
    ranges.sort_unstable_by_key(|r| (*r.start(), *r.end()));

    let mut merged: Vec<RangeInclusive<u32>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        if let Some(last) = merged.last_mut() {
            if *range.start() <= last.end().saturating_add(1) {
                if range.end() > last.end() {
                    *last = *last.start()..=*range.end();
                }
                continue;
            }
        }
        merged.push(range);
    }
    merged
}

fn parse_page(s: &str) -> Result<u32> {
    match s.trim().parse::<u32>() {
        Ok(0) => Err(Error::InvalidPageRange("pages are numbered from 1".into())),
        Ok(page) => Ok(page),
        Err(_) => Err(Error::InvalidPageRange(format!("invalid page number: {s:?}"))),
    }
}

fn parse_range(start: &str, end: &str) -> Result<RangeInclusive<u32>> {
    let (start, end) = (parse_page(start)?, parse_page(end)?);
    if start > end {
        return Err(Error::InvalidPageRange(format!("{start}-{end} is reversed")));
    }
    Ok(start..=end)
}
