//! # pdf2csv
//!
//! Reconstruct CSV tables from the text layout of PDF documents.
//!
//! PDFs rarely carry table structure. This library takes the text of each
//! page, cuts it into lines, and splits every line into fields wherever the
//! text has a wide whitespace gap (two or more whitespace characters, or a
//! tab, by default). The rows are written as CSV, either as UTF-8 with a
//! byte-order marker or as Shift_JIS.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> pdf2csv::Result<()> {
//!     let report = pdf2csv::convert_file("report.pdf", "report.csv")?;
//!     println!("{} rows from {} pages", report.row_count, report.pages_converted);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - [`parser`]: page text extraction behind the [`PdfBackend`] trait
//! - [`table`]: line assembly and column splitting
//! - [`render`]: CSV serialization and output encoding
//! - [`convert`]: the per-run driver tying them together

pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod table;

// Re-export commonly used types
pub use convert::{
    Boundary, ConvertObserver, ConvertOptions, ConvertReport, PageProgress, PageSelection,
    RunState, TableConverter,
};
pub use error::{Error, Result};
pub use model::{Line, Row, TextFragment};
pub use parser::{ExtractMode, LopdfBackend, PdfBackend, TextExtractor};
pub use render::{EncodingMode, RecordTerminator};
pub use table::{BoundaryStrategy, ColumnSplitter, DEFAULT_BOUNDARY_PATTERN};

use std::path::Path;

/// Convert a PDF file to CSV with default options.
///
/// # Example
///
/// ```no_run
/// let report = pdf2csv::convert_file("listing.pdf", "listing.csv").unwrap();
/// assert!(report.output.is_some());
/// ```
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<ConvertReport> {
    convert_file_with_options(input, output, ConvertOptions::default())
}

/// Convert a PDF file to CSV with custom options.
///
/// # Example
///
/// ```no_run
/// use pdf2csv::{convert_file_with_options, ConvertOptions, EncodingMode};
///
/// let options = ConvertOptions::new()
///     .with_encoding(EncodingMode::ShiftJis)
///     .with_pattern(r"\t+");
/// convert_file_with_options("listing.pdf", "listing.csv", options).unwrap();
/// ```
pub fn convert_file_with_options<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: ConvertOptions,
) -> Result<ConvertReport> {
    TableConverter::new(options)?.convert_file(input, output)
}

/// Split one line of text into fields using the default boundary.
///
/// Returns `None` for a blank line.
///
/// # Example
///
/// ```
/// let row = pdf2csv::split_line("Name    Age   City").unwrap();
/// assert_eq!(row.fields(), &["Name", "Age", "City"]);
/// ```
pub fn split_line(text: &str) -> Option<Row> {
    Line::new(text).map(|line| ColumnSplitter::default().split(&line))
}
