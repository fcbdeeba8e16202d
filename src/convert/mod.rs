//! The conversion pipeline.
//!
//! For every selected page, in document order:
//!
//! ```text
//! extract → assemble lines → split columns → write row
//! ```
//!
//! with the output encoder wrapping the row writer's byte stream for the
//! whole run. Pages are independent of each other; nothing is carried over.
//!
//! # Example
//!
//! ```no_run
//! use pdf2csv::convert::{ConvertOptions, TableConverter};
//! use pdf2csv::render::EncodingMode;
//!
//! fn main() -> pdf2csv::Result<()> {
//!     let options = ConvertOptions::new().with_encoding(EncodingMode::ShiftJis);
//!     let converter = TableConverter::new(options)?;
//!     let report = converter.convert_file("invoice.pdf", "invoice.csv")?;
//!     println!("{} rows", report.row_count);
//!     Ok(())
//! }
//! ```

mod options;

pub use options::{Boundary, ConvertOptions, PageSelection};

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::Row;
use crate::parser::{extract, ExtractMode, LopdfBackend, PdfBackend, TextExtractor};
use crate::render::{CsvRowWriter, EncodingMode, OutputEncoder};
use crate::table::{assemble, ColumnSplitter};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing opened yet
    Idle,
    /// Input document open
    Opened,
    /// Converting the given 1-indexed page
    Processing {
        /// Page number
        page: u32,
    },
    /// All pages done, flushing output
    Flushing,
    /// Run completed
    Closed,
    /// Run aborted by an error
    Failed,
}

impl RunState {
    /// Check if no further transitions can happen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Closed | RunState::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => f.write_str("idle"),
            RunState::Opened => f.write_str("opened"),
            RunState::Processing { page } => write!(f, "processing page {page}"),
            RunState::Flushing => f.write_str("flushing"),
            RunState::Closed => f.write_str("closed"),
            RunState::Failed => f.write_str("failed"),
        }
    }
}

/// Outcome of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    /// 1-indexed page number
    pub number: u32,
    /// Pages in the document
    pub total: u32,
    /// Rows written for this page
    pub rows: usize,
    /// Whether the page was null
    pub null: bool,
}

/// Receives progress notifications during a run.
///
/// All methods do nothing by default.
pub trait ConvertObserver {
    /// Called on every state transition.
    fn on_state(&mut self, state: RunState) {
        let _ = state;
    }

    /// Called after a selected page has been written.
    fn on_page(&mut self, progress: &PageProgress) {
        let _ = progress;
    }
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ConvertObserver for NoopObserver {}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConvertReport {
    /// Output path, when converting to a file
    pub output: Option<PathBuf>,
    /// Output encoding
    pub encoding: EncodingMode,
    /// Extraction strategy used
    pub extract_mode: ExtractMode,
    /// Column boundary rule used
    pub boundary: String,
    /// Pages in the document
    pub page_count: u32,
    /// Selected pages that were converted (null pages included)
    pub pages_converted: u32,
    /// Null pages encountered among the selected ones
    pub null_pages: u32,
    /// Lines assembled
    pub line_count: u64,
    /// Rows written
    pub row_count: u64,
    /// Field count of the widest row
    pub max_fields: usize,
    /// Field count of the narrowest row
    pub min_fields: usize,
    /// Bytes written, marker included
    pub bytes_written: u64,
}

impl ConvertReport {
    /// Check if rows differ in field count.
    pub fn is_ragged(&self) -> bool {
        self.row_count > 0 && self.min_fields != self.max_fields
    }

    /// Serialize the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::WriteFailed(e.into()))
    }

    fn record_row(&mut self, row: &Row) {
        self.min_fields = if self.row_count == 0 {
            row.len()
        } else {
            self.min_fields.min(row.len())
        };
        self.max_fields = self.max_fields.max(row.len());
        self.row_count += 1;
    }
}

/// Converts PDF documents to CSV.
pub struct TableConverter {
    options: ConvertOptions,
    splitter: ColumnSplitter,
    extractor: Box<dyn TextExtractor>,
}

impl TableConverter {
    /// Create a converter, validating the options.
    pub fn new(options: ConvertOptions) -> Result<Self> {
        if !options.delimiter.is_ascii() || matches!(options.delimiter, b'"' | b'\r' | b'\n') {
            return Err(Error::InvalidDelimiter(format!(
                "{:?}",
                options.delimiter as char
            )));
        }

        let splitter = options.boundary.splitter()?;
        let extractor = options.extract_mode.extractor();
        Ok(Self {
            options,
            splitter,
            extractor,
        })
    }

    /// Create a converter with a custom extraction strategy.
    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Active options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Rows of a single page, without writing anything.
    ///
    /// A null page has no rows.
    pub fn page_rows(&self, backend: &dyn PdfBackend, number: u32) -> Result<Vec<Row>> {
        let fragments = extract(self.extractor.as_ref(), backend, number)?;
        Ok(assemble(&fragments)
            .iter()
            .map(|line| self.splitter.split(line))
            .collect())
    }

    /// Convert the PDF at `input` into a CSV file at `output`.
    pub fn convert_file<P, Q>(&self, input: P, output: Q) -> Result<ConvertReport>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        self.convert_file_with_observer(input, output, &mut NoopObserver)
    }

    /// Convert a file, reporting progress to `observer`.
    ///
    /// The input is opened before the output is created, so an unreadable
    /// input never leaves an empty CSV behind.
    pub fn convert_file_with_observer<P, Q>(
        &self,
        input: P,
        output: Q,
        observer: &mut dyn ConvertObserver,
    ) -> Result<ConvertReport>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let (input, output) = (input.as_ref(), output.as_ref());
        transition(observer, RunState::Idle);

        let backend = LopdfBackend::open(input).map_err(|err| {
            transition(observer, RunState::Failed);
            err
        })?;
        log::debug!(
            "{}: PDF {}, {} pages",
            input.display(),
            backend.version(),
            backend.page_count()
        );

        let file = File::create(output).map_err(|source| {
            transition(observer, RunState::Failed);
            Error::OutputCreate {
                path: output.to_path_buf(),
                source,
            }
        })?;

        let mut report = self.convert_with_observer(&backend, BufWriter::new(file), observer)?;
        report.output = Some(output.to_path_buf());
        Ok(report)
    }

    /// Convert an already opened document, writing CSV bytes to `out`.
    pub fn convert<W: Write>(&self, backend: &dyn PdfBackend, out: W) -> Result<ConvertReport> {
        self.convert_with_observer(backend, out, &mut NoopObserver)
    }

    /// Convert an already opened document, reporting progress to `observer`.
    pub fn convert_with_observer<W: Write>(
        &self,
        backend: &dyn PdfBackend,
        out: W,
        observer: &mut dyn ConvertObserver,
    ) -> Result<ConvertReport> {
        transition(observer, RunState::Opened);

        match self.run(backend, out, observer) {
            Ok(report) => {
                transition(observer, RunState::Closed);
                log::debug!(
                    "Wrote {} rows from {} pages ({} bytes)",
                    report.row_count,
                    report.pages_converted,
                    report.bytes_written
                );
                Ok(report)
            }
            Err(err) => {
                transition(observer, RunState::Failed);
                Err(err)
            }
        }
    }

    fn run<W: Write>(
        &self,
        backend: &dyn PdfBackend,
        out: W,
        observer: &mut dyn ConvertObserver,
    ) -> Result<ConvertReport> {
        let total = backend.page_count();
        let encoder = OutputEncoder::new(out, self.options.encoding)?;
        let mut sink =
            CsvRowWriter::with_format(encoder, self.options.delimiter, self.options.terminator);

        let mut report = ConvertReport {
            encoding: self.options.encoding,
            extract_mode: self.options.extract_mode,
            boundary: self.splitter.describe(),
            page_count: total,
            ..Default::default()
        };

        for number in (1..=total).filter(|n| self.options.pages.includes(*n)) {
            transition(observer, RunState::Processing { page: number });

            let null = backend.page(number).is_none();
            let fragments = extract(self.extractor.as_ref(), backend, number)?;
            let lines = assemble(&fragments);

            for line in &lines {
                log::trace!("{}", line);
                let row = self.splitter.split(line);
                sink.write_row(&row)?;
                report.record_row(&row);
            }

            report.pages_converted += 1;
            report.null_pages += u32::from(null);
            report.line_count += lines.len() as u64;
            log::debug!(
                "Page {}/{}: {} fragments, {} rows ({})",
                number,
                total,
                fragments.len(),
                lines.len(),
                self.extractor.name()
            );

            observer.on_page(&PageProgress {
                number,
                total,
                rows: lines.len(),
                null,
            });
        }

        transition(observer, RunState::Flushing);
        report.bytes_written = sink.bytes_written();
        sink.finish()?;
        Ok(report)
    }
}

fn transition(observer: &mut dyn ConvertObserver, state: RunState) {
    log::debug!("Run state: {}", state);
    observer.on_state(state);
}
