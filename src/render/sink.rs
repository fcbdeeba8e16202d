//! CSV row serialization.

use std::io::{self, Write};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::Row;

use super::encoding::OutputEncoder;

/// Record terminator written after every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordTerminator {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    Crlf,
}

impl From<RecordTerminator> for csv::Terminator {
    fn from(terminator: RecordTerminator) -> Self {
        match terminator {
            RecordTerminator::Lf => csv::Terminator::Any(b'\n'),
            RecordTerminator::Crlf => csv::Terminator::CRLF,
        }
    }
}

/// Writes rows as delimiter-separated records through an [`OutputEncoder`].
///
/// Fields containing the delimiter, a quote or a line break are quoted with
/// inner quotes doubled; everything else is written verbatim. Rows keep
/// their own field count, nothing is padded or truncated.
pub struct CsvRowWriter<W: Write> {
    out: OutputEncoder<W>,
    builder: csv::WriterBuilder,
    rows_written: u64,
}

impl<W: Write> CsvRowWriter<W> {
    /// Create a writer emitting comma-separated, `\n`-terminated records.
    pub fn new(out: OutputEncoder<W>) -> Self {
        Self::with_format(out, b',', RecordTerminator::Lf)
    }

    /// Create a writer with an explicit delimiter and terminator.
    pub fn with_format(out: OutputEncoder<W>, delimiter: u8, terminator: RecordTerminator) -> Self {
        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(delimiter)
            .terminator(terminator.into())
            .quote_style(csv::QuoteStyle::Necessary)
            .flexible(true);

        Self {
            out,
            builder,
            rows_written: 0,
        }
    }

    /// Serialize one row.
    ///
    /// The record is fully serialized and encoded before any byte of it is
    /// written, so a failing row leaves no partial record behind.
    pub fn write_row(&mut self, row: &Row) -> Result<()> {
        let mut record = self.builder.from_writer(Vec::with_capacity(64));
        record.write_record(row.iter()).map_err(csv_error)?;
        let bytes = record
            .into_inner()
            .map_err(|e| Error::WriteFailed(io::Error::other(e.to_string())))?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| Error::WriteFailed(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        self.out.write_text(text)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Number of rows written so far.
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Bytes handed to the destination so far.
    pub fn bytes_written(&self) -> u64 {
        self.out.bytes_written()
    }

    /// Flush everything and return the destination.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out.into_inner())
    }
}

fn csv_error(err: csv::Error) -> Error {
    match err.into_kind() {
        csv::ErrorKind::Io(e) => Error::WriteFailed(e),
        other => Error::WriteFailed(io::Error::other(format!("{other:?}"))),
    }
}
