//! Output side of the pipeline: CSV records and their byte encoding.

mod encoding;
mod sink;

pub use encoding::{EncodingMode, OutputEncoder, UTF8_MARKER};
pub use sink::{CsvRowWriter, RecordTerminator};
