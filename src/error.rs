//! Error types for pdf2csv.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::render::EncodingMode;

/// Result type alias for pdf2csv operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a PDF to CSV.
///
/// Every variant is fatal for the run that produced it.
#[derive(Error, Debug)]
pub enum Error {
    /// The input document cannot be opened or parsed at the container level.
    #[error("Cannot open {}: {reason}", .path.display())]
    OpenFailed {
        /// Path of the input document
        path: PathBuf,
        /// Description reported by the PDF backend
        reason: String,
    },

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF header carries a version string we cannot read.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Text on a page cannot be decoded.
    #[error("Page {page}: text extraction failed: {reason}")]
    ExtractionFailed {
        /// 1-indexed page number
        page: u32,
        /// Description reported by the PDF backend
        reason: String,
    },

    /// The output sink rejected a write or flush.
    #[error("Write failed: {0}")]
    WriteFailed(#[source] io::Error),

    /// The output file cannot be created.
    #[error("Cannot create {}: {source}", .path.display())]
    OutputCreate {
        /// Requested output path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A character has no representation in the output encoding.
    #[error("Character {character:?} cannot be encoded as {encoding}")]
    UnsupportedCharacter {
        /// The offending character
        character: char,
        /// Selected output encoding
        encoding: EncodingMode,
    },

    /// The column boundary pattern is not usable.
    #[error("Invalid column boundary pattern: {0}")]
    InvalidPattern(String),

    /// The field delimiter cannot be used in CSV output.
    #[error("Unusable field delimiter: {0}")]
    InvalidDelimiter(String),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// I/O error when reading input files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Pipeline stage the error originated from.
    ///
    /// One of `"open"`, `"extract"`, `"write"`, `"encode"` or `"config"`.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::OpenFailed { .. }
            | Error::UnknownFormat
            | Error::UnsupportedVersion(_)
            | Error::PdfParse(_)
            | Error::Encrypted
            | Error::Io(_) => "open",
            Error::ExtractionFailed { .. } => "extract",
            Error::WriteFailed(_) | Error::OutputCreate { .. } => "write",
            Error::UnsupportedCharacter { .. } => "encode",
            Error::InvalidPattern(_) | Error::InvalidDelimiter(_) | Error::InvalidPageRange(_) => {
                "config"
            }
        }
    }

    /// Page number the error is tied to, if any.
    pub fn page(&self) -> Option<u32> {
        match self {
            Error::ExtractionFailed { page, .. } => Some(*page),
            _ => None,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ExtractionFailed {
            page: 3,
            reason: "bad font".to_string(),
        };
        assert_eq!(err.to_string(), "Page 3: text extraction failed: bad font");

        let err = Error::UnsupportedCharacter {
            character: '€',
            encoding: EncodingMode::ShiftJis,
        };
        assert_eq!(
            err.to_string(),
            "Character '€' cannot be encoded as Shift_JIS"
        );
    }

    #[test]
    fn test_error_stage() {
        let open = Error::OpenFailed {
            path: PathBuf::from("in.pdf"),
            reason: "truncated".into(),
        };
        assert_eq!(open.stage(), "open");
        assert_eq!(open.page(), None);

        let extract = Error::ExtractionFailed {
            page: 7,
            reason: String::new(),
        };
        assert_eq!(extract.stage(), "extract");
        assert_eq!(extract.page(), Some(7));

        let write = Error::WriteFailed(io::Error::new(io::ErrorKind::Other, "disk full"));
        assert_eq!(write.stage(), "write");

        assert_eq!(Error::InvalidPattern("x".into()).stage(), "config");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
