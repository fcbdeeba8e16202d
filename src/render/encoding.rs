//! Output character encoding.
//!
//! [`OutputEncoder`] sits between the CSV serializer and the destination.
//! It only sees text and bytes; it knows nothing about rows or fields.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use encoding_rs::{EncoderResult, SHIFT_JIS};
use serde::Serialize;

use crate::error::{Error, Result};

/// UTF-8 byte-order marker.
pub const UTF8_MARKER: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Output character encoding, fixed for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum EncodingMode {
    /// UTF-8 preceded by a byte-order marker
    #[default]
    #[serde(rename = "utf8")]
    Utf8WithMarker,
    /// Shift_JIS without marker
    #[serde(rename = "sjis")]
    ShiftJis,
}

impl EncodingMode {
    /// Short name as accepted on the command line.
    pub fn short_name(self) -> &'static str {
        match self {
            EncodingMode::Utf8WithMarker => "utf8",
            EncodingMode::ShiftJis => "sjis",
        }
    }

    /// Bytes written before any content.
    pub fn marker(self) -> &'static [u8] {
        match self {
            EncodingMode::Utf8WithMarker => &UTF8_MARKER,
            EncodingMode::ShiftJis => &[],
        }
    }
}

impl fmt::Display for EncodingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingMode::Utf8WithMarker => f.write_str("UTF-8"),
            EncodingMode::ShiftJis => f.write_str("Shift_JIS"),
        }
    }
}

impl FromStr for EncodingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf8" | "utf-8" | "utf8-bom" => Ok(EncodingMode::Utf8WithMarker),
            "sjis" | "shift-jis" | "shiftjis" => Ok(EncodingMode::ShiftJis),
            other => Err(format!("unsupported output encoding: {other}")),
        }
    }
}

/// Transcoding writer wrapping the raw output destination.
pub struct OutputEncoder<W: Write> {
    inner: W,
    mode: EncodingMode,
    scratch: Vec<u8>,
    bytes_written: u64,
}

impl<W: Write> OutputEncoder<W> {
    /// Wrap `inner`, writing the encoding's marker immediately.
    pub fn new(mut inner: W, mode: EncodingMode) -> Result<Self> {
        let marker = mode.marker();
        inner.write_all(marker).map_err(Error::WriteFailed)?;
        Ok(Self {
            inner,
            mode,
            scratch: Vec::new(),
            bytes_written: marker.len() as u64,
        })
    }

    /// Total bytes handed to the destination so far, marker included.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Encode and write `text`.
    ///
    /// Either all of `text` reaches the destination or none of it does: an
    /// unencodable character is detected before anything is written.
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        let bytes = match self.mode {
            EncodingMode::Utf8WithMarker => text.as_bytes(),
            EncodingMode::ShiftJis => {
                encode_shift_jis(text, &mut self.scratch)?;
                &self.scratch
            }
        };
        self.inner.write_all(bytes).map_err(Error::WriteFailed)?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    /// Flush the destination.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(Error::WriteFailed)
    }

    /// Unwrap the destination without flushing.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Encode `text` as Shift_JIS into `out`, replacing its contents.
fn encode_shift_jis(text: &str, out: &mut Vec<u8>) -> Result<()> {
    let mut encoder = SHIFT_JIS.new_encoder();
    out.clear();
    out.reserve(
        encoder
            .max_buffer_length_from_utf8_without_replacement(text.len())
            .unwrap_or(text.len() * 2),
    );

    let mut rest = text;
    loop {
        let (result, read) = encoder.encode_from_utf8_to_vec_without_replacement(rest, out, true);
        rest = &rest[read..];
        match result {
            EncoderResult::InputEmpty => return Ok(()),
            EncoderResult::OutputFull => out.reserve(rest.len() * 2 + 16),
            EncoderResult::Unmappable(character) => {
                return Err(Error::UnsupportedCharacter {
                    character,
                    encoding: EncodingMode::ShiftJis,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_writes_marker_first() {
        let mut encoder = OutputEncoder::new(Vec::new(), EncodingMode::Utf8WithMarker).unwrap();
        encoder.write_text("名前,年齢\n").unwrap();
        assert_eq!(encoder.bytes_written(), 3 + "名前,年齢\n".len() as u64);

        let bytes = encoder.into_inner();
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
        assert_eq!(&bytes[3..], "名前,年齢\n".as_bytes());
    }

    #[test]
    fn test_utf8_marker_without_content() {
        let encoder = OutputEncoder::new(Vec::new(), EncodingMode::Utf8WithMarker).unwrap();
        assert_eq!(encoder.into_inner(), UTF8_MARKER.to_vec());
    }

    #[test]
    fn test_shift_jis_transcodes_without_marker() {
        let mut encoder = OutputEncoder::new(Vec::new(), EncodingMode::ShiftJis).unwrap();
        encoder.write_text("A,日本,表\n").unwrap();
        assert_eq!(
            encoder.into_inner(),
            vec![b'A', b',', 0x93, 0xFA, 0x96, 0x7B, b',', 0x95, 0x5C, b'\n']
        );
    }

    #[test]
    fn test_shift_jis_unsupported_character_writes_nothing() {
        let mut encoder = OutputEncoder::new(Vec::new(), EncodingMode::ShiftJis).unwrap();
        encoder.write_text("ok\n").unwrap();

        let err = encoder.write_text("smile,😀\n").unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedCharacter {
                character: '😀',
                encoding: EncodingMode::ShiftJis
            }
        ));
        assert_eq!(encoder.into_inner(), b"ok\n".to_vec());
    }

    #[test]
    fn test_shift_jis_long_input() {
        let text = "漢字".repeat(5000);
        let mut out = Vec::new();
        encode_shift_jis(&text, &mut out).unwrap();
        assert_eq!(out.len(), 20000);
    }

    #[test]
    fn test_write_failure() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Err(std::io::Error::other("disk full"))
            }
        }

        let err = OutputEncoder::new(Broken, EncodingMode::Utf8WithMarker)
            .err()
            .unwrap();
        assert!(matches!(err, Error::WriteFailed(_)));

        let mut encoder = OutputEncoder::new(Broken, EncodingMode::ShiftJis).unwrap();
        assert!(matches!(encoder.flush(), Err(Error::WriteFailed(_))));
    }

    #[test]
    fn test_encoding_mode_parse() {
        assert_eq!("utf8".parse::<EncodingMode>(), Ok(EncodingMode::Utf8WithMarker));
        assert_eq!("UTF-8".parse::<EncodingMode>(), Ok(EncodingMode::Utf8WithMarker));
        assert_eq!("sjis".parse::<EncodingMode>(), Ok(EncodingMode::ShiftJis));
        assert_eq!("Shift_JIS".parse::<EncodingMode>(), Ok(EncodingMode::ShiftJis));
        assert!("latin1".parse::<EncodingMode>().is_err());
        assert_eq!(EncodingMode::ShiftJis.short_name(), "sjis");
    }
}
