//! Logical text lines.

use serde::Serialize;
use std::fmt;
use std::ops::Deref;

/// A trimmed, non-empty line of page text.
///
/// A `Line` never contains a newline and never has leading or trailing
/// whitespace. The only way to build one is [`Line::new`], which enforces
/// this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Line(String);

impl Line {
    /// Trim `text` and wrap it, or return `None` if nothing is left or the
    /// text spans several lines.
    pub fn new(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.contains('\n') {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Borrow the line text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Line {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Line {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
