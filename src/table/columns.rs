//! Column splitting by whitespace runs.
//!
//! A line is cut wherever a boundary matches; whatever lies between two
//! boundaries is a field. This has no notion of the page's horizontal
//! layout, so it is only as good as the spacing the extractor produced.
//! The boundary rule is a [`BoundaryStrategy`] so that other policies can be
//! plugged in without touching the pipeline.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{Line, Row};

/// Default boundary: two or more ASCII whitespace characters, or any run of
/// tabs.
///
/// Only tab, line feed, form feed, carriage return and space count. Wider
/// spaces such as U+3000 or NBSP stay inside fields.
pub const DEFAULT_BOUNDARY_PATTERN: &str = r"[\t\n\f\r ]{2,}|\t+";

/// Decides where one field ends and the next begins.
pub trait BoundaryStrategy: Send + Sync + fmt::Debug {
    /// Cut `line` into fields.
    ///
    /// Boundaries at the very start or end produce empty leading or trailing
    /// fields; these are kept.
    fn split<'a>(&self, line: &'a str) -> Vec<&'a str>;

    /// Human-readable description for logs and reports.
    fn describe(&self) -> String;
}

/// Boundaries given by a regular expression.
#[derive(Debug, Clone)]
pub struct RegexBoundary {
    regex: Regex,
}

impl RegexBoundary {
    /// Compile `pattern`.
    ///
    /// Patterns that match the empty string are rejected, since they would
    /// put a boundary between every character.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| Error::InvalidPattern(e.to_string()))?;
        if regex.is_match("") {
            return Err(Error::InvalidPattern(format!(
                "{pattern} matches the empty string"
            )));
        }
        Ok(Self { regex })
    }

    /// The source pattern.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

impl BoundaryStrategy for RegexBoundary {
    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        let mut fields = Vec::new();
        let mut last = 0;
        for m in self.regex.find_iter(line) {
            if m.as_str().is_empty() {
                continue;
            }
            fields.push(&line[last..m.start()]);
            last = m.end();
        }
        fields.push(&line[last..]);
        fields
    }

    fn describe(&self) -> String {
        format!("regex {}", self.regex.as_str())
    }
}

/// Boundaries at ASCII whitespace runs of at least `min_run` characters, and
/// at every run of tabs.
///
/// `WhitespaceRun::new(n)` behaves exactly like the pattern
/// `[\t\n\f\r ]{n,}|\t+` without going through the regex engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhitespaceRun {
    min_run: usize,
}

impl WhitespaceRun {
    /// Create a strategy with the given run threshold (at least 1).
    pub fn new(min_run: usize) -> Self {
        Self {
            min_run: min_run.max(1),
        }
    }

}

impl Default for WhitespaceRun {
    fn default() -> Self {
        Self::new(2)
    }
}

impl BoundaryStrategy for WhitespaceRun {
    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        let mut fields = Vec::new();
        let mut field_start = 0;
        let mut chars = line.char_indices().peekable();

        while let Some((start, c)) = chars.next() {
            if !is_boundary_space(c) {
                continue;
            }

            // Measure the maximal whitespace run beginning here.
            let mut end = start + c.len_utf8();
            let mut run_len = 1;
            while let Some(&(i, next)) = chars.peek() {
                if !is_boundary_space(next) {
                    break;
                }
                end = i + next.len_utf8();
                run_len += 1;
                chars.next();
            }

            if run_len >= self.min_run {
                fields.push(&line[field_start..start]);
                field_start = end;
                continue;
            }

            // Short run: only its tab sequences are boundaries.
            let mut i = start;
            while i < end {
                let rest = &line[i..end];
                let tabs = rest.len() - rest.trim_start_matches('\t').len();
                if tabs > 0 {
                    fields.push(&line[field_start..i]);
                    field_start = i + tabs;
                    i += tabs;
                } else {
                    i += rest.chars().next().map_or(1, char::len_utf8);
                }
            }
        }

        fields.push(&line[field_start..]);
        fields
    }

    fn describe(&self) -> String {
        format!("whitespace runs >= {} or tabs", self.min_run)
    }
}

fn is_boundary_space(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

/// Turns lines into rows using a boundary strategy.
#[derive(Debug, Clone)]
pub struct ColumnSplitter {
    strategy: Arc<dyn BoundaryStrategy>,
}

impl ColumnSplitter {
    /// Create a splitter with a custom strategy.
    pub fn new(strategy: Arc<dyn BoundaryStrategy>) -> Self {
        Self { strategy }
    }

    /// Create a splitter from a regular expression.
    pub fn from_pattern(pattern: &str) -> Result<Self> {
        Ok(Self::new(Arc::new(RegexBoundary::new(pattern)?)))
    }

    /// Split one line into a row.
    pub fn split(&self, line: &Line) -> Row {
        self.strategy.split(line.as_str()).into_iter().collect()
    }

    /// Description of the active strategy.
    pub fn describe(&self) -> String {
        self.strategy.describe()
    }
}

impl Default for ColumnSplitter {
    fn default() -> Self {
        Self::new(Arc::new(WhitespaceRun::default()))
    }
}
