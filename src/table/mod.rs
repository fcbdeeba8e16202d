//! Table reconstruction: fragments to lines, lines to rows.

mod columns;
mod lines;

pub use columns::{
    BoundaryStrategy, ColumnSplitter, RegexBoundary, WhitespaceRun, DEFAULT_BOUNDARY_PATTERN,
};
pub use lines::assemble;
