//! Line assembly from extracted fragments.

use crate::model::{Line, TextFragment};

/// Join fragments and cut the result into trimmed, non-empty lines.
///
/// Fragment boundaries carry no meaning of their own: two fragments only
/// become separate lines if a newline sits between them. No re-flowing or
/// de-hyphenation is done.
pub fn assemble(fragments: &[TextFragment]) -> Vec<Line> {
    let text: String = fragments.iter().map(|f| f.text.as_str()).collect();
    text.split('\n').filter_map(Line::new).collect()
}
