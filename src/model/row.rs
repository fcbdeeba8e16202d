//! Split records.

use serde::Serialize;

/// Ordered field values derived from one line.
///
/// Field count varies between rows; consumers must tolerate ragged output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Row {
    fields: Vec<String>,
}

impl Row {
    /// Create a row from field values.
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Field values in order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over field values.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    /// Consume the row, returning its fields.
    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_from_iter() {
        let row: Row = ["Name", "Age"].into_iter().collect();
        assert_eq!(row.len(), 2);
        assert_eq!(row.fields(), &["Name".to_string(), "Age".to_string()]);
        assert_eq!(row.iter().collect::<Vec<_>>(), vec!["Name", "Age"]);
    }

    #[test]
    fn test_empty_row() {
        let row = Row::default();
        assert!(row.is_empty());
        assert_eq!(row.into_fields(), Vec::<String>::new());
    }
}
