//! The persisted collection of records for one (entity, feed) pair.

use super::record::Record;

/// Deduplicated, ascending-by-date records plus their column order.
///
/// Columns are the union of field names in first-seen order. The header stays
/// stable across saves even when the first row after sorting came from a newer fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Dataset {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a dataset with an explicit column order. Fields a row carries that are
    /// missing from `columns` are appended.
    pub fn from_parts(columns: Vec<String>, rows: Vec<Record>) -> Self {
        let columns = union_columns(columns, &rows);
        Self { columns, rows }
    }

    /// Build a dataset whose columns are derived from the rows themselves.
    pub fn from_rows(rows: Vec<Record>) -> Self {
        Self::from_parts(Vec::new(), rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Date text of the first and last rows, as stored.
    pub fn date_range(&self, date_field: &str) -> (Option<&str>, Option<&str>) {
        let first = self.rows.first().and_then(|r| r.str_field(date_field));
        let last = self.rows.last().and_then(|r| r.str_field(date_field));
        (first, last)
    }
}

/// Extend `seed` with every field name in `rows` not already present, in first-seen order.
pub fn union_columns<'a>(
    mut seed: Vec<String>,
    rows: impl IntoIterator<Item = &'a Record>,
) -> Vec<String> {
    for row in rows {
        for field in row.fields() {
            if !seed.iter().any(|c| c == field) {
                seed.push(field.to_string());
            }
        }
    }
    seed
}
