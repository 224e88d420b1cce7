//! Loosely typed dataset rows as returned by a coverage store.

use std::collections::HashMap;

/// Column name to value mapping for one matched dataset record.
///
/// Columns that were absent or `NULL` in the store are missing keys rather
/// than empty strings. Rows are produced fresh per query and never shared.
///
/// # Examples
///
/// ```
/// use coverage_core::RawCoverageRow;
///
/// let row = RawCoverageRow::from([("ee4g", "0.9"), ("ee_4g", "")]);
/// assert_eq!(row.first_present(&["ee_4g", "ee4g"]), Some("0.9"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawCoverageRow {
    columns: HashMap<String, String>,
}

impl RawCoverageRow {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `column` to `value`, replacing any earlier value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.columns.insert(column.into(), value.into());
    }

    /// Value stored for `column`, if present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }

    /// Return the first value among `aliases` that is present and non-empty.
    ///
    /// Aliases are probed in order, so callers list the preferred column name
    /// first and older edition spellings after it.
    #[must_use]
    pub fn first_present(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .filter_map(|alias| self.get(alias))
            .find(|value| !value.is_empty())
    }

    /// Number of populated columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the row carries no columns at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate over `(column, value)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(|(column, value)| (column.as_str(), value.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for RawCoverageRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for RawCoverageRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<HashMap<String, String>> for RawCoverageRow {
    fn from(columns: HashMap<String, String>) -> Self {
        Self { columns }
    }
}
