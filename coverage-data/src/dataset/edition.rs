//! Edition → archive URL table.

use std::collections::BTreeMap;

use super::DatasetError;

/// Edition used when callers do not ask for one.
pub const DEFAULT_EDITION: &str = "2023";

const OFCOM_2022_URL: &str = "https://www.ofcom.org.uk/siteassets/resources/documents/research-and-data/telecoms-research/connected-nations/connected-nations-2022/interactive-report/2022_mobile_pc_r03.zip";
const OFCOM_2023_URL: &str = "https://www.ofcom.org.uk/siteassets/resources/documents/research-and-data/telecoms-research/connected-nations/connected-nations-2023/interactive-report/2023_mobile_pc_r01.zip";

/// Maps dataset editions to the URL of their postcode-level archive.
///
/// Each [`DatasetManager`](super::DatasetManager) owns its own table, so
/// tests and alternative deployments inject their own entries without
/// touching shared state. [`Default`] yields the published Ofcom Connected
/// Nations editions.
///
/// # Examples
/// ```
/// use coverage_data::dataset::EditionTable;
///
/// let table = EditionTable::empty().with_edition("2030", "https://example.org/2030.zip");
/// assert_eq!(table.resolve("2030")?, "https://example.org/2030.zip");
/// assert!(table.resolve("2023").is_err());
/// # Ok::<(), coverage_data::dataset::DatasetError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditionTable {
    urls: BTreeMap<String, String>,
}

impl Default for EditionTable {
    fn default() -> Self {
        Self::empty()
            .with_edition("2022", OFCOM_2022_URL)
            .with_edition("2023", OFCOM_2023_URL)
    }
}

impl EditionTable {
    /// Table with no editions.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            urls: BTreeMap::new(),
        }
    }

    /// Add or replace the archive URL for `edition`.
    #[must_use]
    pub fn with_edition(mut self, edition: impl Into<String>, url: impl Into<String>) -> Self {
        self.urls.insert(edition.into(), url.into());
        self
    }

    /// Look up the archive URL for `edition`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::UnknownEdition`] naming the known editions.
    pub fn resolve(&self, edition: &str) -> Result<&str, DatasetError> {
        self.urls
            .get(edition)
            .map(String::as_str)
            .ok_or_else(|| DatasetError::UnknownEdition {
                edition: edition.to_owned(),
                available: self.editions().map(str::to_owned).collect(),
            })
    }

    /// Known editions in ascending order.
    pub fn editions(&self) -> impl Iterator<Item = &str> {
        self.urls.keys().map(String::as_str)
    }
}
