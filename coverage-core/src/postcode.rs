//! Canonical postcode keys shared by storage and lookup.

use std::{fmt, ops::Deref};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A postcode normalised to uppercase with every whitespace character removed.
///
/// All dataset storage and lookups operate on this form, so two inputs that
/// differ only in case or spacing compare equal once wrapped.
///
/// # Examples
///
/// ```
/// use coverage_core::PostcodeKey;
///
/// let spaced = PostcodeKey::normalise("sw1a 1aa");
/// let packed = PostcodeKey::normalise("SW1A1AA");
/// assert_eq!(spaced, packed);
/// assert_eq!(spaced.as_str(), "SW1A1AA");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PostcodeKey(String);

impl PostcodeKey {
    /// Normalise `raw` into a key. Idempotent.
    #[must_use]
    pub fn normalise(raw: &str) -> Self {
        Self(normalise_postcode(raw))
    }

    /// Borrow the normalised key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether normalisation left nothing behind.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the wrapper and return the inner [`String`].
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Uppercase `raw` and strip all whitespace.
///
/// Exposed separately so ingestion can normalise CSV cells without allocating
/// a key wrapper per row.
#[must_use]
pub fn normalise_postcode(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !ch.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

impl From<&str> for PostcodeKey {
    fn from(value: &str) -> Self {
        Self::normalise(value)
    }
}

impl AsRef<str> for PostcodeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for PostcodeKey {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for PostcodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("sw1a 1aa", "SW1A1AA")]
    #[case("SW1A1AA", "SW1A1AA")]
    #[case("  ec1a\t1bb \n", "EC1A1BB")]
    #[case("l s 1 1 a a", "LS11AA")]
    #[case("", "")]
    fn normalises_case_and_whitespace(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(PostcodeKey::normalise(raw).as_str(), expected);
    }

    #[rstest]
    #[case("sw1a 1aa")]
    #[case(" Ec1A 1bB")]
    fn normalisation_is_idempotent(#[case] raw: &str) {
        let once = PostcodeKey::normalise(raw);
        let twice = PostcodeKey::normalise(once.as_str());
        assert_eq!(once, twice);
    }

    #[rstest]
    fn spacing_variants_share_a_key() {
        assert_eq!(
            PostcodeKey::normalise("sw1a 1aa"),
            PostcodeKey::normalise("SW1A1AA")
        );
    }

    #[rstest]
    fn empty_input_yields_empty_key() {
        assert!(PostcodeKey::normalise(" \t ").is_empty());
    }
}
