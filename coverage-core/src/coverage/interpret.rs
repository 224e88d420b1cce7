//! Pure interpretation of raw dataset rows into per-operator summaries.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::PostcodeKey;

use super::operator::{ANY_OPERATOR_ALIASES, Metric, Operator, column_aliases};
use super::row::RawCoverageRow;

/// Fraction at or above which a metric counts as covered.
///
/// Matches Ofcom's own "premises covered" convention.
pub const COVERAGE_THRESHOLD: f64 = 0.5;

/// Display value used when a metric cannot be resolved.
pub const NOT_AVAILABLE: &str = "N/A";

/// Coverage for a single operator across voice, 4G and 5G.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OperatorCoverage {
    /// Operator this entry describes.
    #[cfg_attr(feature = "serde", serde(rename = "name"))]
    pub operator: Operator,
    /// Voice percentage, or [`NOT_AVAILABLE`].
    pub voice: String,
    /// 4G percentage, or [`NOT_AVAILABLE`].
    pub four_g: String,
    /// 5G percentage, or [`NOT_AVAILABLE`].
    pub five_g: String,
    /// Voice fraction resolved to at least [`COVERAGE_THRESHOLD`].
    pub has_voice: bool,
    /// 4G fraction resolved to at least [`COVERAGE_THRESHOLD`].
    pub has_four_g: bool,
    /// 5G fraction resolved to at least [`COVERAGE_THRESHOLD`].
    pub has_five_g: bool,
}

/// Aggregate view across all operators.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OverallCoverage {
    /// "Any operator" percentage from the source row, or [`NOT_AVAILABLE`].
    pub any_operator: String,
    /// Number of operators with 4G covered.
    pub four_g_count: usize,
    /// Number of operators with 5G covered.
    pub five_g_count: usize,
}

/// Structured coverage for one postcode.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MobileSummary {
    /// Postcode recorded in the source row.
    pub postcode: PostcodeKey,
    /// One entry per operator, always in [`Operator::ALL`] order.
    pub operators: [OperatorCoverage; 4],
    /// Aggregate counts derived from `operators`.
    pub overall: OverallCoverage,
}

/// A resolved (or unresolved) coverage fraction for one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Reading(Option<f64>);

impl Reading {
    fn resolve(row: &RawCoverageRow, aliases: &[&str]) -> Self {
        let fraction = row
            .first_present(aliases)
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite());
        Self(fraction)
    }

    fn is_covered(self) -> bool {
        self.0.is_some_and(|fraction| fraction >= COVERAGE_THRESHOLD)
    }

    fn display(self) -> String {
        self.0.map_or_else(
            || NOT_AVAILABLE.to_owned(),
            |fraction| format!("{:.0}%", fraction * 100.0),
        )
    }
}

impl OperatorCoverage {
    fn from_row(row: &RawCoverageRow, operator: Operator) -> Self {
        let [voice, four_g, five_g] =
            Metric::ALL.map(|metric| Reading::resolve(row, column_aliases(operator, metric)));
        Self {
            operator,
            voice: voice.display(),
            four_g: four_g.display(),
            five_g: five_g.display(),
            has_voice: voice.is_covered(),
            has_four_g: four_g.is_covered(),
            has_five_g: five_g.is_covered(),
        }
    }
}

impl OverallCoverage {
    fn from_operators(row: &RawCoverageRow, operators: &[OperatorCoverage]) -> Self {
        Self {
            any_operator: Reading::resolve(row, ANY_OPERATOR_ALIASES).display(),
            four_g_count: operators.iter().filter(|op| op.has_four_g).count(),
            five_g_count: operators.iter().filter(|op| op.has_five_g).count(),
        }
    }
}

/// Interpret a raw dataset row as a [`MobileSummary`].
///
/// Each operator/metric pair probes its column aliases in priority order and
/// takes the first present, non-empty value. Missing or unparsable values are
/// reported as [`NOT_AVAILABLE`] and never count as covered. The output is
/// independent of which columns the row happens to contain.
///
/// # Examples
///
/// ```
/// use coverage_core::{Operator, RawCoverageRow, interpret};
///
/// let row = RawCoverageRow::from([("postcode", "LS11AA"), ("ee_4g", "0.3"), ("o2_4g", "0.8")]);
/// let summary = interpret(&row);
/// assert_eq!(summary.operators[0].operator, Operator::Ee);
/// assert!(!summary.operators[0].has_four_g);
/// assert!(summary.operators[1].has_four_g);
/// assert_eq!(summary.operators[1].four_g, "80%");
/// assert_eq!(summary.overall.four_g_count, 1);
/// ```
#[must_use]
pub fn interpret(row: &RawCoverageRow) -> MobileSummary {
    let operators = Operator::ALL.map(|operator| OperatorCoverage::from_row(row, operator));
    let overall = OverallCoverage::from_operators(row, &operators);
    MobileSummary {
        postcode: PostcodeKey::normalise(row.get("postcode").unwrap_or_default()),
        operators,
        overall,
    }
}
