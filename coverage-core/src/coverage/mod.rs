//! Interpret raw coverage rows as per-operator summaries.
//!
//! Dataset editions drift in how they name columns, so every
//! operator/metric pair resolves through an ordered alias list before the
//! fraction is thresholded and formatted. Interpretation is pure and
//! deterministic: the same row always yields the same summary, with the
//! operators in fixed order.

mod interpret;
mod operator;
mod row;

pub use interpret::{
    COVERAGE_THRESHOLD, MobileSummary, NOT_AVAILABLE, OperatorCoverage, OverallCoverage, interpret,
};
pub use operator::{ANY_OPERATOR_ALIASES, Metric, Operator, column_aliases};
pub use row::RawCoverageRow;
