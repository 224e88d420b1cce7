//! Tracked operators, coverage metrics and their dataset column aliases.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the four UK mobile network operators reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Operator {
    /// EE.
    #[cfg_attr(feature = "serde", serde(rename = "EE"))]
    Ee,
    /// O2.
    O2,
    /// Three.
    Three,
    /// Vodafone.
    Vodafone,
}

impl Operator {
    /// Every tracked operator in reporting order.
    pub const ALL: [Self; 4] = [Self::Ee, Self::O2, Self::Three, Self::Vodafone];

    /// Display name used in summaries.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ee => "EE",
            Self::O2 => "O2",
            Self::Three => "Three",
            Self::Vodafone => "Vodafone",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coverage metric reported per operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Voice calls.
    Voice,
    /// 4G data.
    FourG,
    /// 5G data.
    FiveG,
}

impl Metric {
    /// Every metric in reporting order.
    pub const ALL: [Self; 3] = [Self::Voice, Self::FourG, Self::FiveG];
}

/// Candidate columns for the "any operator" aggregate, in priority order.
pub const ANY_OPERATOR_ALIASES: &[&str] = &["any_operator", "any_coverage"];

/// Candidate columns for `(operator, metric)`, in priority order.
///
/// Ofcom renames columns between editions (`ee_4g` in one release, `ee4g`
/// in another; outdoor voice falling back to the indoor figure). The first
/// alias is the current spelling.
#[must_use]
pub const fn column_aliases(operator: Operator, metric: Metric) -> &'static [&'static str] {
    match (operator, metric) {
        (Operator::Ee, Metric::Voice) => &["ee_voice", "ee_voice_indoor"],
        (Operator::Ee, Metric::FourG) => &["ee_4g", "ee4g"],
        (Operator::Ee, Metric::FiveG) => &["ee_5g", "ee5g"],
        (Operator::O2, Metric::Voice) => &["o2_voice", "o2_voice_indoor"],
        (Operator::O2, Metric::FourG) => &["o2_4g", "o24g"],
        (Operator::O2, Metric::FiveG) => &["o2_5g", "o25g"],
        (Operator::Three, Metric::Voice) => &["three_voice", "three_voice_indoor"],
        (Operator::Three, Metric::FourG) => &["three_4g", "three4g"],
        (Operator::Three, Metric::FiveG) => &["three_5g", "three5g"],
        (Operator::Vodafone, Metric::Voice) => &["vodafone_voice", "vodafone_voice_indoor"],
        (Operator::Vodafone, Metric::FourG) => &["vodafone_4g", "vodafone4g"],
        (Operator::Vodafone, Metric::FiveG) => &["vodafone_5g", "vodafone5g"],
    }
}
