//! Risk aggregation: many warnings in, one verdict out.
//!
//! | present                    | verdict  |
//! |----------------------------|----------|
//! | any Critical or High       | `Red`    |
//! | else any Medium            | `Yellow` |
//! | else (Info only, or empty) | `Green`  |
//!
//! The verdict depends only on which tiers are present, never on order or
//! multiplicity.

use crate::evaluator::Warning;
use crate::packs::Severity;
use serde::{Deserialize, Serialize};

/// Three-valued rollup of a warning list. Ordered `Green < Yellow < Red`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Green,
    Yellow,
    Red,
}

impl RiskLevel {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }

    /// Risk contributed by a single warning of the given severity.
    #[must_use]
    pub const fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Critical | Severity::High => Self::Red,
            Severity::Medium => Self::Yellow,
            Severity::Info => Self::Green,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "green" => Ok(Self::Green),
            "yellow" => Ok(Self::Yellow),
            "red" => Ok(Self::Red),
            other => Err(format!("unknown risk level: {other}")),
        }
    }
}

/// Reduce a warning list to a risk level using each warning's tier.
#[must_use]
pub fn aggregate(warnings: &[Warning]) -> RiskLevel {
    warnings
        .iter()
        .map(|w| RiskLevel::for_severity(w.severity))
        .max()
        .unwrap_or_default()
}

/// Reduce already-rendered warning lines by inspecting their tier markers.
///
/// Lines that carry no known marker contribute nothing. Agrees with
/// [`aggregate`] on lines produced by [`Warning::rendered`].
#[must_use]
pub fn aggregate_rendered<S: AsRef<str>>(lines: &[S]) -> RiskLevel {
    let mut risk = RiskLevel::Green;
    for line in lines {
        let line = line.as_ref();
        if line.starts_with(Severity::Critical.marker())
            || line.starts_with(Severity::High.marker())
        {
            return RiskLevel::Red;
        }
        if line.starts_with(Severity::Medium.marker()) {
            risk = RiskLevel::Yellow;
        }
    }
    risk
}
