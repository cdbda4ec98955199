//! Pattern tables for script classification.
//!
//! Rules are grouped into three tier tables that are always evaluated in the
//! same order: Critical, then High, then Medium. Within a tier, rules keep the
//! order in which they were declared, so classification output is fully
//! deterministic.
//!
//! Tables are built once (at first use for the builtin set, at startup for a
//! configured set) and never mutated afterwards. They are shared by reference
//! and safe to read from any number of threads.

pub mod critical;
pub mod high;
pub mod medium;

use crate::config::{CustomRule, RulesConfig};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Tier of a pattern table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Filesystem-destroying invocations.
    Critical,
    /// System-state-altering commands.
    High,
    /// Narrower but still consequential actions ("caution").
    #[serde(alias = "caution")]
    Medium,
}

impl Tier {
    /// All tiers in evaluation order.
    pub const ALL: [Self; 3] = [Self::Critical, Self::High, Self::Medium];

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" | "caution" => Ok(Self::Medium),
            other => Err(format!("unknown tier: {other}")),
        }
    }
}

/// Severity of a produced warning.
///
/// Pattern tables yield the first three; heuristic checks yield `Info`.
/// The variant order is the display order of a warning list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Info,
}

impl Severity {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Info => "info",
        }
    }

    /// Printable tier marker that prefixes a rendered warning.
    #[must_use]
    pub const fn marker(&self) -> &'static str {
        match self {
            Self::Critical => "⛔ CRITICAL: ",
            Self::High => "🔴 HIGH: ",
            Self::Medium => "🟡 CAUTION: ",
            Self::Info => "🟢 INFO: ",
        }
    }
}

impl From<Tier> for Severity {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Critical => Self::Critical,
            Tier::High => Self::High,
            Tier::Medium => Self::Medium,
        }
    }
}

/// A literal pattern and the warning it produces.
///
/// Patterns are stored lower-cased; matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRule {
    pub pattern: Cow<'static, str>,
    pub tier: Tier,
    pub message: Cow<'static, str>,
}

impl PatternRule {
    /// Build a rule from owned strings (used for configured rules).
    #[must_use]
    pub fn owned(pattern: &str, tier: Tier, message: &str) -> Self {
        Self {
            pattern: Cow::Owned(pattern.to_lowercase()),
            tier,
            message: Cow::Owned(message.to_string()),
        }
    }
}

/// Macro to declare a builtin pattern rule.
///
/// Builtin patterns must already be lower-case.
///
/// ```ignore
/// pattern_rule!(Critical, "mkfs", "Attempts to create new filesystem (destroys data)")
/// ```
#[macro_export]
macro_rules! pattern_rule {
    ($tier:ident, $pattern:literal, $message:literal) => {
        $crate::packs::PatternRule {
            pattern: ::std::borrow::Cow::Borrowed($pattern),
            tier: $crate::packs::Tier::$tier,
            message: ::std::borrow::Cow::Borrowed($message),
        }
    };
}

/// Builtin tables, built on first use.
pub static BUILTIN_TABLES: LazyLock<PatternTables> = LazyLock::new(PatternTables::builtin_owned);

/// The three ordered tier tables.
#[derive(Debug, Clone, Default)]
pub struct PatternTables {
    critical: Vec<PatternRule>,
    high: Vec<PatternRule>,
    medium: Vec<PatternRule>,
}

impl PatternTables {
    /// The process-wide builtin tables.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN_TABLES
    }

    fn builtin_owned() -> Self {
        Self {
            critical: critical::create_rules(),
            high: high::create_rules(),
            medium: medium::create_rules(),
        }
    }

    /// Build tables from the builtin rules adjusted by configuration.
    ///
    /// Disabled patterns are removed from every tier. Custom rules are appended
    /// to the end of their tier in declaration order. Custom rules with an empty
    /// pattern are skipped.
    #[must_use]
    pub fn from_config(rules: &RulesConfig) -> Self {
        let disabled: Vec<String> = rules
            .disabled
            .iter()
            .map(|p| p.trim().to_lowercase())
            .collect();

        let mut tables = Self::builtin_owned();
        for tier in Tier::ALL {
            tables
                .table_mut(tier)
                .retain(|rule| !disabled.iter().any(|d| *d == *rule.pattern));
        }

        for CustomRule {
            pattern,
            tier,
            message,
        } in &rules.custom
        {
            if pattern.trim().is_empty() {
                warn!(rule_message = %message, "skipping custom rule with empty pattern");
                continue;
            }
            tables
                .table_mut(*tier)
                .push(PatternRule::owned(pattern, *tier, message));
        }

        debug!(
            critical = tables.critical.len(),
            high = tables.high.len(),
            medium = tables.medium.len(),
            "built pattern tables"
        );
        tables
    }

    /// Rules of one tier, in evaluation order.
    #[must_use]
    pub fn table(&self, tier: Tier) -> &[PatternRule] {
        match tier {
            Tier::Critical => &self.critical,
            Tier::High => &self.high,
            Tier::Medium => &self.medium,
        }
    }

    fn table_mut(&mut self, tier: Tier) -> &mut Vec<PatternRule> {
        match tier {
            Tier::Critical => &mut self.critical,
            Tier::High => &mut self.high,
            Tier::Medium => &mut self.medium,
        }
    }

    /// All rules in evaluation order (Critical, High, Medium).
    pub fn iter(&self) -> impl Iterator<Item = &PatternRule> {
        Tier::ALL.into_iter().flat_map(|tier| self.table(tier).iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.critical.len() + self.high.len() + self.medium.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
