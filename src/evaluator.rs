//! Script evaluation: the single entry point for classifying a document.
//!
//! Evaluation runs in a fixed order:
//!
//! 1. Critical table
//! 2. High table
//! 3. Medium table
//! 4. Heuristic checks (Info)
//! 5. Risk aggregation
//!
//! Every table is iterated to the end; matches accumulate within and across
//! tiers. The result is a pure function of the document and the (immutable)
//! tables, so callers must simply re-run evaluation whenever the script text
//! changes.

use crate::document::ScriptDocument;
use crate::heuristics::{HeuristicSettings, run_heuristics};
use crate::matcher::contains_command;
use crate::packs::{PatternTables, Severity, Tier};
use crate::risk::{RiskLevel, aggregate};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{debug, instrument};

/// One finding about a script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Warning {
    pub severity: Severity,
    pub message: Cow<'static, str>,
}

impl Warning {
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    /// Message prefixed with its tier marker, e.g. `⛔ CRITICAL: ...`.
    #[must_use]
    pub fn rendered(&self) -> String {
        format!("{}{}", self.severity.marker(), self.message)
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.severity.marker(), self.message)
    }
}

/// Full result of evaluating one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub warnings: Vec<Warning>,
    pub risk: RiskLevel,
}

impl Assessment {
    /// Number of warnings of the given severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.warnings
            .iter()
            .filter(|w| w.severity == severity)
            .count()
    }

    /// Warnings produced by the pattern tables (everything except Info).
    pub fn pattern_warnings(&self) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(|w| w.severity != Severity::Info)
    }
}

/// Classifier bound to a set of pattern tables and heuristic settings.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'t> {
    tables: &'t PatternTables,
    heuristics: HeuristicSettings,
}

impl Evaluator<'static> {
    /// Evaluator over the builtin tables with every heuristic enabled.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(PatternTables::builtin(), HeuristicSettings::default())
    }
}

impl<'t> Evaluator<'t> {
    #[must_use]
    pub const fn new(tables: &'t PatternTables, heuristics: HeuristicSettings) -> Self {
        Self { tables, heuristics }
    }

    #[must_use]
    pub const fn tables(&self) -> &'t PatternTables {
        self.tables
    }

    /// Pattern-table warnings, Critical first, then High, then Medium.
    #[must_use]
    #[instrument(level = "debug", skip(self, document), fields(len = document.text().len(), kind = %document.kind()))]
    pub fn classify(&self, document: &ScriptDocument) -> Vec<Warning> {
        let script = document.text().to_lowercase();
        let mut warnings = Vec::new();

        for tier in Tier::ALL {
            for rule in self.tables.table(tier) {
                if contains_command(&script, &rule.pattern) {
                    debug!(tier = tier.label(), pattern = %rule.pattern, "pattern matched");
                    warnings.push(Warning::new(tier.into(), rule.message.clone()));
                }
            }
        }

        warnings
    }

    /// Pattern-table warnings followed by heuristic warnings, plus the verdict.
    #[must_use]
    pub fn assess(&self, document: &ScriptDocument) -> Assessment {
        let mut warnings = self.classify(document);
        warnings.extend(run_heuristics(document, &self.heuristics));
        let risk = aggregate(&warnings);
        debug!(warnings = warnings.len(), risk = risk.label(), "assessment complete");
        Assessment { warnings, risk }
    }
}

/// Classify a document against the builtin tables.
#[must_use]
pub fn classify(document: &ScriptDocument) -> Vec<Warning> {
    Evaluator::builtin().classify(document)
}

/// Classify, run heuristics and aggregate using the builtin tables.
#[must_use]
pub fn assess(document: &ScriptDocument) -> Assessment {
    Evaluator::builtin().assess(document)
}


// =============================================================================
// Property-based invariants
// =============================================================================

#[cfg(test)]
mod proptest_invariants {
    use super::*;
    use crate::document::ScriptKind;
    use crate::packs::PatternRule;
    use proptest::prelude::*;

    /// Strategy for script-like text, including quotes, hyphens and comments.
    fn script_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z0-9 /.\\-'\"#|&]{0,120}",
            "([a-z\\-]{1,12}( [a-z0-9/.\\-]{1,12}){0,4}\n){0,8}",
            "\\PC{0,200}",
            Just(String::new()),
        ]
    }

    fn kind_strategy() -> impl Strategy<Value = ScriptKind> {
        prop_oneof![Just(ScriptKind::PosixShell), Just(ScriptKind::PowerShell)]
    }

    /// Patterns safe to embed inside a quoted literal: no quote characters.
    fn quotable_rule_strategy() -> impl Strategy<Value = PatternRule> {
        let rules: Vec<PatternRule> = PatternTables::builtin()
            .iter()
            .filter(|r| !r.pattern.contains(['\'', '"']))
            .cloned()
            .collect();
        proptest::sample::select(rules)
    }

    fn critical_rule_strategy() -> impl Strategy<Value = PatternRule> {
        proptest::sample::select(PatternTables::builtin().table(Tier::Critical).to_vec())
    }

    proptest! {
        /// Property: classification is idempotent.
        #[test]
        fn classification_is_deterministic(text in script_strategy(), kind in kind_strategy()) {
            let doc = ScriptDocument::new(text, kind);
            prop_assert_eq!(classify(&doc), classify(&doc));
            prop_assert_eq!(assess(&doc), assess(&doc));
        }

        /// Property: warnings are sorted by severity (Critical, High, Medium, Info).
        #[test]
        fn warnings_follow_tier_order(text in script_strategy(), kind in kind_strategy()) {
            let result = assess(&ScriptDocument::new(text, kind));
            let order: Vec<Severity> = result.warnings.iter().map(|w| w.severity).collect();
            let mut sorted = order.clone();
            sorted.sort();
            prop_assert_eq!(order, sorted);
        }

        /// Property: a pattern that only appears inside a quoted literal is ignored.
        #[test]
        fn quoted_pattern_is_ignored(
            rule in quotable_rule_strategy(),
            use_single in any::<bool>(),
        ) {
            let quote = if use_single { '\'' } else { '"' };
            let text = format!("#!/bin/bash\necho {quote}{}{quote}", rule.pattern);
            let warnings = classify(&ScriptDocument::posix(text));
            prop_assert!(warnings.is_empty(), "{:?} -> {:?}", rule.pattern, warnings);
        }

        /// Property: a live Critical pattern always yields Critical and Red.
        #[test]
        fn live_critical_pattern_is_red(rule in critical_rule_strategy()) {
            let text = format!("#!/bin/bash\n{}", rule.pattern);
            let result = assess(&ScriptDocument::posix(text));
            prop_assert!(result.warnings.iter().any(|w| w.severity == Severity::Critical));
            prop_assert_eq!(result.risk, RiskLevel::Red);
        }

        /// Property: adding a red-tier warning never lowers the verdict.
        #[test]
        fn red_warning_never_lowers_risk(text in script_strategy(), critical in any::<bool>()) {
            let mut warnings = assess(&ScriptDocument::posix(text)).warnings;
            let before = aggregate(&warnings);
            let severity = if critical { Severity::Critical } else { Severity::High };
            warnings.push(Warning::new(severity, "added"));
            let after = aggregate(&warnings);
            prop_assert!(after >= before);
            prop_assert_eq!(after, RiskLevel::Red);
        }

        /// Property: evaluation never panics on arbitrary input.
        #[test]
        fn evaluation_never_panics(text in "\\PC{0,1000}") {
            let _ = assess(&ScriptDocument::posix(text));
        }
    }
}
