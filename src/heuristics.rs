//! Script-wide checks that do not depend on the pattern tables.
//!
//! Every check yields at most one [`Severity::Info`] warning, and the checks
//! always run in the same order: shebang, length, error handling.

use crate::document::{ScriptDocument, ScriptKind};
use crate::evaluator::Warning;
use crate::packs::Severity;
use serde::{Deserialize, Serialize};

/// Scripts whose trimmed text is shorter than this (in bytes) look incomplete.
pub const SHORT_SCRIPT_THRESHOLD: usize = 20;

/// Error-handling advice only applies to scripts with more lines than this.
pub const ERROR_HANDLING_MIN_LINES: usize = 5;

/// Substrings that count as error handling on a trimmed, lower-cased line.
pub const ERROR_HANDLING_IDIOMS: &[&str] = &["try {", "catch", "trap", "|| ", "&& ", "if [ $? -"];

const SHEBANG_MESSAGE: &str = "Consider adding a shebang line (#!/bin/bash) at the top";
const SHORT_SCRIPT_MESSAGE: &str = "Script seems very short - it might be incomplete";
const ERROR_HANDLING_MESSAGE: &str =
    "Script has no error handling - consider adding try/catch or error checks";

/// Which heuristic checks run. All default on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicSettings {
    /// Suggest a shebang for posix-shell scripts.
    pub shebang: bool,
    /// Flag very short scripts.
    pub short_script: bool,
    /// Suggest error handling for longer scripts.
    pub error_handling: bool,
}

impl Default for HeuristicSettings {
    fn default() -> Self {
        Self {
            shebang: true,
            short_script: true,
            error_handling: true,
        }
    }
}

/// Run every heuristic check with default settings.
#[must_use]
pub fn heuristics(document: &ScriptDocument) -> Vec<Warning> {
    run_heuristics(document, &HeuristicSettings::default())
}

/// Run the enabled heuristic checks.
#[must_use]
pub fn run_heuristics(document: &ScriptDocument, settings: &HeuristicSettings) -> Vec<Warning> {
    let text = document.text();
    let mut warnings = Vec::new();

    if settings.shebang && missing_shebang(text, document.kind()) {
        warnings.push(Warning::new(Severity::Info, SHEBANG_MESSAGE));
    }

    if settings.short_script && text.trim().len() < SHORT_SCRIPT_THRESHOLD {
        warnings.push(Warning::new(Severity::Info, SHORT_SCRIPT_MESSAGE));
    }

    if settings.error_handling
        && text.split('\n').count() > ERROR_HANDLING_MIN_LINES
        && !has_error_handling(text)
    {
        warnings.push(Warning::new(Severity::Info, ERROR_HANDLING_MESSAGE));
    }

    warnings
}

/// PowerShell scripts never need a shebang; every other kind does.
fn missing_shebang(text: &str, kind: ScriptKind) -> bool {
    kind != ScriptKind::PowerShell && !text.starts_with("#!")
}

/// Returns true if any line contains an error-handling idiom.
#[must_use]
pub fn has_error_handling(text: &str) -> bool {
    text.split('\n').any(|line| {
        let line = line.trim().to_lowercase();
        ERROR_HANDLING_IDIOMS.iter().any(|idiom| line.contains(idiom))
    })
}
