//! Check reports: the serializable result of `script-guard check`.

use crate::confirm::Confirmation;
use crate::document::{ScriptDocument, ScriptKind};
use crate::evaluator::Assessment;
use crate::packs::Severity;
use crate::risk::RiskLevel;
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Current JSON report schema.
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Check output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Pretty,
    Json,
}

/// Risk threshold at which `check` exits non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FailOn {
    #[default]
    None,
    Yellow,
    Red,
}

impl FailOn {
    #[must_use]
    pub const fn blocks(&self, risk: RiskLevel) -> bool {
        match self {
            Self::None => false,
            Self::Yellow => matches!(risk, RiskLevel::Yellow | RiskLevel::Red),
            Self::Red => matches!(risk, RiskLevel::Red),
        }
    }
}

/// Per-tier warning counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub info: usize,
}

/// One warning as it appears in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWarning {
    pub tier: Severity,
    pub message: String,
    pub rendered: String,
}

/// Full result of checking one script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub schema_version: u32,
    /// Source path, or `-` for stdin.
    pub file: String,
    pub kind: ScriptKind,
    pub risk: RiskLevel,
    pub confirmation: Confirmation,
    pub counts: CheckCounts,
    pub warnings: Vec<ReportWarning>,
}

impl CheckReport {
    #[must_use]
    pub fn new(file: &str, document: &ScriptDocument, assessment: &Assessment) -> Self {
        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            file: file.to_string(),
            kind: document.kind(),
            risk: assessment.risk,
            confirmation: Confirmation::for_risk(assessment.risk),
            counts: CheckCounts {
                critical: assessment.count(Severity::Critical),
                high: assessment.count(Severity::High),
                medium: assessment.count(Severity::Medium),
                info: assessment.count(Severity::Info),
            },
            warnings: assessment
                .warnings
                .iter()
                .map(|w| ReportWarning {
                    tier: w.severity,
                    message: w.message.to_string(),
                    rendered: w.rendered(),
                })
                .collect(),
        }
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable report. Colors follow the global `colored` override.
    #[must_use]
    pub fn render_pretty(&self, verbose: bool) -> String {
        let mut out = String::new();

        let verdict = match self.risk {
            RiskLevel::Red => "RED".red().bold(),
            RiskLevel::Yellow => "YELLOW".yellow().bold(),
            RiskLevel::Green => "GREEN".green().bold(),
        };
        let _ = writeln!(out, "{} ({})", self.file.bold(), self.kind);
        let _ = writeln!(out, "Risk: {verdict}");

        if self.warnings.is_empty() {
            let _ = writeln!(out, "{}", "No warnings.".green());
        } else {
            let _ = writeln!(out);
            for warning in &self.warnings {
                let line = match warning.tier {
                    Severity::Critical => warning.rendered.red().bold(),
                    Severity::High => warning.rendered.red(),
                    Severity::Medium => warning.rendered.yellow(),
                    Severity::Info => warning.rendered.normal(),
                };
                let _ = writeln!(out, "  {line}");
            }
        }

        if verbose {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "{}",
                format!(
                    "critical={} high={} medium={} info={} confirmation={}",
                    self.counts.critical,
                    self.counts.high,
                    self.counts.medium,
                    self.counts.info,
                    self.confirmation.label()
                )
                .bright_black()
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::assess;

    fn report_for(doc: &ScriptDocument) -> CheckReport {
        CheckReport::new("deploy.sh", doc, &assess(doc))
    }

    #[test]
    fn fail_on_thresholds() {
        assert!(!FailOn::None.blocks(RiskLevel::Red));
        assert!(FailOn::Yellow.blocks(RiskLevel::Yellow));
        assert!(FailOn::Yellow.blocks(RiskLevel::Red));
        assert!(!FailOn::Red.blocks(RiskLevel::Yellow));
        assert!(FailOn::Red.blocks(RiskLevel::Red));
        assert!(!FailOn::Red.blocks(RiskLevel::Green));
    }

    #[test]
    fn counts_match_warnings() {
        let report = report_for(&ScriptDocument::posix("rm -rf /"));
        assert_eq!(
            report.counts,
            CheckCounts {
                critical: 1,
                high: 0,
                medium: 1,
                info: 2,
            }
        );
        assert_eq!(report.risk, RiskLevel::Red);
        assert_eq!(report.confirmation, Confirmation::TypedYes);
    }

    #[test]
    fn json_shape_is_stable() {
        let report = report_for(&ScriptDocument::posix("#!/bin/bash\nrm -rf ./old_logs"));
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["schema_version"], 1);
        assert_eq!(value["file"], "deploy.sh");
        assert_eq!(value["kind"], "posix_shell");
        assert_eq!(value["risk"], "yellow");
        assert_eq!(value["confirmation"], "yes_no");
        assert_eq!(value["counts"]["medium"], 1);
        assert_eq!(value["warnings"][0]["tier"], "medium");
        assert_eq!(
            value["warnings"][0]["message"],
            "Recursive deletion - verify target path carefully"
        );
        assert!(
            value["warnings"][0]["rendered"]
                .as_str()
                .is_some_and(|s| s.starts_with("🟡 CAUTION: "))
        );
    }

    #[test]
    fn json_round_trips() {
        let report = report_for(&ScriptDocument::powershell("Stop-Computer -Force"));
        let parsed: CheckReport = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn pretty_lists_rendered_warnings() {
        colored::control::set_override(false);
        let report = report_for(&ScriptDocument::posix("shutdown -h now"));
        let out = report.render_pretty(false);
        assert!(out.contains("Risk: RED"));
        assert!(out.contains("  🔴 HIGH: "));
        assert!(!out.contains("confirmation="));
    }

    #[test]
    fn pretty_verbose_shows_counts() {
        colored::control::set_override(false);
        let report = report_for(&ScriptDocument::powershell("Get-ChildItem | Select-Object Name"));
        let out = report.render_pretty(true);
        assert!(out.contains("Risk: GREEN"));
        assert!(out.contains("No warnings."));
        assert!(out.contains("critical=0 high=0 medium=0 info=0 confirmation=light"));
    }
}
