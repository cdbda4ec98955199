//! Structured decision log for script checks.
//!
//! One line per checked script, appended to a file, in either text or JSON
//! form. Script text may be redacted before it is written.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use tracing::warn;

use crate::document::ScriptDocument;
use crate::evaluator::{Assessment, Warning};
use crate::risk::RiskLevel;

// ============================================================================
// Configuration Types
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether the decision log is written.
    pub enabled: bool,
    /// Path to log file. Supports ~ expansion.
    pub file: Option<String>,
    /// Output format: "text" or "json".
    pub format: LogFormat,
    /// Redaction settings.
    pub redaction: RedactionConfig,
    /// Which verdicts to log.
    pub events: LogEventFilter,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            file: None,
            format: LogFormat::Text,
            redaction: RedactionConfig::default(),
            events: LogEventFilter::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Redaction configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    pub enabled: bool,
    pub mode: RedactionMode,
    pub max_literal_len: usize,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: RedactionMode::Literals,
            max_literal_len: 50,
        }
    }
}

/// Redaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RedactionMode {
    None,
    /// Truncate quoted literals, keep live text.
    #[default]
    Literals,
    /// Replace the whole script with a length marker.
    Full,
}

/// Filter for which verdicts to log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogEventFilter {
    pub red: bool,
    pub yellow: bool,
    pub green: bool,
}

impl Default for LogEventFilter {
    fn default() -> Self {
        Self {
            red: true,
            yellow: true,
            green: false,
        }
    }
}

impl LogEventFilter {
    #[must_use]
    pub const fn allows(&self, risk: RiskLevel) -> bool {
        match risk {
            RiskLevel::Red => self.red,
            RiskLevel::Yellow => self.yellow,
            RiskLevel::Green => self.green,
        }
    }
}

// ============================================================================
// Log Entry
// ============================================================================

/// A structured log entry for one checked script.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub risk: RiskLevel,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub script: String,
    pub warnings: Vec<String>,
    /// Outcome of the confirmation prompt, when one was shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
}

impl LogEntry {
    /// Create a new log entry from an assessment.
    #[must_use]
    pub fn from_assessment(
        assessment: &Assessment,
        document: &ScriptDocument,
        source: Option<&str>,
        approved: Option<bool>,
        redaction: &RedactionConfig,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            risk: assessment.risk,
            kind: document.kind().label().to_string(),
            source: source.map(String::from),
            script: redact_script(document.text(), redaction),
            warnings: assessment.warnings.iter().map(Warning::rendered).collect(),
            approved,
        }
    }

    /// Format as text log line.
    #[must_use]
    pub fn format_text(&self) -> String {
        let mut parts = Vec::with_capacity(7);
        parts.push(format!("[{}]", self.timestamp));
        parts.push(self.risk.label().to_uppercase());
        parts.push(self.kind.clone());
        if let Some(ref source) = self.source {
            parts.push(source.clone());
        }
        parts.push(format!("\"{}\"", self.script.replace('\n', "\\n")));
        if !self.warnings.is_empty() {
            parts.push(format!("-- {}", self.warnings.join("; ")));
        }
        match self.approved {
            Some(true) => parts.push("[approved]".to_string()),
            Some(false) => parts.push("[refused]".to_string()),
            None => {}
        }
        parts.join(" ")
    }

    /// Format as JSON line.
    #[must_use]
    pub fn format_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

// ============================================================================
// Logger
// ============================================================================

/// Appends one entry per checked script to the configured log file.
pub struct DecisionLogger {
    config: LoggingConfig,
    writer: Option<Mutex<BufWriter<File>>>,
}

impl DecisionLogger {
    /// Create a new logger from configuration. Returns `None` when disabled.
    #[must_use]
    pub fn new(config: &LoggingConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let writer = config.file.as_ref().and_then(|path| {
            let expanded = expand_tilde(path);
            match open_log_file(&expanded) {
                Ok(file) => Some(Mutex::new(BufWriter::new(file))),
                Err(e) => {
                    warn!(path = %expanded, error = %e, "decision log unavailable");
                    None
                }
            }
        });
        Some(Self {
            config: config.clone(),
            writer,
        })
    }

    /// Log one assessment.
    pub fn log(
        &self,
        assessment: &Assessment,
        document: &ScriptDocument,
        source: Option<&str>,
        approved: Option<bool>,
    ) {
        if !self.config.events.allows(assessment.risk) {
            return;
        }
        let entry = LogEntry::from_assessment(
            assessment,
            document,
            source,
            approved,
            &self.config.redaction,
        );
        let line = match self.config.format {
            LogFormat::Text => entry.format_text(),
            LogFormat::Json => entry.format_json(),
        };
        if let Some(ref writer) = self.writer {
            if let Ok(mut w) = writer.lock() {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().into_owned();
        }
    }
    path.to_string()
}

fn open_log_file(path: &str) -> std::io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn redact_script(script: &str, config: &RedactionConfig) -> String {
    if !config.enabled {
        return script.to_string();
    }
    match config.mode {
        RedactionMode::None => script.to_string(),
        RedactionMode::Full => format!("[REDACTED {} bytes]", script.len()),
        RedactionMode::Literals => script
            .split('\n')
            .map(|line| redact_literals(line, config.max_literal_len))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Truncate quoted literals on one line. Quote state resets per line, the
/// same way the matcher sees it.
fn redact_literals(line: &str, max_len: usize) -> String {
    let mut result = String::with_capacity(line.len());
    let mut quote: Option<char> = None;
    let mut literal_len = 0;

    for c in line.chars() {
        match quote {
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                literal_len = 0;
                result.push(c);
            }
            None => result.push(c),
            Some(q) if c == q => {
                quote = None;
                if literal_len > max_len {
                    result.push_str("...");
                }
                result.push(c);
            }
            Some(_) => {
                if literal_len < max_len {
                    result.push(c);
                }
                literal_len += 1;
            }
        }
    }
    result
}
