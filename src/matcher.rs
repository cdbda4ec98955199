//! Live-occurrence matching of literal patterns.
//!
//! A pattern "occurs" in a script when it starts at a live position (see
//! [`crate::context`]) on some non-blank, non-comment line. Two exemptions are
//! checked first, against the whole script:
//!
//! - **Flag name**: the pattern appears right after a hyphen somewhere in the
//!   script (`-shutdown`), so it is treated as a flag name everywhere.
//! - **PowerShell format**: the bare pattern `format` is suppressed whenever
//!   the script passes a `-format` parameter (`Get-Date -Format "HH:mm:ss"`).
//!
//! Both exemptions are deliberately narrow. They are not a flag parser.

use crate::context::QuoteScanner;
use memchr::memmem;
use tracing::trace;

/// Why a pattern was suppressed for a whole script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exemption {
    /// `format` alongside a `-format` parameter.
    PowerShellFormat,
    /// The pattern occurs immediately after a hyphen.
    FlagName,
}

impl Exemption {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PowerShellFormat => "powershell-format",
            Self::FlagName => "flag-name",
        }
    }
}

/// Check the script-wide exemptions for a pattern.
///
/// Both arguments must already be lower-cased.
#[must_use]
pub fn exemption_for(script: &str, pattern: &str) -> Option<Exemption> {
    if pattern == "format" && memmem::find(script.as_bytes(), b"-format").is_some() {
        return Some(Exemption::PowerShellFormat);
    }

    let flag_form = format!("-{pattern}");
    if memmem::find(script.as_bytes(), flag_form.as_bytes()).is_some() {
        return Some(Exemption::FlagName);
    }

    None
}

/// Returns true if `pattern` starts at a position outside quotes in `line`.
///
/// Comparison is case-insensitive. Quote state starts fresh for the line.
#[must_use]
pub fn matches(line: &str, pattern: &str) -> bool {
    matches_lowered(&line.to_lowercase(), &pattern.to_lowercase())
}

/// Like [`matches`], for callers that already lower-cased both sides.
#[inline]
#[must_use]
pub fn matches_lowered(line: &str, pattern: &str) -> bool {
    let hay = line.as_bytes();
    let needle = pattern.as_bytes();
    if needle.is_empty() || needle.len() > hay.len() {
        return false;
    }
    let last_start = hay.len() - needle.len();

    QuoteScanner::new(line)
        .take_while(|pos| pos.index <= last_start)
        .any(|pos| pos.live && &hay[pos.index..pos.index + needle.len()] == needle)
}

/// Returns true if a line is skipped before matching (blank or comment).
#[inline]
#[must_use]
pub fn is_skipped_line(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//")
}

/// Returns true if `pattern` occurs as a live command fragment in `script`.
///
/// Both arguments must already be lower-cased.
#[must_use]
pub fn contains_command(script: &str, pattern: &str) -> bool {
    if let Some(exemption) = exemption_for(script, pattern) {
        trace!(pattern, exemption = exemption.label(), "pattern exempted");
        return false;
    }

    script
        .split('\n')
        .map(str::trim)
        .filter(|line| !is_skipped_line(line))
        .any(|line| matches_lowered(line, pattern))
}
