//! Risk-gated confirmation prompts.
//!
//! The prompt gets stricter as risk rises: green scripts pass without a
//! question, yellow scripts take a `y`/`yes`, and red scripts require the full
//! word `yes`. End of input always refuses.

use crate::evaluator::Warning;
use crate::risk::RiskLevel;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Confirmation style required before a script may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    /// The exact word `yes`, case-insensitive. `y` is refused.
    TypedYes,
    /// `y` or `yes`, case-insensitive.
    YesNo,
    /// No question asked.
    Light,
}

impl Confirmation {
    #[must_use]
    pub const fn for_risk(risk: RiskLevel) -> Self {
        match risk {
            RiskLevel::Red => Self::TypedYes,
            RiskLevel::Yellow => Self::YesNo,
            RiskLevel::Green => Self::Light,
        }
    }

    /// Risk level this style is asked for.
    #[must_use]
    pub const fn risk(&self) -> RiskLevel {
        match self {
            Self::TypedYes => RiskLevel::Red,
            Self::YesNo => RiskLevel::Yellow,
            Self::Light => RiskLevel::Green,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::TypedYes => "typed_yes",
            Self::YesNo => "yes_no",
            Self::Light => "light",
        }
    }

    const fn prompt(&self) -> &'static str {
        match self {
            Self::TypedYes => "Type 'yes' to run this script: ",
            Self::YesNo => "Run this script? [y/N]: ",
            Self::Light => "",
        }
    }

    /// Returns true if `answer` approves under this confirmation style.
    #[must_use]
    pub fn accepts(&self, answer: &str) -> bool {
        let answer = answer.trim().to_ascii_lowercase();
        match self {
            Self::TypedYes => answer == "yes",
            Self::YesNo => answer == "y" || answer == "yes",
            Self::Light => true,
        }
    }
}

/// Show the warnings and ask for approval.
///
/// [`Confirmation::Light`] approves without reading input. Otherwise only the
/// warnings at the prompted risk level are listed, and one line is read from
/// `reader`; end of input refuses.
///
/// # Errors
///
/// Returns any I/O error from reading or writing.
pub fn confirm<R: BufRead, W: Write>(
    confirmation: Confirmation,
    warnings: &[Warning],
    reader: &mut R,
    writer: &mut W,
) -> io::Result<bool> {
    if confirmation == Confirmation::Light {
        return Ok(true);
    }

    let risk = confirmation.risk();
    let mut relevant = warnings
        .iter()
        .filter(|w| RiskLevel::for_severity(w.severity) == risk)
        .peekable();
    if relevant.peek().is_some() {
        writeln!(writer, "{}", "Warnings:".bold())?;
        for warning in relevant {
            writeln!(writer, "  {}", warning.rendered())?;
        }
    }
    if confirmation == Confirmation::TypedYes {
        writeln!(
            writer,
            "{}",
            "This script is HIGH RISK and may cause irreversible damage."
                .red()
                .bold()
        )?;
    }
    write!(writer, "{}", confirmation.prompt())?;
    writer.flush()?;

    let mut answer = String::new();
    if reader.read_line(&mut answer)? == 0 {
        debug!(confirmation = confirmation.label(), "no answer before end of input");
        return Ok(false);
    }

    let approved = confirmation.accepts(&answer);
    debug!(confirmation = confirmation.label(), approved, "confirmation answered");
    Ok(approved)
}
