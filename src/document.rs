//! Classification input: script text plus the kind of interpreter it targets.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// Interpreter family a script was generated for.
///
/// The set is closed. Anything unrecognized is treated as [`ScriptKind::PosixShell`]
/// because that branch runs the stricter shebang check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptKind {
    /// bash, sh, zsh and friends.
    #[default]
    #[serde(alias = "bash", alias = "sh")]
    PosixShell,
    /// Windows PowerShell / pwsh.
    #[serde(rename = "powershell", alias = "pwsh")]
    PowerShell,
}

impl ScriptKind {
    /// Get a human-readable label for this kind.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PosixShell => "posix_shell",
            Self::PowerShell => "powershell",
        }
    }

    /// Infer the kind from a file extension. Returns `None` when the
    /// extension is missing or says nothing about the interpreter.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("ps1" | "psm1") => Some(Self::PowerShell),
            Some("sh" | "bash" | "zsh") => Some(Self::PosixShell),
            _ => None,
        }
    }

    /// Parse a kind tag, falling back to the stricter posix branch.
    #[must_use]
    pub fn parse_lenient(tag: &str) -> Self {
        match tag.parse() {
            Ok(kind) => kind,
            Err(UnknownScriptKind(tag)) => {
                warn!(tag = %tag, "unknown script kind, treating as posix shell");
                Self::PosixShell
            }
        }
    }
}

impl std::fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned by [`ScriptKind::from_str`] for tags outside the known set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownScriptKind(pub String);

impl std::fmt::Display for UnknownScriptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown script kind: {}", self.0)
    }
}

impl std::error::Error for UnknownScriptKind {}

impl FromStr for ScriptKind {
    type Err = UnknownScriptKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bash" | "sh" | "zsh" | "shell" | "posix" | "posix_shell" => Ok(Self::PosixShell),
            "powershell" | "pwsh" | "ps1" | "ps" => Ok(Self::PowerShell),
            other => Err(UnknownScriptKind(other.to_string())),
        }
    }
}

/// A generated script awaiting review.
///
/// Produced once per generation/edit/refine round. Every change to the text
/// yields a new document, and with it a fresh assessment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDocument {
    text: String,
    kind: ScriptKind,
}

impl ScriptDocument {
    #[must_use]
    pub fn new(text: impl Into<String>, kind: ScriptKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// Shorthand for a posix-shell document.
    #[must_use]
    pub fn posix(text: impl Into<String>) -> Self {
        Self::new(text, ScriptKind::PosixShell)
    }

    /// Shorthand for a PowerShell document.
    #[must_use]
    pub fn powershell(text: impl Into<String>) -> Self {
        Self::new(text, ScriptKind::PowerShell)
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn kind(&self) -> ScriptKind {
        self.kind
    }
}
