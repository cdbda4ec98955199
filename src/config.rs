//! Configuration system for script-guard.
//!
//! Supports layered configuration from multiple sources:
//! 1. Environment variables (highest priority)
//! 2. Project config (.script-guard.toml, current dir up to the repo root)
//! 3. User config (~/.config/script-guard/config.toml)
//! 4. System config (/etc/script-guard/config.toml)
//! 5. Compiled defaults (lowest priority)
//!
//! Configuration is read once at startup. Pattern tables built from it are
//! immutable for the life of the process.

use crate::document::ScriptKind;
use crate::heuristics::HeuristicSettings;
use crate::logging::{LogFormat, LoggingConfig, RedactionMode};
use crate::packs::Tier;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable prefix for all config options.
const ENV_PREFIX: &str = "SCRIPT_GUARD";

/// Default config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Project-level config file name.
const PROJECT_CONFIG_NAME: &str = ".script-guard.toml";

/// Directory name under the user and system config roots.
const APP_DIR_NAME: &str = "script-guard";

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,

    /// Heuristic checks to run.
    pub heuristics: HeuristicSettings,

    /// Pattern table adjustments.
    pub rules: RulesConfig,

    /// Decision log.
    pub logging: LoggingConfig,
}

/// General configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Color output mode: "auto", "always", "never".
    pub color: String,

    /// Whether to show verbose output.
    pub verbose: bool,

    /// Script kind used when neither a flag nor a file extension decides.
    pub default_kind: ScriptKind,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            color: "auto".to_string(),
            verbose: false,
            default_kind: ScriptKind::PosixShell,
        }
    }
}

/// Adjustments to the builtin pattern tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Builtin patterns to drop (matched case-insensitively against the pattern text).
    pub disabled: Vec<String>,

    /// Additional rules, appended to the end of their tier.
    pub custom: Vec<CustomRule>,
}

/// A user-supplied pattern rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRule {
    /// Literal text to look for (case-insensitive).
    pub pattern: String,
    /// Table the rule belongs to.
    pub tier: Tier,
    /// Warning text shown when the rule matches.
    pub message: String,
}

/// One configuration file as written on disk.
///
/// Every scalar is optional so a layer only overrides the keys it actually
/// sets; a key explicitly set to its default still wins over lower layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    pub general: GeneralLayer,
    pub heuristics: HeuristicsLayer,
    pub rules: RulesConfig,
    pub logging: LoggingLayer,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeneralLayer {
    pub color: Option<String>,
    pub verbose: Option<bool>,
    pub default_kind: Option<ScriptKind>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HeuristicsLayer {
    pub shebang: Option<bool>,
    pub short_script: Option<bool>,
    pub error_handling: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingLayer {
    pub enabled: Option<bool>,
    pub file: Option<String>,
    pub format: Option<LogFormat>,
    pub redaction: RedactionLayer,
    pub events: EventsLayer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RedactionLayer {
    pub enabled: Option<bool>,
    pub mode: Option<RedactionMode>,
    pub max_literal_len: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EventsLayer {
    pub red: Option<bool>,
    pub yellow: Option<bool>,
    pub green: Option<bool>,
}

impl Config {
    /// Load configuration from all sources, merging them in priority order.
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(system_config) = Self::load_system_config() {
            config.merge(system_config);
        }

        if let Some(user_config) = Self::load_user_config() {
            config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config() {
            config.merge(project_config);
        }

        config.apply_env_overrides();
        config
    }

    /// Load defaults, then one explicit file, then environment overrides.
    ///
    /// Used when the caller names a config file; the discovered layers are skipped.
    #[must_use]
    pub fn load_explicit(path: &Path) -> Self {
        let mut config = Self::default();
        if let Some(file_config) = Self::load_from_file(path) {
            config.merge(file_config);
        }
        config.apply_env_overrides();
        config
    }

    /// Load configuration from a specific file.
    ///
    /// Missing files yield `None`. Files that fail to parse are skipped with a
    /// warning so a broken layer never blocks classification.
    #[must_use]
    pub fn load_from_file(path: &Path) -> Option<ConfigLayer> {
        let content = fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config layer");
                Some(config)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                None
            }
        }
    }

    fn load_system_config() -> Option<ConfigLayer> {
        let path = PathBuf::from("/etc")
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME);
        Self::load_from_file(&path)
    }

    fn load_user_config() -> Option<ConfigLayer> {
        Self::load_from_file(&Self::user_config_path()?)
    }

    /// Walk from the current directory up to the repo root looking for a
    /// project config.
    fn load_project_config() -> Option<ConfigLayer> {
        let mut current = env::current_dir().ok()?;

        loop {
            let config_path = current.join(PROJECT_CONFIG_NAME);
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }

            // Stop at the repo root.
            if current.join(".git").exists() {
                return None;
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Overlay a config layer onto this one. Keys the layer sets win.
    fn merge(&mut self, other: ConfigLayer) {
        let ConfigLayer {
            general,
            heuristics,
            rules,
            logging,
        } = other;

        if let Some(color) = general.color {
            self.general.color = color;
        }
        if let Some(verbose) = general.verbose {
            self.general.verbose = verbose;
        }
        if let Some(kind) = general.default_kind {
            self.general.default_kind = kind;
        }

        if let Some(v) = heuristics.shebang {
            self.heuristics.shebang = v;
        }
        if let Some(v) = heuristics.short_script {
            self.heuristics.short_script = v;
        }
        if let Some(v) = heuristics.error_handling {
            self.heuristics.error_handling = v;
        }

        // Rules append.
        self.rules.disabled.extend(rules.disabled);
        self.rules.custom.extend(rules.custom);

        let log = &mut self.logging;
        if let Some(enabled) = logging.enabled {
            log.enabled = enabled;
        }
        if logging.file.is_some() {
            log.file = logging.file;
        }
        if let Some(format) = logging.format {
            log.format = format;
        }
        if let Some(enabled) = logging.redaction.enabled {
            log.redaction.enabled = enabled;
        }
        if let Some(mode) = logging.redaction.mode {
            log.redaction.mode = mode;
        }
        if let Some(len) = logging.redaction.max_literal_len {
            log.redaction.max_literal_len = len;
        }
        if let Some(red) = logging.events.red {
            log.events.red = red;
        }
        if let Some(yellow) = logging.events.yellow {
            log.events.yellow = yellow;
        }
        if let Some(green) = logging.events.green {
            log.events.green = green;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // SCRIPT_GUARD_KIND=powershell
        if let Ok(kind) = env::var(format!("{ENV_PREFIX}_KIND")) {
            self.general.default_kind = ScriptKind::parse_lenient(&kind);
        }

        // SCRIPT_GUARD_COLOR=never
        if let Ok(color) = env::var(format!("{ENV_PREFIX}_COLOR")) {
            self.general.color = color;
        }

        // SCRIPT_GUARD_VERBOSE=1
        if env::var(format!("{ENV_PREFIX}_VERBOSE")).is_ok() {
            self.general.verbose = true;
        }

        // SCRIPT_GUARD_LOG_FILE=~/.local/share/script-guard/decisions.log
        if let Ok(file) = env::var(format!("{ENV_PREFIX}_LOG_FILE")) {
            self.logging.enabled = true;
            self.logging.file = Some(file);
        }

        // SCRIPT_GUARD_DISABLE="halt,reboot"
        if let Ok(disable) = env::var(format!("{ENV_PREFIX}_DISABLE")) {
            self.rules.disabled.extend(
                disable
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToString::to_string),
            );
        }
    }

    /// Path to the user config file.
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        Some(
            dirs::config_dir()?
                .join(APP_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        )
    }

    /// Serialize the effective configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be represented as TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Generate a sample configuration string with comments.
    #[must_use]
    pub fn generate_sample_config() -> String {
        r#"# script-guard configuration

[general]
# Color output: "auto" | "always" | "never"
color = "auto"

# Verbose output
verbose = false

# Script kind when neither --kind nor the file extension decides:
# "posix_shell" | "powershell"
default_kind = "posix_shell"

[heuristics]
# Suggest a shebang line for posix-shell scripts
shebang = true
# Flag scripts shorter than 20 characters
short_script = true
# Suggest error handling for scripts longer than 5 lines
error_handling = true

[rules]
# Builtin patterns to drop, e.g. ["halt"]
disabled = []

# Extra rules. tier is "critical" | "high" | "medium"
# [[rules.custom]]
# pattern = "terraform destroy"
# tier = "critical"
# message = "Destroys managed infrastructure"

[logging]
# Append one line per check to a log file
enabled = false
# file = "~/.local/share/script-guard/decisions.log"
# "text" | "json"
format = "text"

[logging.redaction]
enabled = false
# "none" | "literals" | "full"
mode = "literals"
# Quoted literals longer than this are truncated in "literals" mode
max_literal_len = 50

[logging.events]
# Which verdicts are written
red = true
yellow = true
green = false
"#
        .to_string()
    }
}
