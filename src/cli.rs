//! CLI argument parsing and command handling.
//!
//! This module provides the command-line interface for script-guard,
//! including the `check` command and configuration management.

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::Config;
use crate::confirm::confirm;
use crate::document::{ScriptDocument, ScriptKind};
use crate::evaluator::Evaluator;
use crate::logging::DecisionLogger;
use crate::packs::{PatternTables, Tier};
use crate::report::{CheckReport, FailOn, ReportFormat};
use crate::risk::RiskLevel;

/// Script ran (or would run) without objection.
pub const EXIT_OK: i32 = 0;
/// Input, configuration or serialization failure.
pub const EXIT_ERROR: i32 = 1;
/// Invalid command line.
pub const EXIT_USAGE: i32 = 2;
/// Risk reached the `--fail-on` threshold.
pub const EXIT_RISK: i32 = 3;
/// The confirmation prompt was refused.
pub const EXIT_REFUSED: i32 = 4;

/// Safety review for generated shell and PowerShell scripts.
///
/// script-guard scans a script for destructive commands outside quoted
/// literals, grades it green, yellow or red, and can gate execution behind a
/// confirmation prompt whose strictness follows the grade.
#[derive(Parser, Debug)]
#[command(name = "script-guard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Load only this config file (plus environment overrides)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify a script and report its risk
    #[command(name = "check")]
    Check(CheckCommand),

    /// List the effective pattern tables in evaluation order
    #[command(name = "patterns")]
    Patterns {
        /// Only show one tier (critical, high, medium)
        #[arg(long)]
        tier: Option<Tier>,
    },

    /// Generate a sample configuration file
    #[command(name = "init")]
    Init {
        /// Output path (defaults to stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    #[command(name = "config")]
    ShowConfig,
}

/// Arguments for `script-guard check`.
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Script file to check, or `-` for stdin
    #[arg(default_value = "-")]
    pub path: PathBuf,

    /// Script kind (bash, sh, powershell, pwsh, ...). Defaults to the file
    /// extension, then the configured default.
    #[arg(long)]
    pub kind: Option<ScriptKind>,

    /// Output format
    #[arg(long, short, value_enum, default_value_t = ReportFormat::Pretty)]
    pub format: ReportFormat,

    /// Exit with status 3 when risk reaches this level
    #[arg(long, value_enum, default_value_t = FailOn::None)]
    pub fail_on: FailOn,

    /// Ask for confirmation on stderr/stdin; exit 4 when refused
    #[arg(long)]
    pub confirm: bool,
}

/// Errors surfaced by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Reading input or writing output failed.
    Io { context: String, source: io::Error },
    /// The effective configuration could not be rendered as TOML.
    ConfigSerialize(toml::ser::Error),
    /// `init` refused to write the sample configuration.
    ConfigWrite(String),
    /// The report could not be rendered as JSON.
    Json(serde_json::Error),
}

impl CliError {
    fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { context, source } => write!(f, "{context}: {source}"),
            Self::ConfigSerialize(e) => write!(f, "failed to serialize configuration: {e}"),
            Self::ConfigWrite(msg) => f.write_str(msg),
            Self::Json(e) => write!(f, "failed to serialize report: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::ConfigSerialize(e) => Some(e),
            Self::ConfigWrite(_) => None,
            Self::Json(e) => Some(e),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(source: io::Error) -> Self {
        Self::io("I/O error", source)
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(e: toml::ser::Error) -> Self {
        Self::ConfigSerialize(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Run the CLI command and return the process exit code.
///
/// # Errors
///
/// Returns an error when input cannot be read, output cannot be written, or
/// `init` would overwrite an existing file.
pub fn run_command(cli: Cli) -> Result<i32, CliError> {
    let mut config = cli
        .config
        .as_deref()
        .map_or_else(Config::load, Config::load_explicit);
    if cli.verbose {
        config.general.verbose = true;
    }
    configure_color_mode(&config.general.color);

    match cli.command {
        Command::Check(check) => handle_check(&config, &check),
        Command::Patterns { tier } => {
            let tables = PatternTables::from_config(&config.rules);
            print!("{}", format_patterns(&tables, tier));
            Ok(EXIT_OK)
        }
        Command::Init { output, force } => {
            init_config(output.as_deref(), force)?;
            Ok(EXIT_OK)
        }
        Command::ShowConfig => {
            show_config(&config)?;
            Ok(EXIT_OK)
        }
    }
}

/// Apply the configured color mode on top of the TTY detection done at startup.
fn configure_color_mode(mode: &str) {
    match mode {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => {}
    }
}

/// Classify one script, print the report, and optionally gate on confirmation.
fn handle_check(config: &Config, check: &CheckCommand) -> Result<i32, CliError> {
    let (label, text) = read_script(&check.path)?;
    let kind = resolve_kind(check.kind, &check.path, config.general.default_kind);
    let document = ScriptDocument::new(text, kind);

    let tables = PatternTables::from_config(&config.rules);
    let assessment = Evaluator::new(&tables, config.heuristics).assess(&document);
    debug!(
        file = %label,
        risk = %assessment.risk,
        warnings = assessment.warnings.len(),
        "checked script"
    );

    let report = CheckReport::new(&label, &document, &assessment);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = match check.format {
        ReportFormat::Pretty => write!(out, "{}", report.render_pretty(config.general.verbose)),
        ReportFormat::Json => writeln!(out, "{}", report.to_json()?),
    };
    written
        .and_then(|()| out.flush())
        .map_err(|e| CliError::io("failed to write report", e))?;
    drop(out);

    let approved = if check.confirm {
        let stdin = io::stdin();
        let approved = confirm(
            report.confirmation,
            &assessment.warnings,
            &mut stdin.lock(),
            &mut io::stderr(),
        )
        .map_err(|e| CliError::io("confirmation failed", e))?;
        Some(approved)
    } else {
        None
    };

    if let Some(logger) = DecisionLogger::new(&config.logging) {
        logger.log(&assessment, &document, Some(&label), approved);
    }

    Ok(exit_code(check.fail_on, assessment.risk, approved))
}

/// Read the script from a file, or stdin when the path is `-`.
fn read_script(path: &Path) -> Result<(String, String), CliError> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| CliError::io("failed to read script from stdin", e))?;
        return Ok(("-".to_string(), text));
    }

    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("failed to read {}", path.display()), e))?;
    Ok((path.display().to_string(), text))
}

/// Kind from the flag, else the file extension, else the configured default.
fn resolve_kind(flag: Option<ScriptKind>, path: &Path, default: ScriptKind) -> ScriptKind {
    flag.or_else(|| ScriptKind::from_path(path))
        .unwrap_or(default)
}

/// Confirmation outcome wins over the `--fail-on` threshold.
const fn exit_code(fail_on: FailOn, risk: RiskLevel, approved: Option<bool>) -> i32 {
    match approved {
        Some(true) => EXIT_OK,
        Some(false) => EXIT_REFUSED,
        None if fail_on.blocks(risk) => EXIT_RISK,
        None => EXIT_OK,
    }
}

/// Render the pattern tables, one block per tier.
fn format_patterns(tables: &PatternTables, only: Option<Tier>) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    for tier in Tier::ALL {
        if only.is_some_and(|t| t != tier) {
            continue;
        }
        let rules = tables.table(tier);
        let _ = writeln!(out, "{} ({}):", tier.label().bold(), rules.len());
        for rule in rules {
            let _ = writeln!(out, "  - {} : {}", rule.pattern, rule.message);
        }
        let _ = writeln!(out);
    }
    out
}

/// Generate a sample configuration file
fn init_config(output: Option<&Path>, force: bool) -> Result<(), CliError> {
    let sample = Config::generate_sample_config();

    match output {
        Some(path) => {
            if path.exists() && !force {
                return Err(CliError::ConfigWrite(format!(
                    "File exists: {}. Use --force to overwrite.",
                    path.display()
                )));
            }

            // Create parent directories if needed
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CliError::io(format!("failed to create {}", parent.display()), e)
                })?;
            }

            std::fs::write(path, sample)
                .map_err(|e| CliError::io(format!("failed to write {}", path.display()), e))?;
            println!("Configuration written to: {}", path.display());
        }
        None => {
            println!("{sample}");
        }
    }

    Ok(())
}

/// Show the current configuration
fn show_config(config: &Config) -> Result<(), CliError> {
    println!("# Config sources (lowest → highest priority):");
    let system_cfg = PathBuf::from("/etc/script-guard").join("config.toml");
    if system_cfg.exists() {
        println!("#   - system: {}", system_cfg.display());
    }
    if let Some(user_cfg) = Config::user_config_path() {
        if user_cfg.exists() {
            println!("#   - user: {}", user_cfg.display());
        }
    }
    let project_cfg = PathBuf::from(".script-guard.toml");
    if project_cfg.exists() {
        println!("#   - project: {}", project_cfg.display());
    }
    println!();
    print!("{}", config.to_toml_string()?);
    Ok(())
}
