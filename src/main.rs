#![forbid(unsafe_code)]
//! script-guard: safety review for generated shell and PowerShell scripts.
//!
//! Exit behavior:
//!   - 0: checked (and approved, with `--confirm`)
//!   - 1: input, configuration or serialization error
//!   - 2: invalid command line
//!   - 3: risk reached `--fail-on`
//!   - 4: confirmation refused

use clap::Parser;
use colored::Colorize;
use script_guard::cli::{self, Cli, EXIT_ERROR};
use std::io::{self, IsTerminal};
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the diagnostic filter (e.g. `script_guard=debug`).
const LOG_FILTER_ENV: &str = "SCRIPT_GUARD_LOG";

/// Configure colored output based on TTY detection.
///
/// Disables colors if stdout is not a terminal (e.g., piped to a file).
fn configure_colors() {
    if !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    setup_logging();
    configure_colors();

    // Usage errors exit with status 2; --help and --version exit 0.
    let cli = Cli::parse();

    let code = match cli::run_command(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            EXIT_ERROR
        }
    };
    std::process::exit(code);
}
