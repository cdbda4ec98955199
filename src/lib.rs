#![forbid(unsafe_code)]
//! script-guard library.
//!
//! Safety review for shell and PowerShell scripts produced by a language
//! model, before anyone runs them. A script is scanned line by line for
//! destructive command fragments that sit outside quoted literals, run
//! through a few script-wide heuristics, and graded green, yellow or red.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Configuration                             │
//! │  (env vars → project config → user config → system → defaults)  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │
//!                                  ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Pattern Tables                           │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────┐                         │
//! │  │ Critical │ │   High   │ │  Medium  │   (+ custom rules)      │
//! │  └──────────┘ └──────────┘ └──────────┘                         │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │
//!                                  ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           Evaluator                              │
//! │  Exemptions → Quote Scanner → Live Match → Heuristics → Risk    │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │
//!                                  ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Report / Confirmation / Decision Log             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use script_guard::{RiskLevel, ScriptDocument, assess};
//!
//! let doc = ScriptDocument::posix("#!/bin/bash\nrm -rf ./old_logs");
//! let assessment = assess(&doc);
//! assert_eq!(assessment.risk, RiskLevel::Yellow);
//! assert!(assessment.warnings[0].rendered().starts_with("🟡 CAUTION: "));
//! ```

pub mod cli;
pub mod config;
pub mod confirm;
pub mod context;
pub mod document;
pub mod evaluator;
pub mod heuristics;
pub mod logging;
pub mod matcher;
pub mod packs;
pub mod report;
pub mod risk;

pub use config::Config;
pub use confirm::{Confirmation, confirm};
pub use document::{ScriptDocument, ScriptKind};
pub use evaluator::{Assessment, Evaluator, Warning, assess, classify};
pub use heuristics::{HeuristicSettings, heuristics};
pub use matcher::{contains_command, matches};
pub use packs::{PatternRule, PatternTables, Severity, Tier};
pub use risk::{RiskLevel, aggregate, aggregate_rendered};
