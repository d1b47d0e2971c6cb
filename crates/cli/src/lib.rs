//! stack-align CLI library: exposed for integration tests

pub mod commands;
pub mod output;
pub mod progress;

use clap::{Parser, Subcommand};
use stack_align_core::Framework;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stack-align")]
#[command(
    about = "Align React / Next.js / TypeScript / Tailwind projects with current best practices",
    long_about = None
)]
#[command(version = stack_align_core::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a project and report issues
    #[command(visible_alias = "check")]
    Analyze(commands::analyze::AnalyzeArgs),

    /// Apply automatic fixes for reported issues
    #[command(visible_alias = "align")]
    Heal(commands::heal::HealArgs),

    /// Generate Vitest skeletons for untested files
    #[command(name = "generate-tests", visible_alias = "test:generate")]
    GenerateTests(commands::generate::GenerateArgs),

    /// Write a default stack-align.toml
    Init {
        /// Path to initialize (default: current directory)
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Console,
    Json,
    Html,
}

/// clap value parser for framework names (`react`, `next`, `ts`, …)
pub fn parse_framework(value: &str) -> Result<Framework, String> {
    Framework::parse(value).ok_or_else(|| {
        let known: Vec<&str> = Framework::ALL.iter().map(|f| f.as_str()).collect();
        format!("unknown framework `{}` (expected one of: {})", value, known.join(", "))
    })
}
