//! `analyze` / `check`: run the analysis pipeline and render the report

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use stack_align_core::{AnalysisReport, Analyzer, Framework};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::output;
use crate::progress::PhaseProgress;
use crate::ReportFormat;

#[derive(Args, Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// Project directory (default: current directory)
    pub path: Option<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    pub format: ReportFormat,

    /// Also write the report to this file (JSON for console/json, HTML for html)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Only report issues of one framework
    #[arg(long, value_parser = crate::parse_framework)]
    pub focus: Option<Framework>,

    /// Print only the summary
    #[arg(long)]
    pub summary: bool,

    /// Config file (default: stack-align.toml in the project or its ancestors)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &AnalyzeArgs) -> Result<()> {
    let start = Instant::now();
    let console = args.format == ReportFormat::Console;

    if console {
        eprintln!(
            "{}",
            format!("  stack-align v{} - analyzing project", stack_align_core::VERSION).bold()
        );
        eprintln!();
    }

    let report = execute(args, console)?;

    match args.format {
        ReportFormat::Console => {
            output::terminal::print_report(&report, args.summary);
            println!("  Time: {:.1}s", start.elapsed().as_secs_f64());
        }
        ReportFormat::Json => println!("{}", output::json::render_report(&report)?),
        ReportFormat::Html => {
            if args.output.is_none() {
                println!("{}", output::html::render_report(&report));
            }
        }
    }

    if let Some(path) = &args.output {
        save(&report, path, args.format)?;
        if console {
            println!("  Report saved to {}", path.display());
        }
    }

    Ok(())
}

/// Analyze the project described by `args`
pub fn execute(args: &AnalyzeArgs, show_progress: bool) -> Result<AnalysisReport> {
    let strict = args.strict;
    let ctx = super::load_project(args.path.as_deref(), args.config.as_deref(), |config| {
        config.strict |= strict;
    })?;

    let mut progress = PhaseProgress::new(show_progress);
    let report = Analyzer::new()
        .focus(args.focus)
        .analyze_with_progress(&ctx, |phase| progress.on_phase(phase));
    progress.finish(&format!("{} files", report.summary.files_analyzed));

    Ok(report)
}

fn save(report: &AnalysisReport, path: &Path, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Html => std::fs::write(path, output::html::render_report(report))
            .with_context(|| format!("Failed to write {}", path.display())),
        _ => report.save(path),
    }
}
