//! `heal` / `align`: apply fixes from a fresh analysis or a saved report

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use stack_align_core::{heal, AnalysisReport, Analyzer, Framework, HealOptions, HealingReport};
use std::path::PathBuf;

use crate::output;
use crate::progress::{PhaseProgress, Step};

#[derive(Args, Debug, Clone, Default)]
pub struct HealArgs {
    /// Project directory (default: current directory)
    pub path: Option<PathBuf>,

    /// Report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Attempt at most N fixes (default: healing.max_fixes)
    #[arg(long)]
    pub max_fix: Option<usize>,

    /// Heal from a report saved by `analyze --output`
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Only heal issues of one framework
    #[arg(long, value_parser = crate::parse_framework)]
    pub framework: Option<Framework>,

    /// Only heal issues of one component
    #[arg(long)]
    pub component: Option<String>,

    /// Generate missing tests after fixing
    #[arg(long)]
    pub generate_tests: bool,

    /// Config file (default: stack-align.toml in the project or its ancestors)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &HealArgs) -> Result<()> {
    eprintln!(
        "{}",
        format!(
            "  stack-align v{} - healing project{}",
            stack_align_core::VERSION,
            if args.dry_run { " (dry run)" } else { "" }
        )
        .bold()
    );
    eprintln!();

    let report = execute(args, true)?;
    output::terminal::print_healing(&report);
    Ok(())
}

pub fn execute(args: &HealArgs, show_progress: bool) -> Result<HealingReport> {
    let ctx = super::load_project(args.path.as_deref(), args.config.as_deref(), |_| {})?;

    let results = match &args.report {
        Some(path) => {
            let saved = AnalysisReport::load(path)?;
            tracing::debug!(path = %path.display(), issues = saved.summary.total_issues, "loaded saved report");
            saved.results
        }
        None => {
            let mut progress = PhaseProgress::new(show_progress);
            let report = Analyzer::new().analyze_with_progress(&ctx, |phase| progress.on_phase(phase));
            progress.finish(&format!("{} issues", report.summary.total_issues));
            report.results
        }
    };

    let defaults = HealOptions::from_config(&ctx);
    let options = HealOptions {
        dry_run: args.dry_run,
        max_fix: args.max_fix.or(defaults.max_fix),
        framework: args.framework,
        component: args.component.clone(),
        generate_tests: args.generate_tests || defaults.generate_tests,
        keep_original: defaults.keep_original,
    };

    let step = show_progress.then(|| Step::new("Applying fixes"));
    let report = heal(&ctx, &results, &options)?;
    if let Some(step) = step {
        if report.total_eligible == 0 {
            step.skip("No fixable issues found");
        } else {
            step.finish(&format!("{} applied, {} failed", report.fixed, report.failed));
        }
    }
    Ok(report)
}
