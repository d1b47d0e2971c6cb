//! `generate-tests` / `test:generate`: write Vitest skeletons

use anyhow::Result;
use clap::Args;
use stack_align_core::{generate_tests, TestGenOptions, TestGenReport};
use std::path::PathBuf;

use crate::output;
use crate::progress::Step;

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Project directory (default: current directory)
    pub path: Option<PathBuf>,

    /// Coverage threshold for a generated vitest config (default: testing.coverage)
    #[arg(long)]
    pub coverage: Option<u8>,

    /// Include jest-axe accessibility tests
    #[arg(long)]
    pub a11y: bool,

    /// Only generate for this component or hook
    #[arg(long)]
    pub component: Option<String>,

    /// List what would be written without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Replace existing test files
    #[arg(long)]
    pub overwrite: bool,

    /// Config file (default: stack-align.toml in the project or its ancestors)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &GenerateArgs) -> Result<()> {
    let report = execute(args, true)?;
    output::terminal::print_testgen(&report, args.dry_run);
    Ok(())
}

pub fn execute(args: &GenerateArgs, show_progress: bool) -> Result<TestGenReport> {
    let ctx = super::load_project(args.path.as_deref(), args.config.as_deref(), |_| {})?;

    let defaults = TestGenOptions::from_config(&ctx.config);
    let options = TestGenOptions {
        coverage: args.coverage.unwrap_or(defaults.coverage),
        include_a11y: args.a11y || defaults.include_a11y,
        component: args.component.clone(),
        dry_run: args.dry_run,
        overwrite: args.overwrite,
    };

    let step = show_progress.then(|| Step::new("Generating tests"));
    let report = generate_tests(&ctx, &options)?;
    if let Some(step) = step {
        step.finish(&format!("{} generated", report.generated.len()));
    }
    Ok(report)
}
