//! stack-align - framework best-practice analyzer and healer

use anyhow::Result;
use clap::Parser;
use stack_align_cli::{commands, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "stack_align=debug"
    } else {
        "stack_align=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(&args)?,
        Commands::Heal(args) => commands::heal::run(&args)?,
        Commands::GenerateTests(args) => commands::generate::run(&args)?,
        Commands::Init { path } => commands::init::run(path.as_deref())?,
    }

    Ok(())
}
