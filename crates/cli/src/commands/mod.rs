//! CLI commands

pub mod analyze;
pub mod generate;
pub mod heal;
pub mod init;

use anyhow::{Context, Result};
use stack_align_core::{AlignConfig, ProjectContext};
use std::path::{Path, PathBuf};

/// Load config (explicit path or discovered) and the project under `path`
pub(crate) fn load_project(
    path: Option<&Path>,
    config_path: Option<&Path>,
    adjust: impl FnOnce(&mut AlignConfig),
) -> Result<ProjectContext> {
    let root: PathBuf = path.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    let mut config = AlignConfig::load(config_path, &root)
        .with_context(|| format!("Cannot load configuration for {}", root.display()))?;
    adjust(&mut config);
    ProjectContext::load(&root, config)
}
