//! Initialize stack-align.toml configuration

use anyhow::Result;
use stack_align_core::{AlignConfig, CONFIG_FILE_NAME};
use std::path::{Path, PathBuf};

pub fn run(path: Option<&Path>) -> Result<()> {
    let target_path = path.unwrap_or_else(|| Path::new("."));
    let config_path = target_path.join(CONFIG_FILE_NAME);

    if !create_config(target_path)? {
        println!("⚠️  {} already exists at {:?}", CONFIG_FILE_NAME, config_path);
        return Ok(());
    }

    println!("✅ Created {} at {:?}", CONFIG_FILE_NAME, config_path);
    println!("\nYou can now customize the configuration and run:");
    println!("  stack-align analyze");

    Ok(())
}

/// Write the default config into `dir`; `false` if one is already there
pub fn create_config(dir: &Path) -> Result<bool> {
    let config_path: PathBuf = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        return Ok(false);
    }
    AlignConfig::default().save(&config_path)?;
    tracing::debug!(path = %config_path.display(), "wrote default config");
    Ok(true)
}
