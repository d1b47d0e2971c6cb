//! Configuration file parsing for stack-align.toml

use crate::issue::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "stack-align.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed config {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config: {0}")]
    Write(#[from] std::io::Error),
}

/// Main configuration structure for stack-align.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignConfig {
    /// Escalate every warning to an error
    #[serde(default)]
    pub strict: bool,

    /// Glob patterns (relative to the project root) to analyze; empty = all
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns to skip, on top of `.alignignore` and built-in excludes
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub frameworks: FrameworksConfig,

    #[serde(default)]
    pub testing: TestingConfig,

    #[serde(default)]
    pub healing: HealingConfig,

    #[serde(default)]
    pub architecture: ArchitectureConfig,

    /// Per-rule severity overrides: `CODE = "error" | "warning" | "suggestion" | "off"`
    #[serde(default)]
    pub rules: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameworkTarget {
    /// Target major version
    pub version: String,

    /// Force the framework's rules on or off regardless of package.json
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl FrameworkTarget {
    fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            enabled: None,
        }
    }

    /// Leading numeric component of `version`
    pub fn major(&self) -> u64 {
        crate::context::parse_major(&self.version).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameworksConfig {
    #[serde(default = "default_react")]
    pub react: FrameworkTarget,

    #[serde(default = "default_nextjs")]
    pub nextjs: FrameworkTarget,

    #[serde(default = "default_typescript")]
    pub typescript: FrameworkTarget,

    #[serde(default = "default_tailwind")]
    pub tailwind: FrameworkTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestingConfig {
    #[serde(default = "default_test_framework")]
    pub framework: String,

    /// Coverage threshold percentage written into generated vitest configs
    #[serde(default = "default_coverage")]
    pub coverage: u8,

    #[serde(default)]
    pub include_a11y: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealingConfig {
    #[serde(default = "default_true")]
    pub migrate_legacy_code: bool,

    #[serde(default)]
    pub generate_missing_tests: bool,

    /// Default fix limit when `--max-fix` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fixes: Option<usize>,

    /// Write `<file>.orig` before overwriting a healed file
    #[serde(default)]
    pub keep_original_files: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchitectureConfig {
    #[serde(default = "default_max_depth")]
    pub max_directory_depth: usize,

    #[serde(default = "default_true")]
    pub enforce_kebab_case: bool,

    #[serde(default = "default_true")]
    pub enforce_pascal_case: bool,
}

/// Effect of a `[rules]` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSetting {
    Off,
    Severity(Severity),
}

// Default functions
fn default_true() -> bool {
    true
}

fn default_react() -> FrameworkTarget {
    FrameworkTarget::new("19")
}

fn default_nextjs() -> FrameworkTarget {
    FrameworkTarget::new("15")
}

fn default_typescript() -> FrameworkTarget {
    FrameworkTarget::new("5")
}

fn default_tailwind() -> FrameworkTarget {
    FrameworkTarget::new("4")
}

fn default_test_framework() -> String {
    "vitest".to_string()
}

fn default_coverage() -> u8 {
    80
}

fn default_max_depth() -> usize {
    5
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            strict: false,
            include: Vec::new(),
            exclude: Vec::new(),
            frameworks: FrameworksConfig::default(),
            testing: TestingConfig::default(),
            healing: HealingConfig::default(),
            architecture: ArchitectureConfig::default(),
            rules: BTreeMap::new(),
        }
    }
}

impl Default for FrameworksConfig {
    fn default() -> Self {
        Self {
            react: default_react(),
            nextjs: default_nextjs(),
            typescript: default_typescript(),
            tailwind: default_tailwind(),
        }
    }
}

impl Default for TestingConfig {
    fn default() -> Self {
        Self {
            framework: default_test_framework(),
            coverage: default_coverage(),
            include_a11y: false,
        }
    }
}

impl Default for HealingConfig {
    fn default() -> Self {
        Self {
            migrate_legacy_code: true,
            generate_missing_tests: false,
            max_fixes: None,
            keep_original_files: false,
        }
    }
}

impl Default for ArchitectureConfig {
    fn default() -> Self {
        Self {
            max_directory_depth: default_max_depth(),
            enforce_kebab_case: true,
            enforce_pascal_case: true,
        }
    }
}

impl AlignConfig {
    /// Load configuration from a file; any failure is an error
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Find stack-align.toml in `start_dir` or its ancestors.
    ///
    /// A missing file yields defaults; a malformed one is logged and also
    /// yields defaults.
    pub fn find_and_load(start_dir: &Path) -> Self {
        let mut current = start_dir;

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::from_file(&config_path) {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring config file, using defaults");
                        Self::default()
                    }
                };
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Self::default()
    }

    /// Explicit `--config` paths must load; otherwise search from `start_dir`
    pub fn load(explicit: Option<&Path>, start_dir: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => Ok(Self::find_and_load(start_dir)),
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Configured override for a rule code, if any
    pub fn rule_setting(&self, rule_code: &str) -> Option<RuleSetting> {
        let value = self.rules.get(rule_code)?;
        if value.eq_ignore_ascii_case("off") {
            return Some(RuleSetting::Off);
        }
        match Severity::parse(value) {
            Some(severity) => Some(RuleSetting::Severity(severity)),
            None => {
                tracing::warn!(rule = rule_code, value = %value, "unknown rule severity, ignored");
                None
            }
        }
    }
}
