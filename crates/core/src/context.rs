//! Read-only project context shared by detectors and transformers
//!
//! Owned by the orchestrator for one analysis run; nothing in here is
//! mutated after [`ProjectContext::load`].

use crate::config::AlignConfig;
use crate::discovery;
use crate::issue::Framework;
use crate::parser::SUPPORTED_EXTENSIONS;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub struct ProjectContext {
    pub root: PathBuf,
    pub name: String,
    pub config: AlignConfig,
    /// Analyzable source files, absolute and sorted
    pub files: Vec<PathBuf>,
    pub package_json: Option<Value>,
}

impl ProjectContext {
    /// Discover files and read package.json under `root`
    pub fn load(root: &Path, config: AlignConfig) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("Cannot open project root {}", root.display()))?;
        let patterns = discovery::ignore_patterns(&root, &config)?;
        let files =
            discovery::discover_files(&root, SUPPORTED_EXTENSIONS, &patterns, &config.include)?;
        Ok(Self::with_files(root, config, files))
    }

    /// Build a context over an explicit file list
    pub fn with_files(root: PathBuf, config: AlignConfig, files: Vec<PathBuf>) -> Self {
        let package_json = read_json(&root.join("package.json"));
        let name = package_json
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .map(String::from)
            .or_else(|| root.file_name().and_then(|n| n.to_str()).map(String::from))
            .unwrap_or_else(|| "project".to_string());
        Self {
            root,
            name,
            config,
            files,
            package_json,
        }
    }

    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Declared version range of an npm dependency (any dependency table)
    pub fn dependency_version(&self, name: &str) -> Option<&str> {
        let pkg = self.package_json.as_ref()?;
        ["dependencies", "devDependencies", "peerDependencies"]
            .iter()
            .find_map(|table| pkg.get(*table)?.get(name)?.as_str())
    }

    /// Which dependency table declares `name`
    pub fn dependency_table(&self, name: &str) -> Option<&'static str> {
        let pkg = self.package_json.as_ref()?;
        ["dependencies", "devDependencies", "peerDependencies"]
            .into_iter()
            .find(|table| pkg.get(*table).and_then(|t| t.get(name)).is_some())
    }

    pub fn dependency_major(&self, name: &str) -> Option<u64> {
        self.dependency_version(name).and_then(parse_major)
    }

    pub fn has_script(&self, name: &str) -> bool {
        self.package_json
            .as_ref()
            .and_then(|p| p.get("scripts"))
            .and_then(|s| s.get(name))
            .is_some()
    }

    /// Whether a framework's rules apply to this project
    pub fn uses(&self, framework: Framework) -> bool {
        let frameworks = &self.config.frameworks;
        let forced = match framework {
            Framework::React => frameworks.react.enabled,
            Framework::Nextjs => frameworks.nextjs.enabled,
            Framework::Typescript => frameworks.typescript.enabled,
            Framework::Tailwind => frameworks.tailwind.enabled,
            _ => None,
        };
        if let Some(forced) = forced {
            return forced;
        }
        match framework {
            Framework::React => self.dependency_version("react").is_some(),
            Framework::Nextjs => self.dependency_version("next").is_some(),
            Framework::Typescript => {
                self.dependency_version("typescript").is_some()
                    || self.root.join("tsconfig.json").exists()
            }
            Framework::Tailwind => {
                self.dependency_version("tailwindcss").is_some()
                    || ["js", "ts", "cjs", "mjs"]
                        .iter()
                        .any(|ext| self.root.join(format!("tailwind.config.{}", ext)).exists())
            }
            Framework::Vitest => self.dependency_version("vitest").is_some(),
            Framework::Architecture | Framework::Other => true,
        }
    }

    /// Whether `source` already has a sibling or `__tests__` test file
    pub fn has_test_for(&self, source: &Path) -> bool {
        let Some(dir) = source.parent() else {
            return false;
        };
        let stem = crate::source::file_stem(source);
        let candidates = ["test", "spec"].iter().flat_map(|kind| {
            ["ts", "tsx", "js", "jsx"]
                .iter()
                .map(move |ext| format!("{}.{}.{}", stem, kind, ext))
        });
        candidates
            .into_iter()
            .any(|name| dir.join(&name).exists() || dir.join("__tests__").join(&name).exists())
    }
}

/// Leading major version in an npm range such as `^18.2.0` or `~15`
pub fn parse_major(range: &str) -> Option<u64> {
    let digits: String = range
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Parse a JSON file, logging and returning `None` on any failure
pub fn read_json(path: &Path) -> Option<Value> {
    let contents = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable JSON, skipped");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_major_handles_ranges() {
        assert_eq!(parse_major("^18.2.0"), Some(18));
        assert_eq!(parse_major("~15.0.1"), Some(15));
        assert_eq!(parse_major(">=4"), Some(4));
        assert_eq!(parse_major("latest"), None);
    }
}
