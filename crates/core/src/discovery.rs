//! File discovery with gitignore-aware filtering
//!
//! Uses the `ignore` crate (from ripgrep) to respect `.gitignore`, then layers
//! the built-in excludes, `.alignignore` and config `exclude` patterns on top
//! as overrides.

use crate::config::AlignConfig;
use anyhow::{Context, Result};
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

pub const IGNORE_FILE_NAME: &str = ".alignignore";

/// Always excluded, whatever the ignore file says
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "node_modules/",
    ".next/",
    "dist/",
    "build/",
    "out/",
    "coverage/",
    ".git/",
    ".turbo/",
];

/// Read `.alignignore` patterns: one glob per line, `#` comments, blanks skipped
pub fn read_ignore_file(root: &Path) -> Result<Vec<String>> {
    let path = root.join(IGNORE_FILE_NAME);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse_ignore_lines(&contents))
}

pub fn parse_ignore_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Every exclusion that applies to a project: defaults, ignore file, config
pub fn ignore_patterns(root: &Path, config: &AlignConfig) -> Result<Vec<String>> {
    let mut patterns: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
    patterns.extend(read_ignore_file(root)?);
    patterns.extend(config.exclude.iter().cloned());
    Ok(patterns)
}

/// Discover files under `root` matching any of the given `extensions`,
/// respecting `.gitignore` and skipping paths that match `ignore_patterns`.
/// When `include` is non-empty only paths matching one of its globs
/// (relative to the root) are kept. Declaration files are skipped.
///
/// Returns absolute paths sorted alphabetically.
pub fn discover_files(
    root: &Path,
    extensions: &[&str],
    ignore_patterns: &[String],
    include: &[String],
) -> Result<Vec<PathBuf>> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Cannot open project root {}", root.display()))?;

    let mut builder = WalkBuilder::new(&root);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true);

    // Overrides use gitignore syntax; negating each pattern turns it into an exclude
    if !ignore_patterns.is_empty() {
        let mut overrides = OverrideBuilder::new(&root);
        for pattern in ignore_patterns {
            let glob = if pattern.ends_with('/') {
                format!("!{}**", pattern)
            } else {
                format!("!{}", pattern)
            };
            overrides
                .add(&glob)
                .with_context(|| format!("Invalid ignore pattern `{}`", pattern))?;
        }
        builder.overrides(overrides.build()?);
    }

    let include: Vec<glob::Pattern> = include
        .iter()
        .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid include pattern `{}`", p)))
        .collect::<Result<_>>()?;

    let mut files = Vec::new();

    for entry in builder.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.into_path();
        if !has_supported_extension(&path, extensions) || is_declaration_file(&path) {
            continue;
        }

        let path = if path.is_absolute() {
            path
        } else {
            root.join(path)
        };

        if !include.is_empty() {
            let rel = path.strip_prefix(&root).unwrap_or(&path);
            if !include.iter().any(|p| p.matches_path(rel)) {
                continue;
            }
        }

        files.push(path);
    }

    files.sort();
    Ok(files)
}

fn has_supported_extension(path: &Path, extensions: &[&str]) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(e) => e,
        None => return false,
    };
    let with_dot = format!(".{}", ext);
    extensions.contains(&with_dot.as_str())
}

fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".d.ts"))
}
