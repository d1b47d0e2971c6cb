//! Transformer layer: applies the fixes of one file, validates, then commits
//!
//! Fixes run sequentially on an in-memory copy of the file; each one sees the
//! previous fix's output and re-parses it. Nothing reaches the disk until all
//! fixes for the file have been applied and the result passes
//! [`crate::validator::validate`]. A fix that cannot be applied, or a result
//! that fails validation, rolls back the whole file and reports every
//! automatic operation as failed.
//!
//! Paths a batch renames to or creates are claimed in a set shared across
//! batches, so a later batch cannot move or create onto them. Dry runs and
//! real runs therefore agree on which of two colliding fixes fails.

pub mod complex;
pub mod replace;

use crate::issue::{FixDescriptor, Issue, JsonOperation};
use crate::parser::{ParseError, SourceLanguage};
use crate::validator;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Expected failures of a single fix; the file is left unmodified
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("target not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid JSON pointer `{0}`")]
    InvalidPointer(String),

    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("no syntax tree available for {}", .0.display())]
    Unsupported(PathBuf),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Record of one attempted fix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealingOperation {
    /// Strategy used (`rename_file`, `replace`, `complex`, …)
    #[serde(rename = "type")]
    pub kind: String,
    pub rule_code: String,
    /// File the operation targets
    pub path: PathBuf,
    pub success: bool,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    pub dry_run: bool,
    /// Write `<file>.orig` before overwriting or moving a file
    pub keep_original: bool,
}

/// Outcome of [`apply_fixes`] for one file
#[derive(Debug, Clone)]
pub struct FileFixOutcome {
    pub path: PathBuf,
    /// Where the file lives after a `rename_file` fix
    pub final_path: PathBuf,
    pub operations: Vec<HealingOperation>,
    /// Non-empty when the file was rolled back
    pub validation_issues: Vec<Issue>,
    /// Whether anything was written to disk
    pub written: bool,
}

impl FileFixOutcome {
    pub fn success(&self) -> bool {
        self.validation_issues.is_empty() && self.operations.iter().all(|op| op.success)
    }
}

/// Apply every fix carried by `issues` to `path`, in order.
///
/// Expected failures (target not found, bad pattern, validation) are
/// reported through the returned operations. Only I/O errors while
/// committing are returned as `Err`.
pub fn apply_fixes(path: &Path, issues: &[&Issue], options: &ApplyOptions) -> Result<FileFixOutcome> {
    apply_fixes_with_claims(path, issues, options, &mut BTreeSet::new())
}

/// [`apply_fixes`] for one batch of a larger run.
///
/// `claimed` holds the paths earlier batches renamed to or created; a fix
/// that would land on one of them fails. On success the paths this batch
/// produced are added to it, whether or not the run is a dry run.
pub fn apply_fixes_with_claims(
    path: &Path,
    issues: &[&Issue],
    options: &ApplyOptions,
    claimed: &mut BTreeSet<PathBuf>,
) -> Result<FileFixOutcome> {
    let original = if path.is_file() {
        Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        )
    } else {
        None
    };

    let mut pending = PendingChanges {
        path: path.to_path_buf(),
        language: SourceLanguage::from_path(path),
        text: original.clone(),
        target: None,
        json: BTreeMap::new(),
        created: Vec::new(),
        claimed: &*claimed,
    };

    let mut operations = Vec::new();
    for issue in issues {
        let Some(fix) = &issue.fix else { continue };
        let (success, description) = match pending.apply(fix) {
            Ok(description) => (true, description),
            Err(e) => {
                tracing::debug!(rule = %issue.rule_code, path = %path.display(), error = %e, "fix not applied");
                (false, format!("{} failed: {}", fix.kind(), e))
            }
        };
        operations.push(HealingOperation {
            kind: fix.kind().to_string(),
            rule_code: issue.rule_code.clone(),
            path: operation_path(path, fix),
            success,
            description,
        });
    }

    if operations.iter().any(|op| op.kind != "manual" && !op.success) {
        tracing::warn!(path = %path.display(), "a fix could not be applied, changes rolled back");
        roll_back(&mut operations, "another fix for this file failed");
        return Ok(FileFixOutcome {
            path: path.to_path_buf(),
            final_path: path.to_path_buf(),
            operations,
            validation_issues: Vec::new(),
            written: false,
        });
    }

    let validation_issues = match (&original, &pending.text) {
        (Some(before), Some(after)) if before != after => validator::validate(path, before, after),
        _ => Vec::new(),
    };

    if !validation_issues.is_empty() {
        tracing::warn!(
            path = %path.display(),
            problems = validation_issues.len(),
            "transformed file failed validation, changes rolled back"
        );
        roll_back(&mut operations, "result failed validation");
        return Ok(FileFixOutcome {
            path: path.to_path_buf(),
            final_path: path.to_path_buf(),
            operations,
            validation_issues,
            written: false,
        });
    }

    let final_path = pending.target.clone().unwrap_or_else(|| path.to_path_buf());
    let written = if options.dry_run {
        false
    } else {
        pending.commit(original.as_deref(), options.keep_original)?
    };
    let produced: Vec<PathBuf> = pending
        .target
        .iter()
        .chain(pending.created.iter().map(|(p, _)| p))
        .cloned()
        .collect();
    claimed.extend(produced);

    Ok(FileFixOutcome {
        path: path.to_path_buf(),
        final_path,
        operations,
        validation_issues,
        written,
    })
}

fn roll_back(operations: &mut [HealingOperation], reason: &str) {
    for op in operations.iter_mut().filter(|op| op.kind != "manual" && op.success) {
        op.success = false;
        op.description = format!("{} (rolled back: {})", op.description, reason);
    }
}

fn operation_path(path: &Path, fix: &FixDescriptor) -> PathBuf {
    match fix {
        FixDescriptor::RenameFile { new_path, .. } => new_path.clone(),
        FixDescriptor::UpdateJson { path, .. } | FixDescriptor::CreateFile { path, .. } => {
            path.clone()
        }
        _ => path.to_path_buf(),
    }
}

/// In-memory state of one file's fix batch
struct PendingChanges<'c> {
    path: PathBuf,
    language: Option<SourceLanguage>,
    text: Option<String>,
    target: Option<PathBuf>,
    json: BTreeMap<PathBuf, Value>,
    created: Vec<(PathBuf, String)>,
    /// Paths produced by earlier batches of the same run
    claimed: &'c BTreeSet<PathBuf>,
}

impl PendingChanges<'_> {
    /// Apply one fix; on error the state is unchanged
    fn apply(&mut self, fix: &FixDescriptor) -> Result<String, TransformError> {
        match fix {
            FixDescriptor::RenameFile { new_path, .. } => {
                if self.text.is_none() {
                    return Err(TransformError::NotFound(self.path.display().to_string()));
                }
                if new_path != &self.path
                    && (new_path.exists() || self.claimed.contains(new_path))
                {
                    return Err(TransformError::AlreadyExists(new_path.clone()));
                }
                self.target = Some(new_path.clone());
                Ok(format!(
                    "Renamed {} to {}",
                    file_name(&self.path),
                    file_name(new_path)
                ))
            }

            FixDescriptor::Replace {
                pattern,
                replacement,
                context,
            } => {
                let text = self.current_text()?;
                let (context, language) = match self.language {
                    Some(language) => (*context, language),
                    None => (None, SourceLanguage::JavaScript),
                };
                let (replaced, tier) =
                    replace::apply(text, language, pattern, replacement, context)?;
                self.text = Some(replaced);
                Ok(format!("Replaced `{}` via {} edit", pattern, tier))
            }

            FixDescriptor::InsertLine { line, content } => {
                let inserted = insert_line(self.current_text()?, *line, content)?;
                self.text = Some(inserted);
                Ok(format!("Inserted `{}` at line {}", content.trim_end(), line))
            }

            FixDescriptor::UpdateJson { path, operations } => {
                let mut doc = match self.json.get(path) {
                    Some(doc) => doc.clone(),
                    None => {
                        if !path.is_file() {
                            return Err(TransformError::NotFound(path.display().to_string()));
                        }
                        serde_json::from_str(&std::fs::read_to_string(path)?)?
                    }
                };
                let mut changed = Vec::new();
                for op in operations {
                    match op {
                        JsonOperation::Set { pointer, value } => {
                            json_set(&mut doc, pointer, value.clone())?;
                            changed.push(format!("set {}", pointer));
                        }
                        JsonOperation::Remove { pointer } => {
                            json_remove(&mut doc, pointer)?;
                            changed.push(format!("removed {}", pointer));
                        }
                    }
                }
                self.json.insert(path.clone(), doc);
                Ok(format!("Updated {}: {}", file_name(path), changed.join(", ")))
            }

            FixDescriptor::CreateFile { path, content } => {
                if path.exists()
                    || self.claimed.contains(path)
                    || self.created.iter().any(|(p, _)| p == path)
                {
                    return Err(TransformError::AlreadyExists(path.clone()));
                }
                self.created.push((path.clone(), content.clone()));
                Ok(format!("Created {}", path.display()))
            }

            FixDescriptor::Complex { transform } => {
                let language = self
                    .language
                    .ok_or_else(|| TransformError::Unsupported(self.path.clone()))?;
                let transformed = complex::apply(self.current_text()?, language, transform)?;
                self.text = Some(transformed);
                Ok(format!("Applied {}", transform.name()))
            }

            FixDescriptor::Manual { description, steps } => {
                if steps.is_empty() {
                    Ok(format!("Manual: {}", description))
                } else {
                    Ok(format!("Manual: {} ({})", description, steps.join("; ")))
                }
            }
        }
    }

    fn current_text(&self) -> Result<&str, TransformError> {
        self.text
            .as_deref()
            .ok_or_else(|| TransformError::NotFound(self.path.display().to_string()))
    }

    /// Write everything out; returns whether any file was touched
    fn commit(&self, original: Option<&str>, keep_original: bool) -> Result<bool> {
        let text_changed = match (original, self.text.as_deref()) {
            (Some(before), Some(after)) => before != after,
            _ => false,
        };
        let mut written = false;

        if keep_original && (text_changed || self.target.is_some()) {
            if let Some(original) = original {
                let backup = backup_path(&self.path);
                std::fs::write(&backup, original)
                    .with_context(|| format!("Failed to write backup {}", backup.display()))?;
            }
        }

        let destination = match &self.target {
            Some(target) => {
                if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
                std::fs::rename(&self.path, target).with_context(|| {
                    format!(
                        "Failed to rename {} to {}",
                        self.path.display(),
                        target.display()
                    )
                })?;
                written = true;
                target.as_path()
            }
            None => self.path.as_path(),
        };

        if text_changed {
            if let Some(text) = &self.text {
                std::fs::write(destination, text)
                    .with_context(|| format!("Failed to write {}", destination.display()))?;
                written = true;
            }
        }

        for (path, doc) in &self.json {
            let mut json = serde_json::to_string_pretty(doc)
                .with_context(|| format!("Failed to serialize {}", path.display()))?;
            json.push('\n');
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            written = true;
        }

        for (path, content) in &self.created {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            written = true;
        }

        Ok(written)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `<path>.orig`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".orig");
    PathBuf::from(name)
}

/// Apply non-overlapping byte-range edits
pub(crate) fn splice(text: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    let mut out = text.to_string();
    edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
    for (range, replacement) in edits {
        out.replace_range(range, &replacement);
    }
    out
}

/// Insert `content` so that it starts at 1-indexed `line`; past the end appends
pub fn insert_line(text: &str, line: usize, content: &str) -> Result<String, TransformError> {
    if line == 0 {
        return Err(TransformError::NotFound("line 0".to_string()));
    }
    let mut content = content.to_string();
    if !content.ends_with('\n') {
        content.push('\n');
    }

    let offset = if line == 1 {
        Some(0)
    } else {
        text.match_indices('\n').nth(line - 2).map(|(i, _)| i + 1)
    };

    let mut out = text.to_string();
    match offset {
        Some(offset) => out.insert_str(offset, &content),
        None => {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&content);
        }
    }
    Ok(out)
}

// ── JSON pointer edits ──────────────────────────────────────────

fn pointer_tokens(pointer: &str) -> Result<Vec<String>, TransformError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(TransformError::InvalidPointer(pointer.to_string()));
    };
    Ok(rest
        .split('/')
        .map(|t| t.replace("~1", "/").replace("~0", "~"))
        .collect())
}

/// Set `value` at `pointer`, creating intermediate objects
pub fn json_set(doc: &mut Value, pointer: &str, value: Value) -> Result<(), TransformError> {
    let tokens = pointer_tokens(pointer)?;
    let Some((last, parents)) = tokens.split_last() else {
        *doc = value;
        return Ok(());
    };

    let mut current = doc;
    for token in parents {
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map
                .entry(token.clone())
                .or_insert_with(|| Value::Object(Map::new())),
            Value::Array(items) => token
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get_mut(i))
                .ok_or_else(|| TransformError::InvalidPointer(pointer.to_string()))?,
            _ => return Err(TransformError::InvalidPointer(pointer.to_string())),
        };
    }

    if current.is_null() {
        *current = Value::Object(Map::new());
    }
    match current {
        Value::Object(map) => {
            map.insert(last.clone(), value);
        }
        Value::Array(items) if last == "-" => items.push(value),
        Value::Array(items) => {
            let slot = last
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get_mut(i))
                .ok_or_else(|| TransformError::InvalidPointer(pointer.to_string()))?;
            *slot = value;
        }
        _ => return Err(TransformError::InvalidPointer(pointer.to_string())),
    }
    Ok(())
}

/// Remove the value at `pointer`; absent values are not an error
pub fn json_remove(doc: &mut Value, pointer: &str) -> Result<(), TransformError> {
    let tokens = pointer_tokens(pointer)?;
    let Some(last) = tokens.last() else {
        return Err(TransformError::InvalidPointer(pointer.to_string()));
    };
    let parent_pointer = &pointer[..pointer.rfind('/').unwrap_or(0)];
    match doc.pointer_mut(parent_pointer) {
        Some(Value::Object(map)) => {
            map.remove(last);
        }
        Some(Value::Array(items)) => {
            if let Some(i) = last.parse::<usize>().ok().filter(|i| *i < items.len()) {
                items.remove(i);
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_line_shifts_following_lines() {
        let out = insert_line("a\nb\n", 2, "x").unwrap();
        assert_eq!(out, "a\nx\nb\n");
        let out = insert_line("a\nb\n", 1, "'use client';\n").unwrap();
        assert_eq!(out, "'use client';\na\nb\n");
        let out = insert_line("a", 9, "z").unwrap();
        assert_eq!(out, "a\nz\n");
    }

    #[test]
    fn json_set_creates_intermediate_objects() {
        let mut doc = json!({"name": "app"});
        json_set(&mut doc, "/scripts/test", json!("vitest run")).unwrap();
        json_set(&mut doc, "/dependencies/@types~1react", json!("^19.0.0")).unwrap();
        assert_eq!(doc["scripts"]["test"], "vitest run");
        assert_eq!(doc["dependencies"]["@types/react"], "^19.0.0");

        json_remove(&mut doc, "/scripts/test").unwrap();
        json_remove(&mut doc, "/scripts/missing").unwrap();
        assert_eq!(doc["scripts"], json!({}));
    }

    #[test]
    fn pointer_must_start_with_slash() {
        let mut doc = json!({});
        assert!(matches!(
            json_set(&mut doc, "scripts", json!(1)),
            Err(TransformError::InvalidPointer(_))
        ));
    }
}
