//! Analysis report: hierarchical results, summary, score and persistence

use crate::classifier::Role;
use crate::issue::{Framework, Issue, Severity, ValidationResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Number of issues listed in [`Summary::top_issues`]
pub const TOP_ISSUES: usize = 10;

/// Results for one component, page, hook or utility file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityResult {
    pub name: String,
    pub file_path: PathBuf,
    pub result: ValidationResult,
}

/// Results tree mirroring the analysis phases
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResults {
    /// Architecture-level issues
    pub project: ValidationResult,
    /// Framework checks keyed by detector name
    pub frameworks: BTreeMap<String, ValidationResult>,
    pub components: Vec<EntityResult>,
    pub pages: Vec<EntityResult>,
    pub hooks: Vec<EntityResult>,
    pub utilities: Vec<EntityResult>,
}

impl AnalysisResults {
    /// Every issue in phase order: project, frameworks, components, pages,
    /// hooks, utilities
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        let entities = self
            .components
            .iter()
            .chain(&self.pages)
            .chain(&self.hooks)
            .chain(&self.utilities)
            .flat_map(|e| &e.result.issues);
        self.project
            .issues
            .iter()
            .chain(self.frameworks.values().flat_map(|r| &r.issues))
            .chain(entities)
    }

    pub fn entities(&self, role: Role) -> &[EntityResult] {
        match role {
            Role::Component => &self.components,
            Role::Page => &self.pages,
            Role::Hook => &self.hooks,
            Role::Utility => &self.utilities,
            Role::Unknown => &[],
        }
    }

    pub fn entities_mut(&mut self, role: Role) -> Option<&mut Vec<EntityResult>> {
        match role {
            Role::Component => Some(&mut self.components),
            Role::Page => Some(&mut self.pages),
            Role::Hook => Some(&mut self.hooks),
            Role::Utility => Some(&mut self.utilities),
            Role::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_issues: usize,
    pub errors: usize,
    pub warnings: usize,
    pub suggestions: usize,
    pub by_framework: BTreeMap<Framework, usize>,
    /// Counts keyed by `project`, `component`, `page`, `hook`, `utility`
    pub by_file_type: BTreeMap<String, usize>,
    /// 0–100 health score
    pub score: f64,
    pub top_issues: Vec<Issue>,
    pub files_analyzed: usize,
    /// Files that could not be parsed
    pub files_skipped: usize,
    /// Detector calls that failed and contributed no issues
    pub detector_failures: usize,
}

impl Summary {
    pub fn from_results(
        results: &AnalysisResults,
        files_analyzed: usize,
        files_skipped: usize,
        detector_failures: usize,
    ) -> Self {
        let mut errors = 0;
        let mut warnings = 0;
        let mut suggestions = 0;
        let mut by_framework: BTreeMap<Framework, usize> = BTreeMap::new();

        for issue in results.issues() {
            match issue.severity {
                Severity::Error => errors += 1,
                Severity::Warning => warnings += 1,
                Severity::Suggestion => suggestions += 1,
            }
            *by_framework.entry(issue.framework).or_default() += 1;
        }

        let mut by_file_type = BTreeMap::new();
        let project_count = results.project.issues.len()
            + results.frameworks.values().map(|r| r.issues.len()).sum::<usize>();
        by_file_type.insert("project".to_string(), project_count);
        for role in [Role::Component, Role::Page, Role::Hook, Role::Utility] {
            let count = results
                .entities(role)
                .iter()
                .map(|e| e.result.issues.len())
                .sum();
            by_file_type.insert(role.to_string(), count);
        }

        Self {
            total_issues: errors + warnings + suggestions,
            errors,
            warnings,
            suggestions,
            by_framework,
            by_file_type,
            score: score(errors, warnings, suggestions),
            top_issues: top_issues(results, TOP_ISSUES),
            files_analyzed,
            files_skipped,
            detector_failures,
        }
    }
}

/// `100 − 5·errors − 2·warnings − 0.5·suggestions`, clamped to `[0, 100]`
pub fn score(errors: usize, warnings: usize, suggestions: usize) -> f64 {
    let raw = 100.0 - 5.0 * errors as f64 - 2.0 * warnings as f64 - 0.5 * suggestions as f64;
    raw.clamp(0.0, 100.0)
}

/// Most severe issues; architecture first within a severity, emission order otherwise
pub fn top_issues(results: &AnalysisResults, limit: usize) -> Vec<Issue> {
    let mut issues: Vec<Issue> = results.issues().cloned().collect();
    issues.sort_by_key(|i| (i.severity.rank(), i.framework != Framework::Architecture));
    issues.truncate(limit);
    issues
}

/// Root aggregate of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub project_name: String,
    pub root: PathBuf,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    pub version: String,
    pub results: AnalysisResults,
    pub summary: Summary,
}

impl AnalysisReport {
    /// Write the report as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Read a report written by [`AnalysisReport::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read report {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Malformed report {}", path.display()))
    }
}
