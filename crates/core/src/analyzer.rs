//! Top-down analysis orchestrator
//!
//! Phases run in a fixed order:
//!
//! ```text
//! ProjectScan → ArchitectureValidation → FrameworkValidation
//!   → ComponentAnalysis → PageAnalysis → HookAnalysis → UtilityAnalysis
//!   → SummaryGeneration
//! ```
//!
//! No phase reads another phase's output; everything meets in the final
//! [`AnalysisReport`]. Detector failures and unparseable files are logged,
//! counted in the summary and otherwise ignored.

use crate::classifier::{self, Role};
use crate::config::RuleSetting;
use crate::context::ProjectContext;
use crate::detectors::{Detector, DetectorError, DetectorRegistry, ProjectDetector};
use crate::issue::{sort_for_display, Framework, Issue, Severity, ValidationResult};
use crate::report::{AnalysisReport, AnalysisResults, EntityResult, Summary};
use crate::source::SourceUnit;
use rayon::prelude::*;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    ProjectScan,
    ArchitectureValidation,
    FrameworkValidation,
    ComponentAnalysis,
    PageAnalysis,
    HookAnalysis,
    UtilityAnalysis,
    SummaryGeneration,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::ProjectScan => "Scanning project",
            Phase::ArchitectureValidation => "Validating architecture",
            Phase::FrameworkValidation => "Validating frameworks",
            Phase::ComponentAnalysis => "Analyzing components",
            Phase::PageAnalysis => "Analyzing pages",
            Phase::HookAnalysis => "Analyzing hooks",
            Phase::UtilityAnalysis => "Analyzing utilities",
            Phase::SummaryGeneration => "Summarizing",
        }
    }
}

const ENTITY_PHASES: [(Phase, Role); 4] = [
    (Phase::ComponentAnalysis, Role::Component),
    (Phase::PageAnalysis, Role::Page),
    (Phase::HookAnalysis, Role::Hook),
    (Phase::UtilityAnalysis, Role::Utility),
];

pub struct Analyzer {
    registry: DetectorRegistry,
    focus: Option<Framework>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::with_registry(DetectorRegistry::new())
    }

    pub fn with_registry(registry: DetectorRegistry) -> Self {
        Self {
            registry,
            focus: None,
        }
    }

    /// Keep only issues of one framework
    pub fn focus(mut self, framework: Option<Framework>) -> Self {
        self.focus = framework;
        self
    }

    pub fn analyze(&self, ctx: &ProjectContext) -> AnalysisReport {
        self.analyze_with_progress(ctx, |_| {})
    }

    /// Run every phase, calling `on_phase` as each one starts
    pub fn analyze_with_progress(
        &self,
        ctx: &ProjectContext,
        mut on_phase: impl FnMut(Phase),
    ) -> AnalysisReport {
        let mut results = AnalysisResults::default();
        let mut failures = 0usize;

        on_phase(Phase::ProjectScan);
        let (units, files_skipped) = load_units(ctx);
        tracing::debug!(files = units.len(), skipped = files_skipped, "project scanned");

        on_phase(Phase::ArchitectureValidation);
        let mut project_issues = Vec::new();
        for detector in self.registry.architecture_detectors() {
            if !detector.is_enabled(ctx) {
                continue;
            }
            match detector.detect(ctx) {
                Ok(result) => project_issues.extend(result.issues),
                Err(e) => failures += record_failure(detector.name(), None, &e),
            }
        }
        results.project = ValidationResult::new(self.finalize(project_issues, ctx, None));

        on_phase(Phase::FrameworkValidation);
        let enabled: Vec<&dyn ProjectDetector> = self
            .registry
            .framework_detectors()
            .iter()
            .map(|d| &**d)
            .filter(|d| d.is_enabled(ctx))
            .collect();
        let outcomes: Vec<(String, Result<ValidationResult, DetectorError>)> = enabled
            .par_iter()
            .map(|detector| (detector.name().to_string(), detector.detect(ctx)))
            .collect();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    let issues = self.finalize(result.issues, ctx, None);
                    results.frameworks.insert(name, ValidationResult::new(issues));
                }
                Err(e) => failures += record_failure(&name, None, &e),
            }
        }

        for (phase, role) in ENTITY_PHASES {
            on_phase(phase);
            let mut entities = Vec::new();
            for unit in units.iter().filter(|u| u.role() == role) {
                let mut issues = Vec::new();
                for detector in self.registry.detectors_for(unit, ctx) {
                    match run_detector(detector, unit, ctx) {
                        Ok(result) => issues.extend(result.issues),
                        Err(e) => failures += record_failure(detector.name(), Some(unit), &e),
                    }
                }

                let name = unit
                    .meta()
                    .primary_name
                    .clone()
                    .unwrap_or_else(|| unit.stem().to_string());
                let mut issues = self.finalize(issues, ctx, Some((role, &name)));
                sort_for_display(&mut issues);
                entities.push(EntityResult {
                    name,
                    file_path: unit.path().to_path_buf(),
                    result: ValidationResult::new(issues),
                });
            }
            if let Some(slot) = results.entities_mut(role) {
                *slot = entities;
            }
        }

        on_phase(Phase::SummaryGeneration);
        let summary = Summary::from_results(&results, units.len(), files_skipped, failures);
        tracing::info!(
            errors = summary.errors,
            warnings = summary.warnings,
            suggestions = summary.suggestions,
            score = summary.score,
            "analysis complete"
        );

        AnalysisReport {
            project_name: ctx.name.clone(),
            root: ctx.root.clone(),
            timestamp: now_millis(),
            version: crate::VERSION.to_string(),
            results,
            summary,
        }
    }

    /// Apply focus, rule overrides, strict mode and entity tags
    fn finalize(
        &self,
        issues: Vec<Issue>,
        ctx: &ProjectContext,
        tag: Option<(Role, &str)>,
    ) -> Vec<Issue> {
        issues
            .into_iter()
            .filter(|issue| self.focus.is_none_or(|f| issue.framework == f))
            .filter_map(|mut issue| {
                match ctx.config.rule_setting(&issue.rule_code) {
                    Some(RuleSetting::Off) => return None,
                    Some(RuleSetting::Severity(severity)) => issue.severity = severity,
                    None if ctx.config.strict && issue.severity == Severity::Warning => {
                        issue.severity = Severity::Error;
                    }
                    None => {}
                }
                if let Some((role, name)) = tag {
                    let name = Some(name.to_string());
                    match role {
                        Role::Component => issue.component = name,
                        Role::Page => issue.page = name,
                        Role::Hook => issue.hook = name,
                        Role::Utility => issue.utility = name,
                        Role::Unknown => {}
                    }
                }
                Some(issue)
            })
            .collect()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse every non-test file; returns the units and the number skipped
fn load_units(ctx: &ProjectContext) -> (Vec<SourceUnit>, usize) {
    let mut units = Vec::new();
    let mut skipped = 0;
    for file in &ctx.files {
        if classifier::is_test_file(file) {
            continue;
        }
        match SourceUnit::load(file) {
            Ok(unit) => units.push(unit),
            Err(e) => {
                tracing::warn!(path = %file.display(), error = %e, "skipping unparseable file");
                skipped += 1;
            }
        }
    }
    (units, skipped)
}

fn run_detector(
    detector: &dyn Detector,
    unit: &SourceUnit,
    ctx: &ProjectContext,
) -> Result<ValidationResult, DetectorError> {
    tracing::trace!(detector = detector.name(), path = %unit.path().display(), "detect");
    detector.detect(unit, ctx)
}

fn record_failure(detector: &str, unit: Option<&SourceUnit>, error: &DetectorError) -> usize {
    match unit {
        Some(unit) => tracing::warn!(
            detector,
            path = %unit.path().display(),
            error = %error,
            "detector failed, no issues recorded"
        ),
        None => tracing::warn!(detector, error = %error, "detector failed, no issues recorded"),
    }
    1
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
