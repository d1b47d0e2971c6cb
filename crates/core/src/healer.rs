//! Healing engine: selects fixable issues and hands them to the transformer
//!
//! Selection flattens the report in phase order, filters, drops fix-less
//! issues, truncates to `max_fix`, then groups by file. Truncation happens
//! before grouping, so a capped run can leave a file partially healed.

use crate::context::ProjectContext;
use crate::issue::{Framework, Issue};
use crate::report::AnalysisResults;
use crate::testgen::{self, TestGenOptions, TestGenReport};
use crate::transform::{self, ApplyOptions, HealingOperation};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct HealOptions {
    pub dry_run: bool,
    /// Cap on the number of issues attempted
    pub max_fix: Option<usize>,
    /// Only heal issues of this framework
    pub framework: Option<Framework>,
    /// Only heal issues tagged with this component name
    pub component: Option<String>,
    /// Generate missing tests after fixing
    pub generate_tests: bool,
    pub keep_original: bool,
}

impl HealOptions {
    /// Defaults taken from the `[healing]` config section
    pub fn from_config(ctx: &ProjectContext) -> Self {
        Self {
            max_fix: ctx.config.healing.max_fixes,
            generate_tests: ctx.config.healing.generate_missing_tests,
            keep_original: ctx.config.healing.keep_original_files,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealingReport {
    /// Issues with a fix that passed the filters
    pub total_eligible: usize,
    /// Automatic operations applied (manual steps are not counted)
    pub fixed: usize,
    pub failed: usize,
    pub limit_applied: bool,
    /// Eligible issues left out by the cap
    pub remaining: usize,
    pub files_touched: Vec<PathBuf>,
    pub operations: Vec<HealingOperation>,
    /// Problems found in rolled-back files
    pub validation_issues: Vec<Issue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tests: Option<TestGenReport>,
    pub dry_run: bool,
}

impl HealingReport {
    /// Automatic operations that succeeded
    pub fn applied(&self) -> impl Iterator<Item = &HealingOperation> {
        self.operations
            .iter()
            .filter(|op| op.success && op.kind != "manual")
    }

    pub fn manual(&self) -> impl Iterator<Item = &HealingOperation> {
        self.operations.iter().filter(|op| op.kind == "manual")
    }
}

/// Issues `heal` would attempt, in order, plus the count cut by `max_fix`
pub fn select_issues<'r>(
    results: &'r AnalysisResults,
    options: &HealOptions,
) -> (Vec<&'r Issue>, usize) {
    let mut eligible: Vec<&Issue> = results
        .issues()
        .filter(|issue| options.framework.is_none_or(|f| issue.framework == f))
        .filter(|issue| {
            options
                .component
                .as_deref()
                .is_none_or(|c| issue.component.as_deref() == Some(c))
        })
        .filter(|issue| issue.fix.is_some())
        .collect();

    let remaining = match options.max_fix {
        Some(max) if eligible.len() > max => {
            let cut = eligible.len() - max;
            eligible.truncate(max);
            cut
        }
        _ => 0,
    };
    (eligible, remaining)
}

/// Group issues by file, keeping the order in which files first appear
pub fn group_by_file<'r>(issues: &[&'r Issue]) -> Vec<(PathBuf, Vec<&'r Issue>)> {
    let mut groups: Vec<(PathBuf, Vec<&Issue>)> = Vec::new();
    for &issue in issues {
        match groups.iter_mut().find(|(path, _)| *path == issue.file_path) {
            Some((_, batch)) => batch.push(issue),
            None => groups.push((issue.file_path.clone(), vec![issue])),
        }
    }
    groups
}

pub fn heal(
    ctx: &ProjectContext,
    results: &AnalysisResults,
    options: &HealOptions,
) -> Result<HealingReport> {
    let (selected, remaining) = select_issues(results, options);
    let mut report = HealingReport {
        total_eligible: selected.len() + remaining,
        limit_applied: remaining > 0,
        remaining,
        dry_run: options.dry_run,
        ..HealingReport::default()
    };

    let apply = ApplyOptions {
        dry_run: options.dry_run,
        keep_original: options.keep_original,
    };

    // Rename and create targets already taken by earlier files
    let mut claimed = BTreeSet::new();
    for (path, batch) in group_by_file(&selected) {
        tracing::debug!(path = %path.display(), fixes = batch.len(), "healing file");
        let outcome = transform::apply_fixes_with_claims(&path, &batch, &apply, &mut claimed)?;

        for op in outcome.operations.iter().filter(|op| op.kind != "manual") {
            if op.success {
                report.fixed += 1;
            } else {
                report.failed += 1;
            }
        }
        if outcome.written {
            report.files_touched.push(outcome.final_path.clone());
        }
        report.operations.extend(outcome.operations);
        report.validation_issues.extend(outcome.validation_issues);
    }

    if options.generate_tests {
        // Files may have moved; rediscover before generating
        let refreshed;
        let ctx = if options.dry_run {
            ctx
        } else {
            refreshed = ProjectContext::load(&ctx.root, ctx.config.clone())?;
            &refreshed
        };
        let test_options = TestGenOptions {
            component: options.component.clone(),
            dry_run: options.dry_run,
            ..TestGenOptions::from_config(&ctx.config)
        };
        report.tests = Some(testgen::generate_tests(ctx, &test_options)?);
    }

    tracing::info!(
        fixed = report.fixed,
        failed = report.failed,
        remaining = report.remaining,
        dry_run = options.dry_run,
        "healing complete"
    );
    Ok(report)
}
