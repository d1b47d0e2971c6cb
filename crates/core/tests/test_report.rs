//! Tests for summaries, scoring and report persistence

use stack_align_core::report::{score, top_issues, TOP_ISSUES};
use stack_align_core::{
    AnalysisReport, AnalysisResults, EntityResult, Framework, Issue, Severity, Summary,
    ValidationResult,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tempfile::TempDir;

fn issue(severity: Severity, framework: Framework, code: &str) -> Issue {
    Issue::new(severity, framework, code, "message", "/p/src/card.tsx", 1)
}

fn sample_results() -> AnalysisResults {
    let mut frameworks = BTreeMap::new();
    frameworks.insert(
        "React version".to_string(),
        ValidationResult::new(vec![issue(
            Severity::Warning,
            Framework::React,
            "REACT19_OUTDATED_VERSION",
        )]),
    );
    AnalysisResults {
        project: ValidationResult::new(vec![issue(
            Severity::Warning,
            Framework::Architecture,
            "ARCH_DIRECTORY_DEPTH",
        )]),
        frameworks,
        components: vec![EntityResult {
            name: "Card".to_string(),
            file_path: PathBuf::from("/p/src/card.tsx"),
            result: ValidationResult::new(vec![
                issue(Severity::Error, Framework::Nextjs, "NEXTJS15_MISSING_CLIENT_DIRECTIVE"),
                issue(Severity::Suggestion, Framework::Tailwind, "TAILWIND_INLINE_STYLE"),
            ]),
        }],
        ..AnalysisResults::default()
    }
}

// ── Score ───────────────────────────────────────────────────────

#[test]
fn test_score_is_clamped() {
    assert_eq!(score(0, 0, 0), 100.0);
    assert_eq!(score(25, 0, 0), 0.0);
    assert_eq!(score(100, 100, 100), 0.0);
}

#[test]
fn test_score_never_rises_with_more_issues() {
    for e in 0..6 {
        for w in 0..6 {
            for s in 0..6 {
                let base = score(e, w, s);
                assert!(score(e + 1, w, s) <= base);
                assert!(score(e, w + 1, s) <= base);
                assert!(score(e, w, s + 1) <= base);
            }
        }
    }
}

// ── Summary ─────────────────────────────────────────────────────

#[test]
fn test_summary_counts() {
    let results = sample_results();
    let summary = Summary::from_results(&results, 3, 1, 0);

    assert_eq!(summary.total_issues, 4);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.warnings, 2);
    assert_eq!(summary.suggestions, 1);
    assert_eq!(summary.by_framework[&Framework::React], 1);
    assert_eq!(summary.by_file_type["project"], 2);
    assert_eq!(summary.by_file_type["component"], 2);
    assert_eq!(summary.by_file_type["hook"], 0);
    assert_eq!(summary.score, 100.0 - 5.0 - 4.0 - 0.5);
    assert_eq!(summary.files_skipped, 1);
}

#[test]
fn test_top_issues_by_severity_with_architecture_first() {
    let results = sample_results();
    let top = top_issues(&results, TOP_ISSUES);
    let codes: Vec<&str> = top.iter().map(|i| i.rule_code.as_str()).collect();
    assert_eq!(
        codes,
        vec![
            "NEXTJS15_MISSING_CLIENT_DIRECTIVE",
            "ARCH_DIRECTORY_DEPTH",
            "REACT19_OUTDATED_VERSION",
            "TAILWIND_INLINE_STYLE",
        ]
    );
    assert_eq!(top_issues(&results, 2).len(), 2);
}

// ── Persistence ─────────────────────────────────────────────────

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let results = sample_results();
    let summary = Summary::from_results(&results, 3, 0, 0);
    let report = AnalysisReport {
        project_name: "fixture".to_string(),
        root: PathBuf::from("/p"),
        timestamp: 1_700_000_000_000,
        version: stack_align_core::VERSION.to_string(),
        results,
        summary,
    };

    let path = dir.path().join("reports").join("stack-align-report.json");
    report.save(&path).unwrap();
    let json = std::fs::read_to_string(&path).unwrap();
    assert!(json.contains("\"projectName\""));
    assert!(json.contains("\"ruleCode\""));

    let loaded = AnalysisReport::load(&path).unwrap();
    assert_eq!(loaded, report);
}

#[test]
fn test_load_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.json");
    std::fs::write(&path, "not json").unwrap();
    assert!(AnalysisReport::load(&path).is_err());
}
