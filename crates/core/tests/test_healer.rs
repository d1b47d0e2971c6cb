//! Tests for issue selection and healing runs

use stack_align_core::healer::{group_by_file, select_issues};
use stack_align_core::{
    heal, AlignConfig, AnalysisResults, EntityResult, FixDescriptor, Framework, HealOptions,
    Issue, ProjectContext, Severity, ValidationResult,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn insert_issue(path: &Path, code: &str, line: usize) -> Issue {
    Issue::new(Severity::Warning, Framework::Other, code, "insert", path, line).with_fix(
        FixDescriptor::InsertLine {
            line,
            content: format!("// {}", code),
        },
    )
}

const SOURCE: &str = "export const a = 1;\nexport const b = 2;\nexport const c = 3;\n";

/// Ten insert-line issues: four in a.ts, three each in b.ts and c.ts
fn ten_issues(dir: &TempDir) -> (AnalysisResults, [PathBuf; 3]) {
    let a = write_temp_file(dir, "a.ts", SOURCE);
    let b = write_temp_file(dir, "b.ts", SOURCE);
    let c = write_temp_file(dir, "c.ts", SOURCE);

    let mut issues = Vec::new();
    for n in 1..=4 {
        issues.push(insert_issue(&a, &format!("A{}", n), 1));
    }
    for n in 1..=3 {
        issues.push(insert_issue(&b, &format!("B{}", n), 1));
    }
    for n in 1..=3 {
        issues.push(insert_issue(&c, &format!("C{}", n), 1));
    }

    let results = AnalysisResults {
        project: ValidationResult::new(issues),
        ..AnalysisResults::default()
    };
    (results, [a, b, c])
}

fn context(dir: &TempDir) -> ProjectContext {
    ProjectContext::with_files(dir.path().to_path_buf(), AlignConfig::default(), Vec::new())
}

// ── Selection ───────────────────────────────────────────────────

#[test]
fn test_selection_filters_then_truncates() {
    let dir = TempDir::new().unwrap();
    let (mut results, [a, ..]) = ten_issues(&dir);
    results.components.push(EntityResult {
        name: "Card".to_string(),
        file_path: a.clone(),
        result: ValidationResult::new(vec![
            Issue {
                component: Some("Card".to_string()),
                ..insert_issue(&a, "CARD", 2)
            },
            Issue::new(Severity::Error, Framework::React, "NO_FIX", "m", &a, 1),
        ]),
    });

    let (all, remaining) = select_issues(&results, &HealOptions::default());
    assert_eq!(all.len(), 11);
    assert_eq!(remaining, 0);

    let options = HealOptions {
        component: Some("Card".to_string()),
        ..HealOptions::default()
    };
    let (card, _) = select_issues(&results, &options);
    assert_eq!(card.len(), 1);
    assert_eq!(card[0].rule_code, "CARD");

    let options = HealOptions {
        framework: Some(Framework::React),
        ..HealOptions::default()
    };
    let (react, _) = select_issues(&results, &options);
    assert!(react.is_empty());

    let options = HealOptions {
        max_fix: Some(3),
        ..HealOptions::default()
    };
    let (capped, remaining) = select_issues(&results, &options);
    let codes: Vec<&str> = capped.iter().map(|i| i.rule_code.as_str()).collect();
    assert_eq!(codes, vec!["A1", "A2", "A3"]);
    assert_eq!(remaining, 8);
}

#[test]
fn test_grouping_keeps_first_appearance_order() {
    let issues = [
        insert_issue(Path::new("/p/b.ts"), "B1", 1),
        insert_issue(Path::new("/p/a.ts"), "A1", 1),
        insert_issue(Path::new("/p/b.ts"), "B2", 1),
    ];
    let refs: Vec<&Issue> = issues.iter().collect();
    let groups = group_by_file(&refs);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].0, PathBuf::from("/p/b.ts"));
    assert_eq!(groups[0].1.len(), 2);
    assert_eq!(groups[1].0, PathBuf::from("/p/a.ts"));
}

// ── Healing ─────────────────────────────────────────────────────

#[test]
fn test_max_fix_touches_only_selected_prefix() {
    let dir = TempDir::new().unwrap();
    let (results, [a, b, c]) = ten_issues(&dir);
    let options = HealOptions {
        max_fix: Some(4),
        ..HealOptions::default()
    };

    let report = heal(&context(&dir), &results, &options).unwrap();
    assert_eq!(report.total_eligible, 10);
    assert_eq!(report.fixed, 4);
    assert_eq!(report.failed, 0);
    assert!(report.limit_applied);
    assert_eq!(report.remaining, 6);
    assert_eq!(report.files_touched, vec![a.clone()]);

    let healed = std::fs::read_to_string(&a).unwrap();
    assert!(healed.starts_with("// A4\n// A3\n// A2\n// A1\n"));
    assert_eq!(std::fs::read_to_string(&b).unwrap(), SOURCE);
    assert_eq!(std::fs::read_to_string(&c).unwrap(), SOURCE);
}

#[test]
fn test_capped_runs_are_reproducible() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let options = HealOptions {
        max_fix: Some(5),
        ..HealOptions::default()
    };

    let (results, _) = ten_issues(&first);
    let one = heal(&context(&first), &results, &options).unwrap();
    let (results, _) = ten_issues(&second);
    let two = heal(&context(&second), &results, &options).unwrap();

    let codes = |r: &stack_align_core::HealingReport| -> Vec<String> {
        r.operations.iter().map(|op| op.rule_code.clone()).collect()
    };
    assert_eq!(codes(&one), codes(&two));
    assert_eq!(codes(&one), vec!["A1", "A2", "A3", "A4", "B1"]);
}

#[test]
fn test_dry_run_matches_real_run_without_writing() {
    let dry_dir = TempDir::new().unwrap();
    let real_dir = TempDir::new().unwrap();

    let (results, [a, ..]) = ten_issues(&dry_dir);
    let dry = heal(
        &context(&dry_dir),
        &results,
        &HealOptions {
            dry_run: true,
            ..HealOptions::default()
        },
    )
    .unwrap();
    assert!(dry.dry_run);
    assert!(dry.files_touched.is_empty());
    assert_eq!(std::fs::read_to_string(&a).unwrap(), SOURCE);

    let (results, _) = ten_issues(&real_dir);
    let real = heal(&context(&real_dir), &results, &HealOptions::default()).unwrap();

    let shape = |r: &stack_align_core::HealingReport, root: &Path| -> Vec<(String, PathBuf, bool)> {
        r.operations
            .iter()
            .map(|op| {
                let rel = op.path.strip_prefix(root).unwrap().to_path_buf();
                (op.kind.clone(), rel, op.success)
            })
            .collect()
    };
    assert_eq!(shape(&dry, dry_dir.path()), shape(&real, real_dir.path()));
    assert_eq!(dry.fixed, real.fixed);
    assert_eq!(real.files_touched.len(), 3);
}

#[test]
fn test_manual_fixes_are_listed_but_not_counted() {
    let dir = TempDir::new().unwrap();
    let path = write_temp_file(&dir, "a.ts", SOURCE);
    let results = AnalysisResults {
        project: ValidationResult::new(vec![Issue::new(
            Severity::Warning,
            Framework::Typescript,
            "TS_EXPLICIT_ANY",
            "any",
            &path,
            1,
        )
        .with_fix(FixDescriptor::manual("Use a precise type", &[]))]),
        ..AnalysisResults::default()
    };

    let report = heal(&context(&dir), &results, &HealOptions::default()).unwrap();
    assert_eq!(report.fixed, 0);
    assert_eq!(report.failed, 0);
    assert_eq!(report.manual().count(), 1);
    assert_eq!(report.applied().count(), 0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), SOURCE);
}

#[test]
fn test_colliding_renames_fail_the_same_way_in_dry_run() {
    let run = |dry_run: bool| {
        let dir = TempDir::new().unwrap();
        let first = write_temp_file(&dir, "FooBar.tsx", "export const a = 1;\n");
        let second = write_temp_file(&dir, "foo_bar.tsx", "export const b = 2;\n");
        let target = dir.path().join("foo-bar.tsx");
        let rename = |path: &Path| {
            Issue::new(Severity::Warning, Framework::Other, "ARCH_FILE_NAMING", "kebab", path, 0)
                .with_fix(FixDescriptor::RenameFile {
                    old_path: path.to_path_buf(),
                    new_path: target.clone(),
                })
        };
        let results = AnalysisResults {
            project: ValidationResult::new(vec![rename(&first), rename(&second)]),
            ..AnalysisResults::default()
        };
        let options = HealOptions {
            dry_run,
            ..HealOptions::default()
        };
        let report = heal(&context(&dir), &results, &options).unwrap();
        let outcomes: Vec<bool> = report.operations.iter().map(|op| op.success).collect();
        assert!(second.exists());
        (report.fixed, report.failed, outcomes)
    };

    let dry = run(true);
    assert_eq!(dry, (1, 1, vec![true, false]));
    assert_eq!(dry, run(false));
}
