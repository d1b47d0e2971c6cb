//! Tests for architecture and Vitest coverage detectors

use stack_align_core::detectors::architecture::{
    DirectoryDepthDetector, ExportStyleDetector, FileNamingDetector,
};
use stack_align_core::detectors::testing::{MissingTestDetector, TestScriptDetector};
use stack_align_core::detectors::{Detector, ProjectDetector};
use stack_align_core::source::SourceUnit;
use stack_align_core::{AlignConfig, ComplexTransform, FixDescriptor, ProjectContext};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn context() -> ProjectContext {
    ProjectContext::with_files(PathBuf::from("/project"), AlignConfig::default(), Vec::new())
}

fn unit(path: &Path, source: &str) -> SourceUnit {
    SourceUnit::parse(path, source.to_string()).unwrap()
}

fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

// ── File naming ─────────────────────────────────────────────────

#[test]
fn test_pascal_case_file_is_renamed_to_kebab_case() {
    let path = Path::new("/project/src/components/ScoreCard.tsx");
    let u = unit(path, "export function ScoreCard() {\n  return <div />;\n}\n");
    let issues = FileNamingDetector.detect(&u, &context()).unwrap().issues;
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].rule_code, "ARCH_FILE_NAMING");
    assert_eq!(
        issues[0].fix,
        Some(FixDescriptor::RenameFile {
            old_path: path.to_path_buf(),
            new_path: PathBuf::from("/project/src/components/score-card.tsx"),
        })
    );
}

#[test]
fn test_kebab_case_and_index_files_are_clean() {
    for name in ["/project/src/score-card.tsx", "/project/src/index.tsx"] {
        let u = unit(Path::new(name), "export function ScoreCard() {\n  return <div />;\n}\n");
        assert!(FileNamingDetector.detect(&u, &context()).unwrap().issues.is_empty());
    }
}

#[test]
fn test_pages_keep_framework_file_names() {
    assert!(!FileNamingDetector.applies_to(stack_align_core::Role::Page));
}

// ── Export style ────────────────────────────────────────────────

#[test]
fn test_default_export_of_named_function_is_convertible() {
    let u = unit(
        Path::new("/project/src/score-card.tsx"),
        "function ScoreCard() {\n  return <div />;\n}\nexport default ScoreCard;\n",
    );
    let issues = ExportStyleDetector.detect(&u, &context()).unwrap().issues;
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].rule_code, "ARCH_PREFER_NAMED_EXPORT");
    assert_eq!(issues[0].line, 4);
    assert_eq!(
        issues[0].fix,
        Some(FixDescriptor::Complex {
            transform: ComplexTransform::ConvertDefaultExport
        })
    );
}

#[test]
fn test_anonymous_default_export_needs_manual_fix() {
    let u = unit(
        Path::new("/project/src/score-card.tsx"),
        "export default () => <div />;\n",
    );
    let issues = ExportStyleDetector.detect(&u, &context()).unwrap().issues;
    assert_eq!(issues.len(), 1);
    assert!(matches!(issues[0].fix, Some(FixDescriptor::Manual { .. })));
}

// ── Directory depth ─────────────────────────────────────────────

#[test]
fn test_deeply_nested_files() {
    let mut config = AlignConfig::default();
    config.architecture.max_directory_depth = 2;
    let root = PathBuf::from("/project");
    let files = vec![
        root.join("src/ui/button.tsx"),
        root.join("src/features/games/cards/score-card.tsx"),
    ];
    let ctx = ProjectContext::with_files(root, config, files);

    let issues = DirectoryDepthDetector.detect(&ctx).unwrap().issues;
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].rule_code, "ARCH_DIRECTORY_DEPTH");
    assert!(issues[0].message.contains("4 directories deep"));
}

// ── Vitest ──────────────────────────────────────────────────────

#[test]
fn test_component_without_test_gets_create_file_fix() {
    let dir = TempDir::new().unwrap();
    let path = write_temp_file(
        &dir,
        "src/score-card.tsx",
        "export function ScoreCard({ title }) {\n  return <h2>{title}</h2>;\n}\n",
    );
    let ctx = ProjectContext::with_files(dir.path().to_path_buf(), AlignConfig::default(), vec![]);
    let u = SourceUnit::load(&path).unwrap();

    let issues = MissingTestDetector.detect(&u, &ctx).unwrap().issues;
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].rule_code, "VITEST_MISSING_TEST");
    match &issues[0].fix {
        Some(FixDescriptor::CreateFile { path, content }) => {
            assert!(path.ends_with("src/score-card.test.tsx"));
            assert!(content.contains("ScoreCard"));
        }
        other => panic!("unexpected fix {:?}", other),
    }
}

#[test]
fn test_existing_sibling_test_satisfies_rule() {
    let dir = TempDir::new().unwrap();
    let path = write_temp_file(
        &dir,
        "src/score-card.tsx",
        "export function ScoreCard() {\n  return <div />;\n}\n",
    );
    write_temp_file(&dir, "src/__tests__/score-card.test.tsx", "test('x', () => {});\n");
    let ctx = ProjectContext::with_files(dir.path().to_path_buf(), AlignConfig::default(), vec![]);
    let u = SourceUnit::load(&path).unwrap();

    assert!(MissingTestDetector.detect(&u, &ctx).unwrap().issues.is_empty());
}

#[test]
fn test_missing_test_script_and_missing_vitest() {
    let dir = TempDir::new().unwrap();
    write_temp_file(
        &dir,
        "package.json",
        r#"{"devDependencies": {"vitest": "^2.1.0"}, "scripts": {"build": "next build"}}"#,
    );
    let ctx = ProjectContext::with_files(dir.path().to_path_buf(), AlignConfig::default(), vec![]);
    let issues = TestScriptDetector.detect(&ctx).unwrap().issues;
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].rule_code, "VITEST_MISSING_TEST_SCRIPT");

    let other = TempDir::new().unwrap();
    write_temp_file(&other, "package.json", r#"{"dependencies": {"react": "^19.0.0"}}"#);
    let ctx = ProjectContext::with_files(other.path().to_path_buf(), AlignConfig::default(), vec![]);
    let issues = TestScriptDetector.detect(&ctx).unwrap().issues;
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].rule_code, "VITEST_NOT_INSTALLED");
}
