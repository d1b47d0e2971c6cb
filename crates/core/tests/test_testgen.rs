//! Tests for Vitest skeleton generation

use stack_align_core::source::SourceUnit;
use stack_align_core::testgen::{generate_test, test_path_for, TestGenOptions};
use stack_align_core::{generate_tests, AlignConfig, ProjectContext, Role};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
}

fn options() -> TestGenOptions {
    TestGenOptions::from_config(&AlignConfig::default())
}

// ── Templates ───────────────────────────────────────────────────

#[test]
fn test_paths_follow_role_and_language() {
    assert_eq!(
        test_path_for(Path::new("/p/score-card.tsx"), Role::Component),
        PathBuf::from("/p/score-card.test.tsx")
    );
    assert_eq!(
        test_path_for(Path::new("/p/use-toggle.ts"), Role::Hook),
        PathBuf::from("/p/use-toggle.test.ts")
    );
    assert_eq!(
        test_path_for(Path::new("/p/button.jsx"), Role::Component),
        PathBuf::from("/p/button.test.jsx")
    );
}

#[test]
fn test_component_skeleton_covers_props() {
    let unit = SourceUnit::parse(
        Path::new("/p/score-card.tsx"),
        "export function ScoreCard({ title, items, onSelect }: { title: string; items: string[]; onSelect: () => void }) {\n  return <ul onClick={onSelect}>{title}{items.length}</ul>;\n}\n".to_string(),
    )
    .unwrap();
    let test = generate_test(&unit, &options()).unwrap();

    assert_eq!(test.path, PathBuf::from("/p/score-card.test.tsx"));
    let content = &test.content;
    assert!(content.contains("import { ScoreCard } from './score-card';"));
    assert!(content.contains("title: 'test-title',"));
    assert!(content.contains("onSelect: vi.fn(),"));
    assert!(content.contains("renders with an empty `items` list"));
    assert!(content.contains("does not call `onSelect` on first render"));
    assert!(!content.contains("jest-axe"));
}

#[test]
fn test_a11y_check_is_opt_in() {
    let unit = SourceUnit::parse(
        Path::new("/p/badge.tsx"),
        "export default function Badge() {\n  return <span>new</span>;\n}\n".to_string(),
    )
    .unwrap();
    let test = generate_test(
        &unit,
        &TestGenOptions {
            include_a11y: true,
            ..options()
        },
    )
    .unwrap();
    assert!(test.content.contains("import Badge from './badge';"));
    assert!(test.content.contains("toHaveNoViolations"));
}

#[test]
fn test_hook_skeleton_uses_render_hook() {
    let unit = SourceUnit::parse(
        Path::new("/p/use-toggle.ts"),
        "import { useState } from 'react';\nexport function useToggle() {\n  return useState(false);\n}\n".to_string(),
    )
    .unwrap();
    let test = generate_test(&unit, &options()).unwrap();
    assert!(test.content.contains("renderHook(() => useToggle())"));
    assert!(test.content.contains("keeps a stable result across rerenders"));
}

#[test]
fn test_unclassified_files_get_nothing() {
    let unit = SourceUnit::parse(Path::new("/p/types.ts"), "export type Id = string;\n".to_string())
        .unwrap();
    assert!(generate_test(&unit, &options()).is_none());
}

// ── Project runs ────────────────────────────────────────────────

#[test]
fn test_generate_writes_missing_tests_and_config() {
    let dir = TempDir::new().unwrap();
    write_temp_file(&dir, "package.json", r#"{"devDependencies": {"typescript": "^5.6.0"}}"#);
    write_temp_file(
        &dir,
        "src/card.tsx",
        "export function Card() {\n  return <div />;\n}\n",
    );
    write_temp_file(
        &dir,
        "src/badge.tsx",
        "export function Badge() {\n  return <span />;\n}\n",
    );
    write_temp_file(&dir, "src/badge.test.tsx", "// handwritten\n");

    let ctx = ProjectContext::load(dir.path(), AlignConfig::default()).unwrap();
    let report = generate_tests(&ctx, &options()).unwrap();

    assert_eq!(report.generated.len(), 1);
    assert!(report.generated[0].ends_with("src/card.test.tsx"));
    assert_eq!(report.existing.len(), 1);
    assert!(dir.path().join("src/card.test.tsx").exists());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("src/badge.test.tsx")).unwrap(),
        "// handwritten\n"
    );

    let config = report.config_created.unwrap();
    assert!(config.ends_with("vitest.config.ts"));
    let contents = std::fs::read_to_string(config).unwrap();
    assert!(contents.contains("lines: 80"));
}

#[test]
fn test_dry_run_and_component_filter() {
    let dir = TempDir::new().unwrap();
    write_temp_file(
        &dir,
        "src/card.tsx",
        "export function Card() {\n  return <div />;\n}\n",
    );
    write_temp_file(
        &dir,
        "src/badge.tsx",
        "export function Badge() {\n  return <span />;\n}\n",
    );

    let ctx = ProjectContext::load(dir.path(), AlignConfig::default()).unwrap();
    let report = generate_tests(
        &ctx,
        &TestGenOptions {
            component: Some("Badge".to_string()),
            dry_run: true,
            ..options()
        },
    )
    .unwrap();

    assert_eq!(report.generated.len(), 1);
    assert!(report.generated[0].ends_with("src/badge.test.tsx"));
    assert!(!dir.path().join("src/badge.test.tsx").exists());
    assert!(report.config_created.is_some());
    assert!(!dir.path().join("vitest.config.js").exists());
}
