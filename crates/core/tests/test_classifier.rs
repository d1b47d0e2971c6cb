//! Tests for role classification and per-file metadata

use stack_align_core::source::{ExportStyle, PropKind, Rendering, SourceUnit};
use stack_align_core::Role;
use std::path::Path;

fn unit(path: &str, source: &str) -> SourceUnit {
    SourceUnit::parse(Path::new(path), source.to_string()).unwrap()
}

// ── Roles ───────────────────────────────────────────────────────

#[test]
fn test_exported_jsx_function_is_component() {
    let u = unit(
        "/p/src/components/button.tsx",
        "export function Button() {\n  return <button>ok</button>;\n}\n",
    );
    assert_eq!(u.role(), Role::Component);
}

#[test]
fn test_arrow_component_wrapped_in_memo() {
    let u = unit(
        "/p/src/components/card.tsx",
        "import { memo } from 'react';\nexport const Card = memo(() => <div />);\n",
    );
    assert_eq!(u.role(), Role::Component);
}

#[test]
fn test_custom_hook() {
    let u = unit(
        "/p/src/hooks/use-toggle.ts",
        "import { useState } from 'react';\nexport function useToggle() {\n  const [on, setOn] = useState(false);\n  return [on, () => setOn(!on)];\n}\n",
    );
    assert_eq!(u.role(), Role::Hook);
}

#[test]
fn test_plain_function_is_utility() {
    let u = unit(
        "/p/src/lib/format.ts",
        "export function formatScore(n: number) {\n  return n.toFixed(1);\n}\n",
    );
    assert_eq!(u.role(), Role::Utility);
}

#[test]
fn test_route_file_is_page_regardless_of_contents() {
    let u = unit("/p/app/dashboard/page.tsx", "const x = 1;\n");
    assert_eq!(u.role(), Role::Page);
}

#[test]
fn test_test_files_are_unknown() {
    let u = unit(
        "/p/src/components/button.test.tsx",
        "export function Helper() { return <div />; }\n",
    );
    assert_eq!(u.role(), Role::Unknown);
}

#[test]
fn test_unexported_and_type_only_files_are_unknown() {
    let u = unit("/p/src/types.ts", "export interface Props { id: string }\n");
    assert_eq!(u.role(), Role::Unknown);

    let u = unit("/p/src/internal.tsx", "function Hidden() { return <div />; }\n");
    assert_eq!(u.role(), Role::Unknown);
}

#[test]
fn test_default_export_by_identifier_counts_as_exported() {
    let u = unit(
        "/p/src/score-card.tsx",
        "function ScoreCard() {\n  return <div />;\n}\nexport default ScoreCard;\n",
    );
    assert_eq!(u.role(), Role::Component);
    assert_eq!(u.meta().export_style, ExportStyle::Default);
    assert_eq!(u.meta().primary_name.as_deref(), Some("ScoreCard"));
}

// ── Metadata ────────────────────────────────────────────────────

#[test]
fn test_client_features_and_rendering() {
    let u = unit(
        "/p/src/counter.tsx",
        "'use client';\nimport { useState } from 'react';\nexport function Counter() {\n  const [n, setN] = useState(0);\n  return <button onClick={() => setN(n + 1)}>{n}</button>;\n}\n",
    );
    let meta = u.meta();
    assert_eq!(meta.rendering, Rendering::Client);
    assert!(meta.uses_client_features);
    assert_eq!(meta.hooks_used, vec!["useState"]);
    assert_eq!(meta.event_handlers, vec!["onClick"]);
    assert_eq!(meta.export_style, ExportStyle::Named);
}

#[test]
fn test_server_component_has_no_client_features() {
    let u = unit(
        "/p/src/title.tsx",
        "export function Title({ text }: { text: string }) {\n  return <h1>{text}</h1>;\n}\n",
    );
    assert_eq!(u.meta().rendering, Rendering::Unmarked);
    assert!(!u.meta().uses_client_features);
}

#[test]
fn test_props_from_destructured_parameter() {
    let u = unit(
        "/p/src/card.tsx",
        "export function Card({ title, count, onSelect }: { title: string; count: number; onSelect: () => void }) {\n  return <div onClick={onSelect}>{title} {count}</div>;\n}\n",
    );
    let props = &u.meta().props;
    let names: Vec<&str> = props.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["title", "count", "onSelect"]);
    let on_select = props.iter().find(|p| p.name == "onSelect").unwrap();
    assert_eq!(on_select.kind, PropKind::Function);
}
