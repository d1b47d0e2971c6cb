//! Tests for the React 19 detectors: component naming, forwardRef, hooks

use stack_align_core::detectors::hooks::{
    ConditionalHookDetector, HookDependenciesDetector, HookNamingDetector,
};
use stack_align_core::detectors::react::{
    ComponentNamingDetector, ForwardRefDetector, ReactVersionDetector,
};
use stack_align_core::detectors::{Detector, ProjectDetector};
use stack_align_core::source::SourceUnit;
use stack_align_core::{
    AlignConfig, ComplexTransform, FixDescriptor, Issue, ProjectContext, ReplaceContext,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn react_context() -> ProjectContext {
    let mut config = AlignConfig::default();
    config.frameworks.react.enabled = Some(true);
    ProjectContext::with_files(PathBuf::from("/project"), config, Vec::new())
}

fn unit(path: &str, source: &str) -> SourceUnit {
    SourceUnit::parse(Path::new(path), source.to_string()).unwrap()
}

fn run(detector: &dyn Detector, u: &SourceUnit) -> Vec<Issue> {
    detector.detect(u, &react_context()).unwrap().issues
}

// ── Component naming ────────────────────────────────────────────

#[test]
fn test_camel_case_component_is_flagged_with_replace_fix() {
    let u = unit(
        "/project/src/score-card.tsx",
        "export function scoreCard() {\n  return <div />;\n}\n",
    );
    let issues = run(&ComponentNamingDetector, &u);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].rule_code, "REACT19_COMPONENT_NAMING");
    assert_eq!(issues[0].line, 1);
    match &issues[0].fix {
        Some(FixDescriptor::Replace {
            replacement,
            context,
            ..
        }) => {
            assert_eq!(replacement, "ScoreCard");
            assert_eq!(*context, Some(ReplaceContext::ComponentDeclaration));
        }
        other => panic!("unexpected fix {:?}", other),
    }
}

#[test]
fn test_pascal_case_component_is_clean() {
    let u = unit(
        "/project/src/score-card.tsx",
        "export function ScoreCard() {\n  return <div />;\n}\n",
    );
    assert!(run(&ComponentNamingDetector, &u).is_empty());
}

#[test]
fn test_naming_rule_respects_architecture_toggle() {
    let mut ctx = react_context();
    ctx.config.architecture.enforce_pascal_case = false;
    assert!(!ComponentNamingDetector.is_enabled(&ctx));
}

// ── forwardRef ──────────────────────────────────────────────────

#[test]
fn test_forward_ref_is_suggested_away() {
    let u = unit(
        "/project/src/input.tsx",
        "import { forwardRef } from 'react';\nexport const Input = forwardRef((props, ref) => <input ref={ref} {...props} />);\n",
    );
    let issues = run(&ForwardRefDetector, &u);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].rule_code, "REACT19_FORWARD_REF");
    assert_eq!(issues[0].line, 2);
    assert!(matches!(issues[0].fix, Some(FixDescriptor::Manual { .. })));
}

#[test]
fn test_forward_ref_ignored_below_react_19() {
    let mut ctx = react_context();
    ctx.config.frameworks.react.version = "18".to_string();
    assert!(!ForwardRefDetector.is_enabled(&ctx));
}

// ── Conditional hooks ───────────────────────────────────────────

#[test]
fn test_hook_inside_if_is_an_error() {
    let u = unit(
        "/project/src/profile.tsx",
        "export function Profile({ id }) {\n  if (id) {\n    const [x] = useState(0);\n  }\n  return <div />;\n}\n",
    );
    let issues = run(&ConditionalHookDetector, &u);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].rule_code, "REACT19_CONDITIONAL_HOOK");
    assert_eq!(issues[0].line, 3);
    assert!(issues[0].message.contains("conditionally"));
}

#[test]
fn test_hook_after_early_return() {
    let u = unit(
        "/project/src/profile.tsx",
        "export function Profile({ id }) {\n  if (!id) return null;\n  const [x] = useState(0);\n  return <div>{x}</div>;\n}\n",
    );
    let issues = run(&ConditionalHookDetector, &u);
    assert_eq!(issues.len(), 1);
    assert!(issues[0].message.contains("early return"));
}

#[test]
fn test_hook_in_loop_and_nested_function() {
    let u = unit(
        "/project/src/list.tsx",
        "export function List({ items }) {\n  for (const i of items) {\n    useMemo(() => i, [i]);\n  }\n  const handler = () => {\n    useEffect(() => {}, []);\n  };\n  return <ul onClick={handler} />;\n}\n",
    );
    let messages: Vec<String> = run(&ConditionalHookDetector, &u)
        .into_iter()
        .map(|i| i.message)
        .collect();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains("inside a loop"));
    assert!(messages[1].contains("nested function"));
}

#[test]
fn test_unconditional_hooks_are_clean() {
    let u = unit(
        "/project/src/counter.tsx",
        "export function Counter() {\n  const [n, setN] = useState(0);\n  const double = useMemo(() => n * 2, [n]);\n  return <button onClick={() => setN(n + 1)}>{double}</button>;\n}\n",
    );
    assert!(run(&ConditionalHookDetector, &u).is_empty());
}

// ── Dependencies ────────────────────────────────────────────────

#[test]
fn test_missing_dependency_array_gets_sync_fix() {
    let u = unit(
        "/project/src/score-card.tsx",
        "export function ScoreCard(props) {\n  useEffect(() => {\n    fetchScore(props.gameId);\n  });\n  return <div />;\n}\n",
    );
    let issues = run(&HookDependenciesDetector, &u);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].rule_code, "REACT19_INCOMPLETE_EFFECT_DEPS");
    assert_eq!(
        issues[0].fix,
        Some(FixDescriptor::Complex {
            transform: ComplexTransform::SyncHookDependencies {
                hook: "useEffect".to_string(),
                occurrence: 0,
                dependencies: vec!["props.gameId".to_string()],
            }
        })
    );
}

#[test]
fn test_incomplete_array_keeps_existing_entries() {
    let u = unit(
        "/project/src/search.tsx",
        "export function Search({ query, limit }) {\n  const [items, setItems] = useState([]);\n  useEffect(() => {\n    setItems(find(query, limit));\n  }, [query]);\n  return <div>{items.length}</div>;\n}\n",
    );
    let issues = run(&HookDependenciesDetector, &u);
    assert_eq!(issues.len(), 1);
    assert!(issues[0].message.contains("limit"));
    match &issues[0].fix {
        Some(FixDescriptor::Complex {
            transform: ComplexTransform::SyncHookDependencies { dependencies, .. },
        }) => assert_eq!(dependencies, &vec!["query".to_string(), "limit".to_string()]),
        other => panic!("unexpected fix {:?}", other),
    }
}

#[test]
fn test_setters_refs_and_complete_arrays_are_clean() {
    let u = unit(
        "/project/src/timer.tsx",
        "export function Timer({ delay }) {\n  const [n, setN] = useState(0);\n  const ref = useRef(null);\n  useEffect(() => {\n    ref.current = setTimeout(() => setN(1), delay);\n  }, [delay]);\n  return <div>{n}</div>;\n}\n",
    );
    assert!(run(&HookDependenciesDetector, &u).is_empty());
}

#[test]
fn test_effect_reading_nothing_reactive_gets_manual_fix() {
    let u = unit(
        "/project/src/logger.tsx",
        "export function Logger() {\n  useEffect(() => {\n    console.log('mounted');\n  });\n  return null;\n}\n",
    );
    let issues = run(&HookDependenciesDetector, &u);
    assert_eq!(issues.len(), 1);
    assert!(matches!(issues[0].fix, Some(FixDescriptor::Manual { .. })));
}

// ── Hook naming ─────────────────────────────────────────────────

#[test]
fn test_function_calling_hooks_must_be_named_like_one() {
    let u = unit(
        "/project/src/lib/window-size.ts",
        "export function windowSize() {\n  const [size, setSize] = useState(0);\n  return size;\n}\n",
    );
    let issues = run(&HookNamingDetector, &u);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].rule_code, "REACT19_HOOK_NAMING");
    assert!(issues[0].message.contains("useWindowSize"));
}

// ── Version ─────────────────────────────────────────────────────

fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_outdated_react_gets_package_json_update() {
    let dir = TempDir::new().unwrap();
    write_temp_file(
        &dir,
        "package.json",
        r#"{"dependencies": {"react": "^18.2.0", "react-dom": "^19.0.0"}}"#,
    );
    let ctx = ProjectContext::with_files(dir.path().to_path_buf(), AlignConfig::default(), vec![]);

    let issues = ReactVersionDetector.detect(&ctx).unwrap().issues;
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].rule_code, "REACT19_OUTDATED_VERSION");
    assert!(issues[0].message.contains("`react`"));
    assert!(matches!(issues[0].fix, Some(FixDescriptor::UpdateJson { .. })));
}

#[test]
fn test_dependency_fix_resolves_its_own_issue() {
    use stack_align_core::transform::ApplyOptions;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("score-card.tsx");
    std::fs::write(
        &path,
        "export function ScoreCard(props) {\n  useEffect(() => {\n    fetchScore(props.gameId);\n  });\n  return <div />;\n}\n",
    )
    .unwrap();

    let before = SourceUnit::load(&path).unwrap();
    let issues = run(&HookDependenciesDetector, &before);
    assert_eq!(issues.len(), 1);

    let batch: Vec<&Issue> = issues.iter().collect();
    let options = ApplyOptions {
        dry_run: false,
        keep_original: false,
    };
    let outcome = stack_align_core::apply_fixes(&path, &batch, &options).unwrap();
    assert!(outcome.written);

    let after = SourceUnit::load(&path).unwrap();
    assert!(after.text().contains("}, [props.gameId]);"));
    assert!(run(&HookDependenciesDetector, &after).is_empty());
}

#[test]
fn test_detectors_are_repeatable() {
    let u = unit(
        "/project/src/search.tsx",
        "export function Search({ query }) {\n  if (query) {\n    useMemo(() => query, []);\n  }\n  useEffect(() => {\n    console.log(query);\n  });\n  return <div />;\n}\n",
    );
    let detectors: [&dyn Detector; 3] = [
        &ConditionalHookDetector,
        &HookDependenciesDetector,
        &ComponentNamingDetector,
    ];
    for detector in detectors {
        assert_eq!(run(detector, &u), run(detector, &u));
    }
}
