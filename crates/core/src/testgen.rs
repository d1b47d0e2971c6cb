//! Vitest + Testing Library skeletons for classified source files

use crate::classifier::{self, Role};
use crate::config::AlignConfig;
use crate::context::ProjectContext;
use crate::issue::Framework;
use crate::source::{PropInfo, PropKind, SourceUnit};
use crate::syntax;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct TestGenOptions {
    /// Coverage threshold written into a generated vitest config
    pub coverage: u8,
    pub include_a11y: bool,
    /// Only generate for the component / hook with this name
    pub component: Option<String>,
    pub dry_run: bool,
    pub overwrite: bool,
}

impl TestGenOptions {
    pub fn from_config(config: &AlignConfig) -> Self {
        Self {
            coverage: config.testing.coverage,
            include_a11y: config.testing.include_a11y,
            component: None,
            dry_run: false,
            overwrite: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTest {
    pub path: PathBuf,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TestGenReport {
    pub generated: Vec<PathBuf>,
    /// Sources skipped because a test already exists
    pub existing: Vec<PathBuf>,
    /// Sources that could not be parsed
    pub skipped: usize,
    pub config_created: Option<PathBuf>,
}

/// Sibling test path: `score-card.tsx` → `score-card.test.tsx`
pub fn test_path_for(source: &Path, role: Role) -> PathBuf {
    let typescript = matches!(
        source.extension().and_then(|e| e.to_str()),
        Some("ts" | "tsx" | "mts" | "cts")
    );
    let ext = match (role, typescript) {
        (Role::Component | Role::Page, true) => "tsx",
        (Role::Component | Role::Page, false) => "jsx",
        (_, true) => "ts",
        (_, false) => "js",
    };
    let stem = crate::source::file_stem(source);
    source.with_file_name(format!("{}.test.{}", stem, ext))
}

/// Build a test skeleton for `unit`; `None` for unclassified files
pub fn generate_test(unit: &SourceUnit, options: &TestGenOptions) -> Option<GeneratedTest> {
    let name = unit.meta().primary_name.clone()?;
    let content = match unit.role() {
        Role::Component => component_test(unit, &name, options),
        Role::Page => page_test(unit, &name),
        Role::Hook => hook_test(unit, &name),
        Role::Utility => utility_test(unit),
        Role::Unknown => return None,
    };
    Some(GeneratedTest {
        path: test_path_for(unit.path(), unit.role()),
        content,
    })
}

/// Generate tests for every classified file lacking one
pub fn generate_tests(ctx: &ProjectContext, options: &TestGenOptions) -> Result<TestGenReport> {
    let mut report = TestGenReport::default();

    for file in &ctx.files {
        if classifier::is_test_file(file) {
            continue;
        }
        let unit = match SourceUnit::load(file) {
            Ok(unit) => unit,
            Err(e) => {
                tracing::warn!(path = %file.display(), error = %e, "skipping unparseable file");
                report.skipped += 1;
                continue;
            }
        };
        if let Some(wanted) = &options.component {
            if unit.meta().primary_name.as_deref() != Some(wanted.as_str()) {
                continue;
            }
        }
        let Some(test) = generate_test(&unit, options) else {
            continue;
        };
        if !options.overwrite && (test.path.exists() || ctx.has_test_for(file)) {
            report.existing.push(file.clone());
            continue;
        }
        if !options.dry_run {
            std::fs::write(&test.path, &test.content)
                .with_context(|| format!("Failed to write {}", test.path.display()))?;
        }
        tracing::debug!(path = %test.path.display(), "generated test");
        report.generated.push(test.path);
    }

    let has_config = ["ts", "js", "mts", "mjs"]
        .iter()
        .any(|ext| ctx.root.join(format!("vitest.config.{}", ext)).exists());
    if !has_config && !report.generated.is_empty() {
        let ext = if ctx.uses(Framework::Typescript) { "ts" } else { "js" };
        let path = ctx.root.join(format!("vitest.config.{}", ext));
        if !options.dry_run {
            std::fs::write(&path, vitest_config(options.coverage))
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        report.config_created = Some(path);
    }

    Ok(report)
}

pub fn vitest_config(coverage: u8) -> String {
    format!(
        r#"import {{ defineConfig }} from 'vitest/config';
import react from '@vitejs/plugin-react';

export default defineConfig({{
  plugins: [react()],
  test: {{
    environment: 'jsdom',
    globals: true,
    coverage: {{
      provider: 'v8',
      thresholds: {{
        lines: {c},
        functions: {c},
        branches: {c},
        statements: {c},
      }},
    }},
  }},
}});
"#,
        c = coverage
    )
}

// ── Templates ───────────────────────────────────────────────────

/// `import { Name } from './stem'`, or the default-import form
fn import_line(unit: &SourceUnit, name: &str) -> String {
    if unit.primary_function().is_some_and(|f| f.default_export) {
        format!("import {} from './{}';\n", name, unit.stem())
    } else {
        format!("import {{ {} }} from './{}';\n", name, unit.stem())
    }
}

fn is_default(unit: &SourceUnit, name: &str) -> bool {
    unit.top_level_functions()
        .iter()
        .any(|f| f.default_export && f.name(unit) == Some(name))
}

fn placeholder(prop: &PropInfo) -> String {
    match prop.kind {
        PropKind::Function => "vi.fn()".to_string(),
        PropKind::Boolean => "false".to_string(),
        PropKind::Number => "1".to_string(),
        PropKind::String => format!("'test-{}'", prop.name),
        PropKind::Array => "[]".to_string(),
        PropKind::Node => "'content'".to_string(),
        PropKind::Object => "{}".to_string(),
        PropKind::Unknown => "undefined".to_string(),
    }
}

fn component_test(unit: &SourceUnit, name: &str, options: &TestGenOptions) -> String {
    let meta = unit.meta();
    let mut out = String::new();

    out.push_str("import { describe, it, expect, vi } from 'vitest';\n");
    out.push_str("import { render, screen } from '@testing-library/react';\n");
    if options.include_a11y {
        out.push_str("import { axe, toHaveNoViolations } from 'jest-axe';\n");
    }
    out.push_str(&import_line(unit, name));
    if options.include_a11y {
        out.push_str("\nexpect.extend(toHaveNoViolations);\n");
    }

    out.push_str("\nconst defaultProps = {\n");
    for prop in meta.props.iter().filter(|p| p.name != "children") {
        out.push_str(&format!("  {}: {},\n", prop.name, placeholder(prop)));
    }
    out.push_str("};\n\n");

    out.push_str(&format!("describe('{}', () => {{\n", name));
    out.push_str("  it('renders without crashing', () => {\n");
    out.push_str(&format!(
        "    const {{ container }} = render(<{} {{...defaultProps}} />);\n",
        name
    ));
    out.push_str("    expect(container).toBeTruthy();\n");
    out.push_str("  });\n");

    for prop in &meta.props {
        let test = match prop.kind {
            PropKind::Boolean => Some(format!(
                "  it('renders with `{p}` enabled', () => {{\n    const {{ container }} = render(<{n} {{...defaultProps}} {p} />);\n    expect(container).toBeTruthy();\n  }});\n",
                p = prop.name,
                n = name
            )),
            PropKind::Array => Some(format!(
                "  it('renders with an empty `{p}` list', () => {{\n    const {{ container }} = render(<{n} {{...defaultProps}} {p}={{[]}} />);\n    expect(container).toBeTruthy();\n  }});\n",
                p = prop.name,
                n = name
            )),
            PropKind::Node if prop.name == "children" => Some(format!(
                "  it('renders its children', () => {{\n    render(<{n} {{...defaultProps}}><span>child content</span></{n}>);\n    expect(screen.getByText('child content')).toBeTruthy();\n  }});\n",
                n = name
            )),
            PropKind::String => Some(format!(
                "  it('accepts the `{p}` prop', () => {{\n    const {{ container }} = render(<{n} {{...defaultProps}} {p}=\"sample-{p}\" />);\n    expect(container).toBeTruthy();\n  }});\n",
                p = prop.name,
                n = name
            )),
            _ => None,
        };
        if let Some(test) = test {
            out.push('\n');
            out.push_str(&test);
        }
    }

    // Handlers passed in as props; inline JSX handlers are exercised by render
    for handler in meta
        .event_handlers
        .iter()
        .filter(|h| meta.props.iter().any(|p| &p.name == *h))
    {
        out.push('\n');
        out.push_str(&format!(
            "  it('does not call `{h}` on first render', () => {{\n    const {h} = vi.fn();\n    render(<{n} {{...defaultProps}} {h}={{{h}}} />);\n    expect({h}).not.toHaveBeenCalled();\n  }});\n",
            h = handler,
            n = name
        ));
    }

    if options.include_a11y {
        out.push('\n');
        out.push_str(&format!(
            "  it('has no accessibility violations', async () => {{\n    const {{ container }} = render(<{} {{...defaultProps}} />);\n    expect(await axe(container)).toHaveNoViolations();\n  }});\n",
            name
        ));
    }

    out.push_str("});\n");
    out
}

fn page_test(unit: &SourceUnit, name: &str) -> String {
    let is_async = unit
        .primary_function()
        .is_some_and(|f| syntax::has_token(f.function, "async"));
    let mut out = String::new();
    out.push_str("import { describe, it, expect } from 'vitest';\n");
    if !is_async {
        out.push_str("import { render } from '@testing-library/react';\n");
    }
    out.push_str(&format!("import {} from './{}';\n\n", name, unit.stem()));
    out.push_str(&format!("describe('{}', () => {{\n", name));
    if is_async {
        // Async server components cannot be rendered by Testing Library
        out.push_str("  it('exports a page component', () => {\n");
        out.push_str(&format!("    expect(typeof {}).toBe('function');\n", name));
    } else {
        out.push_str("  it('renders without crashing', () => {\n");
        out.push_str(&format!("    const {{ container }} = render(<{} />);\n", name));
        out.push_str("    expect(container).toBeTruthy();\n");
    }
    out.push_str("  });\n});\n");
    out
}

fn hook_test(unit: &SourceUnit, name: &str) -> String {
    let meta = unit.meta();
    let takes_args = unit
        .primary_function()
        .is_some_and(|f| !syntax::function_parameters(f.function).is_empty());
    let call = if takes_args && unit.language().is_typescript() {
        format!("{}(...([] as unknown as Parameters<typeof {}>))", name, name)
    } else {
        format!("{}()", name)
    };

    let mut out = String::new();
    out.push_str("import { describe, it, expect } from 'vitest';\n");
    out.push_str("import { renderHook, act } from '@testing-library/react';\n");
    out.push_str(&import_line(unit, name));
    out.push_str(&format!("\ndescribe('{}', () => {{\n", name));
    out.push_str("  it('returns a value', () => {\n");
    out.push_str(&format!("    const {{ result }} = renderHook(() => {});\n", call));
    out.push_str("    expect(result.current).toBeDefined();\n");
    out.push_str("  });\n");

    if meta.hooks_used.iter().any(|h| h == "useState" || h == "useReducer") {
        out.push_str("\n  it('keeps a stable result across rerenders', () => {\n");
        out.push_str(&format!(
            "    const {{ result, rerender }} = renderHook(() => {});\n",
            call
        ));
        out.push_str("    const first = result.current;\n");
        out.push_str("    act(() => rerender());\n");
        out.push_str("    expect(typeof result.current).toBe(typeof first);\n");
        out.push_str("  });\n");
    }

    out.push_str("});\n");
    out
}

fn utility_test(unit: &SourceUnit) -> String {
    let exported = &unit.meta().exported_functions;
    let mut out = String::new();
    out.push_str("import { describe, it, expect } from 'vitest';\n");
    let named: Vec<&str> = exported
        .iter()
        .map(String::as_str)
        .filter(|n| !is_default(unit, n))
        .collect();
    if !named.is_empty() {
        out.push_str(&format!(
            "import {{ {} }} from './{}';\n",
            named.join(", "),
            unit.stem()
        ));
    }
    for name in exported.iter().filter(|n| is_default(unit, n)) {
        out.push_str(&format!("import {} from './{}';\n", name, unit.stem()));
    }

    for name in exported {
        out.push_str(&format!("\ndescribe('{}', () => {{\n", name));
        out.push_str("  it('is callable', () => {\n");
        out.push_str(&format!("    expect(typeof {}).toBe('function');\n", name));
        out.push_str("  });\n});\n");
    }
    out
}
