//! TypeScript 5 strictness rules

use super::{literal_replacement, unit_issue, Detector, DetectorError, ProjectDetector};
use crate::classifier::Role;
use crate::context::{read_json, ProjectContext};
use crate::issue::{
    FixDescriptor, Framework, Issue, JsonOperation, ReplaceContext, Severity, ValidationResult,
};
use crate::source::SourceUnit;
use crate::syntax;
use std::collections::{BTreeSet, HashSet};
use tree_sitter::Node;

fn typescript_enabled(ctx: &ProjectContext) -> bool {
    ctx.config.frameworks.typescript.enabled != Some(false)
}

/// `TS_EXPLICIT_ANY`
pub struct ExplicitAnyDetector;

impl Detector for ExplicitAnyDetector {
    fn name(&self) -> &str {
        "Explicit any"
    }

    fn framework(&self) -> Framework {
        Framework::Typescript
    }

    fn applies_to(&self, role: Role) -> bool {
        role != Role::Unknown
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        typescript_enabled(ctx)
    }

    fn detect(
        &self,
        unit: &SourceUnit,
        _ctx: &ProjectContext,
    ) -> Result<ValidationResult, DetectorError> {
        if !unit.language().is_typescript() {
            return Ok(ValidationResult::empty());
        }
        let lines: BTreeSet<usize> = syntax::descendants(unit.root())
            .into_iter()
            .filter(|n| n.kind() == "predefined_type" && unit.node_text(*n) == "any")
            .map(syntax::line)
            .collect();
        let issues = lines
            .into_iter()
            .map(|line| {
                unit_issue(
                    unit,
                    Severity::Warning,
                    Framework::Typescript,
                    "TS_EXPLICIT_ANY",
                    "Explicit `any` disables type checking".to_string(),
                    line,
                )
                .with_fix(FixDescriptor::manual(
                    "Replace `any` with a precise type",
                    &["Use `unknown` and narrow it where the real type is not known"],
                ))
            })
            .collect();
        Ok(ValidationResult::new(issues))
    }
}

/// `TS_TYPE_ONLY_IMPORT`: imports used only as types should say so
pub struct TypeOnlyImportDetector;

impl Detector for TypeOnlyImportDetector {
    fn name(&self) -> &str {
        "Type-only imports"
    }

    fn framework(&self) -> Framework {
        Framework::Typescript
    }

    fn applies_to(&self, role: Role) -> bool {
        role != Role::Unknown
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        typescript_enabled(ctx)
    }

    fn detect(
        &self,
        unit: &SourceUnit,
        _ctx: &ProjectContext,
    ) -> Result<ValidationResult, DetectorError> {
        if !unit.language().is_typescript() {
            return Ok(ValidationResult::empty());
        }

        let statements = syntax::named_children(unit.root());
        let mut value_uses: HashSet<&str> = HashSet::new();
        let mut type_uses: HashSet<&str> = HashSet::new();
        for statement in statements.iter().filter(|s| s.kind() != "import_statement") {
            for node in syntax::descendants(*statement) {
                match node.kind() {
                    "identifier" | "shorthand_property_identifier" => {
                        value_uses.insert(unit.node_text(node));
                    }
                    "type_identifier" => {
                        type_uses.insert(unit.node_text(node));
                    }
                    _ => {}
                }
            }
        }

        let mut issues = Vec::new();
        for statement in statements.iter().filter(|s| s.kind() == "import_statement") {
            let Some(locals) = named_import_locals(unit, *statement) else {
                continue;
            };
            let type_only = locals
                .iter()
                .all(|name| type_uses.contains(name) && !value_uses.contains(name));
            if !type_only {
                continue;
            }

            let original = unit.node_text(*statement);
            let rewritten = original.replacen("import", "import type", 1);
            issues.push(
                unit_issue(
                    unit,
                    Severity::Suggestion,
                    Framework::Typescript,
                    "TS_TYPE_ONLY_IMPORT",
                    format!("`{}` is only used as a type; use `import type`", locals.join(", ")),
                    syntax::line(*statement),
                )
                .with_fix(FixDescriptor::Replace {
                    pattern: regex::escape(original),
                    replacement: literal_replacement(&rewritten),
                    context: Some(ReplaceContext::Import),
                }),
            );
        }
        Ok(ValidationResult::new(issues))
    }
}

/// Local names of an `import { A, B as C } from '...'` statement; `None`
/// for default, namespace, side-effect or already type-qualified imports
fn named_import_locals<'s>(unit: &'s SourceUnit, statement: Node<'_>) -> Option<Vec<&'s str>> {
    if syntax::has_token(statement, "type") {
        return None;
    }
    let clause = syntax::named_children(statement)
        .into_iter()
        .find(|n| n.kind() == "import_clause")?;
    let parts = syntax::named_children(clause);
    let [named] = parts.as_slice() else {
        return None;
    };
    if named.kind() != "named_imports" {
        return None;
    }

    let specifiers: Vec<Node<'_>> = syntax::named_children(*named)
        .into_iter()
        .filter(|n| n.kind() == "import_specifier")
        .collect();
    if specifiers.is_empty() || specifiers.iter().any(|s| syntax::has_token(*s, "type")) {
        return None;
    }
    specifiers
        .iter()
        .map(|s| {
            s.child_by_field_name("alias")
                .or_else(|| s.child_by_field_name("name"))
                .map(|n| unit.node_text(n))
        })
        .collect()
}

/// `TS_UNTYPED_PROPS`: component props without a type annotation
pub struct UntypedPropsDetector;

impl Detector for UntypedPropsDetector {
    fn name(&self) -> &str {
        "Untyped props"
    }

    fn framework(&self) -> Framework {
        Framework::Typescript
    }

    fn applies_to(&self, role: Role) -> bool {
        role == Role::Component
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        typescript_enabled(ctx)
    }

    fn detect(
        &self,
        unit: &SourceUnit,
        _ctx: &ProjectContext,
    ) -> Result<ValidationResult, DetectorError> {
        if !unit.language().is_typescript() {
            return Ok(ValidationResult::empty());
        }
        let Some(primary) = unit.primary_function() else {
            return Ok(ValidationResult::empty());
        };
        let Some(param) = syntax::function_parameters(primary.function).into_iter().next() else {
            return Ok(ValidationResult::empty());
        };
        let annotated = param.child_by_field_name("type").is_some()
            || declarator_type(primary.function, primary.statement).is_some();
        if annotated {
            return Ok(ValidationResult::empty());
        }

        let name = primary
            .name(unit)
            .map(String::from)
            .or_else(|| unit.meta().primary_name.clone())
            .unwrap_or_default();
        let issue = unit_issue(
            unit,
            Severity::Warning,
            Framework::Typescript,
            "TS_UNTYPED_PROPS",
            format!("Props of `{}` have no type annotation", name),
            syntax::line(param),
        )
        .with_fix(FixDescriptor::manual(
            "Declare a props type",
            &[
                "Add `interface Props { ... }` describing every prop",
                "Annotate the parameter: `(props: Props)`",
            ],
        ));
        Ok(ValidationResult::new(vec![issue]))
    }
}

/// Type annotation on the variable a function is assigned to (`const X: FC<P> = ...`)
fn declarator_type<'t>(function: Node<'t>, statement: Node<'t>) -> Option<Node<'t>> {
    let mut current = function.parent();
    while let Some(node) = current {
        if node.kind() == "variable_declarator" {
            return node.child_by_field_name("type");
        }
        if node.id() == statement.id() {
            return None;
        }
        current = node.parent();
    }
    None
}

/// `TS_STRICT_DISABLED`: tsconfig without `"strict": true`
pub struct StrictModeDetector;

impl ProjectDetector for StrictModeDetector {
    fn name(&self) -> &str {
        "Strict mode"
    }

    fn framework(&self) -> Framework {
        Framework::Typescript
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        ctx.uses(Framework::Typescript)
    }

    fn detect(&self, ctx: &ProjectContext) -> Result<ValidationResult, DetectorError> {
        let path = ctx.root.join("tsconfig.json");
        let Some(tsconfig) = read_json(&path) else {
            return Ok(ValidationResult::empty());
        };
        let strict = tsconfig
            .pointer("/compilerOptions/strict")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        if strict {
            return Ok(ValidationResult::empty());
        }

        let issue = Issue::new(
            Severity::Warning,
            Framework::Typescript,
            "TS_STRICT_DISABLED",
            "tsconfig.json does not enable `strict` mode",
            path.clone(),
            0,
        )
        .with_fix(FixDescriptor::UpdateJson {
            path,
            operations: vec![JsonOperation::Set {
                pointer: "/compilerOptions/strict".to_string(),
                value: serde_json::Value::Bool(true),
            }],
        });
        Ok(ValidationResult::new(vec![issue]))
    }
}
