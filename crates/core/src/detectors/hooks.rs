//! Rules of hooks: unconditional calls, complete dependency arrays, naming

use super::{unit_issue, Detector, DetectorError};
use crate::classifier::Role;
use crate::context::ProjectContext;
use crate::issue::{ComplexTransform, FixDescriptor, Framework, Issue, Severity, ValidationResult};
use crate::naming;
use crate::source::SourceUnit;
use crate::syntax;
use std::collections::HashSet;
use tree_sitter::Node;

/// Hooks whose second argument is a dependency array
pub const DEPENDENCY_HOOKS: &[&str] = &[
    "useEffect",
    "useLayoutEffect",
    "useInsertionEffect",
    "useCallback",
    "useMemo",
];

/// Hooks returning `[value, stableSetter, ...]`
const STATE_HOOKS: &[&str] = &[
    "useState",
    "useReducer",
    "useTransition",
    "useActionState",
    "useOptimistic",
];

// ── Conditional calls ───────────────────────────────────────────

/// `REACT19_CONDITIONAL_HOOK`
pub struct ConditionalHookDetector;

impl Detector for ConditionalHookDetector {
    fn name(&self) -> &str {
        "Conditional hook calls"
    }

    fn framework(&self) -> Framework {
        Framework::React
    }

    fn applies_to(&self, role: Role) -> bool {
        matches!(role, Role::Component | Role::Hook | Role::Page)
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        ctx.uses(Framework::React)
    }

    fn detect(
        &self,
        unit: &SourceUnit,
        _ctx: &ProjectContext,
    ) -> Result<ValidationResult, DetectorError> {
        let mut issues = Vec::new();

        for call in syntax::descendants(unit.root()) {
            if call.kind() != "call_expression" {
                continue;
            }
            let Some(name) = syntax::callee_name(call, unit.text()) else {
                continue;
            };
            if !syntax::is_hook_name(name) {
                continue;
            }
            if let Some(reason) = conditional_reason(call) {
                issues.push(
                    unit_issue(
                        unit,
                        Severity::Error,
                        Framework::React,
                        "REACT19_CONDITIONAL_HOOK",
                        format!("Hook `{}` is called {}", name, reason),
                        syntax::line(call),
                    )
                    .with_fix(FixDescriptor::manual(
                        "Call hooks unconditionally at the top level of the function",
                        &[
                            "Move the hook call above any condition, loop or early return",
                            "Put the condition inside the hook's callback instead",
                        ],
                    )),
                );
            }
        }

        Ok(ValidationResult::new(issues))
    }
}

/// Why a hook call is not unconditional, if it isn't
fn conditional_reason(call: Node<'_>) -> Option<&'static str> {
    // Module-level calls belong to nobody
    let owner = syntax::enclosing_function(call)?;
    if syntax::enclosing_function(owner).is_some() {
        return Some("inside a nested function");
    }

    let mut child = call;
    let mut current = call.parent();
    while let Some(parent) = current {
        if parent.id() == owner.id() {
            break;
        }
        match parent.kind() {
            "if_statement" | "ternary_expression" if !is_field(parent, "condition", child) => {
                return Some("conditionally");
            }
            "binary_expression"
                if is_field(parent, "right", child)
                    && parent
                        .child_by_field_name("operator")
                        .is_some_and(|op| matches!(op.kind(), "&&" | "||" | "??")) =>
            {
                return Some("conditionally");
            }
            "switch_case" | "switch_default" | "catch_clause" => return Some("conditionally"),
            "for_statement" | "for_in_statement" | "while_statement" | "do_statement" => {
                return Some("inside a loop");
            }
            _ => {}
        }
        child = parent;
        current = parent.parent();
    }

    let returns_early = syntax::descendants(owner).into_iter().any(|n| {
        n.kind() == "return_statement"
            && n.end_byte() <= call.start_byte()
            && syntax::enclosing_function(n).is_some_and(|f| f.id() == owner.id())
    });
    returns_early.then_some("after an early return")
}

fn is_field(parent: Node<'_>, field: &str, child: Node<'_>) -> bool {
    parent
        .child_by_field_name(field)
        .is_some_and(|n| n.id() == child.id())
}

// ── Dependency arrays ───────────────────────────────────────────

/// `REACT19_INCOMPLETE_EFFECT_DEPS`
pub struct HookDependenciesDetector;

impl Detector for HookDependenciesDetector {
    fn name(&self) -> &str {
        "Hook dependencies"
    }

    fn framework(&self) -> Framework {
        Framework::React
    }

    fn applies_to(&self, role: Role) -> bool {
        matches!(role, Role::Component | Role::Hook | Role::Page)
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        ctx.uses(Framework::React)
    }

    fn detect(
        &self,
        unit: &SourceUnit,
        _ctx: &ProjectContext,
    ) -> Result<ValidationResult, DetectorError> {
        let mut issues = Vec::new();
        for &hook in DEPENDENCY_HOOKS {
            let calls = syntax::calls_named(unit.root(), unit.text(), hook);
            for (occurrence, call) in calls.into_iter().enumerate() {
                issues.extend(check_dependencies(unit, hook, occurrence, call));
            }
        }
        issues.sort_by_key(|i| i.line);
        Ok(ValidationResult::new(issues))
    }
}

fn check_dependencies(
    unit: &SourceUnit,
    hook: &str,
    occurrence: usize,
    call: Node<'_>,
) -> Option<Issue> {
    let args = syntax::call_arguments(call);
    let callback = *args.first()?;
    if !syntax::is_function_kind(callback.kind()) {
        return None;
    }
    let owner = syntax::enclosing_function(call)?;
    let inferred = ReactiveScope::of(unit, owner).referenced_in(unit, callback);

    let issue = |message: String| {
        unit_issue(
            unit,
            Severity::Warning,
            Framework::React,
            "REACT19_INCOMPLETE_EFFECT_DEPS",
            message,
            syntax::line(call),
        )
    };
    let sync = |dependencies: Vec<String>| FixDescriptor::Complex {
        transform: ComplexTransform::SyncHookDependencies {
            hook: hook.to_string(),
            occurrence,
            dependencies,
        },
    };

    match args.get(1) {
        None => {
            let fix = if inferred.is_empty() {
                FixDescriptor::manual(
                    "Add a dependency array",
                    &["Pass `[]` to run only on mount, or list the values the callback reads"],
                )
            } else {
                sync(inferred)
            };
            Some(issue(format!("`{}` has no dependency array and runs after every render", hook)).with_fix(fix))
        }
        Some(array) if array.kind() == "array" => {
            let existing: Vec<String> = syntax::named_children(*array)
                .into_iter()
                .filter(|n| n.kind() != "comment")
                .map(|n| unit.node_text(n).to_string())
                .collect();
            let missing: Vec<String> = inferred
                .into_iter()
                .filter(|dep| !covered(dep, &existing))
                .collect();
            if missing.is_empty() {
                return None;
            }
            let message = format!("`{}` is missing dependencies: {}", hook, missing.join(", "));
            let mut dependencies = existing;
            dependencies.extend(missing);
            Some(issue(message).with_fix(sync(dependencies)))
        }
        // Dependencies passed through a variable are not inspected
        Some(_) => None,
    }
}

/// `props` covers `props.gameId`
fn covered(dep: &str, existing: &[String]) -> bool {
    existing.iter().any(|e| {
        e == dep
            || dep
                .strip_prefix(e.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    })
}

/// Values of a component or hook body that can change between renders
#[derive(Default)]
struct ReactiveScope {
    /// Name of an un-destructured props parameter
    props_param: Option<String>,
    names: HashSet<String>,
}

impl ReactiveScope {
    fn of(unit: &SourceUnit, owner: Node<'_>) -> Self {
        let mut scope = Self::default();
        let takes_props = matches!(unit.role(), Role::Component | Role::Page);

        for (index, param) in syntax::function_parameters(owner).into_iter().enumerate() {
            if index == 0 && takes_props {
                let pattern = match param.kind() {
                    "required_parameter" | "optional_parameter" => {
                        param.child_by_field_name("pattern")
                    }
                    _ => Some(param),
                };
                if let Some(pattern) = pattern.filter(|p| p.kind() == "identifier") {
                    scope.props_param = Some(unit.node_text(pattern).to_string());
                    continue;
                }
            }
            scope.bind(unit, param);
        }

        let Some(body) = syntax::function_body(owner) else {
            return scope;
        };
        for node in syntax::descendants(body) {
            if !syntax::enclosing_function(node).is_some_and(|f| f.id() == owner.id()) {
                continue;
            }
            match node.kind() {
                "variable_declarator" => scope.bind_local(unit, node),
                "function_declaration" => {
                    if let Some(name) = node.child_by_field_name("name") {
                        scope.names.insert(unit.node_text(name).to_string());
                    }
                }
                _ => {}
            }
        }
        scope
    }

    fn bind(&mut self, unit: &SourceUnit, pattern: Node<'_>) {
        for name in bound_names(pattern) {
            self.names.insert(unit.node_text(name).to_string());
        }
    }

    fn bind_local(&mut self, unit: &SourceUnit, declarator: Node<'_>) {
        let Some(pattern) = declarator.child_by_field_name("name") else {
            return;
        };
        let hook = declarator
            .child_by_field_name("value")
            .filter(|v| v.kind() == "call_expression")
            .and_then(|v| syntax::callee_name(v, unit.text()));
        // Refs are stable across renders
        if hook == Some("useRef") {
            return;
        }
        let has_setter = hook.is_some_and(|h| STATE_HOOKS.contains(&h));
        if pattern.kind() == "array_pattern" && has_setter {
            for (index, element) in syntax::named_children(pattern).into_iter().enumerate() {
                if index != 1 {
                    self.bind(unit, element);
                }
            }
        } else {
            self.bind(unit, pattern);
        }
    }

    /// Reactive values read by `callback`, in order of first appearance
    fn referenced_in(&self, unit: &SourceUnit, callback: Node<'_>) -> Vec<String> {
        let nodes = syntax::descendants(callback);

        let mut shadowed: HashSet<&str> = HashSet::new();
        for node in &nodes {
            if node.kind() == "variable_declarator" {
                if let Some(pattern) = node.child_by_field_name("name") {
                    shadowed.extend(bound_names(pattern).into_iter().map(|n| unit.node_text(n)));
                }
            } else if syntax::is_function_kind(node.kind()) {
                for param in syntax::function_parameters(*node) {
                    shadowed.extend(bound_names(param).into_iter().map(|n| unit.node_text(n)));
                }
            }
        }

        let props = self.props_param.as_deref();
        let mut deps: Vec<String> = Vec::new();
        let mut push = |dep: String| {
            if !deps.contains(&dep) {
                deps.push(dep);
            }
        };

        for node in &nodes {
            match node.kind() {
                "member_expression" => {
                    let object = node.child_by_field_name("object");
                    let property = node.child_by_field_name("property");
                    if let (Some(object), Some(property)) = (object, property) {
                        let object_name = unit.node_text(object);
                        if object.kind() == "identifier"
                            && Some(object_name) == props
                            && !shadowed.contains(object_name)
                        {
                            push(format!("{}.{}", object_name, unit.node_text(property)));
                        }
                    }
                }
                "identifier" | "shorthand_property_identifier" => {
                    let name = unit.node_text(*node);
                    if shadowed.contains(name) {
                        continue;
                    }
                    if self.names.contains(name) {
                        push(name.to_string());
                    } else if Some(name) == props && !is_member_object(*node) {
                        push(name.to_string());
                    }
                }
                _ => {}
            }
        }
        deps
    }
}

/// Identifiers a binding pattern introduces
fn bound_names<'t>(pattern: Node<'t>) -> Vec<Node<'t>> {
    match pattern.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => vec![pattern],
        "object_pattern" | "array_pattern" => syntax::named_children(pattern)
            .into_iter()
            .flat_map(bound_names)
            .collect(),
        "pair_pattern" => pattern
            .child_by_field_name("value")
            .map(bound_names)
            .unwrap_or_default(),
        "object_assignment_pattern" | "assignment_pattern" => pattern
            .child_by_field_name("left")
            .map(bound_names)
            .unwrap_or_default(),
        "required_parameter" | "optional_parameter" => pattern
            .child_by_field_name("pattern")
            .map(bound_names)
            .unwrap_or_default(),
        "rest_pattern" => pattern.named_child(0).map(bound_names).unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn is_member_object(node: Node<'_>) -> bool {
    node.parent().is_some_and(|p| {
        p.kind() == "member_expression"
            && p.child_by_field_name("object")
                .is_some_and(|o| o.id() == node.id())
    })
}

// ── Naming ──────────────────────────────────────────────────────

/// `REACT19_HOOK_NAMING`: functions that call hooks are hooks
pub struct HookNamingDetector;

impl Detector for HookNamingDetector {
    fn name(&self) -> &str {
        "Hook naming"
    }

    fn framework(&self) -> Framework {
        Framework::React
    }

    fn applies_to(&self, role: Role) -> bool {
        matches!(role, Role::Hook | Role::Utility)
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        ctx.uses(Framework::React)
    }

    fn detect(
        &self,
        unit: &SourceUnit,
        _ctx: &ProjectContext,
    ) -> Result<ValidationResult, DetectorError> {
        let mut issues = Vec::new();

        for function in unit.top_level_functions() {
            if !function.exported || function.has_jsx() {
                continue;
            }
            let Some(name) = function.name(unit) else {
                continue;
            };
            if syntax::is_hook_name(name) || naming::is_pascal_case(name) {
                continue;
            }
            let calls_hook = syntax::descendants(function.function).into_iter().any(|n| {
                n.kind() == "call_expression"
                    && syntax::enclosing_function(n).is_some_and(|f| f.id() == function.function.id())
                    && syntax::callee_name(n, unit.text()).is_some_and(syntax::is_hook_name)
            });
            if !calls_hook {
                continue;
            }

            let suggested = format!("use{}", naming::to_pascal_case(name));
            issues.push(
                unit_issue(
                    unit,
                    Severity::Warning,
                    Framework::React,
                    "REACT19_HOOK_NAMING",
                    format!("`{}` calls hooks, so it must be named like a hook (`{}`)", name, suggested),
                    function.name_node().map(syntax::line).unwrap_or(1),
                )
                .with_fix(FixDescriptor::manual(
                    format!("Rename `{}` to `{}`", name, suggested),
                    &["Update every call site to the new name"],
                )),
            );
        }

        Ok(ValidationResult::new(issues))
    }
}
