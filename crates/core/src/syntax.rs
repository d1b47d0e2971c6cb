//! Small helpers over tree-sitter nodes shared by detectors and transformers

use regex::Regex;
use std::sync::LazyLock;
use tree_sitter::Node;

static HOOK_NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^use[A-Z]").unwrap());

/// Hooks shipped by React itself
pub const BUILTIN_HOOKS: &[&str] = &[
    "useState",
    "useEffect",
    "useLayoutEffect",
    "useInsertionEffect",
    "useContext",
    "useReducer",
    "useCallback",
    "useMemo",
    "useRef",
    "useImperativeHandle",
    "useDebugValue",
    "useDeferredValue",
    "useTransition",
    "useId",
    "useSyncExternalStore",
    "useOptimistic",
    "useActionState",
    "useFormStatus",
];

pub fn is_hook_name(name: &str) -> bool {
    HOOK_NAME_RE.is_match(name)
}

pub fn is_builtin_hook(name: &str) -> bool {
    BUILTIN_HOOKS.contains(&name)
}

pub fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

/// 1-indexed start line
pub fn line(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

/// Pre-order list of `node` and all its descendants
pub fn descendants<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    collect(node, &mut out);
    out
}

fn collect<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    out.push(node);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect(child, out);
    }
}

/// Named children of `node` as an owned list
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Whether `node` has an unnamed child token with the given text (e.g. `default`)
pub fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| !c.is_named() && c.kind() == token);
    found
}

pub fn is_function_kind(kind: &str) -> bool {
    matches!(
        kind,
        "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "function"
            | "generator_function"
            | "arrow_function"
            | "method_definition"
    )
}

pub fn is_jsx_kind(kind: &str) -> bool {
    matches!(
        kind,
        "jsx_element" | "jsx_self_closing_element" | "jsx_fragment"
    )
}

pub fn contains_jsx(node: Node<'_>) -> bool {
    descendants(node).iter().any(|n| is_jsx_kind(n.kind()))
}

/// Nearest function-like ancestor of `node` (excluding `node` itself)
pub fn enclosing_function<'t>(node: Node<'t>) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(n) = current {
        if is_function_kind(n.kind()) {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

/// Callee name of a call expression: `foo()` → foo, `React.foo()` → foo
pub fn callee_name<'s>(call: Node<'_>, source: &'s str) -> Option<&'s str> {
    let callee = call.child_by_field_name("function")?;
    match callee.kind() {
        "identifier" => Some(text(callee, source)),
        "member_expression" => callee
            .child_by_field_name("property")
            .map(|p| text(p, source)),
        _ => None,
    }
}

/// Every call to `name` under `node`, in source order
pub fn calls_named<'t>(node: Node<'t>, source: &str, name: &str) -> Vec<Node<'t>> {
    descendants(node)
        .into_iter()
        .filter(|n| n.kind() == "call_expression" && callee_name(*n, source) == Some(name))
        .collect()
}

/// Argument nodes of a call expression, in order
pub fn call_arguments<'t>(call: Node<'t>) -> Vec<Node<'t>> {
    call.child_by_field_name("arguments")
        .map(named_children)
        .unwrap_or_default()
        .into_iter()
        .filter(|n| n.kind() != "comment")
        .collect()
}

/// Unquoted value of a `string` node
pub fn string_value<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    let raw = text(node, source);
    raw.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

/// Directive prologue value if `statement` is `'use client';` or similar
pub fn directive_value<'s>(statement: Node<'_>, source: &'s str) -> Option<&'s str> {
    if statement.kind() != "expression_statement" {
        return None;
    }
    let expr = statement.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }
    let value = string_value(expr, source);
    matches!(value, "use client" | "use server").then_some(value)
}

/// Whether top-level statement `node` declares `name`
pub fn declares_name(node: Node<'_>, source: &str, name: &str) -> bool {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" | "class_declaration" => node
            .child_by_field_name("name")
            .is_some_and(|n| text(n, source) == name),
        "lexical_declaration" | "variable_declaration" => named_children(node)
            .into_iter()
            .filter(|d| d.kind() == "variable_declarator")
            .any(|d| {
                d.child_by_field_name("name")
                    .is_some_and(|n| text(n, source) == name)
            }),
        _ => false,
    }
}

/// Parameters node of any function-like node
pub fn function_parameters<'t>(function: Node<'t>) -> Vec<Node<'t>> {
    if let Some(params) = function.child_by_field_name("parameters") {
        return named_children(params)
            .into_iter()
            .filter(|n| n.kind() != "comment")
            .collect();
    }
    // `x => ...` arrow functions expose a single `parameter`
    function
        .child_by_field_name("parameter")
        .into_iter()
        .collect()
}

/// Body node of any function-like node
pub fn function_body<'t>(function: Node<'t>) -> Option<Node<'t>> {
    function.child_by_field_name("body")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_names_require_capital_after_use() {
        assert!(is_hook_name("useState"));
        assert!(is_hook_name("useGameScore"));
        assert!(!is_hook_name("use"));
        assert!(!is_hook_name("user"));
        assert!(!is_hook_name("username"));
    }
}
