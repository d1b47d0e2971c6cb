//! Parsed in-memory view of one source file
//!
//! A [`SourceUnit`] owns the raw text, its syntax tree, the classified
//! [`Role`] and the role-specific [`SourceMeta`]. Units are immutable: after
//! an edit, build a new one with [`SourceUnit::with_text`] since every node
//! position of the old tree is stale.

use crate::classifier::{self, Role};
use crate::parser::{parse_strict, ParseError, SourceLanguage};
use crate::syntax;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Tree};

/// Semantic kind of a prop, inferred from its type or its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropKind {
    Function,
    Boolean,
    Number,
    String,
    Array,
    Node,
    Object,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropInfo {
    pub name: String,
    pub kind: PropKind,
    /// Declared type text when the prop is annotated
    pub type_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStyle {
    Named,
    Default,
    Both,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rendering {
    /// Leading `'use client'`
    Client,
    /// Leading `'use server'`
    Server,
    /// No directive prologue
    Unmarked,
}

/// Role-specific facts derived from the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMeta {
    /// Name of the primary component / hook / utility export
    pub primary_name: Option<String>,
    pub props: Vec<PropInfo>,
    pub event_handlers: Vec<String>,
    pub hooks_used: Vec<String>,
    pub export_style: ExportStyle,
    pub exported_functions: Vec<String>,
    pub rendering: Rendering,
    /// Calls hooks, binds `on*` handlers or touches browser globals
    pub uses_client_features: bool,
}

/// A function-like top-level declaration
#[derive(Debug, Clone, Copy)]
pub struct TopLevelFunction<'t> {
    pub function: Node<'t>,
    /// Top-level statement holding the function
    pub statement: Node<'t>,
    pub exported: bool,
    pub default_export: bool,
}

impl<'t> TopLevelFunction<'t> {
    pub fn name<'s>(&self, unit: &'s SourceUnit) -> Option<&'s str> {
        self.name_node().map(|n| unit.node_text(n))
    }

    /// Identifier that binds the function's name
    pub fn name_node(&self) -> Option<Node<'t>> {
        if let Some(name) = self.function.child_by_field_name("name") {
            return Some(name);
        }
        // `const Foo = () => ...` / `const Foo = memo(() => ...)`
        let mut current = self.function.parent();
        while let Some(node) = current {
            if node.kind() == "variable_declarator" {
                return node
                    .child_by_field_name("name")
                    .filter(|n| n.kind() == "identifier");
            }
            if node.id() == self.statement.id() {
                break;
            }
            current = node.parent();
        }
        None
    }

    pub fn has_jsx(&self) -> bool {
        syntax::contains_jsx(self.function)
    }
}

/// Parsed representation of one file
pub struct SourceUnit {
    path: PathBuf,
    text: String,
    language: SourceLanguage,
    tree: Tree,
    role: Role,
    meta: SourceMeta,
}

impl std::fmt::Debug for SourceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceUnit")
            .field("path", &self.path)
            .field("role", &self.role)
            .field("meta", &self.meta)
            .finish()
    }
}

impl SourceUnit {
    /// Read and parse a file from disk
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(path, text)
    }

    /// Parse `text` as the contents of `path`
    pub fn parse(path: &Path, text: String) -> Result<Self, ParseError> {
        let language = SourceLanguage::from_path(path)
            .ok_or_else(|| ParseError::UnsupportedLanguage(path.display().to_string()))?;
        let tree = parse_strict(&text, language)?;

        let mut unit = Self {
            path: path.to_path_buf(),
            text,
            language,
            tree,
            role: Role::Unknown,
            meta: SourceMeta {
                primary_name: None,
                props: Vec::new(),
                event_handlers: Vec::new(),
                hooks_used: Vec::new(),
                export_style: ExportStyle::None,
                exported_functions: Vec::new(),
                rendering: Rendering::Unmarked,
                uses_client_features: false,
            },
        };
        unit.role = classifier::classify(&unit);
        unit.meta = extract_meta(&unit);
        Ok(unit)
    }

    /// Re-parse with new contents; metadata is recomputed from scratch
    pub fn with_text(&self, text: String) -> Result<Self, ParseError> {
        Self::parse(&self.path, text)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> SourceLanguage {
        self.language
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn meta(&self) -> &SourceMeta {
        &self.meta
    }

    pub fn node_text(&self, node: Node<'_>) -> &str {
        syntax::text(node, &self.text)
    }

    /// File name without any extension (`score-card.test.tsx` → `score-card`)
    pub fn stem(&self) -> &str {
        file_stem(&self.path)
    }

    /// Top-level function-like declarations with their export status
    pub fn top_level_functions(&self) -> Vec<TopLevelFunction<'_>> {
        let root = self.root();
        let mut found = Vec::new();
        let mut exported_names: HashSet<&str> = HashSet::new();
        let mut default_names: HashSet<&str> = HashSet::new();

        for statement in syntax::named_children(root) {
            match statement.kind() {
                "export_statement" => {
                    let is_default = syntax::has_token(statement, "default");
                    if let Some(decl) = statement.child_by_field_name("declaration") {
                        collect_declaration(decl, statement, true, is_default, &mut found);
                    } else if let Some(value) = statement.child_by_field_name("value") {
                        match value.kind() {
                            "identifier" => {
                                default_names.insert(self.node_text(value));
                            }
                            _ => collect_value(value, statement, true, is_default, &mut found),
                        }
                    } else if statement.child_by_field_name("source").is_none() {
                        // export { A, B as default }
                        for node in syntax::descendants(statement) {
                            if node.kind() != "export_specifier" {
                                continue;
                            }
                            let Some(name) = node.child_by_field_name("name") else {
                                continue;
                            };
                            let local = self.node_text(name);
                            let alias = node
                                .child_by_field_name("alias")
                                .map(|a| self.node_text(a));
                            if alias == Some("default") {
                                default_names.insert(local);
                            } else {
                                exported_names.insert(local);
                            }
                        }
                    }
                }
                _ => collect_declaration(statement, statement, false, false, &mut found),
            }
        }

        for item in &mut found {
            if let Some(name) = item.name(self) {
                if default_names.contains(name) {
                    item.exported = true;
                    item.default_export = true;
                } else if exported_names.contains(name) {
                    item.exported = true;
                }
            }
        }
        found
    }

    /// The declaration backing this unit's role, if any
    pub fn primary_function(&self) -> Option<TopLevelFunction<'_>> {
        let functions = self.top_level_functions();
        let exported = || functions.iter().copied().filter(|f| f.exported);
        match self.role {
            Role::Component | Role::Page => exported()
                .find(|f| f.has_jsx())
                .or_else(|| exported().find(|f| f.default_export))
                .or_else(|| functions.iter().copied().find(|f| f.has_jsx())),
            Role::Hook => exported().find(|f| f.name(self).is_some_and(syntax::is_hook_name)),
            Role::Utility => exported().next(),
            Role::Unknown => None,
        }
    }
}

/// File name up to the first dot
pub fn file_stem(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .unwrap_or("")
}

fn collect_declaration<'t>(
    decl: Node<'t>,
    statement: Node<'t>,
    exported: bool,
    default_export: bool,
    out: &mut Vec<TopLevelFunction<'t>>,
) {
    match decl.kind() {
        "function_declaration" | "generator_function_declaration" | "class_declaration" => {
            out.push(TopLevelFunction {
                function: decl,
                statement,
                exported,
                default_export,
            });
        }
        "lexical_declaration" | "variable_declaration" => {
            for declarator in syntax::named_children(decl) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                if let Some(value) = declarator.child_by_field_name("value") {
                    collect_value(value, statement, exported, default_export, out);
                }
            }
        }
        _ => {}
    }
}

/// Function values, including ones wrapped in `memo(...)` / `forwardRef(...)`
fn collect_value<'t>(
    value: Node<'t>,
    statement: Node<'t>,
    exported: bool,
    default_export: bool,
    out: &mut Vec<TopLevelFunction<'t>>,
) {
    let kind = value.kind();
    if syntax::is_function_kind(kind) || kind == "class" {
        out.push(TopLevelFunction {
            function: value,
            statement,
            exported,
            default_export,
        });
        return;
    }
    if kind == "call_expression" {
        for arg in syntax::call_arguments(value) {
            if syntax::is_function_kind(arg.kind()) || arg.kind() == "call_expression" {
                collect_value(arg, statement, exported, default_export, out);
                return;
            }
        }
    }
}

const BROWSER_GLOBALS: &[&str] = &["window", "document", "localStorage", "sessionStorage", "navigator"];

fn extract_meta(unit: &SourceUnit) -> SourceMeta {
    let functions = unit.top_level_functions();
    let primary = unit.primary_function();
    let root = unit.root();
    let all_nodes = syntax::descendants(root);

    let has_named = functions.iter().any(|f| f.exported && !f.default_export)
        || all_nodes.iter().any(|n| {
            n.kind() == "export_statement"
                && !syntax::has_token(*n, "default")
                && n.child_by_field_name("source").is_none()
                && n.child_by_field_name("declaration").is_some()
        });
    let has_default = all_nodes
        .iter()
        .any(|n| n.kind() == "export_statement" && syntax::has_token(*n, "default"))
        || functions.iter().any(|f| f.default_export);
    let export_style = match (has_named, has_default) {
        (true, true) => ExportStyle::Both,
        (true, false) => ExportStyle::Named,
        (false, true) => ExportStyle::Default,
        (false, false) => ExportStyle::None,
    };

    let exported_functions = functions
        .iter()
        .filter(|f| f.exported)
        .filter_map(|f| f.name(unit).map(String::from))
        .collect();

    let rendering = syntax::named_children(root)
        .into_iter()
        .find(|n| n.kind() != "comment")
        .and_then(|first| syntax::directive_value(first, unit.text()))
        .map(|d| match d {
            "use client" => Rendering::Client,
            _ => Rendering::Server,
        })
        .unwrap_or(Rendering::Unmarked);

    let mut hooks_used: Vec<String> = Vec::new();
    let mut event_handlers: Vec<String> = Vec::new();
    let mut uses_client_features = false;

    for node in &all_nodes {
        match node.kind() {
            "call_expression" => {
                if let Some(name) = syntax::callee_name(*node, unit.text()) {
                    if syntax::is_hook_name(name) {
                        uses_client_features = true;
                        if !hooks_used.iter().any(|h| h == name) {
                            hooks_used.push(name.to_string());
                        }
                    }
                }
            }
            "jsx_attribute" => {
                let Some(attr_name) = node.named_child(0) else {
                    continue;
                };
                let attr = unit.node_text(attr_name);
                let is_handler = attr.len() > 2
                    && attr.starts_with("on")
                    && attr[2..].starts_with(|c: char| c.is_ascii_uppercase());
                let has_expression = node
                    .named_child(1)
                    .is_some_and(|v| v.kind() == "jsx_expression");
                if is_handler && has_expression {
                    uses_client_features = true;
                    if !event_handlers.iter().any(|h| h == attr) {
                        event_handlers.push(attr.to_string());
                    }
                }
            }
            "identifier" => {
                if BROWSER_GLOBALS.contains(&unit.node_text(*node)) {
                    uses_client_features = true;
                }
            }
            _ => {}
        }
    }

    let props = primary
        .map(|f| extract_props(unit, f.function))
        .unwrap_or_default();
    for prop in &props {
        if prop.kind == PropKind::Function
            && prop.name.starts_with("on")
            && !event_handlers.contains(&prop.name)
        {
            event_handlers.push(prop.name.clone());
        }
    }

    let primary_name = primary
        .and_then(|f| f.name(unit).map(String::from))
        .or_else(|| match unit.role() {
            Role::Unknown => None,
            _ => Some(crate::naming::to_pascal_case(unit.stem())),
        });

    SourceMeta {
        primary_name,
        props,
        event_handlers,
        hooks_used,
        export_style,
        exported_functions,
        rendering,
        uses_client_features,
    }
}

/// Props from the first parameter of a component function
fn extract_props(unit: &SourceUnit, function: Node<'_>) -> Vec<PropInfo> {
    let Some(first) = syntax::function_parameters(function).into_iter().next() else {
        return Vec::new();
    };

    // TS wraps parameters as required_parameter { pattern, type }
    let (pattern, annotation) = match first.kind() {
        "required_parameter" | "optional_parameter" => (
            first.child_by_field_name("pattern"),
            first.child_by_field_name("type"),
        ),
        "assignment_pattern" => (first.child_by_field_name("left"), None),
        _ => (Some(first), None),
    };

    let declared = annotation
        .map(|a| declared_props(unit, a))
        .unwrap_or_default();

    let mut props: Vec<PropInfo> = Vec::new();
    let mut push = |name: &str| {
        if props.iter().any(|p| p.name == name) {
            return;
        }
        let type_text = declared
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t.clone());
        let kind = match &type_text {
            Some(t) => kind_from_type(t),
            None => kind_from_name(name),
        };
        props.push(PropInfo {
            name: name.to_string(),
            kind,
            type_text,
        });
    };

    match pattern.map(|p| (p, p.kind())) {
        Some((pattern, "object_pattern")) => {
            for child in syntax::named_children(pattern) {
                let name_node = match child.kind() {
                    "shorthand_property_identifier_pattern" => Some(child),
                    "object_assignment_pattern" => child.child_by_field_name("left"),
                    "pair_pattern" => child.child_by_field_name("key"),
                    _ => None,
                };
                if let Some(n) = name_node {
                    push(unit.node_text(n));
                }
            }
        }
        Some((pattern, "identifier")) => {
            let param = unit.node_text(pattern);
            if let Some(body) = syntax::function_body(function) {
                for node in syntax::descendants(body) {
                    if node.kind() != "member_expression" {
                        continue;
                    }
                    let object = node.child_by_field_name("object");
                    let property = node.child_by_field_name("property");
                    if let (Some(object), Some(property)) = (object, property) {
                        if object.kind() == "identifier" && unit.node_text(object) == param {
                            push(unit.node_text(property));
                        }
                    }
                }
            }
        }
        _ => {}
    }

    // Declared but never destructured still counts as a prop
    for (name, _) in &declared {
        push(name);
    }
    props
}

/// `(name, type)` pairs from a parameter type annotation
fn declared_props(unit: &SourceUnit, annotation: Node<'_>) -> Vec<(String, String)> {
    let Some(ty) = annotation.named_child(0) else {
        return Vec::new();
    };
    let holder = match ty.kind() {
        "object_type" => Some(ty),
        "type_identifier" => {
            let wanted = unit.node_text(ty);
            syntax::descendants(unit.root()).into_iter().find(|n| {
                matches!(n.kind(), "interface_declaration" | "type_alias_declaration")
                    && n.child_by_field_name("name")
                        .is_some_and(|name| unit.node_text(name) == wanted)
            })
        }
        _ => None,
    };
    let Some(holder) = holder else {
        return Vec::new();
    };
    syntax::descendants(holder)
        .into_iter()
        .filter(|n| n.kind() == "property_signature")
        .filter_map(|sig| {
            let name = unit.node_text(sig.child_by_field_name("name")?).to_string();
            let type_text = sig
                .child_by_field_name("type")
                .map(|t| unit.node_text(t).trim_start_matches(':').trim().to_string())
                .unwrap_or_default();
            Some((name, type_text))
        })
        .collect()
}

fn kind_from_type(type_text: &str) -> PropKind {
    let t = type_text.trim();
    if t.contains("=>") || t.starts_with("Function") {
        PropKind::Function
    } else if t == "boolean" {
        PropKind::Boolean
    } else if t == "number" {
        PropKind::Number
    } else if t == "string" || t.starts_with('\'') || t.starts_with('"') {
        PropKind::String
    } else if t.ends_with("[]") || t.starts_with("Array<") {
        PropKind::Array
    } else if t.contains("ReactNode") || t.contains("ReactElement") || t.contains("JSX.Element") {
        PropKind::Node
    } else if t.is_empty() {
        PropKind::Unknown
    } else {
        PropKind::Object
    }
}

fn kind_from_name(name: &str) -> PropKind {
    let starts_upper_after = |prefix: &str| {
        name.strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
    };
    if starts_upper_after("on") {
        PropKind::Function
    } else if ["is", "has", "should", "can", "show"]
        .iter()
        .any(|p| starts_upper_after(p))
        || matches!(name, "disabled" | "checked" | "open" | "loading" | "visible")
    {
        PropKind::Boolean
    } else if name == "children" {
        PropKind::Node
    } else if name.ends_with("Count")
        || matches!(name, "count" | "index" | "total" | "size" | "score" | "amount" | "max" | "min")
    {
        PropKind::Number
    } else if name.ends_with("Id")
        || matches!(name, "id" | "name" | "title" | "label" | "href" | "className" | "text")
    {
        PropKind::String
    } else if name.ends_with("List") || name.ends_with("Items") || name == "items" {
        PropKind::Array
    } else {
        PropKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_heuristics_cover_common_props() {
        assert_eq!(kind_from_name("onSelect"), PropKind::Function);
        assert_eq!(kind_from_name("isOpen"), PropKind::Boolean);
        assert_eq!(kind_from_name("gameId"), PropKind::String);
        assert_eq!(kind_from_name("playerCount"), PropKind::Number);
        assert_eq!(kind_from_name("once"), PropKind::Unknown);
    }

    #[test]
    fn type_text_beats_name() {
        assert_eq!(kind_from_type("() => void"), PropKind::Function);
        assert_eq!(kind_from_type("string[]"), PropKind::Array);
        assert_eq!(kind_from_type("React.ReactNode"), PropKind::Node);
        assert_eq!(kind_from_type("'sm' | 'lg'"), PropKind::String);
    }

    #[test]
    fn stem_strips_every_extension() {
        assert_eq!(file_stem(Path::new("src/score-card.test.tsx")), "score-card");
    }
}
