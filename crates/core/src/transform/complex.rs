//! Named rewrites that need more than a pattern substitution

use super::{splice, TransformError};
use crate::issue::ComplexTransform;
use crate::parser::{parse_tree, SourceLanguage};
use crate::syntax;
use std::ops::Range;
use tree_sitter::Node;

pub fn apply(
    text: &str,
    language: SourceLanguage,
    transform: &ComplexTransform,
) -> Result<String, TransformError> {
    match transform {
        ComplexTransform::ConvertDefaultExport => convert_default_export(text, language),
        ComplexTransform::SyncHookDependencies {
            hook,
            occurrence,
            dependencies,
        } => sync_hook_dependencies(text, language, hook, *occurrence, dependencies),
        ComplexTransform::HoistDirective { directive } => {
            hoist_directive(text, language, directive)
        }
    }
}

/// `export default X` → `export` modifier on X's declaration
pub fn convert_default_export(
    text: &str,
    language: SourceLanguage,
) -> Result<String, TransformError> {
    let tree = parse_tree(text, language)?;
    let root = tree.root_node();
    let statements = syntax::named_children(root);

    let statement = statements
        .iter()
        .copied()
        .find(|n| n.kind() == "export_statement" && syntax::has_token(*n, "default"))
        .ok_or_else(|| TransformError::NotFound("default export".to_string()))?;

    // `export default function X() {}`: drop the `default` keyword
    if let Some(declaration) = statement.child_by_field_name("declaration") {
        if declaration.child_by_field_name("name").is_none() {
            return Err(TransformError::NotFound(
                "name of the default-exported declaration".to_string(),
            ));
        }
        let default = default_token(statement)
            .ok_or_else(|| TransformError::NotFound("`default` keyword".to_string()))?;
        return Ok(splice(
            text,
            vec![(default.start_byte()..declaration.start_byte(), String::new())],
        ));
    }

    let value = statement
        .child_by_field_name("value")
        .filter(|v| v.kind() == "identifier")
        .ok_or_else(|| TransformError::NotFound("identifier after `export default`".to_string()))?;
    let name = syntax::text(value, text);

    let declaring = statements
        .iter()
        .copied()
        .find(|n| {
            syntax::declares_name(*n, text, name)
                || (n.kind() == "export_statement"
                    && n.child_by_field_name("declaration")
                        .is_some_and(|d| syntax::declares_name(d, text, name)))
        })
        .ok_or_else(|| TransformError::NotFound(format!("declaration of `{}`", name)))?;

    let mut edits = vec![(with_trailing_newline(text, statement.byte_range()), String::new())];
    if declaring.kind() != "export_statement" {
        let start = declaring.start_byte();
        edits.push((start..start, "export ".to_string()));
    }

    let converted = splice(text, edits);
    let mut tidy = converted.trim_end().to_string();
    tidy.push('\n');
    Ok(tidy)
}

fn default_token(statement: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = statement.walk();
    let found = statement
        .children(&mut cursor)
        .find(|c| !c.is_named() && c.kind() == "default");
    found
}

/// Extend `range` over the newline that ends its line, if any
fn with_trailing_newline(text: &str, range: Range<usize>) -> Range<usize> {
    let rest = &text[range.end..];
    let spaces = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    let after = &rest[spaces..];
    if after.starts_with("\r\n") {
        range.start..range.end + spaces + 2
    } else if after.starts_with('\n') {
        range.start..range.end + spaces + 1
    } else {
        range
    }
}

/// Give the `occurrence`-th call to `hook` exactly `dependencies`
pub fn sync_hook_dependencies(
    text: &str,
    language: SourceLanguage,
    hook: &str,
    occurrence: usize,
    dependencies: &[String],
) -> Result<String, TransformError> {
    let tree = parse_tree(text, language)?;
    let calls = syntax::calls_named(tree.root_node(), text, hook);
    let call = calls
        .get(occurrence)
        .ok_or_else(|| TransformError::NotFound(format!("call #{} to {}", occurrence + 1, hook)))?;

    let args = syntax::call_arguments(*call);
    let array = format!("[{}]", dependencies.join(", "));
    match args.as_slice() {
        [callback] => {
            let end = callback.end_byte();
            Ok(splice(text, vec![(end..end, format!(", {}", array))]))
        }
        [_, deps, ..] if deps.kind() == "array" => Ok(splice(text, vec![(deps.byte_range(), array)])),
        [] => Err(TransformError::NotFound(format!("callback of {}", hook))),
        _ => Err(TransformError::NotFound(format!(
            "literal dependency array of {}",
            hook
        ))),
    }
}

/// Move a `'use client'` / `'use server'` statement to the top of the file
pub fn hoist_directive(
    text: &str,
    language: SourceLanguage,
    directive: &str,
) -> Result<String, TransformError> {
    let tree = parse_tree(text, language)?;
    let statements: Vec<Node<'_>> = syntax::named_children(tree.root_node())
        .into_iter()
        .filter(|n| n.kind() != "comment")
        .collect();

    let target = statements
        .iter()
        .copied()
        .find(|n| syntax::directive_value(*n, text) == Some(directive))
        .ok_or_else(|| TransformError::NotFound(format!("'{}' directive", directive)))?;

    if statements.first().is_some_and(|first| first.id() == target.id()) {
        return Ok(text.to_string());
    }

    let moved = format!("{}\n", syntax::text(target, text));
    Ok(splice(
        text,
        vec![
            (0..0, moved),
            (with_trailing_newline(text, target.byte_range()), String::new()),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_export_of_identifier_becomes_named() {
        let source = "function Card() {\n  return null;\n}\n\nexport default Card;\n";
        let out = convert_default_export(source, SourceLanguage::Tsx).unwrap();
        assert_eq!(out, "export function Card() {\n  return null;\n}\n");
    }

    #[test]
    fn default_function_export_drops_keyword() {
        let source = "export default function Card() {\n  return null;\n}\n";
        let out = convert_default_export(source, SourceLanguage::Tsx).unwrap();
        assert!(out.starts_with("export function Card()"));
    }

    #[test]
    fn anonymous_default_export_is_not_found() {
        let source = "export default () => null;\n";
        let err = convert_default_export(source, SourceLanguage::Tsx).unwrap_err();
        assert!(matches!(err, TransformError::NotFound(_)));
    }

    #[test]
    fn dependency_array_is_appended_or_replaced() {
        let source = "useEffect(() => {\n  load(id);\n});\nuseEffect(() => {}, [a]);\n";
        let deps = vec!["id".to_string()];
        let out = sync_hook_dependencies(source, SourceLanguage::TypeScript, "useEffect", 0, &deps)
            .unwrap();
        assert!(out.contains("}, [id]);"));
        let out = sync_hook_dependencies(&out, SourceLanguage::TypeScript, "useEffect", 1, &deps)
            .unwrap();
        assert!(out.contains("useEffect(() => {}, [id]);"));
    }

    #[test]
    fn directive_moves_to_first_line() {
        let source = "import { useState } from 'react';\n'use client';\n\nexport const a = 1;\n";
        let out = hoist_directive(source, SourceLanguage::TypeScript, "use client").unwrap();
        assert!(out.starts_with("'use client';\nimport"));
        assert_eq!(out.matches("use client").count(), 1);
    }
}
