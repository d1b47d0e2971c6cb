//! Post-fix sanity checks run before a transformed file is written
//!
//! A transformed text is rejected whenever it fails to parse, carries error
//! or missing nodes, has unbalanced brackets, or closes a JSX element with
//! the wrong tag. The original text only shapes the message wording.

use crate::issue::{Framework, Issue, Severity};
use crate::parser::{parse_tree, SourceLanguage};
use crate::syntax;
use std::path::Path;

/// Problems in `transformed`; an empty list means it is safe to write
pub fn validate(path: &Path, original: &str, transformed: &str) -> Vec<Issue> {
    let Some(language) = SourceLanguage::from_path(path) else {
        return Vec::new();
    };
    let mut issues = Vec::new();

    if let Some(line) = unbalanced_line(transformed, language) {
        let message = if unbalanced_line(original, language).is_some() {
            "Brackets are still unbalanced after transformation"
        } else {
            "Brackets are unbalanced after transformation"
        };
        issues.push(validation_issue(
            path,
            "VALIDATION_UNBALANCED_BRACKETS",
            message.to_string(),
            line,
        ));
    }

    let Ok(after) = parse_tree(transformed, language) else {
        issues.push(validation_issue(
            path,
            "VALIDATION_SYNTAX_ERROR",
            "Transformed file could not be parsed".to_string(),
            1,
        ));
        return issues;
    };
    if after.root_node().has_error() {
        let line = first_error_line(after.root_node()).unwrap_or(1);
        let was_valid = parse_tree(original, language).is_ok_and(|t| !t.root_node().has_error());
        let message = if was_valid {
            format!("Transformation introduced a syntax error at line {}", line)
        } else {
            format!("Transformed file still has a syntax error at line {}", line)
        };
        issues.push(validation_issue(path, "VALIDATION_SYNTAX_ERROR", message, line));
    }

    for element in syntax::descendants(after.root_node())
        .into_iter()
        .filter(|n| n.kind() == "jsx_element")
    {
        let tag_name = |field: &str| {
            element
                .child_by_field_name(field)
                .and_then(|tag| tag.child_by_field_name("name"))
                .map(|name| syntax::text(name, transformed))
        };
        if let (Some(open), Some(close)) = (tag_name("open_tag"), tag_name("close_tag")) {
            if open != close {
                issues.push(validation_issue(
                    path,
                    "VALIDATION_JSX_MISMATCH",
                    format!("`<{}>` is closed by `</{}>`", open, close),
                    syntax::line(element),
                ));
            }
        }
    }

    issues
}

fn validation_issue(path: &Path, code: &str, message: String, line: usize) -> Issue {
    Issue::new(Severity::Error, Framework::Other, code, message, path, line)
}

fn first_error_line(node: tree_sitter::Node<'_>) -> Option<usize> {
    syntax::descendants(node)
        .into_iter()
        .find(|n| n.is_error() || n.is_missing())
        .map(syntax::line)
}

/// 1-indexed line of the first bracket problem in `text`, if any.
///
/// Walks the real tokens of the syntax tree, so brackets inside strings,
/// template text, regex literals, JSX text and comments never count. A
/// closer that does not match reports its own line; otherwise the first
/// opener left unclosed is reported. Tokens the parser invented during error
/// recovery are skipped.
pub fn unbalanced_line(text: &str, language: SourceLanguage) -> Option<usize> {
    let tree = parse_tree(text, language).ok()?;
    let mut stack: Vec<(&str, usize)> = Vec::new();

    for token in syntax::descendants(tree.root_node())
        .into_iter()
        .filter(|n| n.child_count() == 0 && !n.is_missing())
    {
        let line = syntax::line(token);
        match token.kind() {
            "(" | "[" | "{" | "{|" | "${" => stack.push((token.kind(), line)),
            closer @ (")" | "]" | "}" | "|}") => {
                let matched = match stack.pop() {
                    Some((open, _)) => matches!(
                        (open, closer),
                        ("(", ")") | ("[", "]") | ("{" | "${", "}") | ("{|", "|}")
                    ),
                    None => false,
                };
                if !matched {
                    return Some(line);
                }
            }
            _ => {}
        }
    }

    stack.first().map(|(_, line)| *line)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: SourceLanguage = SourceLanguage::TypeScript;
    const TSX: SourceLanguage = SourceLanguage::Tsx;

    #[test]
    fn strings_comments_and_templates_are_ignored() {
        assert_eq!(unbalanced_line("const a = '{';\n// )\n/* ] */\n", TS), None);
        assert_eq!(unbalanced_line("const s = `a ${fn({ b: 1 })} }`;\n", TS), None);
        assert_eq!(unbalanced_line("if (a < b && c > d) { x(); }\n", TS), None);
    }

    #[test]
    fn jsx_text_and_regex_literals_are_ignored() {
        let jsx = "export const A = () => <p>Don't (really)</p>;\n";
        assert_eq!(unbalanced_line(jsx, TSX), None);
        assert!(validate(Path::new("a.tsx"), jsx, jsx).is_empty());

        let regex = "const open = /[(]/;\nconst quote = /'/;\n";
        assert_eq!(unbalanced_line(regex, TS), None);
        assert!(validate(Path::new("a.ts"), regex, regex).is_empty());
    }

    #[test]
    fn reports_first_unbalanced_line() {
        assert_eq!(unbalanced_line("function a() {\n  return 1;\n", TS), Some(1));
        assert_eq!(unbalanced_line("a();\n}\n", TS), Some(2));
    }

    #[test]
    fn pre_existing_problems_still_block() {
        let broken = "function a() {\n";
        let issues = validate(Path::new("a.ts"), broken, "'use client';\nfunction a() {\n");
        assert!(!issues.is_empty());
        assert!(issues
            .iter()
            .any(|i| i.rule_code == "VALIDATION_UNBALANCED_BRACKETS" && i.message.contains("still")));
    }

    #[test]
    fn jsx_tag_mismatch_is_flagged() {
        let original = "export const A = () => <div>hi</div>;\n";
        let transformed = "export const A = () => <div>hi</span>;\n";
        let issues = validate(Path::new("a.tsx"), original, transformed);
        assert!(!issues.is_empty());
    }
}
