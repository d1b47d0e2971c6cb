//! Two-tier `replace`: syntax-tree targeted first, raw-text regex as fallback
//!
//! The tree tier only rewrites inside nodes of the requested
//! [`ReplaceContext`], so a component rename does not touch a string or
//! comment that happens to contain the same word. When the tree tier finds
//! nothing (typically because an earlier fix reshaped the file) the whole
//! text is substituted instead.

use super::{splice, TransformError};
use crate::detectors::tailwind;
use crate::issue::ReplaceContext;
use crate::parser::{parse_tree, SourceLanguage};
use crate::syntax;
use regex::Regex;
use std::ops::Range;
use tree_sitter::Node;

/// Which tier produced a replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceTier {
    Tree,
    Text,
}

impl std::fmt::Display for ReplaceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplaceTier::Tree => write!(f, "syntax tree"),
            ReplaceTier::Text => write!(f, "text"),
        }
    }
}

pub fn apply(
    text: &str,
    language: SourceLanguage,
    pattern: &str,
    replacement: &str,
    context: Option<ReplaceContext>,
) -> Result<(String, ReplaceTier), TransformError> {
    let re = Regex::new(pattern)?;

    if let Some(context) = context {
        if let Some(replaced) = tree_replace(text, language, &re, replacement, context)? {
            return Ok((replaced, ReplaceTier::Tree));
        }
        tracing::debug!(pattern, ?context, "no matching node, falling back to text replace");
    }

    text_replace(text, &re, replacement, context)
        .map(|replaced| (replaced, ReplaceTier::Text))
        .ok_or_else(|| TransformError::NotFound(format!("no match for `{}`", pattern)))
}

/// Rewrite matches inside nodes of `context`; `None` when no node matches
pub fn tree_replace(
    text: &str,
    language: SourceLanguage,
    re: &Regex,
    replacement: &str,
    context: ReplaceContext,
) -> Result<Option<String>, TransformError> {
    let tree = parse_tree(text, language)?;
    let candidates = candidates(tree.root_node(), text, context);

    let matching: Vec<Node<'_>> = candidates
        .into_iter()
        .filter(|n| re.is_match(syntax::text(*n, text)))
        .collect();

    // A rename must at least hit the declaration itself
    if context == ReplaceContext::ComponentDeclaration && !matching.iter().any(|n| is_declaration_name(*n)) {
        return Ok(None);
    }

    let mut ranges: Vec<Range<usize>> = Vec::new();
    let mut sorted = matching;
    sorted.sort_by_key(|n| n.start_byte());
    for node in sorted {
        let range = node.byte_range();
        // Nested candidates (a string inside a template literal) are covered by their parent
        if ranges.last().is_some_and(|last| range.start < last.end) {
            continue;
        }
        ranges.push(range);
    }
    if ranges.is_empty() {
        return Ok(None);
    }

    let edits = ranges
        .into_iter()
        .map(|range| {
            let replaced = substitute(re, &text[range.clone()], replacement, Some(context));
            (range, replaced)
        })
        .collect();
    let replaced = splice(text, edits);
    Ok((replaced != text).then_some(replaced))
}

/// Global substitution over raw text; `None` when nothing changes
pub fn text_replace(
    text: &str,
    re: &Regex,
    replacement: &str,
    context: Option<ReplaceContext>,
) -> Option<String> {
    let replaced = substitute(re, text, replacement, context);
    (replaced != text).then_some(replaced)
}

/// Passes over a class string; two always suffice, the rest is slack
const MAX_CLASS_PASSES: usize = 4;

/// `replace_all`, repeated for class tokens.
///
/// Neighbouring class tokens share the whitespace between them, so a match
/// that consumes its trailing separator hides the next occurrence from the
/// same pass (`flex-grow flex-grow`). Later passes pick those up.
fn substitute(re: &Regex, text: &str, replacement: &str, context: Option<ReplaceContext>) -> String {
    let mut out = re.replace_all(text, replacement).into_owned();
    if context != Some(ReplaceContext::ClassName) {
        return out;
    }
    for _ in 1..MAX_CLASS_PASSES {
        let next = re.replace_all(&out, replacement).into_owned();
        if next == out {
            break;
        }
        out = next;
    }
    out
}

fn candidates<'t>(root: Node<'t>, source: &str, context: ReplaceContext) -> Vec<Node<'t>> {
    match context {
        ReplaceContext::ComponentDeclaration => syntax::descendants(root)
            .into_iter()
            .filter(|n| n.kind() == "identifier")
            .collect(),
        ReplaceContext::Import => syntax::named_children(root)
            .into_iter()
            .filter(|n| n.kind() == "import_statement")
            .collect(),
        ReplaceContext::ClassName => tailwind::class_strings(root, source),
        ReplaceContext::StringLiteral => syntax::descendants(root)
            .into_iter()
            .filter(|n| matches!(n.kind(), "string" | "template_string"))
            .collect(),
    }
}

fn is_declaration_name(node: Node<'_>) -> bool {
    node.parent().is_some_and(|parent| {
        matches!(
            parent.kind(),
            "function_declaration" | "class_declaration" | "variable_declarator"
        ) && parent
            .child_by_field_name("name")
            .is_some_and(|name| name.id() == node.id())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_tier_leaves_strings_alone() {
        let source = "export function scoreCard() {\n  return <div title=\"scoreCard\" />;\n}\n";
        let (out, tier) = apply(
            source,
            SourceLanguage::Tsx,
            r"\bscoreCard\b",
            "ScoreCard",
            Some(ReplaceContext::ComponentDeclaration),
        )
        .unwrap();
        assert_eq!(tier, ReplaceTier::Tree);
        assert!(out.contains("function ScoreCard()"));
        assert!(out.contains("title=\"scoreCard\""));
    }

    #[test]
    fn falls_back_to_text_when_no_node_matches() {
        let source = "// scoreCard\nexport const x = 1;\n";
        let (out, tier) = apply(
            source,
            SourceLanguage::TypeScript,
            r"\bscoreCard\b",
            "ScoreCard",
            Some(ReplaceContext::ComponentDeclaration),
        )
        .unwrap();
        assert_eq!(tier, ReplaceTier::Text);
        assert!(out.starts_with("// ScoreCard"));
    }

    #[test]
    fn adjacent_repeated_class_tokens_are_all_rewritten() {
        let pattern = tailwind::class_token_pattern("flex-grow");
        let source = "export const A = () => <div className=\"flex-grow flex-grow flex-grow md:flex-grow\" />;\n";
        let (out, tier) = apply(
            source,
            SourceLanguage::Tsx,
            &pattern,
            "${pre}grow${post}",
            Some(ReplaceContext::ClassName),
        )
        .unwrap();
        assert_eq!(tier, ReplaceTier::Tree);
        assert!(out.contains("className=\"grow grow grow md:grow\""), "{}", out);
    }

    #[test]
    fn no_match_anywhere_is_not_found() {
        let result = apply("const a = 1;\n", SourceLanguage::JavaScript, "zzz", "y", None);
        assert!(matches!(result, Err(TransformError::NotFound(_))));
    }
}
