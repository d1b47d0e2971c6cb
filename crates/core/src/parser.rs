//! Tree-sitter front end for TypeScript / JavaScript sources

use std::path::Path;
use thiserror::Error;
use tree_sitter::{Parser, Tree};

/// Error types for parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Unsupported file type: {0}")]
    UnsupportedLanguage(String),

    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),

    #[error("Syntax error at line {line}")]
    Syntax { line: usize },
}

/// Grammar used for a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    TypeScript,
    Tsx,
    JavaScript,
}

/// File extensions the pipeline understands, with leading dot
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs"];

impl SourceLanguage {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext {
            "ts" | "mts" | "cts" => Some(SourceLanguage::TypeScript),
            "tsx" => Some(SourceLanguage::Tsx),
            "js" | "jsx" | "mjs" | "cjs" => Some(SourceLanguage::JavaScript),
            _ => None,
        }
    }

    pub fn is_typescript(self) -> bool {
        matches!(self, SourceLanguage::TypeScript | SourceLanguage::Tsx)
    }

    fn grammar(self) -> tree_sitter::Language {
        match self {
            SourceLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SourceLanguage::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            SourceLanguage::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        }
    }
}

fn create_parser(language: SourceLanguage) -> Result<Parser, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.grammar())
        .map_err(|e| ParseError::TreeSitter(e.to_string()))?;
    Ok(parser)
}

/// Parse `source` without judging its validity.
pub fn parse_tree(source: &str, language: SourceLanguage) -> Result<Tree, ParseError> {
    let mut parser = create_parser(language)?;
    parser
        .parse(source, None)
        .ok_or_else(|| ParseError::TreeSitter("parser returned no tree".to_string()))
}

/// Parse `source` and reject trees that contain error or missing nodes.
pub fn parse_strict(source: &str, language: SourceLanguage) -> Result<Tree, ParseError> {
    let tree = parse_tree(source, language)?;
    let root = tree.root_node();
    if root.has_error() {
        let line = first_error_line(root).unwrap_or(1);
        return Err(ParseError::Syntax { line });
    }
    Ok(tree)
}

fn first_error_line(node: tree_sitter::Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(line) = first_error_line(child) {
                return Some(line);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_grammar_by_extension() {
        assert_eq!(
            SourceLanguage::from_path(Path::new("a/Button.tsx")),
            Some(SourceLanguage::Tsx)
        );
        assert_eq!(
            SourceLanguage::from_path(Path::new("lib/util.mjs")),
            Some(SourceLanguage::JavaScript)
        );
        assert_eq!(SourceLanguage::from_path(Path::new("README.md")), None);
    }

    #[test]
    fn strict_parse_reports_error_line() {
        let err = parse_strict("const a = 1;\nfunction (\n", SourceLanguage::TypeScript)
            .unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn tsx_parses_jsx() {
        let tree = parse_strict(
            "export function A() { return <div className=\"x\" />; }",
            SourceLanguage::Tsx,
        )
        .unwrap();
        assert!(!tree.root_node().has_error());
    }
}
