//! Issue types shared by every detector, the report and the healing engine

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Suggestion,
}

impl Severity {
    /// Lower rank sorts first (errors before warnings before suggestions)
    pub fn rank(self) -> u8 {
        match self {
            Severity::Error => 0,
            Severity::Warning => 1,
            Severity::Suggestion => 2,
        }
    }

    /// Parse a severity name as written in config files
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "error" => Some(Severity::Error),
            "warning" | "warn" => Some(Severity::Warning),
            "suggestion" | "info" => Some(Severity::Suggestion),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Suggestion => write!(f, "suggestion"),
        }
    }
}

/// Framework family an issue belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    React,
    Nextjs,
    Typescript,
    Tailwind,
    Vitest,
    Architecture,
    Other,
}

impl Framework {
    pub const ALL: [Framework; 7] = [
        Framework::React,
        Framework::Nextjs,
        Framework::Typescript,
        Framework::Tailwind,
        Framework::Vitest,
        Framework::Architecture,
        Framework::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Framework::React => "react",
            Framework::Nextjs => "nextjs",
            Framework::Typescript => "typescript",
            Framework::Tailwind => "tailwind",
            Framework::Vitest => "vitest",
            Framework::Architecture => "architecture",
            Framework::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.to_ascii_lowercase();
        match value.as_str() {
            "next" | "next.js" => Some(Framework::Nextjs),
            "ts" => Some(Framework::Typescript),
            _ => Self::ALL.into_iter().find(|f| f.as_str() == value),
        }
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syntactic role a `replace` fix targets before falling back to raw text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplaceContext {
    /// Identifiers bound to (and referencing) a component declaration
    ComponentDeclaration,
    /// A whole `import` statement
    Import,
    /// String content inside a `className` / `class` JSX attribute
    ClassName,
    /// Any string literal
    StringLiteral,
}

/// One edit applied to a JSON document, addressed by JSON pointer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum JsonOperation {
    /// Set the value at `pointer`, creating intermediate objects
    Set {
        pointer: String,
        value: serde_json::Value,
    },
    /// Remove the value at `pointer` if present
    Remove { pointer: String },
}

/// Bespoke rewrites that need more than a pattern substitution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ComplexTransform {
    /// Turn `export default X` into an `export` modifier on X's declaration
    ConvertDefaultExport,
    /// Make the `occurrence`-th call to `hook` carry exactly `dependencies`
    SyncHookDependencies {
        hook: String,
        occurrence: usize,
        dependencies: Vec<String>,
    },
    /// Move a `'use client'` / `'use server'` directive to the first line
    HoistDirective { directive: String },
}

impl ComplexTransform {
    pub fn name(&self) -> &'static str {
        match self {
            ComplexTransform::ConvertDefaultExport => "convert_default_export",
            ComplexTransform::SyncHookDependencies { .. } => "sync_hook_dependencies",
            ComplexTransform::HoistDirective { .. } => "hoist_directive",
        }
    }
}

/// Mechanical remediation attached to an issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FixDescriptor {
    RenameFile {
        old_path: PathBuf,
        new_path: PathBuf,
    },
    Replace {
        /// Regex; matched against node text first, raw text as fallback
        pattern: String,
        replacement: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<ReplaceContext>,
    },
    InsertLine {
        /// 1-indexed
        line: usize,
        content: String,
    },
    UpdateJson {
        path: PathBuf,
        operations: Vec<JsonOperation>,
    },
    CreateFile {
        path: PathBuf,
        content: String,
    },
    Complex {
        transform: ComplexTransform,
    },
    /// No automatic effect; surfaced to the user only
    Manual {
        description: String,
        #[serde(default)]
        steps: Vec<String>,
    },
}

impl FixDescriptor {
    pub fn manual(description: impl Into<String>, steps: &[&str]) -> Self {
        FixDescriptor::Manual {
            description: description.into(),
            steps: steps.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Strategy name as shown in reports
    pub fn kind(&self) -> &'static str {
        match self {
            FixDescriptor::RenameFile { .. } => "rename_file",
            FixDescriptor::Replace { .. } => "replace",
            FixDescriptor::InsertLine { .. } => "insert_line",
            FixDescriptor::UpdateJson { .. } => "update_json",
            FixDescriptor::CreateFile { .. } => "create_file",
            FixDescriptor::Complex { .. } => "complex",
            FixDescriptor::Manual { .. } => "manual",
        }
    }
}

/// A single issue produced by a detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    pub file_path: PathBuf,

    /// 1-indexed; 0 for project-level issues
    pub line: usize,

    /// Stable rule identifier (e.g. `REACT19_CONDITIONAL_HOOK`)
    pub rule_code: String,

    pub framework: Framework,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utility: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixDescriptor>,
}

impl Issue {
    pub fn new(
        severity: Severity,
        framework: Framework,
        rule_code: &str,
        message: impl Into<String>,
        file_path: impl Into<PathBuf>,
        line: usize,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            file_path: file_path.into(),
            line,
            rule_code: rule_code.to_string(),
            framework,
            component: None,
            page: None,
            hook: None,
            utility: None,
            fix: None,
        }
    }

    pub fn with_fix(mut self, fix: FixDescriptor) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Name of whichever entity tag is set
    pub fn entity_name(&self) -> Option<&str> {
        self.component
            .as_deref()
            .or(self.page.as_deref())
            .or(self.hook.as_deref())
            .or(self.utility.as_deref())
    }
}

/// Return contract of every detector; composes by concatenation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub issues: Vec<Issue>,
}

impl ValidationResult {
    pub fn new(issues: Vec<Issue>) -> Self {
        let valid = !issues.iter().any(|i| i.severity == Severity::Error);
        Self { valid, issues }
    }

    pub fn empty() -> Self {
        Self {
            valid: true,
            issues: Vec::new(),
        }
    }

    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.valid &= other.valid;
        self.issues.extend(other.issues);
        self
    }

    pub fn push(&mut self, issue: Issue) {
        if issue.severity == Severity::Error {
            self.valid = false;
        }
        self.issues.push(issue);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<ValidationResult> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = ValidationResult>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::merge)
    }
}

/// Stable sort placing `architecture` issues first, emission order otherwise
pub fn sort_for_display(issues: &mut [Issue]) {
    issues.sort_by_key(|i| i.framework != Framework::Architecture);
}
