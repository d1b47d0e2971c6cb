//! Tailwind CSS v4 class usage

use super::{unit_issue, Detector, DetectorError, ProjectDetector};
use crate::classifier::Role;
use crate::context::ProjectContext;
use crate::issue::{FixDescriptor, Framework, Issue, ReplaceContext, Severity, ValidationResult};
use crate::source::SourceUnit;
use crate::syntax;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tree_sitter::Node;

/// v3 utilities renamed in v4
pub const RENAMED_UTILITIES: &[(&str, &str)] = &[
    ("flex-grow", "grow"),
    ("flex-shrink", "shrink"),
    ("overflow-ellipsis", "text-ellipsis"),
    ("decoration-slice", "box-decoration-slice"),
    ("decoration-clone", "box-decoration-clone"),
    ("outline-none", "outline-hidden"),
];

static OPACITY_UTILITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(bg|text|border|divide|placeholder|ring)-opacity-\d+$").unwrap()
});

/// Regex matching `class` as a whole class token inside a class string
pub fn class_token_pattern(class: &str) -> String {
    format!(
        r#"(?P<pre>^|[\s"'`:!]){}(?P<post>$|[\s"'`])"#,
        regex::escape(class)
    )
}

/// `className` / `class` attributes of every JSX element
fn class_attributes<'t>(root: Node<'t>, source: &str) -> Vec<Node<'t>> {
    syntax::descendants(root)
        .into_iter()
        .filter(|n| n.kind() == "jsx_attribute")
        .filter(|n| {
            n.named_child(0)
                .is_some_and(|name| matches!(syntax::text(name, source), "className" | "class"))
        })
        .collect()
}

/// String literals anywhere inside a class attribute value
pub fn class_strings<'t>(root: Node<'t>, source: &str) -> Vec<Node<'t>> {
    class_attributes(root, source)
        .into_iter()
        .filter_map(|attr| attr.named_child(1))
        .flat_map(syntax::descendants)
        .filter(|n| n.kind() == "string" || n.kind() == "template_string")
        .collect()
}

/// Utility name without variants (`md:hover:flex-grow` → `flex-grow`)
fn utility_name(token: &str) -> &str {
    let base = token.rsplit(':').next().unwrap_or(token);
    base.trim_start_matches('!')
}

/// `TAILWIND_DEPRECATED_CLASS`, `TAILWIND_REMOVED_OPACITY_UTILITY` and
/// `TAILWIND_CLASS_CONCATENATION`
pub struct ClassNameDetector;

impl Detector for ClassNameDetector {
    fn name(&self) -> &str {
        "Tailwind class names"
    }

    fn framework(&self) -> Framework {
        Framework::Tailwind
    }

    fn applies_to(&self, role: Role) -> bool {
        matches!(role, Role::Component | Role::Page)
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        ctx.uses(Framework::Tailwind) && ctx.config.frameworks.tailwind.major() >= 4
    }

    fn detect(
        &self,
        unit: &SourceUnit,
        _ctx: &ProjectContext,
    ) -> Result<ValidationResult, DetectorError> {
        let mut issues = Vec::new();
        // One issue per utility: its fix rewrites every occurrence in the file
        let mut reported: HashSet<&str> = HashSet::new();

        for string in class_strings(unit.root(), unit.text()) {
            let line = syntax::line(string);
            for token in syntax::string_value(string, unit.text()).split_whitespace() {
                let utility = utility_name(token);
                if reported.contains(utility) {
                    continue;
                }
                if let Some((old, new)) = RENAMED_UTILITIES.iter().find(|(old, _)| *old == utility) {
                    reported.insert(utility);
                    issues.push(
                        unit_issue(
                            unit,
                            Severity::Warning,
                            Framework::Tailwind,
                            "TAILWIND_DEPRECATED_CLASS",
                            format!("`{}` was renamed to `{}` in Tailwind CSS v4", old, new),
                            line,
                        )
                        .with_fix(FixDescriptor::Replace {
                            pattern: class_token_pattern(old),
                            replacement: format!("${{pre}}{}${{post}}", new),
                            context: Some(ReplaceContext::ClassName),
                        }),
                    );
                } else if OPACITY_UTILITY_RE.is_match(utility) {
                    reported.insert(utility);
                    issues.push(removed_opacity_issue(unit, utility, line));
                }
            }
        }

        for attr in class_attributes(unit.root(), unit.text()) {
            if let Some(concat) = attr.named_child(1).and_then(string_concatenation) {
                issues.push(
                    unit_issue(
                        unit,
                        Severity::Suggestion,
                        Framework::Tailwind,
                        "TAILWIND_CLASS_CONCATENATION",
                        "Class names are built with `+`; Tailwind cannot detect partial class names".to_string(),
                        syntax::line(concat),
                    )
                    .with_fix(FixDescriptor::manual(
                        "Use complete class names",
                        &["Use a template literal or a `clsx`/`cn` helper with whole class names"],
                    )),
                );
            }
        }

        issues.sort_by_key(|i| i.line);
        Ok(ValidationResult::new(issues))
    }
}

fn removed_opacity_issue(unit: &SourceUnit, utility: &str, line: usize) -> Issue {
    let prefix = utility.split('-').next().unwrap_or(utility);
    let step = format!("Replace with a modifier such as `{}-black/50`", prefix);
    unit_issue(
        unit,
        Severity::Warning,
        Framework::Tailwind,
        "TAILWIND_REMOVED_OPACITY_UTILITY",
        format!("`{}` was removed in Tailwind CSS v4", utility),
        line,
    )
    .with_fix(FixDescriptor::manual(
        "Use an opacity modifier on the color utility",
        &[step.as_str()],
    ))
}

/// First `+` concatenation involving a string literal under `value`
fn string_concatenation(value: Node<'_>) -> Option<Node<'_>> {
    syntax::descendants(value).into_iter().find(|n| {
        n.kind() == "binary_expression"
            && n.child_by_field_name("operator").is_some_and(|op| op.kind() == "+")
            && syntax::named_children(*n)
                .iter()
                .any(|c| c.kind() == "string" || c.kind() == "template_string")
    })
}

/// `TAILWIND_INLINE_STYLE`: static inline styles instead of utilities
pub struct InlineStyleDetector;

impl Detector for InlineStyleDetector {
    fn name(&self) -> &str {
        "Inline styles"
    }

    fn framework(&self) -> Framework {
        Framework::Tailwind
    }

    fn applies_to(&self, role: Role) -> bool {
        matches!(role, Role::Component | Role::Page)
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        ctx.uses(Framework::Tailwind)
    }

    fn detect(
        &self,
        unit: &SourceUnit,
        _ctx: &ProjectContext,
    ) -> Result<ValidationResult, DetectorError> {
        let issues = syntax::descendants(unit.root())
            .into_iter()
            .filter(|n| n.kind() == "jsx_attribute")
            .filter(|n| n.named_child(0).is_some_and(|name| unit.node_text(name) == "style"))
            .filter(|n| {
                n.named_child(1)
                    .and_then(|v| v.named_child(0))
                    .is_some_and(|expr| expr.kind() == "object")
            })
            .map(|attr| {
                unit_issue(
                    unit,
                    Severity::Suggestion,
                    Framework::Tailwind,
                    "TAILWIND_INLINE_STYLE",
                    "Inline `style` object; prefer Tailwind utility classes".to_string(),
                    syntax::line(attr),
                )
                .with_fix(FixDescriptor::manual(
                    "Move static styles into `className` utilities",
                    &["Keep `style` only for values computed at runtime"],
                ))
            })
            .collect();
        Ok(ValidationResult::new(issues))
    }
}

/// `TAILWIND4_OUTDATED_VERSION`
pub struct TailwindVersionDetector;

impl ProjectDetector for TailwindVersionDetector {
    fn name(&self) -> &str {
        "Tailwind version"
    }

    fn framework(&self) -> Framework {
        Framework::Tailwind
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        ctx.uses(Framework::Tailwind)
    }

    fn detect(&self, ctx: &ProjectContext) -> Result<ValidationResult, DetectorError> {
        let target = ctx.config.frameworks.tailwind.major();
        let Some(declared) = ctx.dependency_version("tailwindcss") else {
            return Ok(ValidationResult::empty());
        };
        let outdated = crate::context::parse_major(declared).is_some_and(|major| major < target);
        if !outdated {
            return Ok(ValidationResult::empty());
        }

        // v4 moves configuration into CSS, so a version bump alone is not enough
        let issue = Issue::new(
            Severity::Warning,
            Framework::Tailwind,
            "TAILWIND4_OUTDATED_VERSION",
            format!("`tailwindcss` is at {} but the target is {}.x", declared, target),
            ctx.root.join("package.json"),
            0,
        )
        .with_fix(FixDescriptor::manual(
            "Upgrade Tailwind CSS with the official migration tool",
            &[
                "Run `npx @tailwindcss/upgrade`",
                "Review the migrated CSS entry point and remove tailwind.config.js if unused",
            ],
        ));
        Ok(ValidationResult::new(vec![issue]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_are_stripped() {
        assert_eq!(utility_name("md:hover:flex-grow"), "flex-grow");
        assert_eq!(utility_name("!outline-none"), "outline-none");
    }

    #[test]
    fn token_pattern_does_not_touch_longer_utilities() {
        let re = Regex::new(&class_token_pattern("flex-grow")).unwrap();
        assert!(re.is_match("\"flex flex-grow\""));
        assert!(re.is_match("hover:flex-grow"));
        assert!(!re.is_match("flex-grow-0"));
        assert_eq!(
            re.replace_all("\"flex flex-grow p-2\"", "${pre}grow${post}"),
            "\"flex grow p-2\""
        );
    }
}
