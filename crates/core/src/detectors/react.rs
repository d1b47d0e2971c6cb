//! React 19 component conventions

use super::{outdated_dependency, unit_issue, Detector, DetectorError, ProjectDetector};
use crate::classifier::Role;
use crate::context::ProjectContext;
use crate::issue::{FixDescriptor, Framework, ReplaceContext, Severity, ValidationResult};
use crate::naming;
use crate::source::SourceUnit;
use crate::syntax;

/// `REACT19_COMPONENT_NAMING`: components are PascalCase
pub struct ComponentNamingDetector;

impl Detector for ComponentNamingDetector {
    fn name(&self) -> &str {
        "Component naming"
    }

    fn framework(&self) -> Framework {
        Framework::React
    }

    fn applies_to(&self, role: Role) -> bool {
        role == Role::Component
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        ctx.uses(Framework::React) && ctx.config.architecture.enforce_pascal_case
    }

    fn detect(
        &self,
        unit: &SourceUnit,
        _ctx: &ProjectContext,
    ) -> Result<ValidationResult, DetectorError> {
        let Some(name_node) = unit.primary_function().and_then(|f| f.name_node()) else {
            return Ok(ValidationResult::empty());
        };
        let name = unit.node_text(name_node);
        if naming::is_pascal_case(name) {
            return Ok(ValidationResult::empty());
        }

        let fixed = naming::to_pascal_case(name);
        let issue = unit_issue(
            unit,
            Severity::Error,
            Framework::React,
            "REACT19_COMPONENT_NAMING",
            format!("Component `{}` must be PascalCase (`{}`)", name, fixed),
            syntax::line(name_node),
        )
        .with_fix(FixDescriptor::Replace {
            pattern: format!(r"\b{}\b", regex::escape(name)),
            replacement: fixed,
            context: Some(ReplaceContext::ComponentDeclaration),
        });
        Ok(ValidationResult::new(vec![issue]))
    }
}

/// `REACT19_FORWARD_REF`: `ref` is a plain prop since React 19
pub struct ForwardRefDetector;

impl Detector for ForwardRefDetector {
    fn name(&self) -> &str {
        "forwardRef usage"
    }

    fn framework(&self) -> Framework {
        Framework::React
    }

    fn applies_to(&self, role: Role) -> bool {
        role == Role::Component
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        ctx.uses(Framework::React) && ctx.config.frameworks.react.major() >= 19
    }

    fn detect(
        &self,
        unit: &SourceUnit,
        _ctx: &ProjectContext,
    ) -> Result<ValidationResult, DetectorError> {
        let issues = syntax::descendants(unit.root())
            .into_iter()
            .filter(|n| n.kind() == "call_expression")
            .filter(|n| syntax::callee_name(*n, unit.text()) == Some("forwardRef"))
            .map(|call| {
                unit_issue(
                    unit,
                    Severity::Suggestion,
                    Framework::React,
                    "REACT19_FORWARD_REF",
                    "`forwardRef` is unnecessary in React 19; accept `ref` as a prop".to_string(),
                    syntax::line(call),
                )
                .with_fix(FixDescriptor::manual(
                    "Replace forwardRef with a `ref` prop",
                    &[
                        "Unwrap the component from forwardRef(...)",
                        "Destructure `ref` from props and pass it to the element",
                    ],
                ))
            })
            .collect();
        Ok(ValidationResult::new(issues))
    }
}

/// `REACT19_OUTDATED_VERSION`: react / react-dom below the target major
pub struct ReactVersionDetector;

impl ProjectDetector for ReactVersionDetector {
    fn name(&self) -> &str {
        "React version"
    }

    fn framework(&self) -> Framework {
        Framework::React
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        ctx.uses(Framework::React)
    }

    fn detect(&self, ctx: &ProjectContext) -> Result<ValidationResult, DetectorError> {
        let target = ctx.config.frameworks.react.major();
        let issues = ["react", "react-dom"]
            .into_iter()
            .filter_map(|package| {
                outdated_dependency(ctx, package, target, Framework::React, "REACT19_OUTDATED_VERSION")
            })
            .collect();
        Ok(ValidationResult::new(issues))
    }
}
