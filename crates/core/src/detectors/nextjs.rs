//! Next.js 15 app router conventions

use super::{outdated_dependency, unit_issue, Detector, DetectorError, ProjectDetector};
use crate::classifier::{self, Role};
use crate::context::ProjectContext;
use crate::issue::{ComplexTransform, FixDescriptor, Framework, Severity, ValidationResult};
use crate::source::{ExportStyle, Rendering, SourceUnit};
use crate::syntax;
use std::collections::BTreeSet;

pub const CLIENT_DIRECTIVE: &str = "'use client';";

/// `NEXTJS15_MISSING_CLIENT_DIRECTIVE` and `NEXTJS15_MISPLACED_DIRECTIVE`
pub struct ClientDirectiveDetector;

impl Detector for ClientDirectiveDetector {
    fn name(&self) -> &str {
        "Client directive"
    }

    fn framework(&self) -> Framework {
        Framework::Nextjs
    }

    fn applies_to(&self, role: Role) -> bool {
        role != Role::Unknown
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        ctx.uses(Framework::Nextjs)
    }

    fn detect(
        &self,
        unit: &SourceUnit,
        _ctx: &ProjectContext,
    ) -> Result<ValidationResult, DetectorError> {
        let statements: Vec<_> = syntax::named_children(unit.root())
            .into_iter()
            .filter(|n| n.kind() != "comment")
            .collect();

        let leading = statements
            .first()
            .and_then(|s| syntax::directive_value(*s, unit.text()));
        let misplaced = statements
            .iter()
            .skip(1)
            .find_map(|s| syntax::directive_value(*s, unit.text()).map(|d| (*s, d)));

        if leading.is_none() {
            if let Some((statement, directive)) = misplaced {
                let issue = unit_issue(
                    unit,
                    Severity::Error,
                    Framework::Nextjs,
                    "NEXTJS15_MISPLACED_DIRECTIVE",
                    format!("`'{}'` must be the first statement of the file", directive),
                    syntax::line(statement),
                )
                .with_fix(FixDescriptor::Complex {
                    transform: ComplexTransform::HoistDirective {
                        directive: directive.to_string(),
                    },
                });
                return Ok(ValidationResult::new(vec![issue]));
            }
        }

        let renders_on_client = match unit.role() {
            Role::Component => true,
            Role::Page => classifier::is_app_route_file(unit.path()),
            _ => false,
        };
        let meta = unit.meta();
        if renders_on_client && meta.rendering == Rendering::Unmarked && meta.uses_client_features {
            let issue = unit_issue(
                unit,
                Severity::Error,
                Framework::Nextjs,
                "NEXTJS15_MISSING_CLIENT_DIRECTIVE",
                "Uses hooks, event handlers or browser APIs but is missing `'use client'`"
                    .to_string(),
                1,
            )
            .with_fix(FixDescriptor::InsertLine {
                line: 1,
                content: format!("{}\n", CLIENT_DIRECTIVE),
            });
            return Ok(ValidationResult::new(vec![issue]));
        }

        Ok(ValidationResult::empty())
    }
}

/// `NEXTJS15_PAGE_DEFAULT_EXPORT`, `NEXTJS15_SYNC_PARAMS`, `NEXTJS15_CLIENT_PAGE`
pub struct PageConventionsDetector;

impl Detector for PageConventionsDetector {
    fn name(&self) -> &str {
        "Page conventions"
    }

    fn framework(&self) -> Framework {
        Framework::Nextjs
    }

    fn applies_to(&self, role: Role) -> bool {
        role == Role::Page
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        ctx.uses(Framework::Nextjs)
    }

    fn detect(
        &self,
        unit: &SourceUnit,
        ctx: &ProjectContext,
    ) -> Result<ValidationResult, DetectorError> {
        let mut result = ValidationResult::empty();
        let meta = unit.meta();

        if matches!(meta.export_style, ExportStyle::Named | ExportStyle::None) {
            result.push(
                unit_issue(
                    unit,
                    Severity::Error,
                    Framework::Nextjs,
                    "NEXTJS15_PAGE_DEFAULT_EXPORT",
                    format!("Route file `{}` must default-export its component", unit.stem()),
                    1,
                )
                .with_fix(FixDescriptor::manual(
                    "Add a default export for the route component",
                    &["Add `export default function Page() { ... }`"],
                )),
            );
        }

        if !classifier::is_app_route_file(unit.path()) {
            return Ok(result);
        }

        if meta.rendering == Rendering::Client {
            if unit.stem() == "page" {
                result.push(
                    unit_issue(
                        unit,
                        Severity::Suggestion,
                        Framework::Nextjs,
                        "NEXTJS15_CLIENT_PAGE",
                        "Page is a client component; keep pages on the server and move interactivity into child components".to_string(),
                        1,
                    )
                    .with_fix(FixDescriptor::manual(
                        "Split the page into a server page and a client child",
                        &[
                            "Move hooks and handlers into a new `'use client'` component",
                            "Remove `'use client'` from the page and render the new component",
                        ],
                    )),
                );
            }
            // Client pages read params through hooks, not props
            return Ok(result);
        }

        if ctx.config.frameworks.nextjs.major() >= 15 {
            let mut seen = BTreeSet::new();
            for node in syntax::descendants(unit.root()) {
                let sync_read = match node.kind() {
                    "member_expression" => reads_request_prop(unit, node),
                    "variable_declarator" => destructures_request_prop(unit, node),
                    _ => false,
                };
                if !sync_read {
                    continue;
                }
                let line = syntax::line(node);
                if !seen.insert(line) {
                    continue;
                }
                result.push(
                    unit_issue(
                        unit,
                        Severity::Warning,
                        Framework::Nextjs,
                        "NEXTJS15_SYNC_PARAMS",
                        format!(
                            "`{}` is read synchronously; `params` and `searchParams` are promises in Next.js 15",
                            unit.node_text(node)
                        ),
                        line,
                    )
                    .with_fix(FixDescriptor::manual(
                        "Await params before reading them",
                        &[
                            "Make the page function `async`",
                            "Read values with `const { id } = await params`",
                        ],
                    )),
                );
            }
        }

        Ok(result)
    }
}

fn is_request_prop(name: &str) -> bool {
    matches!(name, "params" | "searchParams")
}

/// `params`, `searchParams`, `props.params` or `props.searchParams`
fn is_request_prop_expr(unit: &SourceUnit, node: tree_sitter::Node<'_>) -> bool {
    match node.kind() {
        "identifier" => is_request_prop(unit.node_text(node)),
        "member_expression" => node
            .child_by_field_name("property")
            .is_some_and(|p| is_request_prop(unit.node_text(p))),
        _ => false,
    }
}

/// `params.id`, `searchParams.q` or `props.params.id`; `params.then` is
/// promise use, not a read
fn reads_request_prop(unit: &SourceUnit, member: tree_sitter::Node<'_>) -> bool {
    let Some(object) = member.child_by_field_name("object") else {
        return false;
    };
    let awaited = member
        .child_by_field_name("property")
        .is_some_and(|p| matches!(unit.node_text(p), "then" | "catch" | "finally"));
    !awaited && is_request_prop_expr(unit, object)
}

/// `const { id } = params` or `const { q } = props.searchParams`
fn destructures_request_prop(unit: &SourceUnit, declarator: tree_sitter::Node<'_>) -> bool {
    let destructured = declarator
        .child_by_field_name("name")
        .is_some_and(|n| matches!(n.kind(), "object_pattern" | "array_pattern"));
    destructured
        && declarator
            .child_by_field_name("value")
            .is_some_and(|v| is_request_prop_expr(unit, v))
}

/// `NEXTJS15_OUTDATED_VERSION`
pub struct NextVersionDetector;

impl ProjectDetector for NextVersionDetector {
    fn name(&self) -> &str {
        "Next.js version"
    }

    fn framework(&self) -> Framework {
        Framework::Nextjs
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        ctx.uses(Framework::Nextjs)
    }

    fn detect(&self, ctx: &ProjectContext) -> Result<ValidationResult, DetectorError> {
        let target = ctx.config.frameworks.nextjs.major();
        let issues = outdated_dependency(ctx, "next", target, Framework::Nextjs, "NEXTJS15_OUTDATED_VERSION")
            .into_iter()
            .collect();
        Ok(ValidationResult::new(issues))
    }
}
