//! Architecture rules: file naming, export style, directory depth

use super::{unit_issue, Detector, DetectorError, ProjectDetector};
use crate::classifier::Role;
use crate::context::ProjectContext;
use crate::issue::{ComplexTransform, FixDescriptor, Framework, Issue, Severity, ValidationResult};
use crate::naming;
use crate::source::{file_stem, SourceUnit};
use crate::syntax;

/// `ARCH_FILE_NAMING`: source files are named in kebab-case
pub struct FileNamingDetector;

impl Detector for FileNamingDetector {
    fn name(&self) -> &str {
        "File naming"
    }

    fn framework(&self) -> Framework {
        Framework::Architecture
    }

    fn applies_to(&self, role: Role) -> bool {
        matches!(role, Role::Component | Role::Hook | Role::Utility)
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        ctx.config.architecture.enforce_kebab_case
    }

    fn detect(
        &self,
        unit: &SourceUnit,
        _ctx: &ProjectContext,
    ) -> Result<ValidationResult, DetectorError> {
        let path = unit.path();
        let stem = file_stem(path);
        if stem == "index" || naming::is_kebab_case(stem) {
            return Ok(ValidationResult::empty());
        }

        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or(stem);
        let new_name = format!("{}{}", naming::to_kebab_case(stem), &file_name[stem.len()..]);
        let new_path = path.with_file_name(&new_name);

        let issue = unit_issue(
            unit,
            Severity::Warning,
            Framework::Architecture,
            "ARCH_FILE_NAMING",
            format!("File `{}` should be named in kebab-case (`{}`)", file_name, new_name),
            1,
        )
        .with_fix(FixDescriptor::RenameFile {
            old_path: path.to_path_buf(),
            new_path,
        });
        Ok(ValidationResult::new(vec![issue]))
    }
}

/// `ARCH_PREFER_NAMED_EXPORT`: components use named exports
pub struct ExportStyleDetector;

impl Detector for ExportStyleDetector {
    fn name(&self) -> &str {
        "Export style"
    }

    fn framework(&self) -> Framework {
        Framework::Architecture
    }

    fn applies_to(&self, role: Role) -> bool {
        role == Role::Component
    }

    fn detect(
        &self,
        unit: &SourceUnit,
        _ctx: &ProjectContext,
    ) -> Result<ValidationResult, DetectorError> {
        let Some(statement) = syntax::named_children(unit.root())
            .into_iter()
            .find(|n| n.kind() == "export_statement" && syntax::has_token(*n, "default"))
        else {
            return Ok(ValidationResult::empty());
        };

        let convertible = default_export_target(unit, statement).is_some();
        let fix = if convertible {
            FixDescriptor::Complex {
                transform: ComplexTransform::ConvertDefaultExport,
            }
        } else {
            FixDescriptor::manual(
                "Give the default-exported value a name and export it by name",
                &[
                    "Declare the component as `export function Name(...)`",
                    "Update importers to `import { Name } from ...`",
                ],
            )
        };

        let issue = unit_issue(
            unit,
            Severity::Warning,
            Framework::Architecture,
            "ARCH_PREFER_NAMED_EXPORT",
            "Components should use named exports instead of `export default`".to_string(),
            syntax::line(statement),
        )
        .with_fix(fix);
        Ok(ValidationResult::new(vec![issue]))
    }
}

/// Name of the declaration a default export can be folded into, if any
pub(crate) fn default_export_target<'s>(
    unit: &'s SourceUnit,
    statement: tree_sitter::Node<'_>,
) -> Option<&'s str> {
    if let Some(decl) = statement.child_by_field_name("declaration") {
        return decl.child_by_field_name("name").map(|n| unit.node_text(n));
    }
    let value = statement.child_by_field_name("value")?;
    if value.kind() != "identifier" {
        return None;
    }
    let name = unit.node_text(value);
    let declared = syntax::named_children(unit.root()).into_iter().any(|n| {
        syntax::declares_name(n, unit.text(), name)
            || n.child_by_field_name("declaration")
                .is_some_and(|d| syntax::declares_name(d, unit.text(), name))
    });
    declared.then_some(name)
}

/// `ARCH_DIRECTORY_DEPTH`: keep source trees shallow
pub struct DirectoryDepthDetector;

impl ProjectDetector for DirectoryDepthDetector {
    fn name(&self) -> &str {
        "Directory depth"
    }

    fn framework(&self) -> Framework {
        Framework::Architecture
    }

    fn detect(&self, ctx: &ProjectContext) -> Result<ValidationResult, DetectorError> {
        let max = ctx.config.architecture.max_directory_depth;
        let issues = ctx
            .files
            .iter()
            .filter_map(|file| {
                let depth = ctx.relative(file).components().count().saturating_sub(1);
                (depth > max).then(|| {
                    Issue::new(
                        Severity::Warning,
                        Framework::Architecture,
                        "ARCH_DIRECTORY_DEPTH",
                        format!(
                            "`{}` is nested {} directories deep (max {})",
                            ctx.relative(file).display(),
                            depth,
                            max
                        ),
                        file.clone(),
                        0,
                    )
                    .with_fix(FixDescriptor::manual(
                        "Flatten the directory structure",
                        &["Group files by feature instead of deep nesting"],
                    ))
                })
            })
            .collect();
        Ok(ValidationResult::new(issues))
    }
}
