//! Rule detectors, one module per framework concern
//!
//! File detectors run against one parsed [`SourceUnit`]; project detectors
//! look at the project as a whole (package.json, tsconfig, layout). Every
//! detector is independent: none reads another's output, so they can run in
//! any order.

pub mod architecture;
pub mod hooks;
pub mod nextjs;
pub mod react;
pub mod tailwind;
pub mod testing;
pub mod typescript;

use crate::classifier::Role;
use crate::context::ProjectContext;
use crate::issue::{FixDescriptor, Framework, Issue, JsonOperation, Severity, ValidationResult};
use crate::source::SourceUnit;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("{detector} failed: {message}")]
    Failed { detector: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Detector over a single parsed file
pub trait Detector: Send + Sync {
    /// Human-readable name of this detector
    fn name(&self) -> &str;

    fn framework(&self) -> Framework;

    /// Roles this detector inspects
    fn applies_to(&self, role: Role) -> bool;

    /// Whether this detector runs at all for the given project
    fn is_enabled(&self, _ctx: &ProjectContext) -> bool {
        true
    }

    fn detect(
        &self,
        unit: &SourceUnit,
        ctx: &ProjectContext,
    ) -> Result<ValidationResult, DetectorError>;
}

/// Detector over the project as a whole
pub trait ProjectDetector: Send + Sync {
    fn name(&self) -> &str;

    fn framework(&self) -> Framework;

    fn is_enabled(&self, _ctx: &ProjectContext) -> bool {
        true
    }

    fn detect(&self, ctx: &ProjectContext) -> Result<ValidationResult, DetectorError>;
}

/// Holds every registered detector
pub struct DetectorRegistry {
    file_detectors: Vec<Box<dyn Detector>>,
    architecture_detectors: Vec<Box<dyn ProjectDetector>>,
    framework_detectors: Vec<Box<dyn ProjectDetector>>,
}

impl DetectorRegistry {
    /// Create a registry with all built-in detectors
    pub fn new() -> Self {
        Self {
            file_detectors: vec![
                Box::new(architecture::FileNamingDetector),
                Box::new(architecture::ExportStyleDetector),
                Box::new(react::ComponentNamingDetector),
                Box::new(react::ForwardRefDetector),
                Box::new(hooks::ConditionalHookDetector),
                Box::new(hooks::HookDependenciesDetector),
                Box::new(hooks::HookNamingDetector),
                Box::new(nextjs::ClientDirectiveDetector),
                Box::new(nextjs::PageConventionsDetector),
                Box::new(tailwind::ClassNameDetector),
                Box::new(tailwind::InlineStyleDetector),
                Box::new(typescript::ExplicitAnyDetector),
                Box::new(typescript::TypeOnlyImportDetector),
                Box::new(typescript::UntypedPropsDetector),
                Box::new(testing::MissingTestDetector),
            ],
            architecture_detectors: vec![Box::new(architecture::DirectoryDepthDetector)],
            framework_detectors: vec![
                Box::new(react::ReactVersionDetector),
                Box::new(nextjs::NextVersionDetector),
                Box::new(typescript::StrictModeDetector),
                Box::new(tailwind::TailwindVersionDetector),
                Box::new(testing::TestScriptDetector),
            ],
        }
    }

    /// Registry with an explicit detector set
    pub fn with_detectors(
        file_detectors: Vec<Box<dyn Detector>>,
        architecture_detectors: Vec<Box<dyn ProjectDetector>>,
        framework_detectors: Vec<Box<dyn ProjectDetector>>,
    ) -> Self {
        Self {
            file_detectors,
            architecture_detectors,
            framework_detectors,
        }
    }

    pub fn file_detectors(&self) -> &[Box<dyn Detector>] {
        &self.file_detectors
    }

    pub fn architecture_detectors(&self) -> &[Box<dyn ProjectDetector>] {
        &self.architecture_detectors
    }

    pub fn framework_detectors(&self) -> &[Box<dyn ProjectDetector>] {
        &self.framework_detectors
    }

    /// Detectors whose rules apply to `unit` in this project
    pub fn detectors_for<'a>(
        &'a self,
        unit: &'a SourceUnit,
        ctx: &'a ProjectContext,
    ) -> impl Iterator<Item = &'a dyn Detector> + 'a {
        self.file_detectors
            .iter()
            .map(|d| &**d)
            .filter(move |d| d.applies_to(unit.role()) && d.is_enabled(ctx))
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper to create an issue located in `unit`
pub(crate) fn unit_issue(
    unit: &SourceUnit,
    severity: Severity,
    framework: Framework,
    rule_code: &str,
    message: String,
    line: usize,
) -> Issue {
    Issue::new(severity, framework, rule_code, message, unit.path(), line)
}

/// Escape `$` so text can be used verbatim as a regex replacement
pub(crate) fn literal_replacement(text: &str) -> String {
    text.replace('$', "$$")
}

/// Issue for an npm dependency declared below the target major version
pub(crate) fn outdated_dependency(
    ctx: &ProjectContext,
    package: &str,
    target_major: u64,
    framework: Framework,
    rule_code: &str,
) -> Option<Issue> {
    let declared = ctx.dependency_version(package)?;
    let major = crate::context::parse_major(declared)?;
    if major >= target_major {
        return None;
    }
    let table = ctx.dependency_table(package)?;
    let manifest = ctx.root.join("package.json");
    let pointer = format!("/{}/{}", table, package.replace('~', "~0").replace('/', "~1"));
    Some(
        Issue::new(
            Severity::Warning,
            framework,
            rule_code,
            format!(
                "`{}` is at {} but the target is {}.x",
                package, declared, target_major
            ),
            manifest.clone(),
            0,
        )
        .with_fix(FixDescriptor::UpdateJson {
            path: manifest,
            operations: vec![JsonOperation::Set {
                pointer,
                value: serde_json::Value::String(format!("^{}.0.0", target_major)),
            }],
        }),
    )
}
