//! Vitest coverage rules

use super::{unit_issue, Detector, DetectorError, ProjectDetector};
use crate::classifier::Role;
use crate::context::ProjectContext;
use crate::issue::{FixDescriptor, Framework, Issue, JsonOperation, Severity, ValidationResult};
use crate::source::SourceUnit;
use crate::testgen::{self, TestGenOptions};

fn vitest_requested(ctx: &ProjectContext) -> bool {
    ctx.config.testing.framework.eq_ignore_ascii_case("vitest")
}

/// `VITEST_MISSING_TEST`: components and hooks without a test file
pub struct MissingTestDetector;

impl Detector for MissingTestDetector {
    fn name(&self) -> &str {
        "Missing tests"
    }

    fn framework(&self) -> Framework {
        Framework::Vitest
    }

    fn applies_to(&self, role: Role) -> bool {
        matches!(role, Role::Component | Role::Hook)
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        vitest_requested(ctx)
    }

    fn detect(
        &self,
        unit: &SourceUnit,
        ctx: &ProjectContext,
    ) -> Result<ValidationResult, DetectorError> {
        if ctx.has_test_for(unit.path()) {
            return Ok(ValidationResult::empty());
        }
        let Some(test) = testgen::generate_test(unit, &TestGenOptions::from_config(&ctx.config))
        else {
            return Ok(ValidationResult::empty());
        };

        let name = unit.meta().primary_name.as_deref().unwrap_or(unit.stem());
        let issue = unit_issue(
            unit,
            Severity::Suggestion,
            Framework::Vitest,
            "VITEST_MISSING_TEST",
            format!("`{}` has no test file", name),
            1,
        )
        .with_fix(FixDescriptor::CreateFile {
            path: test.path,
            content: test.content,
        });
        Ok(ValidationResult::new(vec![issue]))
    }
}

/// `VITEST_MISSING_TEST_SCRIPT` and `VITEST_NOT_INSTALLED`
pub struct TestScriptDetector;

impl ProjectDetector for TestScriptDetector {
    fn name(&self) -> &str {
        "Test setup"
    }

    fn framework(&self) -> Framework {
        Framework::Vitest
    }

    fn is_enabled(&self, ctx: &ProjectContext) -> bool {
        ctx.package_json.is_some() && vitest_requested(ctx)
    }

    fn detect(&self, ctx: &ProjectContext) -> Result<ValidationResult, DetectorError> {
        let manifest = ctx.root.join("package.json");

        if !ctx.uses(Framework::Vitest) {
            let issue = Issue::new(
                Severity::Suggestion,
                Framework::Vitest,
                "VITEST_NOT_INSTALLED",
                "Vitest is the configured test framework but is not installed",
                manifest,
                0,
            )
            .with_fix(FixDescriptor::manual(
                "Install Vitest and Testing Library",
                &["npm install -D vitest jsdom @testing-library/react @vitejs/plugin-react"],
            ));
            return Ok(ValidationResult::new(vec![issue]));
        }

        if ctx.has_script("test") {
            return Ok(ValidationResult::empty());
        }
        let issue = Issue::new(
            Severity::Suggestion,
            Framework::Vitest,
            "VITEST_MISSING_TEST_SCRIPT",
            "package.json has no `test` script",
            manifest.clone(),
            0,
        )
        .with_fix(FixDescriptor::UpdateJson {
            path: manifest,
            operations: vec![JsonOperation::Set {
                pointer: "/scripts/test".to_string(),
                value: serde_json::Value::String("vitest run".to_string()),
            }],
        });
        Ok(ValidationResult::new(vec![issue]))
    }
}
