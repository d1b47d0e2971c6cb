//! File role classification
//!
//! Roles come from the exported declarations of a parsed file, checked in a
//! fixed priority: JSX-bearing export → component, `use[A-Z]` export that is
//! not a React built-in → hook, any other exported function → utility.
//! Route files of a Next.js app (`app/**/page.tsx`, `pages/**`) are pages
//! regardless of their contents; test files are never classified.

use crate::source::{SourceUnit, TopLevelFunction};
use crate::syntax;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Component,
    Hook,
    Page,
    Utility,
    Unknown,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Component => "component",
            Role::Hook => "hook",
            Role::Page => "page",
            Role::Utility => "utility",
            Role::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// App-router files that Next.js renders as routes
const APP_ROUTE_FILES: &[&str] = &[
    "page",
    "layout",
    "template",
    "loading",
    "error",
    "not-found",
    "default",
    "global-error",
];

/// Classify a parsed unit. Pure: same unit, same answer.
pub fn classify(unit: &SourceUnit) -> Role {
    if is_test_file(unit.path()) {
        return Role::Unknown;
    }
    if is_route_file(unit.path()) {
        return Role::Page;
    }

    let functions = unit.top_level_functions();
    let exported: Vec<&TopLevelFunction<'_>> = functions.iter().filter(|f| f.exported).collect();

    if exported.iter().any(|f| f.has_jsx()) {
        return Role::Component;
    }

    let is_custom_hook = |f: &&TopLevelFunction<'_>| {
        f.name(unit)
            .is_some_and(|n| syntax::is_hook_name(n) && !syntax::is_builtin_hook(n))
    };
    if exported.iter().any(is_custom_hook) {
        return Role::Hook;
    }

    if exported
        .iter()
        .any(|f| f.function.kind() != "class_declaration" && f.function.kind() != "class")
    {
        return Role::Utility;
    }

    Role::Unknown
}

/// Read, parse and classify a file; unparseable files are `Unknown`
pub fn classify_path(path: &Path) -> Role {
    match SourceUnit::load(path) {
        Ok(unit) => unit.role(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "classification skipped");
            Role::Unknown
        }
    }
}

pub fn is_test_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.contains(".test.")
        || name.contains(".spec.")
        || path
            .components()
            .any(|c| matches!(c, Component::Normal(s) if s == "__tests__"))
}

fn directories(path: &Path) -> Vec<&str> {
    let mut segments: Vec<&str> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();
    segments.pop();
    segments
}

/// A special file of the Next.js app router (`app/**/page.tsx`, `layout.tsx`, ...)
pub fn is_app_route_file(path: &Path) -> bool {
    directories(path).contains(&"app") && APP_ROUTE_FILES.contains(&crate::source::file_stem(path))
}

pub fn is_route_file(path: &Path) -> bool {
    if is_app_route_file(path) {
        return true;
    }
    let stem = crate::source::file_stem(path);
    let dirs = directories(path);
    if let Some(pos) = dirs.iter().position(|s| *s == "pages") {
        let below = &dirs[pos + 1..];
        return !below.contains(&"api") && !stem.starts_with('_');
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_files_by_path() {
        assert!(is_route_file(Path::new("/p/src/app/dashboard/page.tsx")));
        assert!(is_route_file(Path::new("/p/app/layout.tsx")));
        assert!(is_route_file(Path::new("/p/pages/index.tsx")));
        assert!(!is_route_file(Path::new("/p/pages/api/hello.ts")));
        assert!(!is_route_file(Path::new("/p/pages/_app.tsx")));
        assert!(!is_route_file(Path::new("/p/app/components/button.tsx")));
    }

    #[test]
    fn test_files_are_recognised() {
        assert!(is_test_file(Path::new("src/button.test.tsx")));
        assert!(is_test_file(Path::new("src/__tests__/button.tsx")));
        assert!(!is_test_file(Path::new("src/button.tsx")));
    }
}
