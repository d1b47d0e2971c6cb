//! stack-align core - framework best-practice analysis and healing
//!
//! This crate provides the analysis pipeline behind the `stack-align` CLI:
//! - Tree-sitter parsing of TypeScript / JavaScript sources into [`SourceUnit`]s
//! - Role classification (component, page, hook, utility)
//! - Detectors for React, Next.js, TypeScript, Tailwind, Vitest and architecture rules
//! - A phased [`Analyzer`] producing a persisted [`AnalysisReport`]
//! - A healing engine that applies fixes, validates them and commits per file
//! - Vitest skeleton generation

pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod context;
pub mod detectors;
pub mod discovery;
pub mod healer;
pub mod issue;
pub mod naming;
pub mod parser;
pub mod report;
pub mod source;
pub mod syntax;
pub mod testgen;
pub mod transform;
pub mod validator;

pub use analyzer::{Analyzer, Phase};
pub use classifier::Role;
pub use config::{AlignConfig, ConfigError, RuleSetting, CONFIG_FILE_NAME};
pub use context::ProjectContext;
pub use detectors::{Detector, DetectorError, DetectorRegistry, ProjectDetector};
pub use discovery::discover_files;
pub use healer::{heal, HealOptions, HealingReport};
pub use issue::{
    ComplexTransform, FixDescriptor, Framework, Issue, JsonOperation, ReplaceContext, Severity,
    ValidationResult,
};
pub use parser::{ParseError, SourceLanguage};
pub use report::{AnalysisReport, AnalysisResults, EntityResult, Summary};
pub use source::SourceUnit;
pub use testgen::{generate_tests, TestGenOptions, TestGenReport};
pub use transform::{apply_fixes, HealingOperation, TransformError};

/// stack-align version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
