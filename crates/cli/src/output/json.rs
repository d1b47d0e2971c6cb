//! JSON output formatting

use anyhow::{Context, Result};
use stack_align_core::AnalysisReport;

/// The persisted report shape, pretty-printed
pub fn render_report(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report")
}
