//! Terminal output formatting

use colored::Colorize;
use stack_align_core::{
    AnalysisReport, EntityResult, HealingReport, Issue, Severity, TestGenReport,
};
use std::path::Path;

pub fn format_issue(issue: &Issue, root: &Path) -> String {
    let icon = match issue.severity {
        Severity::Error => "❌",
        Severity::Warning => "⚠️ ",
        Severity::Suggestion => "💡",
    };
    let path = issue.file_path.strip_prefix(root).unwrap_or(&issue.file_path);
    let location = if issue.line > 0 {
        format!("{}:{}", path.display(), issue.line)
    } else {
        path.display().to_string()
    };
    format!(
        "  {} {} {} {}",
        icon,
        issue.message,
        location.dimmed(),
        format!("[{}]", issue.rule_code).dimmed()
    )
}

fn score_label(score: f64) -> String {
    let text = format!("{:.1}/100", score);
    if score >= 90.0 {
        text.green().bold().to_string()
    } else if score >= 70.0 {
        text.yellow().bold().to_string()
    } else {
        text.red().bold().to_string()
    }
}

fn print_section(title: &str, issues: &[&Issue], root: &Path) {
    if issues.is_empty() {
        return;
    }
    println!("  {}", title.bold());
    for issue in issues {
        println!("{}", format_issue(issue, root));
    }
    println!();
}

fn print_entities(title: &str, entities: &[EntityResult], root: &Path) {
    let flagged: Vec<&EntityResult> = entities
        .iter()
        .filter(|e| !e.result.issues.is_empty())
        .collect();
    if flagged.is_empty() {
        return;
    }
    println!("  {}", title.bold());
    for entity in flagged {
        println!("  {} {}", "›".cyan(), entity.name.bold());
        for issue in &entity.result.issues {
            println!("  {}", format_issue(issue, root));
        }
    }
    println!();
}

pub fn print_report(report: &AnalysisReport, summary_only: bool) {
    let root = report.root.as_path();
    let results = &report.results;
    let summary = &report.summary;
    println!();

    if !summary_only {
        let project: Vec<&Issue> = results
            .project
            .issues
            .iter()
            .chain(results.frameworks.values().flat_map(|r| &r.issues))
            .collect();
        print_section("Project", &project, root);
        print_entities("Components", &results.components, root);
        print_entities("Pages", &results.pages, root);
        print_entities("Hooks", &results.hooks, root);
        print_entities("Utilities", &results.utilities, root);
    } else if !summary.top_issues.is_empty() {
        let top: Vec<&Issue> = summary.top_issues.iter().collect();
        print_section("Top issues", &top, root);
    }

    println!("  {}", "\u{2500}".repeat(60).dimmed());
    println!("  {} - score {}", report.project_name.bold(), score_label(summary.score));
    println!(
        "  {} \u{00b7} {} \u{00b7} {}",
        format!("{} error(s)", summary.errors).red(),
        format!("{} warning(s)", summary.warnings).yellow(),
        format!("{} suggestion(s)", summary.suggestions).blue()
    );
    if !summary.by_framework.is_empty() {
        let parts: Vec<String> = summary
            .by_framework
            .iter()
            .map(|(framework, count)| format!("{} {}", framework, count))
            .collect();
        println!("  {}", parts.join(" \u{00b7} ").dimmed());
    }
    println!(
        "  {} files analyzed \u{00b7} {} skipped \u{00b7} {} detector failure(s)",
        summary.files_analyzed, summary.files_skipped, summary.detector_failures
    );
}

pub fn print_healing(report: &HealingReport) {
    println!();
    for op in &report.operations {
        let icon = if op.kind == "manual" {
            "📝"
        } else if op.success {
            "✅"
        } else {
            "❌"
        };
        println!(
            "  {} {} {} {}",
            icon,
            op.description,
            op.path.display().to_string().dimmed(),
            format!("[{}]", op.rule_code).dimmed()
        );
    }
    for issue in &report.validation_issues {
        println!("  {} {}", "rolled back:".red(), issue.message);
    }
    if !report.operations.is_empty() {
        println!();
    }

    println!("  {}", "\u{2500}".repeat(60).dimmed());
    let verb = if report.dry_run { "would apply" } else { "applied" };
    println!(
        "  {} {} \u{00b7} {} \u{00b7} {} manual",
        format!("{} fix(es)", report.fixed).green(),
        verb,
        format!("{} failed", report.failed).red(),
        report.manual().count()
    );
    if report.limit_applied {
        println!(
            "  {}",
            format!(
                "Fix limit reached: {} of {} eligible issue(s) left for a later run",
                report.remaining, report.total_eligible
            )
            .yellow()
        );
    }
    if !report.files_touched.is_empty() {
        println!("  {} file(s) written", report.files_touched.len());
    }
    if let Some(tests) = &report.tests {
        print_testgen(tests, report.dry_run);
    }
}

pub fn print_testgen(report: &TestGenReport, dry_run: bool) {
    let verb = if dry_run { "Would create" } else { "Created" };
    for path in &report.generated {
        println!("  {} {} {}", "✅", verb, path.display());
    }
    if let Some(config) = &report.config_created {
        println!("  {} {} {}", "✅", verb, config.display());
    }
    println!(
        "  {} test(s) generated \u{00b7} {} already covered \u{00b7} {} skipped",
        report.generated.len(),
        report.existing.len(),
        report.skipped
    );
}
