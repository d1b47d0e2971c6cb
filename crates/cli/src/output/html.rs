//! Standalone HTML report

use stack_align_core::{AnalysisReport, EntityResult, Issue};

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:2rem;color:#1f2933}\
table{border-collapse:collapse;width:100%;margin-bottom:2rem}\
th,td{border-bottom:1px solid #e4e7eb;padding:.4rem .6rem;text-align:left;font-size:.9rem}\
.error{color:#c81e1e}.warning{color:#b7791f}.suggestion{color:#2b6cb0}\
.score{font-size:2rem;font-weight:bold}code{font-size:.85rem}";

/// Escape text for HTML element and attribute content
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn issue_rows(issues: &[&Issue], report: &AnalysisReport) -> String {
    let mut rows = String::new();
    for issue in issues {
        let path = issue
            .file_path
            .strip_prefix(&report.root)
            .unwrap_or(&issue.file_path);
        rows.push_str(&format!(
            "<tr><td class=\"{sev}\">{sev}</td><td><code>{code}</code></td><td>{msg}</td><td><code>{path}:{line}</code></td><td>{fix}</td></tr>\n",
            sev = issue.severity,
            code = escape(&issue.rule_code),
            msg = escape(&issue.message),
            path = escape(&path.display().to_string()),
            line = issue.line,
            fix = issue.fix.as_ref().map(|f| f.kind()).unwrap_or("-"),
        ));
    }
    rows
}

fn section(title: &str, issues: &[&Issue], report: &AnalysisReport) -> String {
    if issues.is_empty() {
        return String::new();
    }
    let mut html = format!("<h2>{}</h2>\n<table>\n", escape(title));
    html.push_str("<tr><th>Severity</th><th>Rule</th><th>Message</th><th>Location</th><th>Fix</th></tr>\n");
    html.push_str(&issue_rows(issues, report));
    html.push_str("</table>\n");
    html
}

fn entity_issues(entities: &[EntityResult]) -> Vec<&Issue> {
    entities.iter().flat_map(|e| &e.result.issues).collect()
}

pub fn render_report(report: &AnalysisReport) -> String {
    let summary = &report.summary;
    let results = &report.results;
    let title = format!("stack-align report: {}", report.project_name);

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(&title)));
    html.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", STYLE));
    html.push_str(&format!("<h1>{}</h1>\n", escape(&title)));
    html.push_str(&format!(
        "<p class=\"score\">{:.1}/100</p>\n<p><span class=\"error\">{} error(s)</span> · <span class=\"warning\">{} warning(s)</span> · <span class=\"suggestion\">{} suggestion(s)</span> · {} files analyzed</p>\n",
        summary.score, summary.errors, summary.warnings, summary.suggestions, summary.files_analyzed
    ));

    let project: Vec<&Issue> = results
        .project
        .issues
        .iter()
        .chain(results.frameworks.values().flat_map(|r| &r.issues))
        .collect();
    html.push_str(&section("Project", &project, report));
    html.push_str(&section("Components", &entity_issues(&results.components), report));
    html.push_str(&section("Pages", &entity_issues(&results.pages), report));
    html.push_str(&section("Hooks", &entity_issues(&results.hooks), report));
    html.push_str(&section("Utilities", &entity_issues(&results.utilities), report));

    html.push_str(&format!(
        "<footer>Generated by stack-align v{}</footer>\n</body>\n</html>\n",
        escape(&report.version)
    ));
    html
}
