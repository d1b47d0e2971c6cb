//! Progress indicators

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use stack_align_core::Phase;

fn spinner_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// A single pipeline step backed by an indicatif spinner.
///
/// Create with [`Step::new`], then call [`Step::finish`] or [`Step::skip`]
/// when the work completes. On a non-TTY the spinner draws nothing, but the
/// finish/skip lines are still emitted via `eprintln!`.
pub struct Step {
    pb: ProgressBar,
    label: String,
}

impl Step {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let pb = ProgressBar::new_spinner();
        pb.set_style(spinner_style("  {spinner:.green} {msg}"));
        pb.set_message(format!("{}...", label));
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { pb, label }
    }

    /// Finish successfully: prints `"  label... done"` with an optional summary
    pub fn finish(&self, summary: &str) {
        self.pb.finish_and_clear();
        if summary.is_empty() {
            eprintln!("  {}... {}", self.label, "done".green());
        } else {
            eprintln!("  {}... {} ({})", self.label, "done".green(), summary);
        }
    }

    pub fn skip(&self, msg: &str) {
        self.pb.finish_and_clear();
        eprintln!("  {}", msg.dimmed());
    }
}

/// Turns analyzer phase callbacks into a sequence of [`Step`]s
#[derive(Default)]
pub struct PhaseProgress {
    current: Option<Step>,
    enabled: bool,
}

impl PhaseProgress {
    pub fn new(enabled: bool) -> Self {
        Self {
            current: None,
            enabled,
        }
    }

    pub fn on_phase(&mut self, phase: Phase) {
        if !self.enabled {
            return;
        }
        if let Some(step) = self.current.take() {
            step.finish("");
        }
        self.current = Some(Step::new(phase.label()));
    }

    pub fn finish(&mut self, summary: &str) {
        if let Some(step) = self.current.take() {
            step.finish(summary);
        }
    }
}
