//! Coloured status lines on stderr.

use console::{Style, Term};
use quill_build::BuildReport;

/// How a status line is coloured.
#[derive(Clone, Copy)]
pub(crate) enum Tone {
    Plain,
    Success,
    Warning,
    Error,
}

/// Status printer for CLI commands.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    /// Print `msg` in the given tone; write failures are ignored.
    pub(crate) fn line(&self, tone: Tone, msg: &str) {
        let style = match tone {
            Tone::Plain => Style::new(),
            Tone::Success => Style::new().green(),
            Tone::Warning => Style::new().yellow(),
            Tone::Error => Style::new().red().bold(),
        };
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(Tone::Plain, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.line(Tone::Warning, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(Tone::Error, msg);
    }

    /// Print every failed page, then a one-line summary.
    pub(crate) fn build_report(&self, report: &BuildReport) {
        for failure in &report.failures {
            self.warning(&format!("  failed {failure}"));
        }
        let tone = if report.is_success() {
            Tone::Success
        } else {
            Tone::Error
        };
        self.line(tone, &build_summary(report));
    }
}

fn build_summary(report: &BuildReport) -> String {
    let failed = if report.is_success() {
        String::new()
    } else {
        format!(", {} failed", report.failures.len())
    };
    format!(
        "Built {} pages, {} assets and {} static files in {}ms{failed}",
        report.pages_written,
        report.assets_copied,
        report.static_files_copied,
        report.elapsed.as_millis()
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_build_summary() {
        let report = BuildReport {
            pages_written: 3,
            assets_copied: 2,
            static_files_copied: 1,
            elapsed: Duration::from_millis(42),
            ..BuildReport::default()
        };

        assert_eq!(
            build_summary(&report),
            "Built 3 pages, 2 assets and 1 static files in 42ms"
        );
    }
}
