//! Report output - verbose per-case trace, summary block, JSON

use clap::ValueEnum;
use colored::Colorize;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

use crate::error::E2eResult;
use crate::suite::{SuiteReport, Verdict};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Per-case trace followed by a summary
    #[default]
    Text,
    /// The full report as JSON
    Json,
}

/// Render a report in the given format
pub fn render(report: &SuiteReport, format: OutputFormat) -> E2eResult<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

/// Line printed before the run starts; stdout carries only the report in
/// JSON mode
pub fn banner(format: OutputFormat) -> Option<&'static str> {
    match format {
        OutputFormat::Text => Some("⚙️ Launching Admin Panel Tests..."),
        OutputFormat::Json => None,
    }
}

/// Print a report to stdout
pub fn print_report(report: &SuiteReport, format: OutputFormat) -> E2eResult<()> {
    println!("{}", render(report, format)?);
    Ok(())
}

fn render_text(report: &SuiteReport) -> String {
    let mut out = String::new();

    for result in &report.results {
        let status = match &result.verdict {
            Verdict::Pass => "ok".green(),
            Verdict::Fail(_) => "FAIL".red(),
            Verdict::Error(_) => "ERROR".yellow(),
        };
        let _ = writeln!(out, "{} ... {} ({} ms)", result.name, status, result.duration_ms);
        if let Verdict::Fail(msg) | Verdict::Error(msg) = &result.verdict {
            let _ = writeln!(out, "    {}", msg);
        }
    }

    out.push_str(&summary(report));
    out
}

/// The summary block printed after the trace
pub fn summary(report: &SuiteReport) -> String {
    format!(
        "\n--- Test Summary ---\nTotal tests: {}\nPassed tests: {}\nFailures: {}\nErrors: {}",
        report.total,
        report.passed,
        report.failed.len(),
        report.errored.len()
    )
}

/// Write the report as JSON, creating parent directories as needed
pub fn write_results(report: &SuiteReport, path: &Path) -> E2eResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;

    info!("Results written to: {}", path.display());
    Ok(())
}
