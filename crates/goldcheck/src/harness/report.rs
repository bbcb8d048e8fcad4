//! Report generation for conformance runs
//!
//! The terminal report is what a developer reads after a run: either a single
//! success line or, per failure, the fixture id, both documents and a diff.
//! The JSON report is the machine-readable counterpart for CI.

use std::fs;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use super::config::{DiffStyle, HaltPolicy};
use super::diff::{DiffMarkers, SequenceMatcher, render_inline_diff, render_unified_diff};
use super::error::{HarnessError, HarnessResult};
use super::runner::{CaseRecord, Mismatch, RunReport};

/// Line printed when every fixture passed
pub const SUCCESS_LINE: &str = "All correct!";

/// How the terminal report is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportOptions {
    /// Mismatch rendering
    pub diff_style: DiffStyle,
    /// ANSI colours on or off
    pub color: bool,
}

impl ReportOptions {
    fn heading(&self, text: &str) -> String {
        if self.color {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn label(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Render the terminal report for a finished run.
pub fn render_run(report: &RunReport, options: ReportOptions) -> String {
    if report.is_success() {
        return format!("{SUCCESS_LINE}\n");
    }

    let mut out = String::new();
    for record in report.failures() {
        out.push_str(&render_failure(record, options));
    }

    if report.policy == HaltPolicy::RunAll {
        out.push_str(&format!(
            "{} passed, {} failed (of {})\n",
            report.passed(),
            report.failed(),
            report.total_fixtures
        ));
    }
    out
}

/// Render one failing record.
pub fn render_failure(record: &CaseRecord, options: ReportOptions) -> String {
    if let Some(mismatch) = record.mismatch() {
        return render_mismatch(&record.fixture, mismatch, options);
    }
    match record.error() {
        Some(error) => render_error(error, options),
        None => String::new(),
    }
}

/// Render a wrong answer: both documents and their diff.
pub fn render_mismatch(fixture: &str, mismatch: &Mismatch, options: ReportOptions) -> String {
    let mut out = String::new();
    out.push_str(&options.heading(&format!("Wrong answer for {fixture}")));
    out.push('\n');
    out.push_str(&options.label("Your answer:"));
    out.push('\n');
    out.push_str(&mismatch.actual_text);
    out.push('\n');
    out.push_str(&options.label("Correct answer:"));
    out.push('\n');
    out.push_str(&mismatch.expected_text);
    out.push('\n');
    out.push_str(&options.label("Diff:"));
    out.push('\n');
    out.push_str(&render_diff(mismatch, options));
    out.push('\n');
    out
}

/// Diff of a mismatch in the configured style.
pub fn render_diff(mismatch: &Mismatch, options: ReportOptions) -> String {
    match options.diff_style {
        DiffStyle::Inline => render_inline_diff(
            &mismatch.actual_text,
            &mismatch.expected_text,
            DiffMarkers::for_color(options.color),
        ),
        DiffStyle::Unified => render_unified_diff(&mismatch.actual_text, &mismatch.expected_text),
    }
}

/// Render a fatal error, including the offending document for shape errors.
pub fn render_error(error: &HarnessError, options: ReportOptions) -> String {
    let mut out = String::new();
    match error {
        HarnessError::Shape { value, .. } => {
            out.push_str(&options.heading(&format!("Parse error: {error}")));
            out.push('\n');
            out.push_str(&options.label("Your answer:"));
            out.push('\n');
            out.push_str(value);
            out.push('\n');
        }
        HarnessError::Spawn { .. } | HarnessError::Timeout { .. } | HarnessError::Wait { .. } => {
            out.push_str(&options.heading(&format!("Execution failed: {error}")));
            out.push('\n');
        }
        other => {
            out.push_str(&options.heading(&format!("Error: {other}")));
            out.push('\n');
        }
    }
    out
}

/// Machine-readable run report
#[derive(Debug, Serialize)]
pub struct JsonReport {
    /// Halt policy of the run
    pub policy: HaltPolicy,
    /// Fixtures discovered
    pub total: usize,
    /// Fixtures passed
    pub passed: usize,
    /// Fixtures failed
    pub failed: usize,
    /// Fixtures never evaluated
    pub skipped: usize,
    /// Whole-run wall-clock time
    pub duration_ms: u128,
    /// Per-fixture entries
    pub cases: Vec<JsonCase>,
}

/// One fixture in the JSON report
#[derive(Debug, Serialize)]
pub struct JsonCase {
    /// Fixture id
    pub fixture: String,
    /// `pass`, `mismatch` or `error`
    pub status: &'static str,
    /// Target exit code, when it exited in time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Pipeline time for this fixture
    pub duration_ms: u128,
    /// Character similarity of the two renderings, for mismatches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    /// Error class, for errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    /// Error message, for errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl JsonReport {
    /// Build the JSON view of a run.
    pub fn from_run(report: &RunReport) -> Self {
        Self {
            policy: report.policy,
            total: report.total_fixtures,
            passed: report.passed(),
            failed: report.failed(),
            skipped: report.skipped(),
            duration_ms: report.duration.as_millis(),
            cases: report.cases.iter().map(JsonCase::from_record).collect(),
        }
    }

    /// Render as pretty JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }

    /// Write to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Io`] if the file cannot be written.
    pub fn write_to(&self, path: impl AsRef<Path>) -> HarnessResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()).map_err(|e| HarnessError::io(path, e))
    }
}

impl JsonCase {
    fn from_record(record: &CaseRecord) -> Self {
        let mut case = Self {
            fixture: record.fixture.clone(),
            status: "pass",
            exit_code: record.execution.as_ref().and_then(|e| e.exit_code),
            duration_ms: record.duration.as_millis(),
            similarity: None,
            error_kind: None,
            message: None,
        };
        if let Some(mismatch) = record.mismatch() {
            case.status = "mismatch";
            case.similarity = Some(similarity(&mismatch.actual_text, &mismatch.expected_text));
        } else if let Some(error) = record.error() {
            case.status = "error";
            case.error_kind = Some(error.kind());
            case.message = Some(error.to_string());
        }
        case
    }
}

fn similarity(actual: &str, expected: &str) -> f64 {
    let a: Vec<char> = actual.chars().collect();
    let b: Vec<char> = expected.chars().collect();
    SequenceMatcher::new(&a, &b).ratio()
}
