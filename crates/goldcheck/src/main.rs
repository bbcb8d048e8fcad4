//! goldcheck - golden-file conformance checker
//!
//! Exit status: 0 when every fixture passed, 1 on a wrong answer, 2 on an
//! error that stopped the run.

mod cli;
mod logging;

use std::process::ExitCode;

use anyhow::Context;
use goldcheck::harness::{
    HarnessConfig, JsonReport, Orchestrator, ReportOptions, RunReport, render_error, render_run,
};

use crate::cli::Cli;

const EXIT_MISMATCH: u8 = 1;
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init(cli.log_level(), cli.log_format);

    let config = match cli.harness_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("goldcheck: {e}");
            return ExitCode::from(EXIT_ERROR);
        }
    };
    if !config.color {
        colored::control::set_override(false);
    }
    let options = ReportOptions {
        diff_style: config.diff_style,
        color: config.color,
    };

    let report = match Orchestrator::new(config.clone()).and_then(|o| o.run()) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(kind = e.kind(), "run aborted");
            print!("{}", render_error(&e, options));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    print!("{}", render_run(&report, options));
    if let Err(e) = write_report(&config, &report) {
        eprintln!("goldcheck: {e:#}");
        return ExitCode::from(EXIT_ERROR);
    }
    exit_code(&report)
}

fn write_report(config: &HarnessConfig, report: &RunReport) -> anyhow::Result<()> {
    let Some(path) = &config.report_path else {
        return Ok(());
    };
    JsonReport::from_run(report)
        .write_to(path)
        .with_context(|| format!("writing run report to {}", path.display()))?;
    tracing::info!(path = %path.display(), "run report written");
    Ok(())
}

fn exit_code(report: &RunReport) -> ExitCode {
    if report.is_success() {
        ExitCode::SUCCESS
    } else if report.has_errors() {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_MISMATCH)
    }
}
