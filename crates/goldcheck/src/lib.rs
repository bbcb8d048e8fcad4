#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]
//! goldcheck - Golden-file conformance checking for state-dump programs
//!
//! A target program reads a fixture on stdin and prints a JSON (or YAML)
//! sequence of state records. goldcheck runs it once per fixture, normalizes
//! its output and the reference answer, compares them exactly and shows a
//! character-level diff for the first wrong answer.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use goldcheck::harness::{HarnessConfig, Orchestrator, ReportOptions, render_run};
//!
//! let config = HarnessConfig {
//!     command: "./simulator".to_string(),
//!     ..HarnessConfig::default()
//! };
//! let report = Orchestrator::new(config)?.run()?;
//! print!("{}", render_run(&report, ReportOptions::default()));
//! # Ok::<(), goldcheck::harness::HarnessError>(())
//! ```

#![forbid(unsafe_code)]

pub mod harness;

/// Common imports for driving a run
pub mod prelude {
    pub use crate::harness::{
        CaseVerdict, DiffStyle, HaltPolicy, HarnessConfig, HarnessError, HarnessResult,
        JsonReport, Orchestrator, ReportOptions, RunReport, render_error, render_run,
    };
}
