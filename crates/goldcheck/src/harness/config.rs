//! Runtime configuration for a conformance run.
//!
//! [`HarnessConfig`] is the single source of truth for every toggle,
//! independent of whether it came from the command line, the environment or
//! a TOML file. Tests construct it directly.
//!
//! # Example
//!
//! ```rust
//! use goldcheck::harness::{HaltPolicy, HarnessConfig};
//!
//! let config = HarnessConfig {
//!     command: "./emulator --dump".to_string(),
//!     halt_policy: HaltPolicy::RunAll,
//!     ..Default::default()
//! };
//! assert_eq!(config.canonical_key, "MEM");
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::error::{HarnessError, HarnessResult};

/// Extension of captured sinks and reference answers.
pub const SINK_EXTENSION: &str = "json";

/// What to do after the first failing fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum HaltPolicy {
    /// Stop at the first problem of any kind
    #[default]
    FirstFailure,
    /// Evaluate every fixture and aggregate the failures
    RunAll,
}

/// How a mismatch is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DiffStyle {
    /// Character-level diff with inserted/deleted spans marked inline
    #[default]
    Inline,
    /// Line-level unified diff
    Unified,
}

/// Runtime configuration for the harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    // ========================================================================
    // Target
    // ========================================================================
    /// Target command line, split on whitespace into program and arguments.
    pub command: String,

    /// Wall-clock limit for one target invocation, in milliseconds.
    pub timeout_ms: u64,

    // ========================================================================
    // Layout
    // ========================================================================
    /// Directory holding one input file per fixture.
    pub fixtures_dir: PathBuf,

    /// Directory holding `<id>.json` reference answers.
    pub answers_dir: PathBuf,

    /// Directory the captured outputs are written to.
    pub scratch_dir: PathBuf,

    /// Keep the scratch directory after the run.
    pub keep_scratch: bool,

    // ========================================================================
    // Comparison
    // ========================================================================
    /// Record attribute whose keys are normalized before comparison.
    pub canonical_key: String,

    /// Halt policy.
    pub halt_policy: HaltPolicy,

    /// Treat an undecodable reference answer as a fatal error.
    pub strict_answers: bool,

    // ========================================================================
    // Output
    // ========================================================================
    /// Mismatch rendering.
    pub diff_style: DiffStyle,

    /// Use ANSI colours in the terminal report.
    pub color: bool,

    /// Where to write the JSON run report, if anywhere.
    pub report_path: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            command: String::new(),
            timeout_ms: 1000,
            fixtures_dir: PathBuf::from("test"),
            answers_dir: PathBuf::from("answer"),
            scratch_dir: PathBuf::from("temp_answer"),
            keep_scratch: false,
            canonical_key: "MEM".to_string(),
            halt_policy: HaltPolicy::FirstFailure,
            strict_answers: false,
            diff_style: DiffStyle::Inline,
            color: true,
            report_path: None,
        }
    }
}

impl HarnessConfig {
    /// Load a configuration from a TOML file. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] if the file cannot be read or parsed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> HarnessResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| HarnessError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text).map_err(|reason| HarnessError::Config {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    /// Timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Path of the reference answer for a fixture id.
    pub fn answer_path(&self, id: &str) -> PathBuf {
        self.answers_dir.join(format!("{id}.{SINK_EXTENSION}"))
    }
}
