//! Command-line interface for `goldcheck`.
//!
//! # Examples
//!
//! ```bash
//! # Check ./simulator against test/ and answer/
//! goldcheck --bin ./simulator
//!
//! # Keep the captured outputs for inspection
//! goldcheck --bin "./simulator --dump" --save-mid
//!
//! # Evaluate every fixture and write a JSON report
//! goldcheck --bin ./simulator --keep-going --report report.json
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use goldcheck::harness::{DiffStyle, HaltPolicy, HarnessConfig, HarnessResult};

/// Golden-file conformance checker.
///
/// Runs the target once per fixture with the fixture on stdin, and compares
/// its output against the reference answer of the same name.
#[derive(Parser, Debug, Clone)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "CLI flags are naturally bools"
)]
#[command(name = "goldcheck", author, version, about, args_override_self = true)]
pub struct Cli {
    /// Target command line, split on whitespace
    #[arg(long = "bin", env = "GOLDCHECK_BIN", required_unless_present = "config")]
    pub bin: Option<String>,

    /// Keep the captured outputs in the scratch directory
    #[arg(long)]
    pub save_mid: bool,

    /// Fixture directory
    #[arg(long, value_name = "DIR")]
    pub fixtures: Option<PathBuf>,

    /// Reference answer directory
    #[arg(long, value_name = "DIR")]
    pub answers: Option<PathBuf>,

    /// Scratch directory for captured outputs
    #[arg(long, value_name = "DIR")]
    pub scratch: Option<PathBuf>,

    /// Per-fixture time limit in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Record attribute whose keys are normalized
    #[arg(long, value_name = "NAME")]
    pub canonical_key: Option<String>,

    /// Evaluate every fixture instead of stopping at the first failure
    #[arg(long)]
    pub keep_going: bool,

    /// Treat an undecodable reference answer as an error
    #[arg(long)]
    pub strict_answers: bool,

    /// How mismatches are shown
    #[arg(long, value_enum)]
    pub diff_style: Option<DiffStyle>,

    /// Disable ANSI colours
    ///
    /// Respects the `NO_COLOR` environment variable
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Write a JSON run report to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// TOML file with default settings; flags override it
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value = "human")]
    pub log_format: LogFormat,
}

/// Log line format on stderr.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Human,
    /// One JSON object per line
    Json,
}

impl Cli {
    /// Parse command line arguments.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create CLI from iterator (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if argument parsing fails.
    #[cfg(test)]
    pub fn try_parse_from<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Default filter directive for the verbosity count.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Build the run configuration: the config file if given, then flags.
    ///
    /// # Errors
    ///
    /// Returns [`goldcheck::harness::HarnessError::Config`] if the config
    /// file cannot be read or parsed.
    pub fn harness_config(&self) -> HarnessResult<HarnessConfig> {
        let base = match &self.config {
            Some(path) => HarnessConfig::from_toml_file(path)?,
            None => HarnessConfig::default(),
        };
        Ok(self.apply(base))
    }

    fn apply(&self, mut config: HarnessConfig) -> HarnessConfig {
        if let Some(bin) = &self.bin {
            config.command.clone_from(bin);
        }
        if let Some(dir) = &self.fixtures {
            config.fixtures_dir.clone_from(dir);
        }
        if let Some(dir) = &self.answers {
            config.answers_dir.clone_from(dir);
        }
        if let Some(dir) = &self.scratch {
            config.scratch_dir.clone_from(dir);
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout_ms = ms;
        }
        if let Some(key) = &self.canonical_key {
            config.canonical_key.clone_from(key);
        }
        if let Some(style) = self.diff_style {
            config.diff_style = style;
        }
        if self.report.is_some() {
            config.report_path.clone_from(&self.report);
        }
        config.keep_scratch |= self.save_mid;
        config.strict_answers |= self.strict_answers;
        config.color &= !self.no_color;
        if self.keep_going {
            config.halt_policy = HaltPolicy::RunAll;
        }
        config
    }
}
