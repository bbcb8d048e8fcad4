//! HarnessError - Fatal conditions that abort a run
//!
//! Everything in here ends the run. Recoverable conditions never show up as
//! errors: an undecodable document is a [`Loaded::Undecodable`] value and a
//! wrong answer is a [`CaseVerdict::Mismatch`].
//!
//! [`Loaded::Undecodable`]: super::loader::Loaded::Undecodable
//! [`CaseVerdict::Mismatch`]: super::runner::CaseVerdict::Mismatch

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that abort a conformance run
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The target command string had no program in it
    #[error("empty target command")]
    EmptyCommand,

    /// The target program could not be started
    #[error("failed to start `{program}` for fixture {fixture}: {source}")]
    Spawn {
        program: String,
        fixture: String,
        #[source]
        source: io::Error,
    },

    /// The target program did not exit within the timeout
    #[error("fixture {fixture} timed out after {}ms", .timeout.as_millis())]
    Timeout { fixture: String, timeout: Duration },

    /// Waiting on (or killing) the child process failed
    #[error("failed waiting for target on fixture {fixture}: {source}")]
    Wait {
        fixture: String,
        #[source]
        source: io::Error,
    },

    /// A decoded document does not have the state-record shape
    #[error("malformed state records in {fixture} ({side}): {reason}")]
    Shape {
        fixture: String,
        side: &'static str,
        reason: String,
        /// Rendering of the offending document
        value: String,
    },

    /// A reference answer could not be decoded and strict answers are on
    #[error("reference answer for {fixture} is undecodable: {reason}")]
    UndecodableAnswer { fixture: String, reason: String },

    /// The fixture directory is missing or unreadable
    #[error("cannot read fixture directory {}: {source}", .path.display())]
    FixtureDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Filesystem error on a path the harness owns
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration file could not be read or parsed
    #[error("invalid config {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}

impl HarnessError {
    /// Build an [`HarnessError::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short machine-readable name of the failure class
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyCommand | Self::Spawn { .. } => "spawn",
            Self::Timeout { .. } => "timeout",
            Self::Wait { .. } => "wait",
            Self::Shape { .. } => "shape",
            Self::UndecodableAnswer { .. } => "undecodable_answer",
            Self::FixtureDir { .. } | Self::Io { .. } => "io",
            Self::Config { .. } => "config",
        }
    }
}

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;
