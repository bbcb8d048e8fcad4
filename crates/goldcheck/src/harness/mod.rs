//! Golden-file conformance harness
//!
//! The pipeline, one stage per module:
//!
//! - [`discover_fixtures`]: ordered fixture files from the fixture directory
//! - [`Executor`]: runs the target with a fixture on stdin, stdout to a sink file
//! - [`load_document`]: decodes a sink or answer file into a [`Loaded`] document
//! - [`Normalizer`]: canonical state-record form (string keys under the canonical attribute)
//! - [`loaded_equal`]: exact deep equality
//! - [`SequenceMatcher`] and [`render_inline_diff`]: character diff for wrong answers
//! - [`Orchestrator`]: sequences all of it under a [`HaltPolicy`]
//! - [`render_run`] and [`JsonReport`]: terminal and machine-readable output

mod compare;
mod config;
mod diff;
mod error;
mod executor;
mod fixtures;
mod loader;
mod normalize;
mod render;
mod report;
mod runner;
mod scratch;

pub use compare::{loaded_equal, values_equal};
pub use config::{DiffStyle, HaltPolicy, HarnessConfig, SINK_EXTENSION};
pub use diff::{
    DiffMarkers, Match, OpTag, Opcode, SequenceMatcher, char_opcodes, render_inline_diff,
    render_unified_diff,
};
pub use error::{HarnessError, HarnessResult};
pub use executor::{Execution, Executor};
pub use fixtures::{Fixture, discover_fixtures};
pub use loader::{Loaded, Value, decode_bytes, kind_name, load_document};
pub use normalize::{Normalizer, ShapeError, key_string};
pub use render::{WIDTH, render_flat, render_loaded, render_value};
pub use report::{
    JsonCase, JsonReport, ReportOptions, SUCCESS_LINE, render_diff, render_error, render_failure,
    render_mismatch, render_run,
};
pub use runner::{CaseRecord, CaseVerdict, Mismatch, Orchestrator, RunReport};
pub use scratch::ScratchDir;
