//! Orchestrator - Runs every fixture through the pipeline
//!
//! For each fixture, in file-name order: execute the target, load the captured
//! output and the reference answer, normalize both, compare. What happens
//! after a failure depends on the [`HaltPolicy`]:
//!
//! - [`HaltPolicy::FirstFailure`]: the first mismatch or fatal error ends the
//!   run, recorded as the last [`CaseRecord`]. Later fixtures are skipped.
//! - [`HaltPolicy::RunAll`]: every fixture gets a [`CaseRecord`] whose
//!   outcome is a `Result`, and the run continues.
//!
//! Either way the report holds everything evaluated so far, so it can be
//! written out after an aborted run. Errors that are not about one fixture
//! (unreadable fixture directory, scratch directory not creatable) are
//! returned as `Err` in both modes.

use std::path::Path;
use std::time::{Duration, Instant};

use super::compare::loaded_equal;
use super::config::{HaltPolicy, HarnessConfig};
use super::error::{HarnessError, HarnessResult};
use super::executor::{Execution, Executor};
use super::fixtures::{Fixture, discover_fixtures};
use super::loader::{Loaded, load_document};
use super::normalize::Normalizer;
use super::render::render_loaded;
use super::scratch::ScratchDir;

/// A wrong answer, with both sides normalized and rendered
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// Normalized captured output
    pub actual: Loaded,
    /// Normalized reference answer
    pub expected: Loaded,
    /// Canonical rendering of `actual`
    pub actual_text: String,
    /// Canonical rendering of `expected`
    pub expected_text: String,
}

/// Comparison outcome for one fixture. Ordinary data, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseVerdict {
    /// Output matched the answer
    Pass,
    /// Output did not match the answer
    Mismatch(Box<Mismatch>),
}

impl CaseVerdict {
    /// Returns true for [`CaseVerdict::Pass`]
    pub fn is_pass(&self) -> bool {
        matches!(self, CaseVerdict::Pass)
    }
}

/// Everything recorded about one fixture
#[derive(Debug)]
pub struct CaseRecord {
    /// Fixture id
    pub fixture: String,
    /// Target invocation, if it finished in time
    pub execution: Option<Execution>,
    /// Verdict, or the error that stopped this fixture
    pub outcome: HarnessResult<CaseVerdict>,
    /// Time spent on the whole pipeline for this fixture
    pub duration: Duration,
}

impl CaseRecord {
    /// Returns true if the fixture passed
    pub fn passed(&self) -> bool {
        matches!(self.outcome, Ok(CaseVerdict::Pass))
    }

    /// The mismatch, if this fixture produced one
    pub fn mismatch(&self) -> Option<&Mismatch> {
        match &self.outcome {
            Ok(CaseVerdict::Mismatch(m)) => Some(&**m),
            _ => None,
        }
    }

    /// The error, if this fixture hit one
    pub fn error(&self) -> Option<&HarnessError> {
        self.outcome.as_ref().err()
    }
}

/// Result of a whole run
#[derive(Debug)]
pub struct RunReport {
    /// Policy the run used
    pub policy: HaltPolicy,
    /// Number of fixtures discovered
    pub total_fixtures: usize,
    /// One record per fixture evaluated, in order
    pub cases: Vec<CaseRecord>,
    /// Wall-clock time of the run
    pub duration: Duration,
}

impl RunReport {
    /// Fixtures that passed
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed()).count()
    }

    /// Fixtures that failed, by mismatch or error
    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    /// Fixtures never evaluated because the run halted
    pub fn skipped(&self) -> usize {
        self.total_fixtures - self.cases.len()
    }

    /// True if every discovered fixture was evaluated and passed
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.skipped() == 0
    }

    /// True if any fixture ended in a fatal error
    pub fn has_errors(&self) -> bool {
        self.cases.iter().any(|c| c.error().is_some())
    }

    /// Failing records, in order
    pub fn failures(&self) -> impl Iterator<Item = &CaseRecord> {
        self.cases.iter().filter(|c| !c.passed())
    }
}

/// Sequences execution, loading, normalization and comparison
#[derive(Debug)]
pub struct Orchestrator {
    config: HarnessConfig,
    executor: Executor,
    normalizer: Normalizer,
}

impl Orchestrator {
    /// Create an orchestrator for a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::EmptyCommand`] if no target command is set.
    pub fn new(config: HarnessConfig) -> HarnessResult<Self> {
        let executor = Executor::from_command(&config.command, config.timeout())?;
        let normalizer = Normalizer::new(config.canonical_key.clone());
        Ok(Self {
            config,
            executor,
            normalizer,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run every fixture.
    ///
    /// The scratch directory lives exactly as long as this call, unless the
    /// configuration keeps it.
    ///
    /// # Errors
    ///
    /// Only environment failures: the fixture directory cannot be read or
    /// the scratch directory cannot be created. Per-fixture errors end up in
    /// the report.
    pub fn run(&self) -> HarnessResult<RunReport> {
        let started = Instant::now();
        let fixtures = discover_fixtures(&self.config.fixtures_dir)?;
        let scratch = ScratchDir::create(&self.config.scratch_dir, self.config.keep_scratch)?;
        tracing::info!(
            fixtures = fixtures.len(),
            command = %self.config.command,
            policy = ?self.config.halt_policy,
            "starting run"
        );

        let mut cases = Vec::with_capacity(fixtures.len());
        for (index, fixture) in fixtures.iter().enumerate() {
            let record = self.run_case(fixture, &scratch);
            tracing::debug!(index, fixture = %fixture.id, passed = record.passed(), "fixture done");

            let halt = self.config.halt_policy == HaltPolicy::FirstFailure && !record.passed();
            cases.push(record);
            if halt {
                tracing::info!(fixture = %fixture.id, "halting after first failure");
                break;
            }
        }

        let report = RunReport {
            policy: self.config.halt_policy,
            total_fixtures: fixtures.len(),
            cases,
            duration: started.elapsed(),
        };
        tracing::info!(
            passed = report.passed(),
            failed = report.failed(),
            skipped = report.skipped(),
            elapsed_ms = report.duration.as_millis() as u64,
            "run finished"
        );
        Ok(report)
    }

    /// Run the pipeline for one fixture.
    pub fn run_case(&self, fixture: &Fixture, scratch: &ScratchDir) -> CaseRecord {
        let span = tracing::info_span!("fixture", id = %fixture.id);
        let _guard = span.enter();
        let started = Instant::now();

        let sink = scratch.sink_path(&fixture.id);
        let (execution, outcome) = match self.executor.run(fixture, &sink) {
            Ok(execution) => {
                tracing::debug!(
                    exit_code = ?execution.exit_code,
                    elapsed_ms = execution.elapsed.as_millis() as u64,
                    "target finished"
                );
                (Some(execution), self.judge(fixture, &sink))
            }
            Err(e) => (None, Err(e)),
        };

        match &outcome {
            Ok(CaseVerdict::Pass) => tracing::info!("pass"),
            Ok(CaseVerdict::Mismatch(_)) => tracing::warn!("wrong answer"),
            Err(e) => tracing::error!(error = %e, "fixture aborted"),
        }

        CaseRecord {
            fixture: fixture.id.clone(),
            execution,
            outcome,
            duration: started.elapsed(),
        }
    }

    fn judge(&self, fixture: &Fixture, sink: &Path) -> HarnessResult<CaseVerdict> {
        let actual = load_document(sink);
        let expected = load_document(self.config.answer_path(&fixture.id));

        if let Loaded::Undecodable(reason) = &expected {
            if self.config.strict_answers {
                return Err(HarnessError::UndecodableAnswer {
                    fixture: fixture.id.clone(),
                    reason: reason.clone(),
                });
            }
            tracing::warn!(reason = %reason, "reference answer is undecodable");
        }

        let actual = self.normalize(&fixture.id, "actual", &actual)?;
        let expected = self.normalize(&fixture.id, "expected", &expected)?;

        if loaded_equal(&actual, &expected) {
            return Ok(CaseVerdict::Pass);
        }
        Ok(CaseVerdict::Mismatch(Box::new(Mismatch {
            actual_text: render_loaded(&actual),
            expected_text: render_loaded(&expected),
            actual,
            expected,
        })))
    }

    fn normalize(&self, id: &str, side: &'static str, loaded: &Loaded) -> HarnessResult<Loaded> {
        self.normalizer.normalize(loaded).map_err(|e| {
            let value = render_loaded(loaded);
            tracing::error!(side, reason = %e, %value, "cannot normalize state records");
            HarnessError::Shape {
                fixture: id.to_string(),
                side,
                reason: e.reason,
                value,
            }
        })
    }
}
