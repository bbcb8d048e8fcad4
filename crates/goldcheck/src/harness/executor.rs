//! Executor - Runs the target once per fixture
//!
//! The fixture file becomes the child's stdin and the sink file its stdout.
//! The child gets a fixed wall-clock budget; past it the child is killed and
//! the invocation fails with [`HarnessError::Timeout`].

use std::fs::File;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use super::error::{HarnessError, HarnessResult};
use super::fixtures::Fixture;

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Outcome of one target invocation that finished in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Execution {
    /// Exit code, `None` if the child was terminated by a signal
    pub exit_code: Option<i32>,
    /// Whether the child reported success
    pub success: bool,
    /// Wall-clock time until exit
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u128(d.as_millis())
}

/// Invocation of the program under test
#[derive(Debug, Clone)]
pub struct Executor {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Executor {
    /// Build an executor from a whitespace-separated command line.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::EmptyCommand`] if `command` has no program.
    pub fn from_command(command: &str, timeout: Duration) -> HarnessResult<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(HarnessError::EmptyCommand)?;
        Ok(Self {
            program,
            args: parts.collect(),
            timeout,
        })
    }

    /// Program name or path.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed before any fixture data.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Per-invocation budget.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the target on `fixture`, capturing stdout into `sink`.
    ///
    /// The exit status is recorded but not judged; only spawn failures and
    /// timeouts are errors.
    ///
    /// # Errors
    ///
    /// [`HarnessError::Io`] if the fixture or sink cannot be opened,
    /// [`HarnessError::Spawn`] if the program cannot start,
    /// [`HarnessError::Timeout`] if it does not exit in time, and
    /// [`HarnessError::Wait`] if polling the child fails.
    pub fn run(&self, fixture: &Fixture, sink: &Path) -> HarnessResult<Execution> {
        let stdin = File::open(&fixture.path).map_err(|e| HarnessError::io(&fixture.path, e))?;
        let stdout = File::create(sink).map_err(|e| HarnessError::io(sink, e))?;

        let started = Instant::now();
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| HarnessError::Spawn {
                program: self.program.clone(),
                fixture: fixture.id.clone(),
                source,
            })?;
        tracing::debug!(pid = child.id(), program = %self.program, "spawned target");

        let status = self.wait_bounded(child, &fixture.id, started)?;
        let execution = Execution {
            exit_code: status.code(),
            success: status.success(),
            elapsed: started.elapsed(),
        };
        if !execution.success {
            tracing::warn!(exit_code = ?execution.exit_code, "target exited unsuccessfully");
        }
        Ok(execution)
    }

    fn wait_bounded(&self, mut child: Child, id: &str, started: Instant) -> HarnessResult<ExitStatus> {
        let wait_err = |source| HarnessError::Wait {
            fixture: id.to_string(),
            source,
        };

        loop {
            if let Some(status) = child.try_wait().map_err(wait_err)? {
                return Ok(status);
            }

            let elapsed = started.elapsed();
            if elapsed >= self.timeout {
                tracing::error!(timeout_ms = self.timeout.as_millis() as u64, "target timed out, killing it");
                // The child may exit between try_wait and kill; reaping below settles it.
                let _ = child.kill();
                child.wait().map_err(wait_err)?;
                return Err(HarnessError::Timeout {
                    fixture: id.to_string(),
                    timeout: self.timeout,
                });
            }

            thread::sleep(POLL_INTERVAL.min(self.timeout - elapsed));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_split() {
        let exec = Executor::from_command("python3  emu.py --dump", Duration::from_secs(1)).unwrap();
        assert_eq!(exec.program(), "python3");
        assert_eq!(exec.args(), ["emu.py", "--dump"]);
    }

    #[test]
    fn test_empty_command_rejected() {
        let err = Executor::from_command("   ", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, HarnessError::EmptyCommand));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("t1.txt");
        std::fs::write(&input, "x").unwrap();
        let fixture = Fixture::from_path(&input).unwrap();

        let exec = Executor::from_command("./definitely-not-a-program", Duration::from_secs(1)).unwrap();
        let err = exec.run(&fixture, &dir.path().join("t1.json")).unwrap_err();
        assert!(matches!(err, HarnessError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_stdin_is_piped_to_sink() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("t1.txt");
        std::fs::write(&input, r#"[{"MEM":{"0":1}}]"#).unwrap();
        let fixture = Fixture::from_path(&input).unwrap();
        let sink = dir.path().join("t1.json");

        let exec = Executor::from_command("cat", Duration::from_secs(5)).unwrap();
        let execution = exec.run(&fixture, &sink).unwrap();

        assert!(execution.success);
        assert_eq!(execution.exit_code, Some(0));
        assert_eq!(std::fs::read_to_string(&sink).unwrap(), r#"[{"MEM":{"0":1}}]"#);
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("t3.txt");
        std::fs::write(&input, "").unwrap();
        let fixture = Fixture::from_path(&input).unwrap();

        let exec = Executor::from_command("sleep 10", Duration::from_millis(100)).unwrap();
        let started = Instant::now();
        let err = exec.run(&fixture, &dir.path().join("t3.json")).unwrap_err();

        assert!(matches!(err, HarnessError::Timeout { ref fixture, .. } if fixture == "t3"));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("t5.txt");
        std::fs::write(&input, "").unwrap();
        let fixture = Fixture::from_path(&input).unwrap();

        let exec = Executor::from_command("false", Duration::from_secs(5)).unwrap();
        let execution = exec.run(&fixture, &dir.path().join("t5.json")).unwrap();
        assert!(!execution.success);
        assert_eq!(execution.exit_code, Some(1));
    }
}
