//! ScratchDir - The intermediate output directory of one run
//!
//! Created when a run starts and removed when the guard drops, on every exit
//! path, unless the caller asked to keep it.

use std::fs;
use std::path::{Path, PathBuf};

use super::config::SINK_EXTENSION;
use super::error::{HarnessError, HarnessResult};

/// Guard owning the directory captured outputs are written to
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    keep: bool,
}

impl ScratchDir {
    /// Create (or reuse) the directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Io`] if the directory cannot be created.
    pub fn create(path: impl Into<PathBuf>, keep: bool) -> HarnessResult<Self> {
        let path = path.into();
        fs::create_dir_all(&path).map_err(|e| HarnessError::io(&path, e))?;
        tracing::debug!(path = %path.display(), keep, "scratch directory ready");
        Ok(Self { path, keep })
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the directory survives the guard.
    pub fn is_kept(&self) -> bool {
        self.keep
    }

    /// Sink path for a fixture id.
    pub fn sink_path(&self, id: &str) -> PathBuf {
        self.path.join(format!("{id}.{SINK_EXTENSION}"))
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if self.keep {
            tracing::info!(path = %self.path.display(), "keeping intermediate outputs");
            return;
        }
        if let Err(error) = fs::remove_dir_all(&self.path) {
            tracing::warn!(path = %self.path.display(), %error, "failed to remove scratch directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("temp_answer");
        {
            let scratch = ScratchDir::create(&path, false).unwrap();
            fs::write(scratch.sink_path("t1"), "[]").unwrap();
            assert!(path.join("t1.json").exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_kept_when_requested() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("temp_answer");
        {
            let scratch = ScratchDir::create(&path, true).unwrap();
            assert!(scratch.is_kept());
            fs::write(scratch.sink_path("t1"), "[]").unwrap();
        }
        assert!(path.join("t1.json").exists());
    }

    #[test]
    fn test_removed_when_unwinding() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("scratch");
        let inner = path.clone();
        let result = std::panic::catch_unwind(move || {
            let _scratch = ScratchDir::create(&inner, false).unwrap();
            panic!("boom");
        });
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
