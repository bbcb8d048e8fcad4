//! Fixture discovery
//!
//! A fixture is one input file in the fixture directory. Its id is the file
//! name up to the first `.`, so `t1.txt` and `t1.in.bin` both become `t1`.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::{HarnessError, HarnessResult};

/// A single named input case fed to the target program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    /// Identifier shared by the fixture, its sink and its answer
    pub id: String,
    /// Path to the raw input bytes
    pub path: PathBuf,
}

impl Fixture {
    /// Create a fixture from a path, deriving the id from the file name.
    ///
    /// Returns `None` for paths without a usable file name (no name, not
    /// UTF-8, or a dotfile with an empty stem).
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let id = fixture_id(path.file_name()?.to_str()?)?;
        Some(Self { id, path })
    }
}

fn fixture_id(file_name: &str) -> Option<String> {
    let stem = file_name.split('.').next()?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

/// Enumerate the fixtures in `dir`, sorted by file name.
///
/// Subdirectories and dotfiles are ignored.
///
/// # Errors
///
/// Returns [`HarnessError::FixtureDir`] if the directory cannot be read.
pub fn discover_fixtures(dir: impl AsRef<Path>) -> HarnessResult<Vec<Fixture>> {
    let dir = dir.as_ref();
    let dir_err = |source| HarnessError::FixtureDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(dir_err)? {
        let entry = entry.map_err(dir_err)?;
        let file_type = entry.file_type().map_err(dir_err)?;
        if !file_type.is_dir() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let fixtures: Vec<Fixture> = paths.into_iter().filter_map(Fixture::from_path).collect();
    tracing::debug!(dir = %dir.display(), count = fixtures.len(), "discovered fixtures");
    Ok(fixtures)
}
