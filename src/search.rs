//! Ordered directory lookup for embedded files.
//!
//! A name is probed as `directory/name` in each directory in turn, and the
//! first regular file found wins. The candidate path is a plain
//! concatenation, so a name that itself contains slashes is looked up below
//! every directory rather than replacing it.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directories probed, in order, for embedded files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a directory after all existing ones.
    pub fn push(&mut self, dir: impl Into<PathBuf>) {
        self.dirs.push(dir.into());
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// First `directory/name` that exists as a file.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        self.dirs
            .iter()
            .map(|dir| candidate(dir, name))
            .find(|path| path.is_file())
    }

    /// Read the file `name` resolves to.
    ///
    /// `Ok(None)` when no directory holds the file; `Err` when the file was
    /// found but could not be read.
    pub fn read(&self, name: &str) -> io::Result<Option<String>> {
        let Some(path) = self.locate(name) else {
            tracing::debug!(name, "not found in search path");
            return Ok(None);
        };
        tracing::debug!(name, path = %path.display(), "located");
        fs::read_to_string(&path).map(Some)
    }
}

fn candidate(dir: &Path, name: &str) -> PathBuf {
    let mut joined = OsString::from(dir.as_os_str());
    joined.push("/");
    joined.push(name);
    PathBuf::from(joined)
}
