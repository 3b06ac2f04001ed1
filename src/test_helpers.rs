//! Shared test utilities for the buildpage test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = site(&[
//!     ("partials/nav.html", "<nav>...</nav>"),
//!     ("index.html", "<embed-file src=\"nav.html\"></embed-file>"),
//! ]);
//! assert_eq!(read(&tmp, "partials/nav.html"), "<nav>...</nav>");
//! ```

use std::path::Path;
use tempfile::TempDir;

/// Create a temp directory holding the given `(relative path, contents)` files.
///
/// Parent directories are created as needed.
pub fn site(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (path, contents) in files {
        write(tmp.path(), path, contents);
    }
    tmp
}

/// Write one file below `root`, creating parent directories.
pub fn write(root: &Path, path: &str, contents: &str) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&full, contents).unwrap();
}

/// Read a file below the temp directory. Panics with the path on failure.
pub fn read(tmp: &TempDir, path: &str) -> String {
    let full = tmp.path().join(path);
    std::fs::read_to_string(&full)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", full.display()))
}
