//! Delivering results.
//!
//! A run produces one piece of text: the expanded page, a dependency list, or a
//! title snippet. It goes to stdout followed by a newline, or into a file
//! exactly as produced. Either way it is only delivered once the whole run has
//! succeeded, so a failed build never leaves a truncated page behind.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Where a command's result goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Destination<'a> {
    Stdout,
    File(&'a Path),
}

impl<'a> From<Option<&'a Path>> for Destination<'a> {
    fn from(path: Option<&'a Path>) -> Self {
        path.map_or(Destination::Stdout, Destination::File)
    }
}

/// Write `text` to `dest`.
pub fn emit(text: &str, dest: Destination<'_>) -> io::Result<()> {
    match dest {
        Destination::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(format_stdout(text).as_bytes())?;
            stdout.flush()
        }
        Destination::File(path) => {
            fs::write(path, text)?;
            tracing::info!(path = %path.display(), bytes = text.len(), "wrote output");
            Ok(())
        }
    }
}

/// Text as printed to stdout: always newline-terminated.
fn format_stdout(text: &str) -> String {
    format!("{text}\n")
}
