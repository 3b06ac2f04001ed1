//! `<title>` snippet generation.
//!
//! Each page of a site gets its title from a key in the `[titles.pages]`
//! config table. `buildpage title KEY` writes a one-line snippet to
//! `{output_dir}/{KEY}.html`:
//!
//! ```html
//! <title>Avionics - LithosphereRocketry</title>
//! ```
//!
//! With `output_dir` on the search path, a template's head pulls it in with
//! `<embed-file src="avionics.html"></embed-file>`, usually behind a define
//! so one template serves every page.

use crate::config::TitlesConfig;
use maud::html;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TitleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No title configured for '{0}' (add it under [titles.pages])")]
    UnknownKey(String),
    #[error("Invalid title key '{0}': keys become file names and must not contain path separators")]
    InvalidKey(String),
}

/// Render the snippet for `key`. Title and suffix are HTML-escaped.
pub fn render_title(titles: &TitlesConfig, key: &str) -> Result<String, TitleError> {
    let page_title = titles
        .pages
        .get(key)
        .ok_or_else(|| TitleError::UnknownKey(key.to_string()))?;
    let markup = html! {
        title { (page_title) (titles.suffix) }
    };
    Ok(markup.into_string())
}

/// Write the snippet for `key` to `{dir}/{key}.html`, creating `dir`.
pub fn write_title(titles: &TitlesConfig, key: &str, dir: &Path) -> Result<PathBuf, TitleError> {
    if key.is_empty() || key == ".." || key.contains(['/', '\\']) {
        return Err(TitleError::InvalidKey(key.to_string()));
    }
    let snippet = render_title(titles, key)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{key}.html"));
    fs::write(&path, snippet)?;
    tracing::info!(key, path = %path.display(), "wrote title snippet");
    Ok(path)
}
