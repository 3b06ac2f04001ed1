//! Build configuration.
//!
//! Handles loading, validating, and merging `buildpage.toml`. Values are
//! layered: stock defaults, then the config file, then command-line flags
//! (applied by the caller on top of the loaded [`BuildConfig`]).
//!
//! ## Config File Location
//!
//! `buildpage.toml` in the working directory is picked up when present. An
//! explicit `--config PATH` must exist.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! search_path = []            # Searched after any --search-path flags
//! include_current_dir = true  # Search "." last
//!
//! [defines]                   # Embed name -> file actually loaded
//! # "nav.html" = "nav-print.html"
//!
//! [titles]
//! suffix = ""                 # Appended to every page title
//! output_dir = "titles"       # Where `buildpage title KEY` writes KEY.html
//!
//! [titles.pages]              # Title key -> page title
//! # index = "Home"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::rename::RenameTable;
use crate::search::SearchPath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "buildpage.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Build configuration loaded from `buildpage.toml`.
///
/// All fields have defaults; a config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Directories searched for embedded files, after any `--search-path` flags.
    pub search_path: Vec<PathBuf>,
    /// Search the working directory after every other directory.
    pub include_current_dir: bool,
    /// Embed name → name of the file loaded in its place.
    pub defines: BTreeMap<String, String>,
    /// `<title>` snippet generation.
    pub titles: TitlesConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            search_path: Vec::new(),
            include_current_dir: true,
            defines: BTreeMap::new(),
            titles: TitlesConfig::default(),
        }
    }
}

impl BuildConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_path.iter().any(|dir| dir.as_os_str().is_empty()) {
            return Err(ConfigError::Validation(
                "search_path entries must not be empty".into(),
            ));
        }
        for (name, substitute) in &self.defines {
            if name.is_empty() || substitute.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "defines must map non-empty names (got {name:?} = {substitute:?})"
                )));
            }
        }
        if self.titles.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "titles.output_dir must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Effective search path: `first` (command-line directories), then
    /// `search_path`, then `.` if `include_current_dir` is set.
    pub fn search_path_with(&self, first: &[PathBuf]) -> SearchPath {
        let mut search = SearchPath::new(first.iter().chain(&self.search_path));
        for dir in search.dirs().iter().filter(|dir| !dir.is_dir()) {
            tracing::warn!(dir = %dir.display(), "search path directory does not exist");
        }
        if self.include_current_dir {
            search.push(".");
        }
        search
    }

    /// Rename table from `[defines]`, overridden by `extra` pairs in order.
    pub fn rename_table_with(&self, extra: &[(String, String)]) -> RenameTable {
        let mut table: RenameTable = self.defines.clone().into_iter().collect();
        table.extend(extra.iter().cloned());
        table
    }
}

/// Settings for `buildpage title`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TitlesConfig {
    /// Appended to every page title, e.g. `" - My Site"`.
    pub suffix: String,
    /// Directory title snippets are written to.
    pub output_dir: PathBuf,
    /// Title key → page title.
    pub pages: BTreeMap<String, String>,
}

impl Default for TitlesConfig {
    fn default() -> Self {
        Self {
            suffix: String::new(),
            output_dir: PathBuf::from("titles"),
            pages: BTreeMap::new(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BuildConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(value)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BuildConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BuildConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `buildpage.toml` from `dir`, falling back to stock defaults when the
/// file does not exist.
pub fn load_config(dir: &Path) -> Result<BuildConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    let overlay = if path.exists() {
        tracing::debug!(path = %path.display(), "loading config");
        Some(load_raw_config(&path)?)
    } else {
        None
    };
    resolve_config(stock_defaults_value(), overlay)
}

/// Load an explicitly named config file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<BuildConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    tracing::debug!(path = %path.display(), "loading config");
    let overlay = load_raw_config(path)?;
    resolve_config(stock_defaults_value(), Some(overlay))
}

/// Returns a fully-commented stock `buildpage.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# buildpage Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags are applied on top of this file.
# Unknown keys will cause an error.

# Directories searched, in order, for files named by <embed-file src="...">.
# Directories given with --search-path are searched before these.
search_path = []

# Search the working directory after all other directories.
include_current_dir = true

# ---------------------------------------------------------------------------
# Defines
# ---------------------------------------------------------------------------
# Load a different file wherever a name is embedded. --define NAME VALUE
# on the command line overrides entries here.
[defines]
# "nav.html" = "nav-print.html"

# ---------------------------------------------------------------------------
# Title snippets (buildpage title KEY)
# ---------------------------------------------------------------------------
[titles]
# Appended to every title, e.g. " - My Site".
suffix = ""

# Directory KEY.html snippets are written to. Add it to search_path to embed
# them with <embed-file src="KEY.html">.
output_dir = "titles"

# Title key -> page title.
[titles.pages]
# index = "Home"
# about = "About"
"##
}
