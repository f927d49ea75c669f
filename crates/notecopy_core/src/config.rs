//! User options for the copy action.
//!
//! # Responsibility
//! - Deserialize the host's JSON option file with a typed default per key.
//! - Expose plain/full copy presets.
//!
//! # Invariants
//! - Missing keys take their defaults; unknown keys are ignored.
//! - A missing option file yields `CopyConfig::default()`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Relation tag prefix used when none is configured.
pub const DEFAULT_RELATION_PREFIX: &str = "relation_";
const DEFAULT_SHORTCUT: &str = "Ctrl+C";

/// What a batch does with the remaining notes after one note fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchErrorPolicy {
    /// Roll back the failed note and keep copying the rest.
    #[default]
    Continue,
    /// Roll back the failed note and skip every note after it.
    Abort,
}

/// Options read by the copy workflow. Keys match the host option file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyConfig {
    #[serde(rename = "shortcut-copy", default = "default_shortcut")]
    pub shortcut: String,
    /// Derive the copy's note id from the original's creation time.
    #[serde(rename = "Preserve creation time", default = "default_true")]
    pub preserve_creation_time: bool,
    #[serde(rename = "relate copies", default)]
    pub relate_copies: bool,
    /// Full copy when set: scheduling statistics follow the card.
    #[serde(rename = "Preserve ease, due, interval...", default = "default_true")]
    pub preserve_schedule: bool,
    #[serde(rename = "Copy log", default = "default_true")]
    pub copy_log: bool,
    #[serde(rename = "leave all fields empty in copy", default)]
    pub blank_all_fields: bool,
    #[serde(rename = "fields to leave empty in copy", default)]
    pub fields_to_blank: Vec<String>,
    #[serde(rename = "post-copy-tags", default)]
    pub post_copy_tags: Vec<String>,
    #[serde(rename = "tag prefixes", default = "default_relation_prefixes")]
    pub relation_prefixes: Vec<String>,
    #[serde(rename = "on error", default)]
    pub on_error: BatchErrorPolicy,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            shortcut: default_shortcut(),
            preserve_creation_time: true,
            relate_copies: false,
            preserve_schedule: true,
            copy_log: true,
            blank_all_fields: false,
            fields_to_blank: Vec::new(),
            post_copy_tags: Vec::new(),
            relation_prefixes: default_relation_prefixes(),
            on_error: BatchErrorPolicy::default(),
        }
    }
}

impl CopyConfig {
    /// Plain copy: new cards without review history.
    pub fn plain(mut self) -> Self {
        self.preserve_schedule = false;
        self.copy_log = false;
        self
    }

    /// Full copy: cards keep scheduling statistics and review history.
    pub fn full(mut self) -> Self {
        self.preserve_schedule = true;
        self.copy_log = true;
        self
    }
}

/// Option file read/parse errors.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read options `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid copy options: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Parses options from JSON text. An empty or blank string means defaults.
pub fn parse_config(json: &str) -> Result<CopyConfig, ConfigError> {
    if json.trim().is_empty() {
        return Ok(CopyConfig::default());
    }
    Ok(serde_json::from_str(json)?)
}

/// Loads options from `path`, falling back to defaults when it is absent.
pub fn load_config(path: impl AsRef<Path>) -> Result<CopyConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(CopyConfig::default());
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

fn default_true() -> bool {
    true
}

fn default_shortcut() -> String {
    DEFAULT_SHORTCUT.to_string()
}

fn default_relation_prefixes() -> Vec<String> {
    vec![DEFAULT_RELATION_PREFIX.to_string()]
}
