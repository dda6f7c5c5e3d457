use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Database settings.
///
/// `path: None` keeps everything in memory; a path selects the disk engine
/// rooted there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub path: Option<PathBuf>,
    /// Write `catalog.json` under `path` on every schema change
    pub persist_catalog: bool,
    /// Rewrite table files on every commit instead of on `checkpoint`
    pub sync_on_commit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: None,
            persist_catalog: true,
            sync_on_commit: true,
        }
    }
}

impl Config {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn catalog_path(&self) -> Option<PathBuf> {
        match &self.path {
            Some(root) if self.persist_catalog => Some(root.join("catalog.json")),
            _ => None,
        }
    }
}
