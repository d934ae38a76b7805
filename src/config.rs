use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TaskError};
use crate::persist::DEFAULT_TASKS_FILE;

/// How the interactive screen takes tasks off the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalMode {
    /// Tick tasks and delete them together.
    #[default]
    Select,
    /// Accomplish the earliest-due task only.
    Earliest,
}

impl FromStr for RemovalMode {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "select" => Ok(RemovalMode::Select),
            "earliest" => Ok(RemovalMode::Earliest),
            other => Err(TaskError::Config(format!(
                "unknown removal mode {other:?}, expected \"select\" or \"earliest\""
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tasks_file: PathBuf,
    pub removal_mode: RemovalMode,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tasks_file: PathBuf::from(DEFAULT_TASKS_FILE),
            removal_mode: RemovalMode::default(),
            log_file: None,
        }
    }
}

impl Config {
    /// Reads a JSON config file. Missing keys fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::parse(path, &data)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(data) => Self::parse(path, &data),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn parse(path: &Path, data: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(data)
            .map_err(|err| TaskError::Config(format!("{}: {err}", path.display())))?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }
}
