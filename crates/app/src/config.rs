//! Front-desk configuration
//!
//! Loaded from `config.toml` in the platform config directory, or from the
//! path given with `--config`. A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use grandview_core::{FacadeOptions, TransitionPolicy, DEFAULT_OPERATOR};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const OPERATOR_ENV: &str = "GRANDVIEW_OPERATOR";
pub const SNAPSHOT_ENV: &str = "GRANDVIEW_SNAPSHOT";

const CONFIG_FILE: &str = "config.toml";
const SNAPSHOT_FILE: &str = "store.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine the config directory")]
    NoConfigDir,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("operator-name is empty in {0}")]
    EmptyOperator(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Author written on notes and new tasks
    pub operator_name: String,
    pub transition_policy: TransitionPolicy,
    /// JSON store snapshot; defaults to the data directory
    pub snapshot_path: Option<PathBuf>,
    /// Used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            operator_name: DEFAULT_OPERATOR.to_string(),
            transition_policy: TransitionPolicy::default(),
            snapshot_path: None,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`, then apply
    /// environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path().ok_or(ConfigError::NoConfigDir)?,
        };

        let mut config = Self::from_file(&path)?;
        config.apply_overrides(
            std::env::var(OPERATOR_ENV).ok(),
            std::env::var(SNAPSHOT_ENV).ok(),
        );
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if config.operator_name.trim().is_empty() {
            return Err(ConfigError::EmptyOperator(path.to_path_buf()));
        }

        Ok(config)
    }

    fn apply_overrides(&mut self, operator: Option<String>, snapshot: Option<String>) {
        if let Some(operator) = operator.filter(|o| !o.trim().is_empty()) {
            self.operator_name = operator;
        }
        if let Some(snapshot) = snapshot.filter(|s| !s.is_empty()) {
            self.snapshot_path = Some(PathBuf::from(snapshot));
        }
    }

    pub fn facade_options(&self) -> FacadeOptions {
        FacadeOptions {
            operator: self.operator_name.clone(),
            policy: self.transition_policy,
        }
    }

    /// Configured snapshot path, falling back to the data directory
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.snapshot_path
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join(SNAPSHOT_FILE)))
    }

    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "grandview", "grandview")
}
