//! Run configuration loaded from `asx.toml`

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::normalize::DEFAULT_TAB_UNIT;

/// Configuration file looked up in the current directory
pub const CONFIG_FILE: &str = "asx.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading configuration from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing configuration {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Interpreter configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Report runtime errors and keep going
    pub ignore_errors: bool,
    /// Standard-library directory searched first by `import`
    pub std_dir: Option<PathBuf>,
    /// User directory searched by `import`; the working directory when unset
    pub user_dir: Option<PathBuf>,
    /// Indentation unit for files without indented lines
    pub default_tab_unit: usize,
    pub mixins: MixinConfig,
}

/// `[mixins]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MixinConfig {
    /// Module names that are not loaded
    pub disabled: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore_errors: false,
            std_dir: None,
            user_dir: None,
            default_tab_unit: DEFAULT_TAB_UNIT,
            mixins: MixinConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(path: &Path, data: &str) -> Result<Self, ConfigError> {
        toml::from_str(data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(path, &data)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn with_ignore_errors(mut self, ignore: bool) -> Self {
        self.ignore_errors = ignore;
        self
    }

    pub fn with_std_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.std_dir = Some(dir.into());
        self
    }

    pub fn with_user_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_dir = Some(dir.into());
        self
    }

    pub fn with_disabled_mixins(mut self, modules: Vec<String>) -> Self {
        self.mixins.disabled = modules;
        self
    }
}
