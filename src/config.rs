//! Layered configuration for the symbol index.
//!
//! Sources, later ones winning:
//! - Built-in defaults
//! - `.defindex/settings.toml`, found by walking up from the current directory
//! - Environment variables
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `DEFINDEX_` and use double
//! underscores to separate nested levels:
//! - `DEFINDEX_INDEX__RESCAN_INTERVAL_SECS=5` sets `index.rescan_interval_secs`
//! - `DEFINDEX_INDEX__AUTO_SAVE=false` sets `index.auto_save`
//! - `DEFINDEX_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{IndexError, IndexResult};

/// Directory that marks a project root and holds its cache and settings.
pub const LOCAL_DIR_NAME: &str = ".defindex";

pub const SETTINGS_FILE_NAME: &str = "settings.toml";

const ENV_PREFIX: &str = "DEFINDEX_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct IndexConfig {
    /// Minimum number of seconds between two non-forced directory walks
    #[serde(default = "default_rescan_interval_secs")]
    pub rescan_interval_secs: u64,

    /// Persist the index after every completed rescan triggered by a lookup
    #[serde(default = "default_true")]
    pub auto_save: bool,

    /// Directory names never descended into during a scan
    #[serde(default = "default_ignored_dirs")]
    pub ignored_dirs: Vec<String>,

    /// Directory names whose presence marks a project root
    #[serde(default = "default_marker_dirs")]
    pub marker_dirs: Vec<String>,

    /// Cache directory, relative to the project root
    #[serde(default = "default_cache_dir_name")]
    pub cache_dir_name: String,

    #[serde(default = "default_cache_file_name")]
    pub cache_file_name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Default level for every target (`error`, `warn`, `info`, `debug`, `trace`)
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target overrides, e.g. `defindex::indexing = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_rescan_interval_secs() -> u64 {
    60
}
fn default_ignored_dirs() -> Vec<String> {
    vec![".git".to_string(), LOCAL_DIR_NAME.to_string()]
}
fn default_marker_dirs() -> Vec<String> {
    vec![".git".to_string(), LOCAL_DIR_NAME.to_string()]
}
fn default_cache_dir_name() -> String {
    LOCAL_DIR_NAME.to_string()
}
fn default_cache_file_name() -> String {
    "index.json".to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            index: IndexConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            rescan_interval_secs: default_rescan_interval_secs(),
            auto_save: true,
            ignored_dirs: default_ignored_dirs(),
            marker_dirs: default_marker_dirs(),
            cache_dir_name: default_cache_dir_name(),
            cache_file_name: default_cache_file_name(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl IndexConfig {
    pub fn rescan_interval(&self) -> Duration {
        Duration::from_secs(self.rescan_interval_secs)
    }

    /// Cache file location for a given project root.
    pub fn cache_path(&self, root: &Path) -> PathBuf {
        root.join(&self.cache_dir_name).join(&self.cache_file_name)
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> IndexResult<Self> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(LOCAL_DIR_NAME).join(SETTINGS_FILE_NAME));

        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, still honouring env overrides.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load_from(path: impl AsRef<Path>) -> IndexResult<Self> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            // DEFINDEX_INDEX__AUTO_SAVE -> index.auto_save
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| IndexError::Config(Box::new(e)))
    }

    /// Find `.defindex/settings.toml` in the current directory or an ancestor
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .map(|ancestor| ancestor.join(LOCAL_DIR_NAME))
            .find(|dir| dir.is_dir())
            .map(|dir| dir.join(SETTINGS_FILE_NAME))
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Write the default configuration into `<dir>/settings.toml`.
    ///
    /// An existing file is left alone unless `force` is set.
    pub fn write_default(dir: &Path, force: bool) -> std::io::Result<PathBuf> {
        let config_path = dir.join(SETTINGS_FILE_NAME);
        if !force && config_path.exists() {
            return Ok(config_path);
        }

        std::fs::create_dir_all(dir)?;
        let content = Settings::default()
            .to_toml()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&config_path, content)?;

        Ok(config_path)
    }
}
