//! Viewer settings persisted as TOML under the app directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;

/// Default filename used to store the viewer configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_NUM_DATA_ROWS: usize = 300;
const DEFAULT_VISIBLE_COLUMNS: usize = 12;
const DEFAULT_VISIBLE_ROWS: usize = 300;
const DEFAULT_MAX_CELL_LENGTH: usize = 7;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors that may occur while loading or saving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No usable config directory found.
    #[error("No suitable config directory found")]
    NoConfigDir,
    /// Failed to create the config directory.
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to read a config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write a config file.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to serialize config to TOML.
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    /// The configured service URL does not parse.
    #[error("Invalid base_url {value:?}: {source}")]
    InvalidBaseUrl {
        value: String,
        source: url::ParseError,
    },
}

/// Recognized viewer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Service origin hosting `colnames`, `data` and `predict`.
    pub base_url: String,
    /// Row limit requested from the data endpoint.
    pub num_data_rows: usize,
    /// Number of columns shown in the table before the "..." marker.
    pub visible_columns: usize,
    /// Number of rows shown in the table.
    pub visible_rows: usize,
    /// Cap on records submitted for prediction; defaults to `visible_rows`.
    pub prediction_row_cap: Option<usize>,
    /// Characters kept per table cell before abbreviation.
    pub max_cell_length: usize,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Dataset label shown in the header.
    pub dataset_name: String,
    /// Window and header title.
    pub title: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            num_data_rows: DEFAULT_NUM_DATA_ROWS,
            visible_columns: DEFAULT_VISIBLE_COLUMNS,
            visible_rows: DEFAULT_VISIBLE_ROWS,
            prediction_row_cap: None,
            max_cell_length: DEFAULT_MAX_CELL_LENGTH,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            dataset_name: "KDD 99, Intrusion Detection".to_string(),
            title: "Anomaly Detection on Network Intrusion Data".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Clamp limits to usable values.
    pub fn normalized(mut self) -> Self {
        self.base_url = self.base_url.trim().to_string();
        self.num_data_rows = self.num_data_rows.max(1);
        self.visible_columns = self.visible_columns.max(1);
        self.visible_rows = self.visible_rows.max(1);
        self.prediction_row_cap = self.prediction_row_cap.map(|cap| cap.max(1));
        self.max_cell_length = self.max_cell_length.max(1);
        self.request_timeout_secs = self.request_timeout_secs.max(1);
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Number of leading records submitted for prediction out of `loaded`.
    pub fn prediction_batch_len(&self, loaded: usize) -> usize {
        self.prediction_row_cap
            .unwrap_or(self.visible_rows)
            .min(loaded)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.base_url)
            .map(|_| ())
            .map_err(|source| ConfigError::InvalidBaseUrl {
                value: self.base_url.clone(),
                source,
            })
    }
}

/// Resolve the configuration file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load configuration from the app directory, returning defaults if missing.
pub fn load_or_default() -> Result<ViewerConfig, ConfigError> {
    load_from_path(&config_path()?)
}

/// Load configuration from `path`; a missing file yields defaults.
pub fn load_from_path(path: &Path) -> Result<ViewerConfig, ConfigError> {
    if !path.exists() {
        return Ok(ViewerConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ViewerConfig = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    let config = config.normalized();
    config.validate()?;
    Ok(config)
}

/// Write `config` to `path` as TOML, creating parent directories.
pub fn save_to_path(config: &ViewerConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let text = toml::to_string_pretty(config).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, text).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}
