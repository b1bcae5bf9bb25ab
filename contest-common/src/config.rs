//! Bootstrap configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (applied by the binary's argument parser)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not fatal. The caller gets compiled defaults and
//! [`ServiceConfig::config_source`] is `None` so it can warn once logging is up.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default HTTP port for the admin service
pub const DEFAULT_PORT: u16 = 5780;

/// Default bind address (loopback only)
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

/// Default cap on upload request bodies (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CONTEST_CONFIG";

/// Directory name used under the platform config/data folders
const APP_DIR_NAME: &str = "contest-admin";

/// Database file name inside the data folder
const DATABASE_FILE_NAME: &str = "contest.db";

/// Contents of `config.toml`
///
/// Every field is optional so a partial file only overrides what it names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Path to the SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Address the HTTP server binds to
    #[serde(default)]
    pub bind_address: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Maximum accepted upload body size in bytes
    #[serde(default)]
    pub max_upload_bytes: Option<usize>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub bind_address: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub log_level: String,
    /// Config file the values were read from, if any
    pub config_source: Option<PathBuf>,
}

impl ServiceConfig {
    /// Resolve configuration from overrides, the TOML file and defaults
    ///
    /// An explicitly named config file (override or `CONTEST_CONFIG`) must
    /// exist. The platform default location is optional.
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let config_path = locate_config_file(overrides.config_file.as_deref())?;

        let toml_config = match &config_path {
            Some(path) => read_toml_config(path)?,
            None => TomlConfig::default(),
        };

        Ok(Self::merge(overrides, toml_config, config_path))
    }

    /// Apply the priority order to already-loaded sources
    pub fn merge(
        overrides: ConfigOverrides,
        toml_config: TomlConfig,
        config_source: Option<PathBuf>,
    ) -> Self {
        let database_path = overrides
            .database_path
            .or(toml_config.database_path)
            .unwrap_or_else(|| default_data_folder().join(DATABASE_FILE_NAME));

        let bind_address = overrides
            .bind_address
            .or(toml_config.bind_address)
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        Self {
            database_path,
            bind_address,
            port: overrides.port.or(toml_config.port).unwrap_or(DEFAULT_PORT),
            max_upload_bytes: toml_config
                .max_upload_bytes
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            log_level: overrides.log_level.unwrap_or(toml_config.logging.level),
            config_source,
        }
    }

    /// `host:port` string suitable for `TcpListener::bind`
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Find the config file to read, if any
///
/// Order: explicit path, `CONTEST_CONFIG`, `<config_dir>/contest-admin/config.toml`.
pub fn locate_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    let named = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

    if let Some(path) = named {
        if path.is_file() {
            return Ok(Some(path));
        }
        return Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let default_path = dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"));
    Ok(default_path.filter(|p| p.is_file()))
}

/// Read and parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    tracing::debug!("Loaded config file {}", path.display());
    Ok(config)
}

/// OS-dependent default data folder
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./contest_data"))
}
