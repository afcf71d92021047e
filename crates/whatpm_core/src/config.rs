//! Application configuration loading.
//!
//! # Responsibility
//! - Resolve runtime settings from flags, environment, TOML file and
//!   compiled defaults.
//!
//! # Invariants
//! - Priority per field: override > environment > file > default.
//! - An explicitly named config file must exist; the default one is optional.
//! - Empty environment values count as unset.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "WHATPM_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "WHATPM_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "WHATPM_LOG_DIR";
pub const ENV_BACKUP_ROOT: &str = "WHATPM_BACKUP_ROOT";
pub const ENV_CRON_SECRET: &str = "WHATPM_CRON_SECRET";

const APP_DIR_NAME: &str = "whatpm";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "whatpm.db";
const BACKUP_DIR_NAME: &str = "backups";

/// Error raised while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Backup job settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupConfig {
    /// Root directory of the filesystem object store.
    pub store_root: PathBuf,
    /// Shared secret expected as `Bearer <secret>`. `None` disables backups.
    pub secret: Option<String>,
}

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub log_level: String,
    /// Rolling log directory; `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
    pub backup: BackupConfig,
}

/// Highest-priority values, usually from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub backup_root: Option<PathBuf>,
    pub backup_secret: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    database_path: Option<PathBuf>,
    log_level: Option<String>,
    log_dir: Option<PathBuf>,
    backup: FileBackupConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileBackupConfig {
    store_root: Option<PathBuf>,
    secret: Option<String>,
}

impl AppConfig {
    /// Loads configuration using the process environment.
    pub fn load(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::resolve(overrides, |name| std::env::var(name).ok())
    }

    /// Loads configuration reading environment values through `env`.
    pub fn resolve<F>(overrides: ConfigOverrides, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |name: &str| env(name).filter(|value| !value.trim().is_empty());

        let file = match &overrides.config_path {
            Some(path) => read_config_file(path)?,
            None => match default_config_path().filter(|path| path.exists()) {
                Some(path) => read_config_file(&path)?,
                None => FileConfig::default(),
            },
        };

        let database_path = overrides
            .database_path
            .or_else(|| env(ENV_DB_PATH).map(PathBuf::from))
            .or(file.database_path)
            .unwrap_or_else(|| data_dir().join(DB_FILE_NAME));
        let log_level = overrides
            .log_level
            .or_else(|| env(ENV_LOG_LEVEL))
            .or(file.log_level)
            .unwrap_or_else(|| default_log_level().to_string());
        let log_dir = overrides
            .log_dir
            .or_else(|| env(ENV_LOG_DIR).map(PathBuf::from))
            .or(file.log_dir);
        let store_root = overrides
            .backup_root
            .or_else(|| env(ENV_BACKUP_ROOT).map(PathBuf::from))
            .or(file.backup.store_root)
            .unwrap_or_else(|| data_dir().join(BACKUP_DIR_NAME));
        let secret = overrides
            .backup_secret
            .or_else(|| env(ENV_CRON_SECRET))
            .or(file.backup.secret)
            .filter(|secret| !secret.is_empty());

        Ok(Self {
            database_path,
            log_level,
            log_dir,
            backup: BackupConfig { store_root, secret },
        })
    }
}

/// Platform config file location, e.g. `~/.config/whatpm/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR_NAME))
}

fn read_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
