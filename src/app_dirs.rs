//! Locations under the `.ensemble-metrics` folder: `generators.toml` and run logs.
//!
//! The folder sits in the OS config directory (e.g. `%APPDATA%` on Windows) unless
//! `ENSEMBLE_METRICS_CONFIG_HOME` names another base.

use std::ffi::OsString;
use std::path::PathBuf;

use directories::BaseDirs;
use thiserror::Error;

/// Name of the application directory that lives under the config base.
pub const APP_DIR_NAME: &str = ".ensemble-metrics";

/// Environment variable that replaces the OS config directory. Empty values are ignored.
pub const CONFIG_HOME_ENV: &str = "ENSEMBLE_METRICS_CONFIG_HOME";

const LOGS_DIR_NAME: &str = "logs";

/// Errors that can occur while resolving or preparing application directories.
#[derive(Debug, Error)]
pub enum AppDirError {
    /// Neither the override nor the OS config directory is available.
    #[error("No suitable base config directory available for application files")]
    NoBaseDir,
    /// Failed to create a directory under the app root.
    #[error("Failed to create application directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Path of the app root, without touching the filesystem.
pub fn app_root_path() -> Result<PathBuf, AppDirError> {
    let base = base_from(std::env::var_os(CONFIG_HOME_ENV))
        .or_else(|| BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()))
        .ok_or(AppDirError::NoBaseDir)?;
    Ok(base.join(APP_DIR_NAME))
}

/// Return the logs directory inside the app root, creating it if needed.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    ensure_dir(app_root_path()?.join(LOGS_DIR_NAME))
}

fn base_from(value: Option<OsString>) -> Option<PathBuf> {
    value.filter(|value| !value.is_empty()).map(PathBuf::from)
}

fn ensure_dir(path: PathBuf) -> Result<PathBuf, AppDirError> {
    match std::fs::create_dir_all(&path) {
        Ok(()) => Ok(path),
        Err(source) => Err(AppDirError::CreateDir { path, source }),
    }
}
