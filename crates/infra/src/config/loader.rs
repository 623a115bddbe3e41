//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//!
//! ## Environment Variables
//! - `CLUBSYNC_DB_PATH`: Database file path
//! - `CLUBSYNC_DB_POOL_SIZE`: Connection pool size
//! - `CLUBSYNC_SYNC_INTERVAL`: Sync interval in seconds
//! - `CLUBSYNC_SYNC_ENABLED`: Whether auto sync is enabled (true/false)
//! - `CLUBSYNC_REMOTE_BASE_URL`: Base URL of the remote API
//! - `CLUBSYNC_REMOTE_TIMEOUT`: Remote request timeout in seconds
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.toml` (current working directory)
//! 2. `./clubsync.toml` (current working directory)
//! 3. `../config.toml` (parent directory)

use std::path::{Path, PathBuf};

use clubsync_domain::{
    ClubSyncError, Config, DatabaseConfig, RemoteConfig, Result, SyncConfig,
};
use tracing::{debug, info};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `ClubSyncError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required environment variables must be present. Returns an error
/// if any are missing.
///
/// # Errors
/// Returns `ClubSyncError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("CLUBSYNC_DB_PATH")?;
    let db_pool_size = env_var("CLUBSYNC_DB_POOL_SIZE").and_then(|s| {
        s.parse::<u32>().map_err(|e| ClubSyncError::Config(format!("Invalid pool size: {e}")))
    })?;

    let sync_interval = env_var("CLUBSYNC_SYNC_INTERVAL").and_then(|s| {
        s.parse::<u64>().map_err(|e| ClubSyncError::Config(format!("Invalid sync interval: {e}")))
    })?;
    let sync_enabled = env_bool("CLUBSYNC_SYNC_ENABLED", true);

    let remote_base_url = env_var("CLUBSYNC_REMOTE_BASE_URL")?;
    let remote_timeout = env_var("CLUBSYNC_REMOTE_TIMEOUT").and_then(|s| {
        s.parse::<u64>().map_err(|e| ClubSyncError::Config(format!("Invalid remote timeout: {e}")))
    })?;

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        sync: SyncConfig { interval_seconds: sync_interval, enabled: sync_enabled },
        remote: RemoteConfig { base_url: remote_base_url, timeout_seconds: remote_timeout },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
///
/// # Errors
/// Returns `ClubSyncError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File cannot be parsed as TOML
pub fn load_from_file(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => probe_config_paths().ok_or_else(|| {
            ClubSyncError::Config("No configuration file found in probe paths".into())
        })?,
    };

    let contents = std::fs::read_to_string(&path).map_err(|e| {
        ClubSyncError::Config(format!("Failed to read {}: {e}", path.display()))
    })?;

    let config: Config = toml::from_str(&contents).map_err(|e| {
        ClubSyncError::Config(format!("Failed to parse {}: {e}", path.display()))
    })?;

    info!(path = %path.display(), "Configuration loaded from file");
    Ok(config)
}

/// Probe well-known locations for a config file
fn probe_config_paths() -> Option<PathBuf> {
    let candidates = ["config.toml", "clubsync.toml", "../config.toml"];

    candidates.iter().map(PathBuf::from).find(|p| p.exists())
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| ClubSyncError::Config(format!("Missing environment variable: {name}")))
}

fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1").unwrap_or(default)
}
