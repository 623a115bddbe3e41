//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DB_POOL_SIZE, DEFAULT_DISPATCH_TIMEOUT_SECS, DEFAULT_SYNC_INTERVAL_SECS,
};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
    pub remote: RemoteConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

/// Sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub interval_seconds: u64,
    pub enabled: bool,
}

/// Remote endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: "clubsync.db".to_string(),
                pool_size: DEFAULT_DB_POOL_SIZE,
            },
            sync: SyncConfig { interval_seconds: DEFAULT_SYNC_INTERVAL_SECS, enabled: true },
            remote: RemoteConfig {
                base_url: "https://api.clubsync.example/v1".to_string(),
                timeout_seconds: DEFAULT_DISPATCH_TIMEOUT_SECS,
            },
        }
    }
}
