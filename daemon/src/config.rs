//! Service configuration with TOML file support.

use std::path::{Path, PathBuf};

use barcheck_utils::LogFormat;
use barcheck_verification::DuplicatePolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Which backend holds the registry and request queue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Lmdb,
    /// Process-local; everything is lost on exit.
    Memory,
}

/// Configuration for the verification service.
///
/// Loaded from a TOML file via [`ServiceConfig::from_toml_file`]; every field
/// has a default, so an empty file is valid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub store: StoreKind,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Recorded as the reviewer on admin decisions made over HTTP.
    #[serde(default = "default_reviewer")]
    pub reviewer: String,

    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    /// Insert the demo lawyers on startup when the registry is empty.
    #[serde(default)]
    pub seed_demo_registry: bool,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// LMDB map size in bytes.
    #[serde(default = "default_lmdb_map_size")]
    pub lmdb_map_size: usize,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./barcheck_data")
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    5000
}

fn default_reviewer() -> String {
    "admin".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_lmdb_map_size() -> usize {
    barcheck_store_lmdb::DEFAULT_MAP_SIZE
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServiceConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            store: StoreKind::default(),
            bind_address: default_bind_address(),
            rpc_port: default_rpc_port(),
            reviewer: default_reviewer(),
            duplicate_policy: DuplicatePolicy::default(),
            seed_demo_registry: false,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            lmdb_map_size: default_lmdb_map_size(),
        }
    }
}
