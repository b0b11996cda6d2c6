//! `perfdash.toml` configuration file support.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use super::config::{
    CacheConfig, QueueApiConfig, ServerConfig, SourceConfig, DEFAULT_DATA_DIR,
    DEFAULT_QUEUE_API_BASE_URL,
};
use super::error::SourceError;
use super::factory::RepositoryType;

/// Dashboard configuration from file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub source: SourceSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(rename = "type", default = "default_repo_type")]
    pub repo_type: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Empty string disables the upstream client.
    #[serde(default = "default_base_url")]
    pub queue_api_base_url: String,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
    /// Zero disables the background refresher.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

fn default_host() -> String {
    ServerConfig::default().host
}

fn default_port() -> u16 {
    ServerConfig::default().port
}

fn default_repo_type() -> String {
    "files".to_string()
}

fn default_data_dir() -> String {
    DEFAULT_DATA_DIR.to_string()
}

fn default_base_url() -> String {
    DEFAULT_QUEUE_API_BASE_URL.to_string()
}

fn default_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_stale_after_secs() -> u64 {
    300
}

fn default_refresh_interval_secs() -> u64 {
    120
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            repo_type: default_repo_type(),
            data_dir: default_data_dir(),
            queue_api_base_url: default_base_url(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
            stale_after_secs: default_stale_after_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(DashboardConfig)` if successful
    /// * `Err(SourceError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            SourceError::Config(format!("Failed to read config file: {}", e))
        })?;

        let config: DashboardConfig = toml::from_str(&content).map_err(|e| {
            SourceError::Config(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `perfdash.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    ///
    /// # Returns
    /// * `Ok(DashboardConfig)` if found and parsed successfully
    /// * `Err(SourceError)` if no config file found or parse error
    pub fn from_default_location() -> Result<Self, SourceError> {
        let search_paths = vec![
            PathBuf::from("perfdash.toml"),
            PathBuf::from("rust_backend/perfdash.toml"),
            PathBuf::from("../perfdash.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(SourceError::Config(
            "No perfdash.toml found in standard locations".to_string(),
        ))
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.source.repo_type)
    }

    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.server.host.clone(),
            port: self.server.port,
        }
    }

    pub fn to_source_config(&self) -> Result<SourceConfig, SourceError> {
        let repo_type = self.repository_type().map_err(|e| {
            SourceError::Config(format!("Invalid repository type: {}", e))
        })?;

        let source = &self.source;
        if source.stale_after_secs == 0 {
            return Err(SourceError::Config(
                "'source.stale_after_secs' must be positive".to_string(),
            ));
        }

        let base_url = source.queue_api_base_url.trim();
        let queue_api = (!base_url.is_empty()).then(|| QueueApiConfig {
            base_url: base_url.to_string(),
            retries: source.retries,
            retry_delay: Duration::from_millis(source.retry_delay_ms),
            timeout: Duration::from_secs(source.timeout_secs),
        });

        Ok(SourceConfig {
            repo_type,
            data_dir: PathBuf::from(&source.data_dir),
            queue_api,
            cache: CacheConfig {
                stale_after: Duration::from_secs(source.stale_after_secs),
                refresh_interval: (source.refresh_interval_secs > 0)
                    .then(|| Duration::from_secs(source.refresh_interval_secs)),
            },
        })
    }
}
