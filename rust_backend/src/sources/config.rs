//! Runtime configuration for data sources and the HTTP server.
//!
//! Values start from defaults, are optionally replaced by `perfdash.toml`
//! (see [`super::repo_config`]) and finally by environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::error::SourceError;
use super::factory::RepositoryType;

pub const DEFAULT_QUEUE_API_BASE_URL: &str = "https://rest.nersc.gov/REST";
pub const DEFAULT_DATA_DIR: &str = "data";

/// Upstream queue wait-time API settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueApiConfig {
    pub base_url: String,
    /// Extra attempts after the first failed one.
    pub retries: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
}

impl Default for QueueApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_QUEUE_API_BASE_URL.to_string(),
            retries: 2,
            retry_delay: Duration::from_millis(1000),
            timeout: Duration::from_secs(30),
        }
    }
}

impl QueueApiConfig {
    /// Full URL of the wait-time endpoint.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/mynersc/queuewaittimes.php",
            self.base_url.trim_end_matches('/')
        )
    }
}

/// Freshness of cached queue payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub stale_after: Duration,
    /// `None` disables the background refresher.
    pub refresh_interval: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(300),
            refresh_interval: Some(Duration::from_secs(120)),
        }
    }
}

/// Where dashboard data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub repo_type: RepositoryType,
    /// Directory holding `power.csv`, `metrics-data.json` and `user-jobs.json`.
    pub data_dir: PathBuf,
    /// `None` serves queue data from a fixture file in `data_dir` instead.
    pub queue_api: Option<QueueApiConfig>,
    pub cache: CacheConfig,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            repo_type: RepositoryType::Files,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            queue_api: Some(QueueApiConfig::default()),
            cache: CacheConfig::default(),
        }
    }
}

impl SourceConfig {
    /// Load configuration from environment variables on top of the defaults.
    ///
    /// # Environment Variables
    /// - `REPOSITORY_TYPE`: `local` or `files`
    /// - `DATA_DIR`: fixture directory
    /// - `QUEUE_API_BASE_URL`: upstream REST base URL; empty disables the client
    /// - `QUEUE_API_RETRIES`: retry count for upstream fetches
    pub fn from_env() -> Result<Self, SourceError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields with any environment variables that are set.
    pub fn apply_env(&mut self) -> Result<(), SourceError> {
        if let Ok(value) = env::var("REPOSITORY_TYPE") {
            self.repo_type = RepositoryType::from_str(&value)
                .map_err(SourceError::Config)?;
        }
        if let Ok(value) = env::var("DATA_DIR") {
            self.data_dir = PathBuf::from(value);
        }
        if let Ok(value) = env::var("QUEUE_API_BASE_URL") {
            self.queue_api = if value.trim().is_empty() {
                None
            } else {
                let mut api = self.queue_api.clone().unwrap_or_default();
                api.base_url = value.trim().to_string();
                Some(api)
            };
        }
        if let Ok(value) = env::var("QUEUE_API_RETRIES") {
            let retries = value.trim().parse::<u32>().map_err(|e| {
                SourceError::Config(format!(
                    "Invalid QUEUE_API_RETRIES '{}': {}",
                    value, e
                ))
            })?;
            if let Some(api) = self.queue_api.as_mut() {
                api.retries = retries;
            }
        }
        Ok(())
    }
}

/// Bind address of the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Override host and port with `HOST` and `PORT` when set.
    pub fn apply_env(&mut self) -> Result<(), SourceError> {
        if let Ok(host) = env::var("HOST") {
            self.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            self.port = port.trim().parse().map_err(|e| {
                SourceError::Config(format!("Invalid PORT '{}': {}", port, e))
            })?;
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SourceConfig::default();
        assert_eq!(config.repo_type, RepositoryType::Files);
        assert_eq!(config.cache.stale_after, Duration::from_secs(300));
        assert_eq!(config.cache.refresh_interval, Some(Duration::from_secs(120)));

        let api = config.queue_api.unwrap();
        assert_eq!(api.retries, 2);
        assert_eq!(
            api.endpoint(),
            "https://rest.nersc.gov/REST/mynersc/queuewaittimes.php"
        );
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let api = QueueApiConfig {
            base_url: "http://localhost:9000/".into(),
            ..Default::default()
        };
        assert_eq!(api.endpoint(), "http://localhost:9000/mynersc/queuewaittimes.php");
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(ServerConfig::default().bind_address(), "0.0.0.0:8080");
    }
}
