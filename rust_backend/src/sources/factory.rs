//! Repository factory for dependency injection.
//!
//! Builds the configured [`DashboardRepository`] at startup so the HTTP layer
//! only ever sees the trait object.

use std::str::FromStr;
use std::sync::Arc;

use super::config::SourceConfig;
use super::error::{SourceError, SourceResult};
use super::repositories::{FilesRepository, LocalRepository};
use super::repository::DashboardRepository;

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory repository
    Local,
    /// Fixture files on disk plus the upstream queue API
    Files,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string ("local", "files").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            "files" | "file" => Ok(Self::Files),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment variable.
    ///
    /// Reads `REPOSITORY_TYPE`. Defaults to `Files` if not set or invalid.
    pub fn from_env() -> Self {
        std::env::var("REPOSITORY_TYPE")
            .ok()
            .and_then(|s| Self::from_str(&s).ok())
            .unwrap_or(Self::Files)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Files => "files",
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```no_run
/// use perfdash::sources::{RepositoryFactory, SourceConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SourceConfig::from_env()?;
/// let repo = RepositoryFactory::create(&config)?;
///
/// let local = RepositoryFactory::create_local();
/// # Ok(())
/// # }
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on configuration.
    ///
    /// # Arguments
    /// * `config` - Source configuration; `repo_type` selects the implementation
    ///
    /// # Returns
    /// * `Ok(Arc<dyn DashboardRepository>)` - Shared repository instance
    /// * `Err(SourceError)` - If the repository cannot be set up
    pub fn create(config: &SourceConfig) -> SourceResult<Arc<dyn DashboardRepository>> {
        match config.repo_type {
            RepositoryType::Local => Ok(Self::create_local()),
            RepositoryType::Files => {
                let repo = FilesRepository::from_config(config)?;
                Ok(Arc::new(repo))
            }
        }
    }

    /// Create an empty in-memory repository.
    pub fn create_local() -> Arc<dyn DashboardRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create a repository from environment configuration.
    pub fn from_env() -> SourceResult<Arc<dyn DashboardRepository>> {
        let config = SourceConfig::from_env()?;
        Self::create(&config)
    }
}

/// Fluent builder over [`SourceConfig`].
pub struct RepositoryBuilder {
    config: SourceConfig,
}

impl RepositoryBuilder {
    pub fn new() -> Self {
        Self {
            config: SourceConfig::default(),
        }
    }

    pub fn repository_type(mut self, repo_type: RepositoryType) -> Self {
        self.config.repo_type = repo_type;
        self
    }

    pub fn data_dir(mut self, data_dir: impl Into<std::path::PathBuf>) -> Self {
        self.config.data_dir = data_dir.into();
        self
    }

    /// Serve queue data from the fixture directory instead of the upstream API.
    pub fn without_queue_api(mut self) -> Self {
        self.config.queue_api = None;
        self
    }

    /// Apply environment overrides.
    pub fn from_env(mut self) -> Result<Self, SourceError> {
        self.config.apply_env()?;
        Ok(self)
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    pub fn build(self) -> SourceResult<Arc<dyn DashboardRepository>> {
        RepositoryFactory::create(&self.config)
    }
}

impl Default for RepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
