//! Data sources for the dashboard.
//!
//! The [`DashboardRepository`] trait abstracts where queue, power, job and
//! metric payloads come from:
//!
//! - [`LocalRepository`]: in-memory data for tests and development
//! - [`FilesRepository`]: JSON/CSV fixtures in a data directory, with queue
//!   data from the center's REST API (`remote-api` feature)
//!
//! Queue payloads are additionally kept in a [`QueueCache`] so repeated
//! requests within the freshness window do not hit the upstream.

pub mod cache;
pub mod config;
pub mod error;
pub mod factory;
#[cfg(feature = "remote-api")]
pub mod queue_client;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use cache::{spawn_refresher, CachedQueue, QueueCache};
pub use config::{CacheConfig, QueueApiConfig, ServerConfig, SourceConfig};
pub use error::{SourceError, SourceResult};
pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
#[cfg(feature = "remote-api")]
pub use queue_client::QueueApiClient;
pub use repo_config::DashboardConfig;
pub use repositories::{FilesRepository, LocalRepository};
pub use repository::DashboardRepository;
