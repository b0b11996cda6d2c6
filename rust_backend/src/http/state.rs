//! Application state for the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use crate::sources::{CacheConfig, DashboardRepository, QueueCache};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Data source for every endpoint
    pub repository: Arc<dyn DashboardRepository>,
    /// Recently fetched queue payloads
    pub queue_cache: Arc<QueueCache>,
}

impl AppState {
    /// Create a new application state with the default cache freshness.
    pub fn new(repository: Arc<dyn DashboardRepository>) -> Self {
        Self::with_cache(repository, CacheConfig::default().stale_after)
    }

    pub fn with_cache(repository: Arc<dyn DashboardRepository>, stale_after: Duration) -> Self {
        Self {
            repository,
            queue_cache: Arc::new(QueueCache::new(stale_after)),
        }
    }
}
