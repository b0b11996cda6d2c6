//! Freshness cache for queue wait-time payloads.
//!
//! Entries are keyed on the unresolved [`QueueQuery`], so "last 7 days" asked
//! twice within the freshness window hits the same entry even though the
//! resolved interval moved on. Absolute windows come straight from clients,
//! so stale entries are dropped on every insert and the map is capped.

use log::{debug, info, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use super::error::SourceResult;
use super::repository::DashboardRepository;
use crate::parsing::QueueWaitTimesPayload;
use crate::services::{QueueParams, QueueQuery};

/// A payload together with the parameters it was fetched with.
#[derive(Debug, Clone)]
pub struct CachedQueue {
    pub params: QueueParams,
    pub payload: QueueWaitTimesPayload,
    fetched_at: Instant,
}

impl CachedQueue {
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }
}

/// Upper bound on cached queries.
pub const DEFAULT_MAX_ENTRIES: usize = 256;

pub struct QueueCache {
    entries: RwLock<HashMap<QueueQuery, CachedQueue>>,
    stale_after: Duration,
    max_entries: usize,
}

impl QueueCache {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stale_after,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    /// Cached entry for `query`, if it is still fresh.
    pub fn get_fresh(&self, query: &QueueQuery) -> Option<CachedQueue> {
        self.entries
            .read()
            .get(query)
            .filter(|entry| entry.age() < self.stale_after)
            .cloned()
    }

    /// Store a payload, evicting stale entries and then the oldest ones
    /// until the new entry fits.
    pub fn insert(&self, query: QueueQuery, params: QueueParams, payload: QueueWaitTimesPayload) {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.age() < self.stale_after);

        while !entries.contains_key(&query) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.fetched_at)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    entries.remove(&key);
                }
                None => break,
            }
        }

        if entries.len() < before {
            debug!("Evicted {} queue cache entries", before - entries.len());
        }

        entries.insert(
            query,
            CachedQueue {
                params,
                payload,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Serve a fresh entry, or fetch and store a new one.
    ///
    /// A failed fetch leaves any older entry in place.
    pub async fn get_or_fetch(
        &self,
        repository: &dyn DashboardRepository,
        query: &QueueQuery,
    ) -> SourceResult<CachedQueue> {
        if let Some(entry) = self.get_fresh(query) {
            debug!("Queue cache hit for {:?}", query);
            return Ok(entry);
        }
        self.refresh(repository, query).await
    }

    /// Fetch `query` unconditionally and store the result.
    pub async fn refresh(
        &self,
        repository: &dyn DashboardRepository,
        query: &QueueQuery,
    ) -> SourceResult<CachedQueue> {
        let params = query.resolve(chrono::Utc::now());
        let payload = repository.fetch_queue_wait_times(&params).await?;
        self.insert(query.clone(), params.clone(), payload.clone());

        Ok(CachedQueue {
            params,
            payload,
            fetched_at: Instant::now(),
        })
    }
}

/// Keep `query` warm by refetching it every `interval`.
///
/// The first refresh runs immediately. Failures are logged and retried on the
/// next tick.
pub fn spawn_refresher(
    cache: Arc<QueueCache>,
    repository: Arc<dyn DashboardRepository>,
    query: QueueQuery,
    interval: Duration,
) -> JoinHandle<()> {
    info!("Refreshing {:?} every {:?}", query, interval);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = cache.refresh(repository.as_ref(), &query).await {
                warn!("Background queue refresh failed: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateRange;
    use crate::services::queue::QueueWindow;
    use crate::sources::repositories::LocalRepository;

    #[tokio::test]
    async fn test_fresh_entries_are_reused() {
        let repo = LocalRepository::new();
        let cache = QueueCache::new(Duration::from_secs(300));
        let query = QueueQuery::default();

        cache.get_or_fetch(&repo, &query).await.unwrap();
        cache.get_or_fetch(&repo, &query).await.unwrap();
        assert_eq!(repo.queue_request_count(), 1);
        assert_eq!(cache.len(), 1);

        let other = QueueQuery {
            window: QueueWindow::Relative(DateRange::Last24Hours),
            ..QueueQuery::default()
        };
        cache.get_or_fetch(&repo, &other).await.unwrap();
        assert_eq!(repo.queue_request_count(), 2);
    }

    #[tokio::test]
    async fn test_stale_entries_are_refetched() {
        let repo = LocalRepository::new();
        let cache = QueueCache::new(Duration::ZERO);
        let query = QueueQuery::default();

        cache.get_or_fetch(&repo, &query).await.unwrap();
        cache.get_or_fetch(&repo, &query).await.unwrap();
        assert_eq!(repo.queue_request_count(), 2);
    }

    fn absolute(start: i64) -> QueueQuery {
        QueueQuery {
            window: QueueWindow::Absolute {
                start,
                end: start + 3600,
            },
            ..QueueQuery::default()
        }
    }

    #[tokio::test]
    async fn test_stale_entries_are_evicted_on_insert() {
        let repo = LocalRepository::new();
        let cache = QueueCache::new(Duration::from_millis(1));

        for i in 0..500 {
            cache.get_or_fetch(&repo, &absolute(i * 3600)).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.get_or_fetch(&repo, &QueueQuery::default()).await.unwrap();

        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_entry_count_is_capped() {
        let repo = LocalRepository::new();
        let cache = QueueCache::new(Duration::from_secs(300)).with_max_entries(8);

        for i in 0..50 {
            cache.get_or_fetch(&repo, &absolute(i * 3600)).await.unwrap();
        }
        assert_eq!(cache.len(), 8);
        // Most recent window survives, earliest is gone.
        assert!(cache.get_fresh(&absolute(49 * 3600)).is_some());
        assert!(cache.get_fresh(&absolute(0)).is_none());

        // Replacing an existing key does not evict anything.
        cache.refresh(&repo, &absolute(49 * 3600)).await.unwrap();
        assert_eq!(cache.len(), 8);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_old_entry() {
        let repo = LocalRepository::new();
        let cache = QueueCache::new(Duration::from_secs(300));
        let query = QueueQuery::default();
        cache.get_or_fetch(&repo, &query).await.unwrap();

        repo.set_queue_available(false);
        assert!(cache.refresh(&repo, &query).await.is_err());
        assert!(cache.get_fresh(&query).is_some());
    }

    #[tokio::test]
    async fn test_refresher_populates_cache() {
        let repo = Arc::new(LocalRepository::new());
        let cache = Arc::new(QueueCache::new(Duration::from_secs(300)));
        let handle = spawn_refresher(
            cache.clone(),
            repo.clone(),
            QueueQuery::default(),
            Duration::from_secs(3600),
        );

        for _ in 0..50 {
            if !cache.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();
        assert_eq!(cache.len(), 1);
        assert_eq!(repo.queue_request_count(), 1);
    }
}
