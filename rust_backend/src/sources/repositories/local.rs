//! In-memory local repository implementation.
//!
//! Holds every payload in memory, which makes it the repository of choice for
//! unit tests, router tests and offline development.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::models::{JobRecord, MetricsByJob};
use crate::parsing::QueueWaitTimesPayload;
use crate::services::QueueParams;
use crate::sources::error::{SourceError, SourceResult};
use crate::sources::repository::DashboardRepository;

/// In-memory local repository.
///
/// Every queue request is answered with the same stored payload; the
/// parameters are recorded so tests can assert on what was asked for.
///
/// # Example
/// ```
/// use perfdash::models::JobRecord;
/// use perfdash::sources::repositories::LocalRepository;
///
/// let repo = LocalRepository::new()
///     .with_power_csv("time,power\n100,50\n")
///     .with_jobs(vec![JobRecord::new(42)]);
/// assert_eq!(repo.queue_request_count(), 0);
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    queue_payload: QueueWaitTimesPayload,
    queue_requests: Vec<QueueParams>,
    queue_available: bool,
    power_csv: String,
    metrics: MetricsByJob,
    jobs: Vec<JobRecord>,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            queue_payload: QueueWaitTimesPayload::default(),
            queue_requests: Vec::new(),
            queue_available: true,
            power_csv: String::new(),
            metrics: MetricsByJob::new(),
            jobs: Vec::new(),
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queue_payload(self, payload: QueueWaitTimesPayload) -> Self {
        self.data.write().queue_payload = payload;
        self
    }

    pub fn with_power_csv(self, csv_text: impl Into<String>) -> Self {
        self.data.write().power_csv = csv_text.into();
        self
    }

    pub fn with_metrics(self, metrics: MetricsByJob) -> Self {
        self.data.write().metrics = metrics;
        self
    }

    pub fn with_jobs(self, jobs: Vec<JobRecord>) -> Self {
        self.data.write().jobs = jobs;
        self
    }

    /// Set the health status reported by `health_check`.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Make queue requests fail as if the upstream were unreachable.
    pub fn set_queue_available(&self, available: bool) {
        self.data.write().queue_available = available;
    }

    /// Number of queue requests served so far.
    pub fn queue_request_count(&self) -> usize {
        self.data.read().queue_requests.len()
    }

    /// Parameters of every queue request, oldest first.
    pub fn queue_requests(&self) -> Vec<QueueParams> {
        self.data.read().queue_requests.clone()
    }
}

#[async_trait]
impl DashboardRepository for LocalRepository {
    async fn health_check(&self) -> SourceResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn fetch_queue_wait_times(
        &self,
        params: &QueueParams,
    ) -> SourceResult<QueueWaitTimesPayload> {
        let mut data = self.data.write();
        if !data.queue_available {
            return Err(SourceError::Upstream(
                "Queue wait-time service unavailable".to_string(),
            ));
        }
        data.queue_requests.push(params.clone());
        Ok(data.queue_payload.clone())
    }

    async fn fetch_power_csv(&self) -> SourceResult<String> {
        Ok(self.data.read().power_csv.clone())
    }

    async fn fetch_metrics_by_job(&self) -> SourceResult<MetricsByJob> {
        Ok(self.data.read().metrics.clone())
    }

    async fn fetch_user_jobs(&self) -> SourceResult<Vec<JobRecord>> {
        Ok(self.data.read().jobs.clone())
    }
}
