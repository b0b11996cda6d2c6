//! Data source trait consumed by the HTTP layer.
//!
//! A repository hands out raw dashboard payloads. It does no reshaping of
//! its own: the service layer turns whatever comes back into views.

use async_trait::async_trait;

use super::error::{SourceError, SourceResult};
use crate::models::{JobRecord, MetricRow, MetricsByJob};
use crate::parsing::QueueWaitTimesPayload;
use crate::services::QueueParams;

/// Source of queue, power, job and metric data.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to be shared between handlers.
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    // ==================== Health ====================

    /// Check whether the source can currently serve data.
    ///
    /// # Returns
    /// - `Ok(true)` if the source is reachable
    /// - `Ok(false)` if it is unavailable but no error occurred
    /// - `Err(SourceError)` if the check itself failed
    async fn health_check(&self) -> SourceResult<bool>;

    // ==================== Center-wide data ====================

    /// Fetch queue wait times for one machine, architecture, QOS and interval.
    ///
    /// # Arguments
    /// * `params` - Fully resolved query parameters
    ///
    /// # Returns
    /// * `Ok(QueueWaitTimesPayload)` - Payload with missing fields defaulted
    /// * `Err(SourceError::Upstream)` - If the upstream could not be reached
    async fn fetch_queue_wait_times(
        &self,
        params: &QueueParams,
    ) -> SourceResult<QueueWaitTimesPayload>;

    /// Fetch the system power CSV as text.
    async fn fetch_power_csv(&self) -> SourceResult<String>;

    // ==================== Job data ====================

    /// Fetch per-job metric samples, keyed by job id.
    async fn fetch_metrics_by_job(&self) -> SourceResult<MetricsByJob>;

    /// Fetch the job listing.
    async fn fetch_user_jobs(&self) -> SourceResult<Vec<JobRecord>>;

    /// Look up one job record.
    ///
    /// # Returns
    /// * `Ok(JobRecord)` - The matching record
    /// * `Err(SourceError::Missing)` - If no job has this id
    async fn get_job(&self, job_id: &str) -> SourceResult<JobRecord> {
        let job_id = job_id.trim();
        self.fetch_user_jobs()
            .await?
            .into_iter()
            .find(|record| record.id_string() == job_id)
            .ok_or_else(|| SourceError::Missing(format!("Job {} not found", job_id)))
    }

    /// Metric samples of one job; empty when the job has none.
    async fn get_job_metrics(&self, job_id: &str) -> SourceResult<Vec<MetricRow>> {
        let metrics = self.fetch_metrics_by_job().await?;
        Ok(metrics.rows(job_id.trim()).to_vec())
    }
}
