//! Repository backed by fixture files on disk.
//!
//! Job and power data are read from a data directory on every request so that
//! replacing a file takes effect without a restart. Queue data comes from the
//! upstream API when one is configured, otherwise from a fixture file.

use async_trait::async_trait;
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::models::{JobRecord, MetricsByJob};
use crate::parsing::{
    parse_metrics_json_str, parse_queue_payload_str, parse_user_jobs_json_str,
    QueueWaitTimesPayload,
};
use crate::services::QueueParams;
use crate::sources::config::SourceConfig;
use crate::sources::error::{SourceError, SourceResult};
#[cfg(feature = "remote-api")]
use crate::sources::queue_client::QueueApiClient;
use crate::sources::repository::DashboardRepository;

pub const POWER_FILE: &str = "power.csv";
pub const METRICS_FILE: &str = "metrics-data.json";
pub const JOBS_FILE: &str = "user-jobs.json";
pub const QUEUE_FIXTURE_FILE: &str = "queue-wait-times.json";

/// File-backed repository.
pub struct FilesRepository {
    data_dir: PathBuf,
    #[cfg(feature = "remote-api")]
    queue_client: Option<QueueApiClient>,
}

impl FilesRepository {
    /// Serve everything, queue data included, from `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            #[cfg(feature = "remote-api")]
            queue_client: None,
        }
    }

    /// Build from configuration, attaching the upstream queue client when
    /// one is configured.
    pub fn from_config(config: &SourceConfig) -> SourceResult<Self> {
        #[allow(unused_mut)]
        let mut repo = Self::new(config.data_dir.clone());

        #[cfg(feature = "remote-api")]
        {
            if let Some(api) = &config.queue_api {
                let client = QueueApiClient::new(api)?;
                info!("Queue data from {}", client.endpoint());
                repo.queue_client = Some(client);
            }
        }

        #[cfg(not(feature = "remote-api"))]
        {
            if config.queue_api.is_some() {
                log::warn!("Built without the remote-api feature; queue data comes from fixtures");
            }
        }

        info!("Reading dashboard data from {}", repo.data_dir.display());
        Ok(repo)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    async fn read_bytes(&self, name: &str) -> SourceResult<Vec<u8>> {
        let path = self.data_dir.join(name);
        debug!("Reading {}", path.display());
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                SourceError::Missing(format!("Data file {} does not exist", path.display()))
            }
            _ => SourceError::Unreadable { path, source: e },
        })
    }

    async fn read_file(&self, name: &'static str) -> SourceResult<String> {
        let bytes = self.read_bytes(name).await?;
        String::from_utf8(bytes).map_err(|e| SourceError::invalid(name, e))
    }

    async fn read_queue_fixture(&self) -> SourceResult<QueueWaitTimesPayload> {
        let text = self.read_file(QUEUE_FIXTURE_FILE).await?;
        parse_queue_payload_str(&text)
            .map_err(|e| SourceError::invalid(QUEUE_FIXTURE_FILE, format!("{:#}", e)))
    }
}

#[async_trait]
impl DashboardRepository for FilesRepository {
    async fn health_check(&self) -> SourceResult<bool> {
        Ok(tokio::fs::metadata(&self.data_dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false))
    }

    async fn fetch_queue_wait_times(
        &self,
        params: &QueueParams,
    ) -> SourceResult<QueueWaitTimesPayload> {
        #[cfg(feature = "remote-api")]
        {
            if let Some(client) = &self.queue_client {
                return client.fetch(params).await;
            }
        }

        debug!("Serving queue fixture for {:?}", params);
        self.read_queue_fixture().await
    }

    async fn fetch_power_csv(&self) -> SourceResult<String> {
        // Lines with undecodable bytes are dropped by the CSV parser.
        let bytes = self.read_bytes(POWER_FILE).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn fetch_metrics_by_job(&self) -> SourceResult<MetricsByJob> {
        let text = self.read_file(METRICS_FILE).await?;
        parse_metrics_json_str(&text)
            .map_err(|e| SourceError::invalid(METRICS_FILE, format!("{:#}", e)))
    }

    async fn fetch_user_jobs(&self) -> SourceResult<Vec<JobRecord>> {
        let text = self.read_file(JOBS_FILE).await?;
        parse_user_jobs_json_str(&text)
            .map_err(|e| SourceError::invalid(JOBS_FILE, format!("{:#}", e)))
    }
}
