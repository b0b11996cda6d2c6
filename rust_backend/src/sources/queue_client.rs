//! HTTP client for the center's queue wait-time API.

use log::{debug, warn};
use std::time::Duration;

use super::config::QueueApiConfig;
use super::error::{SourceError, SourceResult};
use crate::parsing::{parse_queue_payload_str, QueueWaitTimesPayload};
use crate::services::QueueParams;

/// Fetches queue wait-time payloads with a fixed number of retries.
#[derive(Clone)]
pub struct QueueApiClient {
    endpoint: String,
    retries: u32,
    retry_delay: Duration,
    client: reqwest::Client,
}

impl QueueApiClient {
    pub fn new(config: &QueueApiConfig) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                SourceError::Config(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            endpoint: config.endpoint(),
            retries: config.retries,
            retry_delay: config.retry_delay,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch one payload, retrying transient failures.
    ///
    /// Only the last error is reported once every attempt has failed.
    pub async fn fetch(&self, params: &QueueParams) -> SourceResult<QueueWaitTimesPayload> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(params).await {
                Ok(payload) => return Ok(payload),
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        "Queue fetch failed ({}), retry {}/{} in {:?}",
                        e, attempt, self.retries, self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, params: &QueueParams) -> SourceResult<QueueWaitTimesPayload> {
        debug!("GET {} {:?}", self.endpoint, params);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params.query_pairs())
            .send()
            .await
            .map_err(|e| SourceError::Upstream(format!("Failed to fetch data: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Upstream(format!(
                "Failed to fetch data: {}",
                status
            )));
        }

        let body = response.text().await.map_err(|e| {
            SourceError::Upstream(format!("Failed to read response body: {}", e))
        })?;

        parse_queue_payload_str(&body)
            .map_err(|e| SourceError::invalid("queue response", format!("{:#}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::QueueQuery;
    use chrono::Utc;

    #[tokio::test]
    async fn test_unreachable_upstream_is_connection_error() {
        let config = QueueApiConfig {
            base_url: "http://127.0.0.1:9".into(),
            retries: 1,
            retry_delay: Duration::from_millis(1),
            timeout: Duration::from_secs(2),
        };
        let client = QueueApiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://127.0.0.1:9/mynersc/queuewaittimes.php"
        );

        let params = QueueQuery::default().resolve(Utc::now());
        let err = client.fetch(&params).await.unwrap_err();
        assert!(matches!(err, SourceError::Upstream(_)));
    }
}
