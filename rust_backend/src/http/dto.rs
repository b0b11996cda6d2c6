//! Data Transfer Objects for the HTTP API.
//!
//! Query structs mirror the view state the frontend keeps locally. Values
//! with a closed set of options arrive as strings and are parsed here so an
//! invalid value produces a JSON error body instead of a bare rejection.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::{Aggregation, DateRange, PanelView};
use crate::services::power::PowerVisibility;
use crate::services::{JobListingRow, QueueQuery};

fn parse_optional<T: FromStr<Err = String>>(value: Option<&str>) -> Result<Option<T>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => T::from_str(v).map(Some),
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// `connected`, `unavailable` or `error: ...`
    pub source: String,
}

/// Query parameters for `/v1/center/queue`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueQueryParams {
    pub machine: Option<String>,
    pub arch: Option<String>,
    pub qos: Option<String>,
    /// Unix seconds; must be given together with `end`.
    pub start: Option<i64>,
    pub end: Option<i64>,
    /// `24h`, `7d` or `30d`; ignored when `start`/`end` are set.
    pub range: Option<String>,
}

impl QueueQueryParams {
    pub fn to_query(&self) -> Result<QueueQuery, String> {
        let range = parse_optional::<DateRange>(self.range.as_deref())?;
        QueueQuery::from_parts(
            self.machine.as_deref(),
            self.arch.as_deref(),
            self.qos.as_deref(),
            self.start,
            self.end,
            range,
        )
        .map_err(|e| e.to_string())
    }
}

/// Query parameters for `/v1/center/power`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerRangeQuery {
    pub range: Option<String>,
}

impl PowerRangeQuery {
    /// Requested window; the power view defaults to the last 24 hours.
    pub fn date_range(&self) -> Result<DateRange, String> {
        Ok(parse_optional(self.range.as_deref())?.unwrap_or(DateRange::Last24Hours))
    }
}

/// Query parameters for `/v1/jobs/{job_id}/panels/{panel}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanelQuery {
    pub aggregation: Option<String>,
    #[serde(default)]
    pub expanded: bool,
    pub show_primary: Option<bool>,
    pub show_secondary: Option<bool>,
}

impl PanelQuery {
    pub fn to_view(&self) -> Result<PanelView, String> {
        Ok(PanelView {
            aggregation: parse_optional::<Aggregation>(self.aggregation.as_deref())?
                .unwrap_or_default(),
            expanded: self.expanded,
            show_primary: self.show_primary.unwrap_or(true),
            show_secondary: self.show_secondary.unwrap_or(true),
        })
    }
}

/// Query parameters for `/v1/jobs/{job_id}/power`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobPowerQuery {
    pub aggregation: Option<String>,
    pub cpu: Option<bool>,
    pub gpu: Option<bool>,
    pub memory: Option<bool>,
    pub node: Option<bool>,
}

impl JobPowerQuery {
    pub fn aggregation(&self) -> Result<Aggregation, String> {
        Ok(parse_optional(self.aggregation.as_deref())?.unwrap_or_default())
    }

    pub fn visibility(&self) -> PowerVisibility {
        [self.cpu, self.gpu, self.memory, self.node].map(|shown| shown.unwrap_or(true))
    }
}

/// Query parameters for `/v1/compare`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareQuery {
    /// Comma-separated job ids.
    pub jobs: Option<String>,
    pub metric: Option<String>,
}

impl CompareQuery {
    /// Requested job ids, or `None` to use the default selection.
    pub fn job_ids(&self) -> Option<Vec<String>> {
        let ids: Vec<String> = self
            .jobs
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        (!ids.is_empty()).then_some(ids)
    }

    pub fn metric(&self) -> Option<&str> {
        self.metric.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }
}

/// Response for the job listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobListingRow>,
    pub total: usize,
}
