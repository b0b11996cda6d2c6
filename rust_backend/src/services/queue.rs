use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{DateRange, HeatmapGrid, TableData};
use crate::parsing::QueueWaitTimesPayload;
use crate::services::heatmap::transform_to_heatmap;
use crate::services::table::format_table_data;

pub const DEFAULT_MACHINE: &str = "perlmutter";
pub const DEFAULT_ARCH: &str = "gpu";
pub const DEFAULT_QOS: &str = "regular";
pub const DEFAULT_RANGE: DateRange = DateRange::Last7Days;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueueQueryError {
    #[error("Queue data needs a bounded date range; '{0}' is not supported")]
    UnboundedRange(DateRange),
    #[error("Both 'start' and 'end' must be given together")]
    PartialInterval,
    #[error("'start' ({start}) must not be after 'end' ({end})")]
    InvertedInterval { start: i64, end: i64 },
    #[error("'{0}' must not be empty")]
    EmptyField(&'static str),
}

/// Time span of a queue query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueWindow {
    /// Trailing window ending at the moment the data is fetched.
    Relative(DateRange),
    /// Explicit Unix-second bounds.
    Absolute { start: i64, end: i64 },
}

/// A queue request as the client asked for it. Relative windows stay
/// unresolved so equal requests share a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueQuery {
    pub machine: String,
    pub arch: String,
    pub qos: String,
    pub window: QueueWindow,
}

impl Default for QueueQuery {
    fn default() -> Self {
        Self {
            machine: DEFAULT_MACHINE.to_string(),
            arch: DEFAULT_ARCH.to_string(),
            qos: DEFAULT_QOS.to_string(),
            window: QueueWindow::Relative(DEFAULT_RANGE),
        }
    }
}

fn non_empty(value: Option<&str>, field: &'static str) -> Result<Option<String>, QueueQueryError> {
    match value.map(str::trim) {
        Some("") => Err(QueueQueryError::EmptyField(field)),
        other => Ok(other.map(str::to_string)),
    }
}

impl QueueQuery {
    /// Build a query from optional request parameters.
    ///
    /// `machine` may carry the architecture as `machine-arch`; an explicit
    /// `arch` still wins. Explicit `start`/`end` take precedence over `range`.
    pub fn from_parts(
        machine: Option<&str>,
        arch: Option<&str>,
        qos: Option<&str>,
        start: Option<i64>,
        end: Option<i64>,
        range: Option<DateRange>,
    ) -> Result<Self, QueueQueryError> {
        let mut query = Self::default();

        if let Some(machine) = non_empty(machine, "machine")? {
            match machine.split_once('-') {
                Some((name, combined_arch)) => {
                    query.machine = name.to_string();
                    query.arch = combined_arch.to_string();
                }
                None => query.machine = machine,
            }
        }
        if let Some(arch) = non_empty(arch, "arch")? {
            query.arch = arch;
        }
        if let Some(qos) = non_empty(qos, "qos")? {
            query.qos = qos;
        }

        query.window = match (start, end) {
            (Some(start), Some(end)) if start > end => {
                return Err(QueueQueryError::InvertedInterval { start, end })
            }
            (Some(start), Some(end)) => QueueWindow::Absolute { start, end },
            (None, None) => {
                let range = range.unwrap_or(DEFAULT_RANGE);
                if range.window_secs().is_none() {
                    return Err(QueueQueryError::UnboundedRange(range));
                }
                QueueWindow::Relative(range)
            }
            _ => return Err(QueueQueryError::PartialInterval),
        };

        Ok(query)
    }

    /// Pin the window to concrete Unix-second bounds.
    pub fn resolve(&self, now: DateTime<Utc>) -> QueueParams {
        let (start, end) = match self.window {
            QueueWindow::Absolute { start, end } => (start, end),
            QueueWindow::Relative(range) => {
                let end = now.timestamp();
                let span = range.window_secs().unwrap_or(0) as i64;
                (end - span, end)
            }
        };

        QueueParams {
            machine: self.machine.clone(),
            arch: self.arch.clone(),
            start,
            end,
            qos: self.qos.clone(),
        }
    }

    pub fn range_label(&self) -> &'static str {
        match self.window {
            QueueWindow::Relative(range) => range.label(),
            QueueWindow::Absolute { .. } => "Custom Range",
        }
    }
}

/// Query parameters sent to the queue wait-time endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueParams {
    pub machine: String,
    pub arch: String,
    pub start: i64,
    pub end: i64,
    pub qos: String,
}

impl QueueParams {
    pub fn query_pairs(&self) -> [(&'static str, String); 5] {
        [
            ("machine", self.machine.clone()),
            ("arch", self.arch.clone()),
            ("start", self.start.to_string()),
            ("end", self.end.to_string()),
            ("qos", self.qos.clone()),
        ]
    }
}

/// Both queue heatmaps and tables, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueView {
    pub params: QueueParams,
    pub range_label: String,
    pub wait_heatmap: HeatmapGrid,
    pub jobs_heatmap: HeatmapGrid,
    pub wait_table: TableData,
    pub jobs_table: TableData,
}

pub fn build_queue_view(
    payload: &QueueWaitTimesPayload,
    params: QueueParams,
    range_label: &str,
) -> QueueView {
    QueueView {
        params,
        range_label: range_label.to_string(),
        wait_heatmap: transform_to_heatmap(&payload.wait),
        jobs_heatmap: transform_to_heatmap(&payload.jobs),
        wait_table: format_table_data(payload.wait_table.as_ref()),
        jobs_table: format_table_data(payload.jobs_table.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::parse_queue_payload_str;
    use chrono::TimeZone;

    #[test]
    fn test_defaults() {
        let query = QueueQuery::from_parts(None, None, None, None, None, None).unwrap();
        assert_eq!(query, QueueQuery::default());
        assert_eq!(query.range_label(), "Last 7 Days");
    }

    #[test]
    fn test_combined_machine_arch() {
        let query = QueueQuery::from_parts(Some("perlmutter-cpu"), None, None, None, None, None).unwrap();
        assert_eq!(query.machine, "perlmutter");
        assert_eq!(query.arch, "cpu");

        let query =
            QueueQuery::from_parts(Some("perlmutter-cpu"), Some("gpu"), Some("debug"), None, None, None)
                .unwrap();
        assert_eq!(query.arch, "gpu");
        assert_eq!(query.qos, "debug");
    }

    #[test]
    fn test_window_validation() {
        assert_eq!(
            QueueQuery::from_parts(None, None, None, None, None, Some(DateRange::All)),
            Err(QueueQueryError::UnboundedRange(DateRange::All))
        );
        assert_eq!(
            QueueQuery::from_parts(None, None, None, Some(10), None, None),
            Err(QueueQueryError::PartialInterval)
        );
        assert_eq!(
            QueueQuery::from_parts(None, None, None, Some(10), Some(5), None),
            Err(QueueQueryError::InvertedInterval { start: 10, end: 5 })
        );
        assert_eq!(
            QueueQuery::from_parts(Some(" "), None, None, None, None, None),
            Err(QueueQueryError::EmptyField("machine"))
        );
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let query =
            QueueQuery::from_parts(None, None, None, None, None, Some(DateRange::Last24Hours)).unwrap();
        let params = query.resolve(now);
        assert_eq!(params.end, now.timestamp());
        assert_eq!(params.end - params.start, 86_400);

        let query = QueueQuery::from_parts(None, None, None, Some(100), Some(200), Some(DateRange::Last30Days))
            .unwrap();
        let params = query.resolve(now);
        assert_eq!((params.start, params.end), (100, 200));
        assert_eq!(query.range_label(), "Custom Range");
        assert_eq!(params.query_pairs()[2], ("start", "100".to_string()));
    }

    #[test]
    fn test_build_queue_view() {
        let payload = parse_queue_payload_str(
            r#"{"wait": [[0, 0, 5], [1, 0, 7], [0, 1, 9]],
                "wait_table": {"categories": ["nodes"], "values": [["1"]]}}"#,
        )
        .unwrap();
        let params = QueueQuery::default().resolve(Utc::now());
        let view = build_queue_view(&payload, params, "Last 7 Days");

        assert_eq!(view.wait_heatmap.x_categories, vec!["<1", "1+"]);
        assert!(view.jobs_heatmap.is_empty());
        assert_eq!(view.wait_table.categories, vec!["Nodes"]);
        assert_eq!(view.jobs_table, TableData::default());
    }
}
