//! HTTP handlers for the REST API.
//!
//! Each handler awaits the repository, then hands the payload to the service
//! layer. The transforms are cheap enough to run inline.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::str::FromStr;

use super::dto::{
    CompareQuery, HealthResponse, JobListResponse, JobPowerQuery, PanelQuery, PowerRangeQuery,
    QueueQueryParams,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::{JobRecord, Panel};
use crate::services::power::JobPowerPanel;
use crate::services::{
    build_catalog, build_comparison, build_job_listing, build_panel, build_queue_view,
    build_roofline, job_metric_sections, job_power_panel, power_view_from_csv, ComparisonData,
    JobMetricsView, MetricCatalog, PanelData, PowerView, QueueView, RooflineData,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Reports whether the service is up and its data source reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let source = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "unavailable".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        source,
    }))
}

// =============================================================================
// Center-wide views
// =============================================================================

/// GET /v1/center/queue
///
/// Queue wait-time and queued-job heatmaps with their tables.
pub async fn get_queue(
    State(state): State<AppState>,
    Query(params): Query<QueueQueryParams>,
) -> HandlerResult<QueueView> {
    let query = params.to_query().map_err(AppError::BadRequest)?;
    let cached = state
        .queue_cache
        .get_or_fetch(state.repository.as_ref(), &query)
        .await?;

    Ok(Json(build_queue_view(
        &cached.payload,
        cached.params,
        query.range_label(),
    )))
}

/// GET /v1/center/power
///
/// System power over the requested trailing window.
pub async fn get_power(
    State(state): State<AppState>,
    Query(params): Query<PowerRangeQuery>,
) -> HandlerResult<PowerView> {
    let range = params.date_range().map_err(AppError::BadRequest)?;
    let csv_text = state.repository.fetch_power_csv().await?;
    Ok(Json(power_view_from_csv(&csv_text, range)?))
}

// =============================================================================
// Jobs
// =============================================================================

/// GET /v1/jobs
pub async fn list_jobs(State(state): State<AppState>) -> HandlerResult<JobListResponse> {
    let records = state.repository.fetch_user_jobs().await?;
    let metrics = state.repository.fetch_metrics_by_job().await?;

    let jobs = build_job_listing(&records, |id| metrics.rows(id));
    let total = jobs.len();
    Ok(Json(JobListResponse { jobs, total }))
}

/// GET /v1/jobs/{job_id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> HandlerResult<JobRecord> {
    Ok(Json(state.repository.get_job(&job_id).await?))
}

/// GET /v1/jobs/{job_id}/metrics
///
/// One section per recorded metric. Unknown jobs yield `has_data: false`.
pub async fn get_job_metrics(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> HandlerResult<JobMetricsView> {
    let rows = state.repository.get_job_metrics(&job_id).await?;
    Ok(Json(job_metric_sections(job_id.trim(), &rows)))
}

/// GET /v1/jobs/{job_id}/panels/{panel}
///
/// Utilization, memory, PCIe, network or GPU performance panel. Jobs without
/// samples get the synthetic fallback panel.
pub async fn get_job_panel(
    State(state): State<AppState>,
    Path((job_id, panel)): Path<(String, String)>,
    Query(params): Query<PanelQuery>,
) -> HandlerResult<PanelData> {
    let panel = Panel::from_str(&panel).map_err(AppError::BadRequest)?;
    let view = params.to_view().map_err(AppError::BadRequest)?;
    let rows = state.repository.get_job_metrics(&job_id).await?;
    Ok(Json(build_panel(panel, &rows, &view)))
}

/// GET /v1/jobs/{job_id}/power
pub async fn get_job_power(
    Path(_job_id): Path<String>,
    Query(params): Query<JobPowerQuery>,
) -> HandlerResult<JobPowerPanel> {
    let aggregation = params.aggregation().map_err(AppError::BadRequest)?;
    Ok(Json(job_power_panel(aggregation, params.visibility())))
}

/// GET /v1/jobs/{job_id}/roofline
pub async fn get_job_roofline(Path(_job_id): Path<String>) -> HandlerResult<RooflineData> {
    Ok(Json(build_roofline()))
}

// =============================================================================
// Job comparison
// =============================================================================

/// GET /v1/compare/metrics
///
/// Metrics and jobs available for comparison, with the default selection.
pub async fn get_compare_catalog(State(state): State<AppState>) -> HandlerResult<MetricCatalog> {
    let metrics = state.repository.fetch_metrics_by_job().await?;
    let records = state.repository.fetch_user_jobs().await?;
    Ok(Json(build_catalog(&metrics, &records)))
}

/// GET /v1/compare?jobs=1,2,3&metric=name
pub async fn compare_jobs(
    State(state): State<AppState>,
    Query(params): Query<CompareQuery>,
) -> HandlerResult<ComparisonData> {
    let metrics = state.repository.fetch_metrics_by_job().await?;
    let job_ids = params.job_ids();
    Ok(Json(build_comparison(
        &metrics,
        job_ids.as_deref(),
        params.metric(),
    )))
}
