#[cfg(test)]
mod tests {
    use crate::models::{JobRecord, MetricRow, MetricsByJob, POWER_USAGE};
    use crate::services::compare::*;
    use serde_json::Value;

    const SM_ACTIVE: &str = "nersc_ldms_dcgm_sm_active";

    fn fixture() -> MetricsByJob {
        let mut metrics = MetricsByJob::new();
        metrics.insert(
            "1001",
            vec![
                MetricRow::new(1001, 200.0)
                    .with_metric(SM_ACTIVE, 0.5)
                    .with_metric(POWER_USAGE, 300.0),
                MetricRow::new(1001, 0.0)
                    .with_metric(SM_ACTIVE, 0.1)
                    .with_metric(POWER_USAGE, 100.0),
                MetricRow::new(1001, 100.0)
                    .with_metric(SM_ACTIVE, 0.3)
                    .with_metric(POWER_USAGE, Value::Null),
            ],
        );
        metrics.insert(
            "1002",
            vec![MetricRow::new(1002, 0.0)
                .with_metric(SM_ACTIVE, 0.9)
                .with_metric(POWER_USAGE, 250.0)],
        );
        metrics
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_format_metric_name() {
        assert_eq!(format_metric_name("nersc_ldms_dcgm_power_usage"), "power usage");
        assert_eq!(format_metric_name("cpu_util"), "cpu util");
        assert_eq!(format_metric_name(""), "");
    }

    #[test]
    fn test_trace_normalized_and_sorted() {
        let data = compare_jobs(&fixture(), &ids(&["1001"]), POWER_USAGE);
        let trace = &data.traces[0];
        assert_eq!(trace.name, "Job 1001");
        assert_eq!(trace.x, vec![0.0, 50.0, 100.0]);
        assert_eq!(trace.y, vec![Some(100.0), None, Some(300.0)]);
        assert_eq!(trace.color, TRACE_COLORS[0]);
        assert_eq!(data.display_name, "power usage");
    }

    #[test]
    fn test_halves_round_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
        assert_eq!(round_half_up(0.49999999999999994), 0.0);

        let rows = vec![MetricRow::new(7, 200.0), MetricRow::new(7, -3.0)];
        let trace = normalized_trace("7", &rows, POWER_USAGE, TRACE_COLORS[0]).unwrap();
        assert_eq!(trace.x, vec![-1.0, 100.0]);
    }

    #[test]
    fn test_short_job_uses_duration_floor() {
        let data = compare_jobs(&fixture(), &ids(&["1002"]), POWER_USAGE);
        assert_eq!(data.traces[0].x, vec![0.0]);
    }

    #[test]
    fn test_summary_skips_nulls() {
        let data = compare_jobs(&fixture(), &ids(&["1001"]), POWER_USAGE);
        let summary = &data.summaries[0];
        assert_eq!(summary.mean, 200.0);
        assert_eq!(summary.avg, summary.mean);
        assert_eq!(summary.min, 100.0);
        assert_eq!(summary.max, 300.0);
    }

    #[test]
    fn test_single_point_summary_is_flat() {
        let summary = summarize_metric("1002", fixture().rows("1002"), POWER_USAGE);
        assert_eq!(summary.mean, 250.0);
        assert_eq!(summary.min, summary.max);
        assert_eq!(summary.avg, summary.min);
    }

    #[test]
    fn test_unknown_job_gets_zero_summary_and_no_trace() {
        let data = compare_jobs(&fixture(), &ids(&["1001", "9999"]), POWER_USAGE);
        assert_eq!(data.traces.len(), 1);
        assert_eq!(data.summaries.len(), 2);
        assert_eq!(data.summaries[1].job_id, "9999");
        assert_eq!(data.summaries[1].max, 0.0);
    }

    #[test]
    fn test_empty_metric_or_jobs() {
        let data = compare_jobs(&fixture(), &ids(&["1001"]), "");
        assert!(data.traces.is_empty() && data.summaries.is_empty());

        let data = compare_jobs(&fixture(), &[], POWER_USAGE);
        assert!(data.traces.is_empty() && data.summaries.is_empty());
    }

    #[test]
    fn test_groups() {
        let metrics = ids(&[
            "nersc_ldms_dcgm_gpu_utilization",
            "nersc_ldms_dcgm_tensor_active",
            "cpu_user",
            "network_rx",
            "netcpu_mix",
            "mem_free",
        ]);
        let groups = MetricGroups::classify(&metrics);
        assert_eq!(groups.gpu.len(), 2);
        assert_eq!(groups.cpu, ids(&["cpu_user", "netcpu_mix"]));
        assert_eq!(groups.network, ids(&["network_rx", "netcpu_mix"]));
        assert_eq!(groups.other, ids(&["mem_free"]));
    }

    #[test]
    fn test_default_metric() {
        assert_eq!(
            default_metric(&ids(&["a", "nersc_ldms_dcgm_power_usage"])).as_deref(),
            Some("nersc_ldms_dcgm_power_usage")
        );
        assert_eq!(default_metric(&ids(&["a", "b"])).as_deref(), Some("a"));
        assert_eq!(default_metric(&[]), None);
    }

    #[test]
    fn test_build_comparison_defaults() {
        let data = build_comparison(&fixture(), None, None);
        assert_eq!(data.metric, POWER_USAGE);
        assert_eq!(data.jobs, ids(&["1001", "1002", "1003", "1004", "1005", "1006"]));
        assert_eq!(data.traces.len(), 6);
        assert_eq!(data.traces[5].color, TRACE_COLORS[5]);
    }

    #[test]
    fn test_build_comparison_explicit_selection() {
        let selection = ids(&["1002"]);
        let data = build_comparison(&fixture(), Some(&selection), Some(SM_ACTIVE));
        assert_eq!(data.jobs, selection);
        assert_eq!(data.summaries[0].mean, 0.9);
    }

    #[test]
    fn test_build_comparison_empty_source() {
        let data = build_comparison(&MetricsByJob::new(), None, None);
        assert!(data.metric.is_empty());
        assert!(data.jobs.is_empty());
        assert!(data.traces.is_empty());
    }

    #[test]
    fn test_catalog() {
        let mut record = JobRecord::new(1001);
        record.project = "m4321".into();
        let catalog = build_catalog(&fixture(), &[record]);

        assert_eq!(catalog.metrics.len(), 2);
        assert_eq!(catalog.metrics[0].name, SM_ACTIVE);
        assert_eq!(catalog.metrics[0].display_name, "sm active");
        assert_eq!(catalog.groups.gpu, ids(&[SM_ACTIVE]));
        assert_eq!(catalog.default_metric.as_deref(), Some(POWER_USAGE));
        assert_eq!(catalog.jobs.len(), 6);
        assert_eq!(catalog.jobs[0].label, "Job ID 1001");
        assert_eq!(catalog.jobs[0].project, "m4321");
        assert_eq!(catalog.jobs[1].project, "Unknown");
        assert_eq!(catalog.default_jobs.len(), 6);
    }
}
