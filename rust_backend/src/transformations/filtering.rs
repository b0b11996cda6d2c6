use crate::models::{DateRange, MetricPoint, PowerPoint};

/// Anything that sits on a time axis.
pub trait Timestamped {
    fn timestamp(&self) -> f64;
}

impl Timestamped for PowerPoint {
    fn timestamp(&self) -> f64 {
        self.time
    }
}

impl Timestamped for MetricPoint {
    fn timestamp(&self) -> f64 {
        self.timestamp
    }
}

/// Keep the points no older than `window` relative to the newest point.
///
/// The cut-off is `max(timestamp) - window`, so the result is anchored to the
/// series itself and not to the wall clock. Input order is preserved.
pub fn filter_by_window<T: Timestamped + Clone>(series: &[T], window: f64) -> Vec<T> {
    let Some(latest) = series
        .iter()
        .map(Timestamped::timestamp)
        .reduce(f64::max)
    else {
        return Vec::new();
    };

    let cutoff = latest - window;
    series
        .iter()
        .filter(|point| point.timestamp() >= cutoff)
        .cloned()
        .collect()
}

/// Apply a [`DateRange`] to a series whose timestamps are in milliseconds.
///
/// [`DateRange::All`] returns the series unchanged.
pub fn filter_by_range<T: Timestamped + Clone>(series: &[T], range: DateRange) -> Vec<T> {
    match range.window_millis() {
        Some(window) => filter_by_window(series, window),
        None => series.to_vec(),
    }
}

/// Newest timestamp of a series, if any.
pub fn latest_timestamp<T: Timestamped>(series: &[T]) -> Option<f64> {
    series.iter().map(Timestamped::timestamp).reduce(f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HOUR_MS: f64 = 3_600_000.0;
    const DAY_MS: f64 = 24.0 * HOUR_MS;

    fn hourly(hours: usize) -> Vec<PowerPoint> {
        (0..hours)
            .map(|h| PowerPoint::new(h as f64 * HOUR_MS, 1000.0 + h as f64))
            .collect()
    }

    #[test]
    fn test_last_24_hours_keeps_boundary() {
        let series = hourly(49);
        let filtered = filter_by_range(&series, DateRange::Last24Hours);
        // 48h is the newest point; the 24h point sits exactly on the cut-off.
        assert_eq!(filtered.len(), 25);
        assert_eq!(filtered[0].time, 24.0 * HOUR_MS);
        assert_eq!(filtered.last().unwrap().time, 48.0 * HOUR_MS);
    }

    #[test]
    fn test_all_is_identity() {
        let series = vec![
            PowerPoint::new(3.0 * DAY_MS, 1.0),
            PowerPoint::new(0.0, 2.0),
            PowerPoint::new(40.0 * DAY_MS, 3.0),
        ];
        assert_eq!(filter_by_range(&series, DateRange::All), series);
    }

    #[test]
    fn test_empty_series() {
        let empty: Vec<PowerPoint> = Vec::new();
        assert!(filter_by_range(&empty, DateRange::Last7Days).is_empty());
        assert!(filter_by_range(&empty, DateRange::All).is_empty());
        assert_eq!(latest_timestamp(&empty), None);
    }

    #[test]
    fn test_window_anchored_to_series_not_clock() {
        // Data from long ago still yields a full window.
        let series = vec![
            PowerPoint::new(1_000.0 * DAY_MS, 1.0),
            PowerPoint::new(1_006.0 * DAY_MS, 2.0),
            PowerPoint::new(1_008.0 * DAY_MS, 3.0),
        ];
        let filtered = filter_by_range(&series, DateRange::Last7Days);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].power, 2.0);
    }

    #[test]
    fn test_unsorted_input_keeps_order() {
        let series = vec![
            PowerPoint::new(10.0 * DAY_MS, 1.0),
            PowerPoint::new(0.0, 2.0),
            PowerPoint::new(9.5 * DAY_MS, 3.0),
        ];
        let filtered = filter_by_range(&series, DateRange::Last24Hours);
        let powers: Vec<f64> = filtered.iter().map(|p| p.power).collect();
        assert_eq!(powers, vec![1.0, 3.0]);
    }

    #[test]
    fn test_metric_points_filter_by_raw_window() {
        let series: Vec<MetricPoint> = (0..10)
            .map(|i| MetricPoint {
                timestamp: i as f64 * 30.0,
                value: Some(i as f64),
            })
            .collect();
        let filtered = filter_by_window(&series, 60.0);
        assert_eq!(filtered.len(), 3);
        assert_eq!(filtered[0].timestamp, 210.0);
    }

    fn range_strategy() -> impl Strategy<Value = DateRange> {
        prop_oneof![
            Just(DateRange::Last24Hours),
            Just(DateRange::Last7Days),
            Just(DateRange::Last30Days),
        ]
    }

    proptest! {
        #[test]
        fn prop_window_yields_suffix_of_sorted_input(
            mut times in prop::collection::vec(0.0f64..(90.0 * DAY_MS), 0..200),
            range in range_strategy(),
        ) {
            times.sort_by(f64::total_cmp);
            let series: Vec<PowerPoint> = times.iter().map(|&t| PowerPoint::new(t, 1.0)).collect();
            let filtered = filter_by_range(&series, range);

            prop_assert!(filtered.len() <= series.len());
            prop_assert_eq!(&series[series.len() - filtered.len()..], &filtered[..]);
            if !series.is_empty() {
                prop_assert!(!filtered.is_empty());
            }
        }
    }
}
