use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use perfdash::models::{MetricRow, Panel, PanelView, Sample, GPU_UTILIZATION};
use perfdash::services::build_panel;
use perfdash::services::heatmap::bin_samples;
use perfdash::services::synthetic::{Scale, SyntheticNodeExpander};

fn queue_samples(hours: usize, node_bins: usize) -> Vec<Sample> {
    (0..hours)
        .flat_map(|x| {
            (0..node_bins).map(move |y| Sample::new(x as f64, y as f64, (x * 7 + y * 3) as f64 % 48.0))
        })
        .collect()
}

fn bench_heatmap_binning(c: &mut Criterion) {
    let mut group = c.benchmark_group("heatmap_binning");

    for &(hours, node_bins) in &[(12, 8), (48, 12), (168, 16)] {
        let samples = queue_samples(hours, node_bins);
        group.bench_with_input(
            BenchmarkId::new("bin_samples", samples.len()),
            &samples,
            |b, samples| {
                b.iter(|| black_box(bin_samples(black_box(samples))));
            },
        );
    }

    group.finish();
}

fn bench_node_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("node_expansion");

    for &points in &[50, 500, 5000] {
        let time: Vec<f64> = (0..points).map(|i| i as f64 * 2.0).collect();
        let primary: Vec<f64> = (0..points).map(|i| 40.0 + (i as f64 / 7.0).sin() * 20.0).collect();
        let secondary: Vec<f64> = primary.iter().map(|v| v * 0.7 + 6.0).collect();
        let expander = SyntheticNodeExpander::new(Scale::Percent, ["CPU", "GPU"]);

        group.bench_with_input(BenchmarkId::new("expand", points), &points, |b, _| {
            b.iter(|| black_box(expander.expand(&time, &primary, &secondary)));
        });
    }

    group.finish();
}

fn bench_panel_build(c: &mut Criterion) {
    let rows: Vec<MetricRow> = (0..1000)
        .map(|i| MetricRow::new(1, i as f64 * 10.0).with_metric(GPU_UTILIZATION, (i % 100) as f64))
        .collect();
    let view = PanelView::default();

    c.bench_function("build_panel_network", |b| {
        b.iter(|| black_box(build_panel(Panel::Network, black_box(&rows), &view)));
    });
}

criterion_group!(benches, bench_heatmap_binning, bench_node_expansion, bench_panel_build);
criterion_main!(benches);
