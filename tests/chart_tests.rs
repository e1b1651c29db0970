mod common;

use common::sample;
use opsdeck::chart::{
    self, COLOR_BLUE, COLOR_GREEN, ChartLayout, ChartSpec, Dataset, scale_max, spec_for,
    sum_channels,
};

fn spec(datasets: Vec<Dataset>, fixed_max: Option<f64>, capacity: usize) -> ChartSpec {
    ChartSpec {
        datasets,
        unit: "%".into(),
        fixed_max,
        capacity,
    }
}

#[test]
fn scale_max_covers_every_value_with_headroom() {
    let datasets = vec![Dataset::new("a", COLOR_GREEN, vec![3.0, 47.2, 12.0])];
    let max = scale_max(&datasets, None);
    assert!(max >= 47.2);
    assert_eq!(max, (47.2f64 * 1.1).ceil());
}

#[test]
fn scale_max_honors_fixed_floor() {
    let datasets = vec![Dataset::new("a", COLOR_GREEN, vec![12.0])];
    assert_eq!(scale_max(&datasets, Some(100.0)), 110.0);
}

#[test]
fn scale_max_all_zero_scales_like_100() {
    let datasets = vec![Dataset::new("a", COLOR_GREEN, vec![0.0, 0.0])];
    assert_eq!(scale_max(&datasets, None), 110.0);
}

#[test]
fn scale_max_ignores_nan() {
    let datasets = vec![Dataset::new("a", COLOR_GREEN, vec![f64::NAN, 5.0])];
    assert_eq!(scale_max(&datasets, None), (5.0f64 * 1.1).ceil());
}

#[test]
fn render_is_deterministic() {
    let s = spec(
        vec![
            Dataset::new("a", COLOR_GREEN, vec![10.0, 20.0, 30.0]),
            Dataset::new("b", COLOR_BLUE, vec![5.0, 15.0, 25.0]),
        ],
        Some(100.0),
        60,
    );
    let layout = ChartLayout::default();
    let first = serde_json::to_string(&chart::render(&s, &layout)).unwrap();
    let second = serde_json::to_string(&chart::render(&s, &layout)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn render_emits_five_gridlines_top_label_is_max() {
    let s = spec(
        vec![Dataset::new("a", COLOR_GREEN, vec![50.0, 60.0])],
        Some(100.0),
        60,
    );
    let geometry = chart::render(&s, &ChartLayout::default());
    assert_eq!(geometry.gridlines.len(), 5);
    assert_eq!(geometry.gridlines[0].label, "110%");
    assert_eq!(geometry.gridlines[4].label, "0%");
}

#[test]
fn short_datasets_get_no_polyline_but_keep_legend() {
    let s = spec(
        vec![
            Dataset::new("lonely", COLOR_GREEN, vec![42.0]),
            Dataset::new("empty", COLOR_BLUE, vec![]),
        ],
        Some(100.0),
        60,
    );
    let geometry = chart::render(&s, &ChartLayout::default());
    for series in &geometry.series {
        assert!(series.polyline.is_empty());
        assert!(series.fill.is_none());
    }
    assert_eq!(geometry.legend.len(), 2);
}

#[test]
fn polyline_points_follow_the_scale() {
    let layout = ChartLayout::default();
    let s = spec(
        vec![Dataset::new("a", COLOR_GREEN, vec![0.0, 55.0, 110.0])],
        Some(100.0),
        3,
    );
    let geometry = chart::render(&s, &layout);
    let polyline = &geometry.series[0].polyline;
    assert_eq!(polyline.len(), 3);

    let chart_width = layout.width - layout.padding.left - layout.padding.right;
    let chart_height = layout.height - layout.padding.top - layout.padding.bottom;
    let step = chart_width / 2.0;
    for (i, point) in polyline.iter().enumerate() {
        assert!((point.x - (layout.padding.left + i as f64 * step)).abs() < 1e-9);
    }
    // max_val is 110; the 110.0 sample sits on the top edge, 0.0 on the
    // bottom edge.
    assert!((polyline[2].y - layout.padding.top).abs() < 1e-9);
    assert!((polyline[0].y - (layout.padding.top + chart_height)).abs() < 1e-9);
}

#[test]
fn fill_path_closes_along_the_baseline() {
    let layout = ChartLayout::default();
    let s = spec(
        vec![Dataset::new("a", COLOR_GREEN, vec![10.0, 20.0])],
        Some(100.0),
        2,
    );
    let geometry = chart::render(&s, &layout);
    let fill = geometry.series[0].fill.as_ref().unwrap();
    assert_eq!(fill.path.len(), 4);
    let bottom = layout.height - layout.padding.bottom;
    assert_eq!(fill.path[2].y, bottom);
    assert_eq!(fill.path[3].y, bottom);
    assert_eq!(fill.top_color, format!("{COLOR_GREEN}40"));
    assert_eq!(fill.bottom_color, format!("{COLOR_GREEN}00"));
}

#[test]
fn legend_omitted_for_single_dataset() {
    let s = spec(
        vec![Dataset::new("a", COLOR_GREEN, vec![1.0, 2.0])],
        None,
        60,
    );
    assert!(chart::render(&s, &ChartLayout::default()).legend.is_empty());
}

#[test]
fn legend_entries_advance_rightward() {
    let s = spec(
        vec![
            Dataset::new("In", COLOR_GREEN, vec![1.0, 2.0]),
            Dataset::new("Out", COLOR_BLUE, vec![1.0, 2.0]),
        ],
        None,
        60,
    );
    let geometry = chart::render(&s, &ChartLayout::default());
    assert_eq!(geometry.legend.len(), 2);
    assert!(geometry.legend[1].x > geometry.legend[0].x);
}

#[test]
fn sum_channels_skips_nan() {
    assert_eq!(sum_channels(&[1.0, f64::NAN, 2.5]), 3.5);
}

#[test]
fn memory_percent_uses_used_channel() {
    let labels = vec!["used".to_string(), "free".to_string()];
    let pct = chart::memory_percent(&labels);
    assert_eq!(pct(&[10.0, 5.0]), 66.7);
    assert_eq!(pct(&[20.0, 5.0]), 80.0);
    assert_eq!(pct(&[0.0, 0.0]), 0.0);
}

#[test]
fn spec_for_known_series() {
    let samples = vec![sample(1, &[10.0, 5.0]), sample(2, &[20.0, 5.0])];
    let labels = vec!["used".to_string(), "free".to_string()];
    let s = spec_for("memory", &labels, &samples, 60).unwrap();
    assert_eq!(s.datasets.len(), 1);
    assert_eq!(s.datasets[0].data, vec![66.7, 80.0]);
    assert_eq!(s.fixed_max, Some(100.0));

    let cpu = spec_for("cpu", &labels, &samples, 60).unwrap();
    assert_eq!(cpu.datasets[0].data, vec![15.0, 25.0]);
}

#[test]
fn spec_for_unknown_series_is_none() {
    assert!(spec_for("processes", &[], &[], 1).is_none());
    assert!(spec_for("nope", &[], &[], 60).is_none());
}
