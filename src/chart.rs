// Chart normalization: turns window snapshots into drawable, auto-scaled
// geometry. Everything here is a pure function of its inputs; identical
// inputs yield identical geometry.

use serde::Serialize;

use crate::models::Sample;

pub const COLOR_GREEN: &str = "#10a37f";
pub const COLOR_BLUE: &str = "#43a9ff";
pub const COLOR_AMBER: &str = "#f5a623";
pub const COLOR_PURPLE: &str = "#a855f7";
pub const COLOR_RED: &str = "#ff4d4f";

/// Approximate label width per character, used for legend spacing. The
/// display surface measures real text; geometry only needs a stable layout.
const LEGEND_CHAR_WIDTH: f64 = 6.0;
const LEGEND_GAP: f64 = 36.0;
const LEGEND_SWATCH_WIDTH: f64 = 12.0;
const LEGEND_SWATCH_HEIGHT: f64 = 3.0;
const GRID_DIVISIONS: usize = 4;

#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    pub label: String,
    pub color: String,
    pub data: Vec<f64>,
}

impl Dataset {
    pub fn new(label: &str, color: &str, data: Vec<f64>) -> Self {
        Self {
            label: label.to_string(),
            color: color.to_string(),
            data,
        }
    }
}

/// Drawable description of one chart, recomputed every render tick.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub datasets: Vec<Dataset>,
    pub unit: String,
    pub fixed_max: Option<f64>,
    /// Horizontal slot count; index i of every dataset maps to the same x.
    pub capacity: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            width: 700.0,
            height: 200.0,
            padding: Padding {
                top: 20.0,
                right: 20.0,
                bottom: 30.0,
                left: 50.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridLine {
    pub y: f64,
    pub label: String,
}

/// Filled region under a polyline: the polyline points plus the two bottom
/// corners, with a vertical gradient from `top_color` to `bottom_color`.
#[derive(Debug, Clone, Serialize)]
pub struct FillRegion {
    pub path: Vec<Point>,
    pub top_color: String,
    pub bottom_color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesGeometry {
    pub label: String,
    pub color: String,
    /// Empty when the dataset has fewer than two points.
    pub polyline: Vec<Point>,
    pub fill: Option<FillRegion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendEntry {
    pub x: f64,
    pub y: f64,
    pub swatch_width: f64,
    pub swatch_height: f64,
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartGeometry {
    pub max_val: f64,
    pub gridlines: Vec<GridLine>,
    pub series: Vec<SeriesGeometry>,
    pub legend: Vec<LegendEntry>,
}

/// Axis maximum: at least `fixed_max`, at least every non-NaN value, never
/// zero (an all-zero chart scales as if its max were 100), with 10% headroom
/// rounded up so the series peak never clips.
pub fn scale_max(datasets: &[Dataset], fixed_max: Option<f64>) -> f64 {
    let mut max_val = fixed_max.unwrap_or(0.0).max(0.0);
    for ds in datasets {
        for v in &ds.data {
            if !v.is_nan() && *v > max_val {
                max_val = *v;
            }
        }
    }
    if max_val == 0.0 {
        max_val = 100.0;
    }
    (max_val * 1.1).ceil()
}

/// Renders one chart to geometry. Datasets with fewer than two points get no
/// polyline or fill but still appear in the legend.
pub fn render(spec: &ChartSpec, layout: &ChartLayout) -> ChartGeometry {
    let chart_width = layout.width - layout.padding.left - layout.padding.right;
    let chart_height = layout.height - layout.padding.top - layout.padding.bottom;
    let max_val = scale_max(&spec.datasets, spec.fixed_max);

    let mut gridlines = Vec::with_capacity(GRID_DIVISIONS + 1);
    for i in 0..=GRID_DIVISIONS {
        let y = layout.padding.top + (chart_height / GRID_DIVISIONS as f64) * i as f64;
        let value = max_val - (max_val / GRID_DIVISIONS as f64) * i as f64;
        gridlines.push(GridLine {
            y,
            label: format!("{:.0}{}", value, spec.unit),
        });
    }

    let step = chart_width / (spec.capacity.max(2) - 1) as f64;
    let bottom = layout.height - layout.padding.bottom;

    let series = spec
        .datasets
        .iter()
        .map(|ds| {
            if ds.data.len() < 2 {
                return SeriesGeometry {
                    label: ds.label.clone(),
                    color: ds.color.clone(),
                    polyline: Vec::new(),
                    fill: None,
                };
            }
            let polyline: Vec<Point> = ds
                .data
                .iter()
                .enumerate()
                .map(|(i, v)| Point {
                    x: layout.padding.left + i as f64 * step,
                    y: layout.padding.top + chart_height * (1.0 - v / max_val),
                })
                .collect();

            let mut path = polyline.clone();
            path.push(Point {
                x: layout.padding.left + (ds.data.len() - 1) as f64 * step,
                y: bottom,
            });
            path.push(Point {
                x: layout.padding.left,
                y: bottom,
            });

            SeriesGeometry {
                label: ds.label.clone(),
                color: ds.color.clone(),
                polyline,
                fill: Some(FillRegion {
                    path,
                    top_color: format!("{}40", ds.color),
                    bottom_color: format!("{}00", ds.color),
                }),
            }
        })
        .collect();

    let mut legend = Vec::new();
    if spec.datasets.len() > 1 {
        let mut x = layout.padding.left;
        for ds in &spec.datasets {
            legend.push(LegendEntry {
                x,
                y: layout.height - 15.0,
                swatch_width: LEGEND_SWATCH_WIDTH,
                swatch_height: LEGEND_SWATCH_HEIGHT,
                label: ds.label.clone(),
                color: ds.color.clone(),
            });
            x += ds.label.len() as f64 * LEGEND_CHAR_WIDTH + LEGEND_GAP;
        }
    }

    ChartGeometry {
        max_val,
        gridlines,
        series,
        legend,
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Sum of all channels (e.g. CPU user+system+... -> total busy percent).
pub fn sum_channels(values: &[f64]) -> f64 {
    values.iter().filter(|v| !v.is_nan()).sum()
}

fn channel(values: &[f64], idx: usize) -> f64 {
    values.get(idx).copied().unwrap_or(0.0)
}

/// Memory percent-used projection for a window whose labels include a
/// `used` channel: used / sum(channels) * 100, rounded to one decimal.
pub fn memory_percent(labels: &[String]) -> impl Fn(&[f64]) -> f64 + use<> {
    let used_idx = labels
        .iter()
        .position(|l| l.eq_ignore_ascii_case("used"))
        .unwrap_or(0);
    move |values: &[f64]| {
        let total = sum_channels(values);
        if total > 0.0 {
            round1(channel(values, used_idx) / total * 100.0)
        } else {
            0.0
        }
    }
}

/// Builds the dashboard ChartSpec for a named series from its snapshot.
/// Returns None for series without a chart (e.g. the processes table).
pub fn spec_for(name: &str, labels: &[String], samples: &[Sample], capacity: usize) -> Option<ChartSpec> {
    let derive = |f: &dyn Fn(&[f64]) -> f64| samples.iter().map(|s| f(&s.values)).collect::<Vec<f64>>();
    match name {
        "cpu" => Some(ChartSpec {
            datasets: vec![Dataset::new("CPU %", COLOR_GREEN, derive(&sum_channels))],
            unit: "%".into(),
            fixed_max: Some(100.0),
            capacity,
        }),
        "memory" => {
            let pct = memory_percent(labels);
            Some(ChartSpec {
                datasets: vec![Dataset::new("Memory %", COLOR_BLUE, derive(&pct))],
                unit: "%".into(),
                fixed_max: Some(100.0),
                capacity,
            })
        }
        "network" => Some(ChartSpec {
            datasets: vec![
                Dataset::new("In", COLOR_GREEN, derive(&|v| channel(v, 0))),
                Dataset::new("Out", COLOR_AMBER, derive(&|v| channel(v, 1))),
            ],
            unit: " KB/s".into(),
            fixed_max: None,
            capacity,
        }),
        "disk" => Some(ChartSpec {
            datasets: vec![
                Dataset::new("Read", COLOR_PURPLE, derive(&|v| channel(v, 0))),
                Dataset::new("Write", COLOR_RED, derive(&|v| channel(v, 1))),
            ],
            unit: " KB/s".into(),
            fixed_max: None,
            capacity,
        }),
        "load" => Some(ChartSpec {
            datasets: vec![
                Dataset::new("1m", COLOR_GREEN, derive(&|v| channel(v, 0))),
                Dataset::new("5m", COLOR_BLUE, derive(&|v| channel(v, 1))),
                Dataset::new("15m", COLOR_AMBER, derive(&|v| channel(v, 2))),
            ],
            unit: String::new(),
            fixed_max: None,
            capacity,
        }),
        _ => None,
    }
}
