// Process-wide series registry. One instance per running process, passed by
// Arc handle; the scheduler is the only writer, the render/read side only
// takes snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::{Sample, SeriesWindow};

/// Maps series name -> rolling window. The outer map is only locked for key
/// lookup and startup registration; each window has its own lock so writes
/// to one series never contend with reads of another. Append plus eviction
/// happens under a single write guard, so readers never observe a partially
/// applied batch.
#[derive(Default)]
pub struct AggregationStore {
    series: std::sync::RwLock<HashMap<String, Arc<RwLock<SeriesWindow>>>>,
}

impl AggregationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a series with the given window capacity. Idempotent: an
    /// existing window is left untouched.
    pub fn register(&self, name: &str, capacity: usize) {
        let mut map = self.series.write().unwrap_or_else(|e| e.into_inner());
        map.entry(name.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(SeriesWindow::new(capacity))));
    }

    fn window(&self, name: &str) -> Option<Arc<RwLock<SeriesWindow>>> {
        let map = self.series.read().unwrap_or_else(|e| e.into_inner());
        map.get(name).cloned()
    }

    pub fn series_names(&self) -> Vec<String> {
        let map = self.series.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        names
    }

    /// Appends a batch of samples (chronological order preserved) and
    /// updates the channel schema. Returns false for an unknown series.
    pub async fn append(&self, name: &str, labels: Vec<String>, samples: Vec<Sample>) -> bool {
        let Some(window) = self.window(name) else {
            return false;
        };
        let mut w = window.write().await;
        w.set_labels(labels);
        for sample in samples {
            w.push(sample);
        }
        true
    }

    /// Owned copy of a window's contents, oldest first.
    pub async fn snapshot(&self, name: &str) -> Option<Vec<Sample>> {
        let window = self.window(name)?;
        let w = window.read().await;
        Some(w.snapshot())
    }

    pub async fn labels(&self, name: &str) -> Option<Vec<String>> {
        let window = self.window(name)?;
        let w = window.read().await;
        Some(w.labels().to_vec())
    }

    pub async fn capacity(&self, name: &str) -> Option<usize> {
        let window = self.window(name)?;
        let w = window.read().await;
        Some(w.capacity())
    }

    /// Projects a window to a scalar sequence via `f`; `None` for an unknown
    /// series, an empty vec for an empty window.
    pub async fn derive<F>(&self, name: &str, f: F) -> Option<Vec<f64>>
    where
        F: Fn(&[f64]) -> f64,
    {
        let window = self.window(name)?;
        let w = window.read().await;
        Some(w.derive(f))
    }
}
