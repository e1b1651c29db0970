// Time-series primitives: Sample and the fixed-capacity rolling window

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// One timestamped observation. `values` is channel-aligned to the owning
/// window's labels (e.g. `[user, system, idle]` for a CPU chart).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: u64,
    pub values: Vec<f64>,
}

impl Sample {
    pub fn new(timestamp: u64, values: Vec<f64>) -> Self {
        Self { timestamp, values }
    }
}

/// Fixed-capacity rolling buffer for one series. Insertion order is
/// chronological: new samples append at the tail, the oldest sample is
/// evicted from the front once capacity is exceeded. Consumers that want
/// newest-first must reverse on their side.
#[derive(Debug, Clone)]
pub struct SeriesWindow {
    capacity: usize,
    buffer: VecDeque<Sample>,
    labels: Vec<String>,
}

impl SeriesWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be positive");
        Self {
            capacity,
            buffer: VecDeque::with_capacity(capacity),
            labels: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Channel labels, excluding the time column.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Replaces the channel schema. Called when an upstream fetch reports
    /// labels, so the window always carries the schema of its newest data.
    pub fn set_labels(&mut self, labels: Vec<String>) {
        if !labels.is_empty() {
            self.labels = labels;
        }
    }

    /// Appends a sample, evicting from the front while over capacity.
    pub fn push(&mut self, sample: Sample) {
        self.buffer.push_back(sample);
        while self.buffer.len() > self.capacity {
            self.buffer.pop_front();
        }
    }

    /// Owned copy of the current contents, oldest first. Never hands out a
    /// live reference; callers must not observe mutation mid-iteration.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.buffer.iter().cloned().collect()
    }

    /// Projects each sample's value vector to a scalar. Output length always
    /// equals `len()`; an empty window yields an empty vec.
    pub fn derive<F>(&self, f: F) -> Vec<f64>
    where
        F: Fn(&[f64]) -> f64,
    {
        self.buffer.iter().map(|s| f(&s.values)).collect()
    }
}
