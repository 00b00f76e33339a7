use crate::sample::{Channel, Sample};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

/// Number of samples kept for the live chart unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 5;

/// Rolling window of the most recent chart samples.
///
/// Samples are stored row-wise, so the timestamp and every channel column
/// always have the same length. The oldest row is evicted once the window
/// grows past `capacity`.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    rows:     VecDeque<Sample>,
    capacity: usize,
}

impl SeriesBuffer {
    /// Create an empty window. A zero capacity is clamped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            rows: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Push a new sample, evicting the oldest if the window overflows.
    pub fn append(&mut self, sample: Sample) {
        self.rows.push_back(sample);
        if self.rows.len() > self.capacity {
            self.rows.pop_front();
        }
    }

    /// Parallel, equal-length views of the window, oldest first.
    ///
    /// Missing channel values are reported as `0.0`; use [`SeriesBuffer::rows`]
    /// to tell a missing reading apart from a real zero.
    pub fn snapshot(&self) -> SeriesSnapshot {
        let labels = self.rows.iter().map(|s| s.timestamp.clone()).collect();
        let series = Channel::CHARTED
            .into_iter()
            .map(|channel| {
                let data = self
                    .rows
                    .iter()
                    .map(|s| s.get(channel).unwrap_or(0.0))
                    .collect();
                (channel, data)
            })
            .collect();
        SeriesSnapshot { labels, series }
    }

    /// Change the window size, dropping the oldest rows when shrinking.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.rows.len() > self.capacity {
            self.rows.pop_front();
        }
    }

    pub fn rows(&self) -> std::collections::vec_deque::Iter<'_, Sample> {
        self.rows.iter()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.rows.back()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SeriesBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Read-only copy of a [`SeriesBuffer`] for renderers.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SeriesSnapshot {
    /// Sample timestamps, oldest first.
    pub labels: Vec<String>,
    /// One column per charted channel; every column has `labels.len()` entries.
    pub series: BTreeMap<Channel, Vec<f64>>,
}

impl SeriesSnapshot {
    /// Column for `channel`; empty for non-charted channels.
    pub fn channel(&self, channel: Channel) -> &[f64] {
        self.series.get(&channel).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
