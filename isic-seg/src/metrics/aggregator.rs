//! Streaming mean of per-image metrics.
//!
//! Only running sums and a count are kept, so the memory use does not grow
//! with the dataset. Partial aggregators from different workers combine
//! with [`MetricsAggregator::merge`].

use serde::{Deserialize, Serialize};

use crate::metrics::{confusion::ConfusionCounts, metric_set::MetricSet};

/// Running sums of [`MetricSet`] values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsAggregator {
    sums: MetricSet,
    counts: ConfusionCounts,
    count: usize,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the scores of one mask pair.
    pub fn update(&mut self, metrics: &MetricSet, counts: &ConfusionCounts) {
        self.sums = self.sums.zip_with(*metrics, |a, b| a + b);
        self.counts += *counts;
        self.count += 1;
    }

    /// Combines two partial aggregates. The operation is associative and
    /// commutative.
    pub fn merge(mut self, other: Self) -> Self {
        self.sums = self.sums.zip_with(other.sums, |a, b| a + b);
        self.counts += other.counts;
        self.count += other.count;
        self
    }

    /// Number of mask pairs added so far.
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Pixel counts summed over every pair.
    pub const fn total_counts(&self) -> ConfusionCounts {
        self.counts
    }

    /// Arithmetic mean of each metric, or `None` before the first update.
    pub fn mean(&self) -> Option<MetricSet> {
        if self.count == 0 {
            return None;
        }
        let count = self.count as f64;
        Some(self.sums.map(|sum| sum / count))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
