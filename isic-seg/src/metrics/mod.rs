//! Pixel-level segmentation metrics.
//!
//! A prediction/ground-truth pair is reduced to [`ConfusionCounts`], turned
//! into a [`MetricSet`], and accumulated by a [`MetricsAggregator`].

pub mod aggregator;
pub mod confusion;
pub mod metric_set;

pub use aggregator::MetricsAggregator;
pub use confusion::ConfusionCounts;
pub use metric_set::MetricSet;
