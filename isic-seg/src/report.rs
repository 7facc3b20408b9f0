//! Evaluation results and their text rendering.

use std::fmt;

use serde::Serialize;

use crate::{
    config::DiceMode,
    metrics::{ConfusionCounts, MetricSet},
};

/// Result of comparing one prediction with its ground truth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairEvaluation {
    pub stem: String,
    pub counts: ConfusionCounts,
    pub metrics: MetricSet,
}

impl fmt::Display for PairEvaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: jaccard={:.5} dice={:.5} accuracy={:.5} sensitivity={:.5} specificity={:.5}",
            self.stem,
            self.metrics.jaccard,
            self.metrics.dice,
            self.metrics.pixel_accuracy,
            self.metrics.sensitivity,
            self.metrics.specificity,
        )
    }
}

/// Dataset-level summary of an evaluation run.
///
/// `Display` renders the five mean scores, one per line.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    /// Arithmetic mean of every per-pair metric.
    pub mean: MetricSet,
    /// Which Dice variant `mean.dice` holds.
    pub dice_mode: DiceMode,
    /// Number of pairs that contributed to `mean`.
    pub evaluated: usize,
    /// Pixel counts summed over all evaluated pairs.
    pub totals: ConfusionCounts,
    /// Stems skipped because they could not be decoded, sorted.
    pub skipped: Vec<String>,
    /// Per-pair results sorted by stem, when requested.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pairs: Vec<PairEvaluation>,
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Jaccard Score: {}", self.mean.jaccard)?;
        writeln!(f, "Dice Score: {}", self.mean.dice)?;
        writeln!(f, "Pixel accuracy: {}", self.mean.pixel_accuracy)?;
        writeln!(f, "Sensitivity: {}", self.mean.sensitivity)?;
        write!(f, "Specificity: {}", self.mean.specificity)
    }
}
