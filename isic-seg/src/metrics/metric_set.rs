//! The five per-image scores reported by the evaluator.

use serde::{Deserialize, Serialize};

use crate::{config::DiceMode, metrics::confusion::ConfusionCounts};

/// Jaccard, Dice, pixel accuracy, sensitivity and specificity of one mask
/// pair, or their mean over many pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    pub jaccard: f64,
    pub dice: f64,
    pub pixel_accuracy: f64,
    pub sensitivity: f64,
    pub specificity: f64,
}

impl MetricSet {
    /// Derives the scores of one mask pair, using `dice_mode` to pick the
    /// Dice variant.
    pub fn from_counts(counts: &ConfusionCounts, dice_mode: &DiceMode) -> Self {
        let dice = match dice_mode {
            DiceMode::PixelAgreement => counts.dice_pixel_agreement(),
            DiceMode::Standard => counts.dice_standard(),
        };
        Self {
            jaccard: counts.jaccard(),
            dice,
            pixel_accuracy: counts.pixel_accuracy(),
            sensitivity: counts.sensitivity(),
            specificity: counts.specificity(),
        }
    }

    pub(crate) fn zip_with(self, other: Self, f: impl Fn(f64, f64) -> f64) -> Self {
        Self {
            jaccard: f(self.jaccard, other.jaccard),
            dice: f(self.dice, other.dice),
            pixel_accuracy: f(self.pixel_accuracy, other.pixel_accuracy),
            sensitivity: f(self.sensitivity, other.sensitivity),
            specificity: f(self.specificity, other.specificity),
        }
    }

    pub(crate) fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            jaccard: f(self.jaccard),
            dice: f(self.dice),
            pixel_accuracy: f(self.pixel_accuracy),
            sensitivity: f(self.sensitivity),
            specificity: f(self.specificity),
        }
    }
}
