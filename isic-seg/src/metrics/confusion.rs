//! Pixel-level confusion counts between a predicted and a ground-truth mask.

use std::ops::{Add, AddAssign};

use burn::tensor::{backend::Backend, ElementConversion, Int, Tensor};
use serde::{Deserialize, Serialize};

use crate::{
    error::{IsicError, IsicResult},
    mask::BinaryMask,
};

/// True/false positive/negative pixel counts of one or more mask pairs.
///
/// The four counts always sum to the number of compared pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub true_positives: u64,
    pub true_negatives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
}

/// `numerator / denominator`, or `default` when the denominator is zero.
fn ratio(numerator: u64, denominator: u64, default: f64) -> f64 {
    if denominator == 0 {
        default
    } else {
        numerator as f64 / denominator as f64
    }
}

fn scalar_sum<B: Backend>(values: Tensor<B, 2, Int>) -> u64 {
    values.sum().into_scalar().elem::<i64>() as u64
}

impl ConfusionCounts {
    pub const fn new(
        true_positives: u64,
        true_negatives: u64,
        false_positives: u64,
        false_negatives: u64,
    ) -> Self {
        Self {
            true_positives,
            true_negatives,
            false_positives,
            false_negatives,
        }
    }

    /// Counts agreement between two binary masks of the same shape.
    ///
    /// Runs as three tensor reductions: `TP = Σ p·g`, `FP = Σ p − TP`,
    /// `FN = Σ g − TP`. The remaining pixels are true negatives.
    pub fn from_masks<B: Backend>(
        prediction: &BinaryMask<B>,
        ground_truth: &BinaryMask<B>,
    ) -> IsicResult<Self> {
        let prediction_dims = prediction.dims();
        let ground_truth_dims = ground_truth.dims();
        if prediction_dims != ground_truth_dims {
            return Err(IsicError::ShapeMismatch {
                prediction_dims,
                ground_truth_dims,
            });
        }

        let pred = prediction.values().clone();
        let gt = ground_truth.values().clone();

        let true_positives = scalar_sum(pred.clone() * gt.clone());
        let predicted_positives = scalar_sum(pred);
        let actual_positives = scalar_sum(gt);

        let false_positives = predicted_positives - true_positives;
        let false_negatives = actual_positives - true_positives;
        let total = prediction.num_pixels() as u64;
        let true_negatives = total - true_positives - false_positives - false_negatives;

        Ok(Self::new(
            true_positives,
            true_negatives,
            false_positives,
            false_negatives,
        ))
    }

    /// Total number of compared pixels.
    pub const fn total(&self) -> u64 {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// Pixels where prediction and ground truth agree.
    pub const fn agreeing(&self) -> u64 {
        self.true_positives + self.true_negatives
    }

    /// Intersection over union of the foreground pixels. An empty union
    /// means both masks are entirely background and scores 1.
    pub fn jaccard(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_positives + self.false_negatives,
            1.0,
        )
    }

    /// Fraction of agreeing pixels, `(TP + TN) / N`.
    ///
    /// This is the historical "Dice Score" of this project: it counts
    /// matching background pixels too, which makes it equal to
    /// [`pixel_accuracy`](Self::pixel_accuracy) for binary masks. See
    /// [`dice_standard`](Self::dice_standard) for the usual coefficient.
    pub fn dice_pixel_agreement(&self) -> f64 {
        ratio(self.agreeing(), self.total(), 1.0)
    }

    /// Conventional Dice coefficient, `2·TP / (2·TP + FP + FN)`. Two empty
    /// masks score 1.
    pub fn dice_standard(&self) -> f64 {
        ratio(
            2 * self.true_positives,
            2 * self.true_positives + self.false_positives + self.false_negatives,
            1.0,
        )
    }

    pub fn pixel_accuracy(&self) -> f64 {
        ratio(self.agreeing(), self.total(), 0.0)
    }

    /// True positive rate, `TP / (TP + FN)`; 0 when there are no positives.
    pub fn sensitivity(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_negatives,
            0.0,
        )
    }

    /// True negative rate, `TN / (TN + FP)`; 0 when there are no negatives.
    pub fn specificity(&self) -> f64 {
        ratio(
            self.true_negatives,
            self.true_negatives + self.false_positives,
            0.0,
        )
    }
}

impl Add for ConfusionCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(
            self.true_positives + other.true_positives,
            self.true_negatives + other.true_negatives,
            self.false_positives + other.false_positives,
            self.false_negatives + other.false_negatives,
        )
    }
}

impl AddAssign for ConfusionCounts {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use burn::backend::ndarray::{NdArray, NdArrayDevice};
    use burn::tensor::TensorData;

    use super::*;

    type TestBackend = NdArray;

    fn mask(values: Vec<i64>, dims: [usize; 2]) -> BinaryMask<TestBackend> {
        let device = NdArrayDevice::Cpu;
        BinaryMask::from_binary(Tensor::from_data(TensorData::new(values, dims), &device))
    }

    fn checkerboard() -> Vec<i64> {
        (0..16).map(|i| ((i / 4 + i % 4) % 2) as i64).collect()
    }

    #[test]
    fn all_background_masks() {
        let counts = ConfusionCounts::from_masks(&mask(vec![0; 16], [4, 4]), &mask(vec![0; 16], [4, 4]))
            .unwrap();

        assert_eq!(counts, ConfusionCounts::new(0, 16, 0, 0));
        assert_abs_diff_eq!(counts.jaccard(), 1.0);
        assert_abs_diff_eq!(counts.pixel_accuracy(), 1.0);
        assert_abs_diff_eq!(counts.sensitivity(), 0.0);
        assert_abs_diff_eq!(counts.specificity(), 1.0);
        assert_abs_diff_eq!(counts.dice_standard(), 1.0);
    }

    #[test]
    fn checkerboard_against_all_foreground() {
        let ground_truth = mask(checkerboard(), [4, 4]);
        let prediction = mask(vec![1; 16], [4, 4]);

        let counts = ConfusionCounts::from_masks(&prediction, &ground_truth).unwrap();

        assert_eq!(counts, ConfusionCounts::new(8, 0, 8, 0));
        assert_abs_diff_eq!(counts.sensitivity(), 1.0);
        assert_abs_diff_eq!(counts.specificity(), 0.0);
        assert_abs_diff_eq!(counts.pixel_accuracy(), 0.5);
        assert_abs_diff_eq!(counts.jaccard(), 0.5);
        assert_abs_diff_eq!(counts.dice_pixel_agreement(), 0.5);
        assert_abs_diff_eq!(counts.dice_standard(), 16.0 / 24.0, epsilon = 1e-12);
    }

    #[test]
    fn identical_masks() {
        let ground_truth = mask(checkerboard(), [4, 4]);
        let prediction = mask(checkerboard(), [4, 4]);

        let counts = ConfusionCounts::from_masks(&prediction, &ground_truth).unwrap();

        assert_abs_diff_eq!(counts.pixel_accuracy(), 1.0);
        assert_abs_diff_eq!(counts.dice_pixel_agreement(), 1.0);
        assert_abs_diff_eq!(counts.dice_standard(), 1.0);
        assert_abs_diff_eq!(counts.sensitivity(), 1.0);
        assert_abs_diff_eq!(counts.specificity(), 1.0);
    }

    #[test]
    fn identical_all_foreground_masks_have_no_negatives() {
        let counts =
            ConfusionCounts::from_masks(&mask(vec![1; 6], [2, 3]), &mask(vec![1; 6], [2, 3]))
                .unwrap();

        assert_abs_diff_eq!(counts.sensitivity(), 1.0);
        assert_abs_diff_eq!(counts.specificity(), 0.0);
        assert_abs_diff_eq!(counts.dice_pixel_agreement(), 1.0);
    }

    #[test]
    fn inverted_masks() {
        let ground_truth = mask(checkerboard(), [4, 4]);
        let inverted = checkerboard().into_iter().map(|v| 1 - v).collect();
        let prediction = mask(inverted, [4, 4]);

        let counts = ConfusionCounts::from_masks(&prediction, &ground_truth).unwrap();

        assert_eq!(counts.true_positives, 0);
        assert_eq!(counts.true_negatives, 0);
        assert_abs_diff_eq!(counts.pixel_accuracy(), 0.0);
        assert_abs_diff_eq!(counts.sensitivity(), 0.0);
        assert_abs_diff_eq!(counts.specificity(), 0.0);
        assert_abs_diff_eq!(counts.jaccard(), 0.0);
    }

    #[test]
    fn counts_sum_to_pixel_count() {
        let prediction = mask(vec![1, 0, 1, 1, 0, 0], [3, 2]);
        let ground_truth = mask(vec![1, 1, 0, 1, 0, 1], [3, 2]);

        let counts = ConfusionCounts::from_masks(&prediction, &ground_truth).unwrap();

        assert_eq!(counts, ConfusionCounts::new(2, 1, 1, 2));
        assert_eq!(counts.total(), 6);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let err = ConfusionCounts::from_masks(&mask(vec![0; 6], [2, 3]), &mask(vec![0; 6], [3, 2]))
            .unwrap_err();

        match err {
            IsicError::ShapeMismatch {
                prediction_dims,
                ground_truth_dims,
            } => {
                assert_eq!(prediction_dims, [2, 3]);
                assert_eq!(ground_truth_dims, [3, 2]);
            }
            other => panic!("Expected ShapeMismatch error, got {other:?}"),
        }
    }

    #[test]
    fn counts_combine_by_addition() {
        let mut counts = ConfusionCounts::new(1, 2, 3, 4);
        counts += ConfusionCounts::new(4, 3, 2, 1);

        assert_eq!(counts, ConfusionCounts::new(5, 5, 5, 5));
        assert_eq!(counts.total(), 20);
    }
}
