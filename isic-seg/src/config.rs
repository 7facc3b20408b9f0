//! Configuration for mask evaluation and dataset loading.
//!
//! Both structs use Burn's `Config` derive, so they can be built with the
//! generated `with_*` setters or loaded from JSON with `Config::load`.

use std::path::PathBuf;

use burn::prelude::*;

use crate::error::{IsicError, IsicResult};

/// Which quantity is reported as the "Dice Score".
#[derive(Config, Debug, PartialEq, Eq)]
pub enum DiceMode {
    /// Fraction of pixels where prediction equals ground truth, `(TP + TN) / N`.
    ///
    /// This is what earlier results for this dataset were reported with. For
    /// binary masks it is numerically identical to pixel accuracy.
    PixelAgreement,
    /// Conventional Dice coefficient, `2·TP / (2·TP + FP + FN)`.
    Standard,
}

/// What to do when a mask pair cannot be decoded.
#[derive(Config, Debug, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Stop the run at the first undecodable pair.
    Abort,
    /// Log a warning, record the stem in the report, and carry on.
    SkipAndWarn,
}

/// Configuration for a metrics evaluation run.
#[derive(Config, Debug)]
pub struct EvaluationConfig {
    /// Directory holding both predicted and ground-truth masks.
    #[config(default = "PathBuf::from(\"out\")")]
    pub input_dir: PathBuf,
    /// File name suffix identifying predicted masks.
    #[config(default = "String::from(\"_Mine.png\")")]
    pub prediction_suffix: String,
    /// File name suffix identifying ground-truth masks.
    #[config(default = "String::from(\"_Segmentation.png\")")]
    pub ground_truth_suffix: String,
    /// A normalized pixel value strictly above this is foreground.
    #[config(default = 0.5)]
    pub threshold: f32,
    /// Dice variant written to the report.
    #[config(default = "DiceMode::PixelAgreement")]
    pub dice_mode: DiceMode,
    /// Behavior on undecodable pairs.
    #[config(default = "DecodePolicy::Abort")]
    pub decode_policy: DecodePolicy,
    /// Number of worker threads. `1` evaluates on the calling thread.
    #[config(default = 1)]
    pub num_workers: usize,
    /// Keep per-pair results in the report.
    #[config(default = false)]
    pub keep_pair_results: bool,
}

impl EvaluationConfig {
    /// Checks the configuration for inconsistent values.
    pub fn validate(&self) -> IsicResult<()> {
        if !(0.0..1.0).contains(&self.threshold) {
            return Err(IsicError::InvalidConfiguration {
                reason: format!("Threshold must be in [0, 1), got {}", self.threshold),
            });
        }
        validate_suffix("prediction_suffix", &self.prediction_suffix)?;
        validate_suffix("ground_truth_suffix", &self.ground_truth_suffix)?;
        if self.prediction_suffix.ends_with(&self.ground_truth_suffix)
            || self.ground_truth_suffix.ends_with(&self.prediction_suffix)
        {
            return Err(IsicError::InvalidConfiguration {
                reason: format!(
                    "Prediction suffix '{}' and ground truth suffix '{}' overlap",
                    self.prediction_suffix, self.ground_truth_suffix
                ),
            });
        }
        if self.num_workers == 0 {
            return Err(IsicError::InvalidConfiguration {
                reason: "Number of workers must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration for the ISIC training image loader.
#[derive(Config, Debug)]
pub struct DatasetConfig {
    /// Directory holding `<stem>.jpg` images and their labels.
    #[config(default = "PathBuf::from(\"dataset\")")]
    pub data_dir: PathBuf,
    /// Extension of input images, including the dot.
    #[config(default = "String::from(\".jpg\")")]
    pub image_extension: String,
    /// Suffix replacing the extension to form the label file name.
    #[config(default = "String::from(\"_Segmentation.png\")")]
    pub label_suffix: String,
    /// Resize images and labels to a square of this size. `None` keeps
    /// the stored resolution.
    #[config(default = "None")]
    pub target_size: Option<u32>,
}

impl DatasetConfig {
    /// Checks the configuration for inconsistent values.
    pub fn validate(&self) -> IsicResult<()> {
        validate_suffix("image_extension", &self.image_extension)?;
        validate_suffix("label_suffix", &self.label_suffix)?;
        if self.image_extension == self.label_suffix {
            return Err(IsicError::InvalidConfiguration {
                reason: "Image extension and label suffix must differ".to_string(),
            });
        }
        if self.target_size == Some(0) {
            return Err(IsicError::InvalidConfiguration {
                reason: "Target size must be positive".to_string(),
            });
        }
        Ok(())
    }
}

fn validate_suffix(name: &str, suffix: &str) -> IsicResult<()> {
    if suffix.is_empty() {
        return Err(IsicError::InvalidConfiguration {
            reason: format!("{name} must not be empty"),
        });
    }
    Ok(())
}
