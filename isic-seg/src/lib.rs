//! # ISIC segmentation evaluation
//!
//! Pixel-level evaluation of skin-lesion segmentation masks from the ISIC
//! challenge, plus a Burn dataset for the ISIC training images.
//!
//! Predicted masks (`<stem>_Mine.png`) and ground-truth masks
//! (`<stem>_Segmentation.png`) are paired by stem, compared with tensor
//! reductions, and summarized by the mean Jaccard index, Dice score, pixel
//! accuracy, sensitivity and specificity.
//!
//! ```rust,ignore
//! use burn::backend::ndarray::{NdArray, NdArrayDevice};
//! use isic_seg::{EvaluationConfig, Evaluator};
//!
//! let config = EvaluationConfig::new().with_input_dir("out".into());
//! let evaluator = Evaluator::<NdArray>::new(config, NdArrayDevice::Cpu)?;
//! println!("{}", evaluator.run()?);
//! ```

pub mod config;
pub mod dataset;
pub mod discovery;
pub mod error;
pub mod evaluate;
pub mod mask;
pub mod metrics;
pub mod report;

#[cfg(test)]
mod tests;

pub use config::{DatasetConfig, DecodePolicy, DiceMode, EvaluationConfig};
pub use dataset::{IsicBatch, IsicBatcher, IsicDataset, IsicItem};
pub use discovery::{discover_mask_pairs, MaskPair};
pub use error::{ErrorKind, IsicError, IsicResult, PairSide};
pub use evaluate::Evaluator;
pub use mask::BinaryMask;
pub use metrics::{ConfusionCounts, MetricSet, MetricsAggregator};
pub use report::{EvaluationReport, PairEvaluation};
