//! Error types for ISIC segmentation evaluation and dataset loading.

use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Which half of a prediction/ground-truth pair a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSide {
    /// The predicted mask (`<stem>_Mine.png` by default).
    Prediction,
    /// The ground-truth mask (`<stem>_Segmentation.png` by default).
    GroundTruth,
}

impl fmt::Display for PairSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prediction => f.write_str("prediction"),
            Self::GroundTruth => f.write_str("ground truth"),
        }
    }
}

/// Coarse classification of [`IsicError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input directory missing, unreadable, or without matching files.
    FileDiscovery,
    /// A stem exists on one side of the pairing only.
    MismatchedPair,
    /// An image could not be decoded or has an unexpected shape.
    Decode,
    /// Invalid configuration or nothing left to evaluate.
    Configuration,
}

/// The error type for `isic-seg` operations.
#[derive(Error, Debug)]
pub enum IsicError {
    /// The input directory does not exist or is not a directory.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// The missing directory.
        path: PathBuf,
    },

    /// Listing the input directory failed.
    #[error("Failed to read directory: {path}")]
    DirectoryReadFailed {
        /// The directory that failed to read.
        path: PathBuf,
        /// The underlying walk error.
        #[source]
        source: walkdir::Error,
    },

    /// No file in the directory matches any of the expected suffixes.
    #[error("No files matching {suffixes:?} found in: {path}")]
    NoMatchingFiles {
        /// The searched directory.
        path: PathBuf,
        /// The suffixes that were looked for.
        suffixes: Vec<String>,
    },

    /// A stem has a file on one side but not the other.
    #[error("No {missing} file for '{stem}' (expected {expected})")]
    MismatchedPair {
        /// The shared file name stem.
        stem: String,
        /// The side that has no file.
        missing: PairSide,
        /// The path that was expected to exist.
        expected: PathBuf,
    },

    /// Opening or decoding an image failed.
    #[error("Failed to open image: {path}")]
    ImageOpenFailed {
        /// The image that failed to open.
        path: PathBuf,
        /// The underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// The image decoded to zero pixels.
    #[error("Image has no pixels: {path}")]
    EmptyImage {
        /// The empty image.
        path: PathBuf,
    },

    /// Prediction and ground truth do not have the same dimensions.
    #[error("Mask shape mismatch: prediction is {prediction_dims:?}, ground truth is {ground_truth_dims:?}")]
    ShapeMismatch {
        /// `[height, width]` of the prediction.
        prediction_dims: [usize; 2],
        /// `[height, width]` of the ground truth.
        ground_truth_dims: [usize; 2],
    },

    /// Evaluating one mask pair failed.
    #[error("Failed to evaluate mask pair '{stem}'")]
    Pair {
        /// The stem of the offending pair.
        stem: String,
        /// What went wrong.
        #[source]
        source: Box<IsicError>,
    },

    /// Every discovered pair was skipped.
    #[error("No mask pairs could be evaluated ({skipped} skipped)")]
    NoPairsEvaluated {
        /// Number of skipped pairs.
        skipped: usize,
    },

    /// The configuration is logically inconsistent.
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Why the configuration was rejected.
        reason: String,
    },
}

impl IsicError {
    /// Returns the coarse kind of this error. `Pair` reports the kind of
    /// the error it wraps.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DirectoryNotFound { .. }
            | Self::DirectoryReadFailed { .. }
            | Self::NoMatchingFiles { .. } => ErrorKind::FileDiscovery,
            Self::MismatchedPair { .. } => ErrorKind::MismatchedPair,
            Self::ImageOpenFailed { .. }
            | Self::EmptyImage { .. }
            | Self::ShapeMismatch { .. } => ErrorKind::Decode,
            Self::Pair { source, .. } => source.kind(),
            Self::NoPairsEvaluated { .. } | Self::InvalidConfiguration { .. } => {
                ErrorKind::Configuration
            }
        }
    }

    pub(crate) fn in_pair(self, stem: &str) -> Self {
        Self::Pair {
            stem: stem.to_owned(),
            source: Box::new(self),
        }
    }
}

/// A specialized `Result` type for `isic-seg` operations.
pub type IsicResult<T> = Result<T, IsicError>;
