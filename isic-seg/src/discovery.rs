//! Discovery of prediction/ground-truth mask pairs on disk.
//!
//! Both kinds of mask live in the same directory and share a file name stem,
//! e.g. `ISIC_0000000_Mine.png` and `ISIC_0000000_Segmentation.png`. Pairs
//! are matched by stem rather than by position in two sorted listings, so a
//! missing file is reported instead of silently shifting every later pair.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::error::{IsicError, IsicResult, PairSide};

/// A predicted mask and the ground truth it is compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskPair {
    /// File name stem shared by both masks.
    pub stem: String,
    /// Path of the predicted mask.
    pub prediction: PathBuf,
    /// Path of the ground-truth mask.
    pub ground_truth: PathBuf,
}

/// Lists the regular files directly inside `dir`, keyed by the stem left
/// after stripping `suffix`.
pub(crate) fn files_with_suffix(dir: &Path, suffix: &str) -> IsicResult<BTreeMap<String, PathBuf>> {
    if !dir.is_dir() {
        return Err(IsicError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = BTreeMap::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| IsicError::DirectoryReadFailed {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            tracing::debug!(path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };
        if let Some(stem) = name.strip_suffix(suffix) {
            files.insert(stem.to_owned(), entry.into_path());
        }
    }
    Ok(files)
}

/// Finds every `<stem><prediction_suffix>` / `<stem><ground_truth_suffix>`
/// pair in `dir`, sorted by stem.
///
/// # Errors
///
/// * [`IsicError::DirectoryNotFound`] if `dir` is not a directory.
/// * [`IsicError::NoMatchingFiles`] if neither suffix matches any file.
/// * [`IsicError::MismatchedPair`] for the first stem (in sorted order) that
///   has a file on one side only. All unmatched stems are logged.
pub fn discover_mask_pairs(
    dir: &Path,
    prediction_suffix: &str,
    ground_truth_suffix: &str,
) -> IsicResult<Vec<MaskPair>> {
    let predictions = files_with_suffix(dir, prediction_suffix)?;
    let mut ground_truths = files_with_suffix(dir, ground_truth_suffix)?;

    if predictions.is_empty() && ground_truths.is_empty() {
        return Err(IsicError::NoMatchingFiles {
            path: dir.to_path_buf(),
            suffixes: vec![prediction_suffix.to_owned(), ground_truth_suffix.to_owned()],
        });
    }

    let mut mismatches = Vec::new();
    for stem in predictions.keys() {
        if !ground_truths.contains_key(stem) {
            mismatches.push((stem.clone(), PairSide::GroundTruth, ground_truth_suffix));
        }
    }
    for stem in ground_truths.keys() {
        if !predictions.contains_key(stem) {
            mismatches.push((stem.clone(), PairSide::Prediction, prediction_suffix));
        }
    }

    if !mismatches.is_empty() {
        mismatches.sort_by(|a, b| a.0.cmp(&b.0));
        for (stem, missing, suffix) in &mismatches {
            tracing::warn!(%stem, %missing, "unmatched mask, expected {stem}{suffix}");
        }
        let (stem, missing, suffix) = mismatches.swap_remove(0);
        return Err(IsicError::MismatchedPair {
            expected: dir.join(format!("{stem}{suffix}")),
            stem,
            missing,
        });
    }

    let pairs: Vec<MaskPair> = predictions
        .into_iter()
        .filter_map(|(stem, prediction)| {
            let ground_truth = ground_truths.remove(&stem)?;
            Some(MaskPair {
                stem,
                prediction,
                ground_truth,
            })
        })
        .collect();

    tracing::info!(count = pairs.len(), dir = %dir.display(), "discovered mask pairs");
    Ok(pairs)
}
