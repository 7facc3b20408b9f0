use std::fs;

use approx::assert_abs_diff_eq;
use burn::backend::ndarray::{NdArray, NdArrayDevice};
use image::GrayImage;
use tempfile::TempDir;

use crate::{
    DecodePolicy, DiceMode, ErrorKind, EvaluationConfig, Evaluator, IsicError, MetricSet,
};

type TestBackend = NdArray;

fn write_mask(dir: &TempDir, name: &str, pixels: &[u8]) {
    GrayImage::from_raw(4, 4, pixels.to_vec())
        .unwrap()
        .save(dir.path().join(name))
        .unwrap();
}

fn checkerboard() -> Vec<u8> {
    (0..16u8).map(|i| ((i / 4 + i % 4) % 2) * 255).collect()
}

/// Writes three pairs: checkerboard vs all-ones, empty vs empty, and a
/// perfect prediction stored as 0/1 against a 0/255 ground truth.
fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_mask(&dir, "ISIC_0000000_Segmentation.png", &checkerboard());
    write_mask(&dir, "ISIC_0000000_Mine.png", &[255; 16]);
    write_mask(&dir, "ISIC_0000001_Segmentation.png", &[0; 16]);
    write_mask(&dir, "ISIC_0000001_Mine.png", &[0; 16]);
    let board = checkerboard();
    let ones: Vec<u8> = board.iter().map(|v| v / 255).collect();
    write_mask(&dir, "ISIC_0000002_Segmentation.png", &board);
    write_mask(&dir, "ISIC_0000002_Mine.png", &ones);
    dir
}

fn evaluator(dir: &TempDir) -> Evaluator<TestBackend> {
    let config = EvaluationConfig::new().with_input_dir(dir.path().to_path_buf());
    Evaluator::new(config, NdArrayDevice::Cpu).unwrap()
}

fn assert_metrics_close(a: &MetricSet, b: &MetricSet) {
    assert_abs_diff_eq!(a.jaccard, b.jaccard, epsilon = 1e-12);
    assert_abs_diff_eq!(a.dice, b.dice, epsilon = 1e-12);
    assert_abs_diff_eq!(a.pixel_accuracy, b.pixel_accuracy, epsilon = 1e-12);
    assert_abs_diff_eq!(a.sensitivity, b.sensitivity, epsilon = 1e-12);
    assert_abs_diff_eq!(a.specificity, b.specificity, epsilon = 1e-12);
}

#[test]
fn evaluates_a_directory() {
    let dir = fixture();

    let report = evaluator(&dir).run().unwrap();

    assert_eq!(report.evaluated, 3);
    assert!(report.skipped.is_empty());
    assert!(report.pairs.is_empty());
    assert_eq!(report.totals.total(), 48);
    // Per pair: jaccard 0.5, 1, 1; accuracy 0.5, 1, 1;
    // sensitivity 1, 0, 1; specificity 0, 1, 1.
    assert_abs_diff_eq!(report.mean.jaccard, 2.5 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(report.mean.pixel_accuracy, 2.5 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(report.mean.dice, 2.5 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(report.mean.sensitivity, 2.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(report.mean.specificity, 2.0 / 3.0, epsilon = 1e-12);
}

#[test]
fn standard_dice_differs_from_pixel_agreement() {
    let dir = fixture();
    let config = EvaluationConfig::new()
        .with_input_dir(dir.path().to_path_buf())
        .with_dice_mode(DiceMode::Standard);

    let report = Evaluator::<TestBackend>::new(config, NdArrayDevice::Cpu)
        .unwrap()
        .run()
        .unwrap();

    // 2·8 / (2·8 + 8) for the first pair, then two perfect scores.
    assert_abs_diff_eq!(report.mean.dice, (2.0 / 3.0 + 2.0) / 3.0, epsilon = 1e-12);
    assert_eq!(report.dice_mode, DiceMode::Standard);
}

#[test]
fn keeps_pair_results_sorted_by_stem() {
    let dir = fixture();
    let config = EvaluationConfig::new()
        .with_input_dir(dir.path().to_path_buf())
        .with_keep_pair_results(true)
        .with_num_workers(3);

    let report = Evaluator::<TestBackend>::new(config, NdArrayDevice::Cpu)
        .unwrap()
        .run()
        .unwrap();

    let stems: Vec<&str> = report.pairs.iter().map(|p| p.stem.as_str()).collect();
    assert_eq!(stems, ["ISIC_0000000", "ISIC_0000001", "ISIC_0000002"]);
    assert_eq!(report.pairs[0].counts.false_positives, 8);
}

#[test]
fn parallel_matches_sequential() {
    let dir = fixture();
    for i in 3..9 {
        let pixels: Vec<u8> = (0..16u8).map(|p| if p < i { 255 } else { 0 }).collect();
        write_mask(&dir, &format!("extra_{i}_Mine.png"), &pixels);
        write_mask(&dir, &format!("extra_{i}_Segmentation.png"), &checkerboard());
    }

    let sequential = evaluator(&dir).run().unwrap();
    let config = EvaluationConfig::new()
        .with_input_dir(dir.path().to_path_buf())
        .with_num_workers(4);
    let parallel = Evaluator::<TestBackend>::new(config, NdArrayDevice::Cpu)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(parallel.evaluated, sequential.evaluated);
    assert_eq!(parallel.totals, sequential.totals);
    assert_metrics_close(&parallel.mean, &sequential.mean);
}

#[test]
fn shape_mismatch_aborts_and_names_the_pair() {
    let dir = fixture();
    GrayImage::new(2, 2)
        .save(dir.path().join("ISIC_0000003_Mine.png"))
        .unwrap();
    write_mask(&dir, "ISIC_0000003_Segmentation.png", &[0; 16]);

    let err = evaluator(&dir).run().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decode);
    match err {
        IsicError::Pair { stem, source } => {
            assert_eq!(stem, "ISIC_0000003");
            assert!(matches!(*source, IsicError::ShapeMismatch { .. }));
        }
        other => panic!("Expected Pair error, got {other:?}"),
    }
}

#[test]
fn undecodable_pairs_can_be_skipped() {
    let dir = fixture();
    fs::write(dir.path().join("ISIC_0000003_Mine.png"), b"not a png").unwrap();
    write_mask(&dir, "ISIC_0000003_Segmentation.png", &[0; 16]);

    let abort = evaluator(&dir).run().unwrap_err();
    assert_eq!(abort.kind(), ErrorKind::Decode);

    let config = EvaluationConfig::new()
        .with_input_dir(dir.path().to_path_buf())
        .with_decode_policy(DecodePolicy::SkipAndWarn);
    let report = Evaluator::<TestBackend>::new(config, NdArrayDevice::Cpu)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.evaluated, 3);
    assert_eq!(report.skipped, ["ISIC_0000003"]);
    assert_abs_diff_eq!(report.mean.jaccard, 2.5 / 3.0, epsilon = 1e-12);
}

#[test]
fn skipping_everything_is_an_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a_Mine.png"), b"").unwrap();
    fs::write(dir.path().join("a_Segmentation.png"), b"").unwrap();
    let config = EvaluationConfig::new()
        .with_input_dir(dir.path().to_path_buf())
        .with_decode_policy(DecodePolicy::SkipAndWarn);

    let err = Evaluator::<TestBackend>::new(config, NdArrayDevice::Cpu)
        .unwrap()
        .run()
        .unwrap_err();

    assert!(matches!(err, IsicError::NoPairsEvaluated { skipped: 1 }));
}

#[test]
fn mismatched_files_are_not_skipped() {
    let dir = fixture();
    write_mask(&dir, "ISIC_0000009_Mine.png", &[0; 16]);
    let config = EvaluationConfig::new()
        .with_input_dir(dir.path().to_path_buf())
        .with_decode_policy(DecodePolicy::SkipAndWarn);

    let err = Evaluator::<TestBackend>::new(config, NdArrayDevice::Cpu)
        .unwrap()
        .run()
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MismatchedPair);
}

#[test]
fn invalid_configuration_is_rejected_up_front() {
    let config = EvaluationConfig::new().with_num_workers(0);
    let result = Evaluator::<TestBackend>::new(config, NdArrayDevice::Cpu);
    assert!(matches!(
        result,
        Err(IsicError::InvalidConfiguration { .. })
    ));
}
