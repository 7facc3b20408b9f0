//! Mask Evaluation
//!
//! Compares predicted lesion masks with ISIC ground truth and prints the
//! mean Jaccard, Dice, pixel accuracy, sensitivity and specificity.
//!
//! ## Usage
//!
//! ```bash
//! # Evaluate ./out
//! cargo run --bin evaluate
//!
//! # Conventional Dice, four workers, JSON output
//! cargo run --bin evaluate -- predictions/ --dice standard --workers 4 --json
//!
//! # Skip masks that fail to decode instead of aborting
//! cargo run --bin evaluate -- predictions/ --skip-undecodable
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use burn::config::Config;
use clap::{Parser, ValueEnum};
use isic_seg::{DecodePolicy, DiceMode, EvaluationConfig, Evaluator};
use isic_seg_tools::{create_device, get_backend_name, init_logging, SelectedBackend};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DiceArg {
    /// (TP + TN) / N, the score earlier results were reported with
    PixelAgreement,
    /// 2·TP / (2·TP + FP + FN)
    Standard,
}

impl From<DiceArg> for DiceMode {
    fn from(arg: DiceArg) -> Self {
        match arg {
            DiceArg::PixelAgreement => Self::PixelAgreement,
            DiceArg::Standard => Self::Standard,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding predicted and ground-truth masks
    dir: Option<PathBuf>,

    /// Configuration file path (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Suffix of predicted mask files
    #[arg(long)]
    prediction_suffix: Option<String>,

    /// Suffix of ground-truth mask files
    #[arg(long)]
    ground_truth_suffix: Option<String>,

    /// Foreground threshold on intensities scaled to [0, 1]
    #[arg(long)]
    threshold: Option<f32>,

    /// Which Dice definition to report
    #[arg(long, value_enum)]
    dice: Option<DiceArg>,

    /// Warn about and skip pairs that fail to decode
    #[arg(long)]
    skip_undecodable: bool,

    /// Number of worker threads
    #[arg(short, long)]
    workers: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Also print the scores of every pair
    #[arg(long)]
    per_image: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = if let Some(config_path) = &args.config {
        EvaluationConfig::load(config_path)
            .map_err(|err| anyhow::anyhow!("{err}"))
            .with_context(|| format!("Failed to load config file: {}", config_path.display()))?
    } else {
        EvaluationConfig::new()
    };

    // Apply command line overrides
    if let Some(dir) = args.dir {
        config.input_dir = dir;
    }
    if let Some(suffix) = args.prediction_suffix {
        config.prediction_suffix = suffix;
    }
    if let Some(suffix) = args.ground_truth_suffix {
        config.ground_truth_suffix = suffix;
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(dice) = args.dice {
        config.dice_mode = dice.into();
    }
    if args.skip_undecodable {
        config.decode_policy = DecodePolicy::SkipAndWarn;
    }
    if let Some(workers) = args.workers {
        config.num_workers = workers;
    }
    config.keep_pair_results |= args.per_image;

    tracing::info!(backend = get_backend_name(), dir = %config.input_dir.display(), "evaluating masks");

    let evaluator = Evaluator::<SelectedBackend>::new(config, create_device())
        .context("Invalid evaluation settings")?;
    let report = evaluator.run().with_context(|| {
        format!(
            "Evaluation of {} failed",
            evaluator.config().input_dir.display()
        )
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.per_image {
        for pair in &report.pairs {
            println!("{pair}");
        }
    }
    println!("{report}");
    Ok(())
}
