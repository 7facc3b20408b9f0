//! Dataset Check
//!
//! Loads an ISIC training directory (`<stem>.jpg` images with
//! `<stem>_Segmentation.png` labels) and prints shapes and value ranges, to
//! catch missing labels or unexpected encodings before training.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin dataset_check -- dataset/ISBI2016_ISIC_Part3B_Training_Data
//!
//! # Resize to 512x512 and look at two batches of four
//! cargo run --bin dataset_check -- dataset/ --target-size 512 --batch-size 4
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use burn::{
    data::dataloader::{DataLoaderBuilder, Dataset},
    prelude::*,
    tensor::cast::ToElement,
};
use clap::Parser;
use isic_seg::{DatasetConfig, IsicBatcher, IsicDataset};
use isic_seg_tools::{create_device, get_backend_name, init_logging, SelectedBackend};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory with ISIC images and labels
    #[arg(default_value = "dataset")]
    data_dir: PathBuf,

    /// Number of samples to inspect
    #[arg(long, default_value = "10")]
    num_samples: usize,

    /// Batch size for the loader test
    #[arg(long, default_value = "2")]
    batch_size: usize,

    /// Resize samples to a square of this size
    #[arg(long)]
    target_size: Option<u32>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let device = create_device();
    println!("Using backend: {}", get_backend_name());

    let config = DatasetConfig::new()
        .with_data_dir(args.data_dir)
        .with_target_size(args.target_size);
    let dataset = IsicDataset::<SelectedBackend>::new(&config, &device)
        .with_context(|| format!("Failed to index {}", config.data_dir.display()))?;
    println!("Number of samples: {}", dataset.len());

    println!("\n=== Samples ===");
    for i in 0..args.num_samples.min(dataset.len()) {
        let (image_path, _) = &dataset.items()[i];
        let sample = dataset
            .get(i)
            .with_context(|| format!("Failed to load sample {}", image_path.display()))?;

        let (image_min, image_max, image_mean) = tensor_stats(sample.image.clone());
        let (label_min, label_max, label_mean) = tensor_stats(sample.label.clone());
        println!("{}:", image_path.display());
        println!("  Image shape: {:?}", sample.image.dims());
        println!("  Label shape: {:?}", sample.label.dims());
        println!("  Image stats: min={image_min:.1}, max={image_max:.1}, mean={image_mean:.1}");
        println!("  Label stats: min={label_min:.3}, max={label_max:.3}, mean={label_mean:.3}");

        if label_max > 1.0 {
            println!("  WARNING: Label values outside expected range [0, 1]");
        }
    }

    if config.target_size.is_none() {
        println!("\nSkipping batch test: samples are only stackable with --target-size");
        return Ok(());
    }

    println!("\n=== Batches ===");
    let loader = DataLoaderBuilder::new(IsicBatcher::<SelectedBackend>::new())
        .batch_size(args.batch_size)
        .shuffle(42)
        .build(dataset);
    for (index, batch) in loader.iter().take(2).enumerate() {
        println!(
            "Batch {index}: images {:?}, labels {:?}",
            batch.images.dims(),
            batch.labels.dims()
        );
    }

    Ok(())
}

fn tensor_stats<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> (f32, f32, f32) {
    let min = tensor.clone().min().into_scalar().to_f32();
    let max = tensor.clone().max().into_scalar().to_f32();
    let mean = tensor.mean().into_scalar().to_f32();
    (min, max, mean)
}
