//! ISIC training data as a Burn dataset.
//!
//! Each sample is a `<stem>.jpg` dermoscopy image next to its
//! `<stem>_Segmentation.png` lesion mask. Images are loaded as single-channel
//! grey levels in `0..=255`; labels are rescaled to `{0, 1}`.

use std::path::{Path, PathBuf};

use burn::data::{dataloader::batcher::Batcher, dataset::Dataset};
use burn::tensor::{backend::Backend, Tensor};
use image::{imageops::FilterType, DynamicImage};

use crate::{
    config::DatasetConfig,
    discovery::files_with_suffix,
    error::{IsicError, IsicResult, PairSide},
    mask::{luma_tensor, normalize_intensity},
};

/// One image/label sample.
#[derive(Debug, Clone)]
pub struct IsicItem<B: Backend> {
    /// Grey-level image with shape `[1, H, W]`.
    pub image: Tensor<B, 3>,
    /// Lesion mask with shape `[1, H, W]` and values in `{0, 1}`.
    pub label: Tensor<B, 3>,
}

/// A stack of samples with shapes `[N, 1, H, W]`.
#[derive(Debug, Clone)]
pub struct IsicBatch<B: Backend> {
    pub images: Tensor<B, 4>,
    pub labels: Tensor<B, 4>,
}

/// Stacks [`IsicItem`]s along a new batch dimension.
#[derive(Clone, Default)]
pub struct IsicBatcher<B: Backend> {
    _phantom: std::marker::PhantomData<B>,
}

impl<B: Backend> IsicBatcher<B> {
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<B: Backend> Batcher<B, IsicItem<B>, IsicBatch<B>> for IsicBatcher<B> {
    fn batch(&self, items: Vec<IsicItem<B>>, device: &B::Device) -> IsicBatch<B> {
        let (images, labels): (Vec<_>, Vec<_>) = items
            .into_iter()
            .map(|item| (item.image.to_device(device), item.label.to_device(device)))
            .unzip();

        IsicBatch {
            images: Tensor::stack(images, 0),
            labels: Tensor::stack(labels, 0),
        }
    }
}

/// Image/label pairs of one ISIC data directory.
pub struct IsicDataset<B: Backend> {
    items: Vec<(PathBuf, PathBuf)>,
    target_size: Option<u32>,
    device: B::Device,
}

impl<B: Backend> IsicDataset<B> {
    /// Indexes `config.data_dir`. Every image must have a label.
    pub fn new(config: &DatasetConfig, device: &B::Device) -> IsicResult<Self> {
        config.validate()?;
        let dir = &config.data_dir;

        let mut items = Vec::new();
        for (stem, image_path) in files_with_suffix(dir, &config.image_extension)? {
            if image_path
                .to_str()
                .is_some_and(|path| path.ends_with(&config.label_suffix))
            {
                continue;
            }
            let label_path = dir.join(format!("{stem}{}", config.label_suffix));
            if !label_path.is_file() {
                return Err(IsicError::MismatchedPair {
                    stem,
                    missing: PairSide::GroundTruth,
                    expected: label_path,
                });
            }
            items.push((image_path, label_path));
        }

        if items.is_empty() {
            return Err(IsicError::NoMatchingFiles {
                path: dir.clone(),
                suffixes: vec![config.image_extension.clone()],
            });
        }

        tracing::info!(count = items.len(), dir = %dir.display(), "indexed ISIC samples");
        Ok(Self {
            items,
            target_size: config.target_size,
            device: device.clone(),
        })
    }

    /// Image and label path of every sample, sorted by stem.
    pub fn items(&self) -> &[(PathBuf, PathBuf)] {
        &self.items
    }

    fn load(&self, path: &Path, filter: FilterType) -> IsicResult<Tensor<B, 3>> {
        let image = image::open(path).map_err(|source| IsicError::ImageOpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        if image.width() == 0 || image.height() == 0 {
            return Err(IsicError::EmptyImage {
                path: path.to_path_buf(),
            });
        }
        let image = self.resize(image, filter);
        Ok(luma_tensor::<B>(image, &self.device).unsqueeze::<3>())
    }

    fn resize(&self, image: DynamicImage, filter: FilterType) -> DynamicImage {
        match self.target_size {
            Some(size) => image.resize_exact(size, size, filter),
            None => image,
        }
    }

    fn load_item(&self, image_path: &Path, label_path: &Path) -> IsicResult<IsicItem<B>> {
        let image = self.load(image_path, FilterType::Triangle)?;
        let label = normalize_intensity(self.load(label_path, FilterType::Nearest)?);
        Ok(IsicItem { image, label })
    }
}

impl<B: Backend> Dataset<IsicItem<B>> for IsicDataset<B> {
    fn get(&self, index: usize) -> Option<IsicItem<B>> {
        let (image_path, label_path) = self.items.get(index)?;
        match self.load_item(image_path, label_path) {
            Ok(item) => Some(item),
            Err(err) => {
                tracing::warn!(index, "failed to load sample: {err}");
                None
            }
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
