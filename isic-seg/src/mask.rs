//! Binary segmentation masks as Burn tensors.
//!
//! Masks are stored either as `{0, 1}` or as `{0, 255}` grey levels. Raw
//! values are rescaled to `[0, 1]` when the largest value exceeds 1, and a
//! pixel is foreground when its rescaled value is above the threshold.

use std::path::Path;

use burn::tensor::{backend::Backend, ElementConversion, Int, Tensor, TensorData};
use image::DynamicImage;

use crate::error::{IsicError, IsicResult};

/// Rescales 8-bit grey levels to `[0, 1]` unless they already are.
pub fn normalize_intensity<B: Backend, const D: usize>(values: Tensor<B, D>) -> Tensor<B, D> {
    let max = values.clone().max().into_scalar().elem::<f32>();
    if max > 1.0 {
        values.div_scalar(255.0)
    } else {
        values
    }
}

/// Converts an image to a `[height, width]` tensor of raw grey levels.
///
/// Colour images are reduced to luma first.
pub fn luma_tensor<B: Backend>(image: DynamicImage, device: &B::Device) -> Tensor<B, 2> {
    let luma = image.into_luma8();
    let (width, height) = luma.dimensions();
    let data = TensorData::new(luma.into_raw(), [height as usize, width as usize])
        .convert::<B::FloatElem>();
    Tensor::from_data(data, device)
}

/// A 2-D mask with values in `{0, 1}`.
#[derive(Debug, Clone)]
pub struct BinaryMask<B: Backend> {
    values: Tensor<B, 2, Int>,
}

impl<B: Backend> BinaryMask<B> {
    /// Decodes the image at `path` and binarizes it.
    pub fn open<P: AsRef<Path>>(path: P, threshold: f32, device: &B::Device) -> IsicResult<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| IsicError::ImageOpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        if image.width() == 0 || image.height() == 0 {
            return Err(IsicError::EmptyImage {
                path: path.to_path_buf(),
            });
        }
        Ok(Self::from_image(image, threshold, device))
    }

    /// Binarizes an already decoded, non-empty image.
    pub fn from_image(image: DynamicImage, threshold: f32, device: &B::Device) -> Self {
        Self::from_intensities(luma_tensor::<B>(image, device), threshold)
    }

    /// Binarizes a non-empty `[height, width]` tensor of raw grey levels.
    pub fn from_intensities(values: Tensor<B, 2>, threshold: f32) -> Self {
        let values = normalize_intensity(values).greater_elem(threshold).int();
        Self { values }
    }

    /// Wraps a tensor that already holds only zeros and ones.
    pub const fn from_binary(values: Tensor<B, 2, Int>) -> Self {
        Self { values }
    }

    /// `[height, width]` of the mask.
    pub fn dims(&self) -> [usize; 2] {
        self.values.dims()
    }

    pub fn num_pixels(&self) -> usize {
        let [height, width] = self.dims();
        height * width
    }

    /// Number of foreground pixels.
    pub fn positive_count(&self) -> u64 {
        self.values.clone().sum().into_scalar().elem::<i64>() as u64
    }

    pub const fn values(&self) -> &Tensor<B, 2, Int> {
        &self.values
    }
}
