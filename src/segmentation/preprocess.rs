use image::{GrayImage, RgbImage};

use super::clahe::clahe;
use super::config::SegmentationConfig;
use super::raster::{ensure_non_empty, to_grayscale};
use super::SegmentationError;

/// Blur, convert to luma and normalize local contrast.
///
/// The blur runs on the color image before the grayscale conversion, so
/// chroma noise is smoothed along with luminance.
pub fn preprocess(image: &RgbImage, config: &SegmentationConfig) -> Result<GrayImage, SegmentationError> {
    let (width, height) = image.dimensions();
    ensure_non_empty(width, height)?;

    let kernel = gaussian_kernel(config.gaussian_kernel_size());
    let blurred = imageproc::filter::separable_filter_equal(image, &kernel);
    let gray = to_grayscale(&blurred)?;
    clahe(&gray, config.clahe_clip_limit(), config.clahe_tile_size())
}

/// Normalized 1-D Gaussian of odd length `size`.
///
/// Sigma follows the usual size-derived rule
/// `0.3 * ((size - 1) / 2 - 1) + 0.8`.
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = size.max(1) | 1;
    if size == 1 {
        return vec![1.0];
    }
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (size / 2) as i32;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in kernel.iter_mut() {
        *k /= sum;
    }
    kernel
}
