//! Buffer plumbing between `image` buffers and kornia images.
//!
//! The pipeline hands `image::GrayImage`/`RgbImage` between stages and drops
//! down to kornia for the per-pixel kernels kornia already provides (luma
//! conversion, binary thresholding).

use image::{GrayImage, RgbImage};
use kornia::{
    image::{Image, ImageSize, allocator::CpuAllocator},
    imgproc,
};

use super::SegmentationError;

pub(crate) type CpuImage<T, const C: usize> = Image<T, C, CpuAllocator>;

pub(crate) fn ensure_non_empty(width: u32, height: u32) -> Result<(), SegmentationError> {
    if width == 0 || height == 0 {
        return Err(SegmentationError::InvalidInput(format!(
            "image must be at least 1x1, got {width}x{height}"
        )));
    }
    Ok(())
}

fn kornia_size(width: u32, height: u32) -> ImageSize {
    ImageSize {
        width: width as usize,
        height: height as usize,
    }
}

pub(crate) fn rgb_to_kornia(image: &RgbImage) -> Result<CpuImage<u8, 3>, SegmentationError> {
    let (width, height) = image.dimensions();
    ensure_non_empty(width, height)?;
    Ok(CpuImage::<u8, 3>::new(
        kornia_size(width, height),
        image.as_raw().clone(),
        CpuAllocator,
    )?)
}

pub(crate) fn gray_to_kornia(image: &GrayImage) -> Result<CpuImage<u8, 1>, SegmentationError> {
    let (width, height) = image.dimensions();
    ensure_non_empty(width, height)?;
    Ok(CpuImage::<u8, 1>::new(
        kornia_size(width, height),
        image.as_raw().clone(),
        CpuAllocator,
    )?)
}

pub(crate) fn kornia_to_gray(image: &CpuImage<u8, 1>) -> Result<GrayImage, SegmentationError> {
    let size = image.size();
    GrayImage::from_raw(
        size.width as u32,
        size.height as u32,
        image.as_slice().to_vec(),
    )
    .ok_or_else(|| {
        SegmentationError::InvalidInput(format!(
            "buffer does not match {}x{}",
            size.width, size.height
        ))
    })
}

/// Luma conversion of an RGB image.
pub fn to_grayscale(image: &RgbImage) -> Result<GrayImage, SegmentationError> {
    let rgb = rgb_to_kornia(image)?;
    let mut gray = CpuImage::<u8, 1>::from_size_val(rgb.size(), 0u8, CpuAllocator)?;
    imgproc::color::gray_from_rgb_u8(&rgb, &mut gray)?;
    kornia_to_gray(&gray)
}

/// Fixed global threshold: `pixel > threshold` becomes 255, everything else 0.
pub fn threshold_binary(image: &GrayImage, threshold: u8) -> Result<GrayImage, SegmentationError> {
    let src = gray_to_kornia(image)?;
    let mut binary = CpuImage::<u8, 1>::from_size_val(src.size(), 0u8, CpuAllocator)?;
    imgproc::threshold::threshold_binary(&src, &mut binary, threshold, 255)?;
    kornia_to_gray(&binary)
}

/// Keeps `image` pixels where `mask` is non-zero, zeroes the rest.
pub fn apply_mask(image: &GrayImage, mask: &GrayImage) -> Result<GrayImage, SegmentationError> {
    if image.dimensions() != mask.dimensions() {
        return Err(SegmentationError::InvalidInput(format!(
            "mask is {:?} but image is {:?}",
            mask.dimensions(),
            image.dimensions()
        )));
    }
    let mut out = image.clone();
    for (px, m) in out.pixels_mut().zip(mask.pixels()) {
        px[0] &= m[0];
    }
    Ok(out)
}
