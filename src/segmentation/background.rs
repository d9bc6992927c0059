use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};

use super::config::SegmentationConfig;
use super::raster::threshold_binary;
use super::SegmentationError;

/// Dilation passes applied after the opening.
const RECONNECT_ITERATIONS: u32 = 5;

/// Foreground mask (0 or 255) of everything brighter than `back_threshold`.
///
/// Small blobs are removed with an opening whose strength scales with the
/// expected object size, then the survivors are grown generously so the
/// later distance transform is not clipped at object edges.
pub fn remove_background(image: &GrayImage, config: &SegmentationConfig) -> Result<GrayImage, SegmentationError> {
    let binary = threshold_binary(image, config.back_threshold())?;

    let radius = structuring_radius(config.morphology_kernel_size());
    let iterations = opening_iterations(config.min_diameter());

    let opened = open(&binary, radius, iterations);
    Ok(dilate_n(&opened, radius, RECONNECT_ITERATIONS))
}

/// Erosion/dilation passes of the opening: `max(1, min_diameter / 3)`.
pub fn opening_iterations(min_diameter: u32) -> u32 {
    (min_diameter / 3).max(1)
}

// A square element of odd side `s` is the L-infinity ball of radius `(s - 1) / 2`.
fn structuring_radius(kernel_size: u32) -> u8 {
    (kernel_size.saturating_sub(1) / 2).min(u8::MAX as u32) as u8
}

fn open(mask: &GrayImage, radius: u8, iterations: u32) -> GrayImage {
    let eroded = erode_n(mask, radius, iterations);
    dilate_n(&eroded, radius, iterations)
}

fn erode_n(mask: &GrayImage, radius: u8, iterations: u32) -> GrayImage {
    let mut out = mask.clone();
    if radius == 0 {
        return out;
    }
    for _ in 0..iterations {
        out = erode(&out, Norm::LInf, radius);
    }
    out
}

fn dilate_n(mask: &GrayImage, radius: u8, iterations: u32) -> GrayImage {
    let mut out = mask.clone();
    if radius == 0 {
        return out;
    }
    for _ in 0..iterations {
        out = dilate(&out, Norm::LInf, radius);
    }
    out
}
