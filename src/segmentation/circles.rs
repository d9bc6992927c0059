use serde::{Deserialize, Serialize};

use super::config::SegmentationConfig;
use super::distance::DistanceMap;
use super::peaks::Peak;
use super::SegmentationError;

/// One detected object: center plus the radius read from each distance map.
///
/// `radius_1` comes from the plain masked image, `radius_2` from its
/// contrast-equalized variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Circle {
    pub x: u32,
    pub y: u32,
    #[serde(rename = "radius_1")]
    pub radius1: u32,
    #[serde(rename = "radius_2")]
    pub radius2: u32,
}

/// Scale factor that undoes the shrinkage caused by binarizing at
/// `threshold` instead of `back_threshold`.
///
/// `1 + (threshold - back_threshold) / (255 - back_threshold)`. A validated
/// config never has `back_threshold == 255`.
pub fn compensation_coefficient(config: &SegmentationConfig) -> f32 {
    let back = config.back_threshold() as f32;
    let thr = config.threshold() as f32;
    1.0 + (thr - back) / (255.0 - back)
}

/// Turns peaks into circles, reading `radius1` from `raw_map` and `radius2`
/// from `equalized_map` at each peak.
///
/// Both maps must have the same size and every peak must lie inside them.
pub fn extract_circles(
    peaks: &[Peak],
    raw_map: &DistanceMap,
    equalized_map: &DistanceMap,
    config: &SegmentationConfig,
) -> Result<Vec<Circle>, SegmentationError> {
    if raw_map.dimensions() != equalized_map.dimensions() {
        return Err(SegmentationError::InvalidInput(format!(
            "distance maps differ in size: {:?} vs {:?}",
            raw_map.dimensions(),
            equalized_map.dimensions()
        )));
    }

    let coeff = compensation_coefficient(config);
    let min_radius = config.min_diameter() / 2;

    let mut circles = Vec::with_capacity(peaks.len());
    for p in peaks {
        let (Some(raw), Some(eq)) = (raw_map.get(p.col, p.row), equalized_map.get(p.col, p.row)) else {
            return Err(SegmentationError::InvalidInput(format!(
                "peak at row {} col {} is outside the {:?} distance map",
                p.row,
                p.col,
                raw_map.dimensions()
            )));
        };
        let radius1 = scaled_radius(raw, coeff);
        if radius1 >= min_radius {
            circles.push(Circle {
                x: p.col,
                y: p.row,
                radius1,
                radius2: scaled_radius(eq, coeff),
            });
        }
    }
    Ok(circles)
}

fn scaled_radius(distance: f32, coeff: f32) -> u32 {
    // float-to-int casts saturate, so a negative product lands on 0
    (distance * coeff).floor() as u32
}
