//! Validated parameters for the mushroom segmentation pipeline.

use serde::{Deserialize, Serialize};

const BACK_THRESHOLD: u8 = 100;
const THRESHOLD: u8 = 150;
const MIN_DIAMETER: u32 = 30;
const PEAKS_REL_THRESHOLD: f32 = 0.1;
const GAUSSIAN_KERNEL_SIZE: u32 = 5;
const CLAHE_CLIP_LIMIT: f32 = 2.0;
const CLAHE_TILE_SIZE: u32 = 8;
const MORPHOLOGY_KERNEL_SIZE: u32 = 3;

/// Raw, unvalidated segmentation parameters.
///
/// This is what the CLI (or any other caller) fills in. Turn it into a
/// [`SegmentationConfig`] with [`SegmentationConfig::new`] before running the
/// pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationParams {
    pub back_threshold: u8,
    pub threshold: u8,
    pub min_diameter: u32,
    pub peaks_rel_threshold: f32,
    pub gaussian_kernel_size: u32,
    pub clahe_clip_limit: f32,
    pub clahe_tile_size: u32,
    pub morphology_kernel_size: u32,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            back_threshold: BACK_THRESHOLD,
            threshold: THRESHOLD,
            min_diameter: MIN_DIAMETER,
            peaks_rel_threshold: PEAKS_REL_THRESHOLD,
            gaussian_kernel_size: GAUSSIAN_KERNEL_SIZE,
            clahe_clip_limit: CLAHE_CLIP_LIMIT,
            clahe_tile_size: CLAHE_TILE_SIZE,
            morphology_kernel_size: MORPHOLOGY_KERNEL_SIZE,
        }
    }
}

/// Rejected parameter values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("back_threshold must be in 0..=254 (255 leaves no room for compensation), got {0}")]
    BackThreshold(u8),
    #[error("min_diameter must be at least 1 pixel, got {0}")]
    MinDiameter(u32),
    #[error("peaks_rel_threshold must be in 0.0..=1.0, got {0}")]
    PeaksRelThreshold(f32),
    #[error("{field} must be at least 1, got {value}")]
    KernelSize { field: &'static str, value: u32 },
    #[error("clahe_clip_limit must be a finite value >= 0, got {0}")]
    ClipLimit(f32),
    #[error("clahe_tile_size must be at least 1, got {0}")]
    TileSize(u32),
}

/// Accepted but suspicious parameter combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWarning {
    /// `threshold < back_threshold` makes the compensation coefficient
    /// smaller than one, so every reported radius shrinks.
    ThresholdBelowBackground { threshold: u8, back_threshold: u8 },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::ThresholdBelowBackground {
                threshold,
                back_threshold,
            } => write!(
                f,
                "threshold ({threshold}) is below back_threshold ({back_threshold}); radii will be scaled down"
            ),
        }
    }
}

/// Immutable, validated pipeline configuration.
///
/// Kernel sizes are always odd: an even request is bumped to the next odd
/// value during construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentationConfig {
    back_threshold: u8,
    threshold: u8,
    min_diameter: u32,
    peaks_rel_threshold: f32,
    gaussian_kernel_size: u32,
    clahe_clip_limit: f32,
    clahe_tile_size: u32,
    morphology_kernel_size: u32,
}

impl SegmentationConfig {
    pub fn new(params: SegmentationParams) -> Result<Self, ConfigError> {
        if params.back_threshold == u8::MAX {
            return Err(ConfigError::BackThreshold(params.back_threshold));
        }
        if params.min_diameter < 1 {
            return Err(ConfigError::MinDiameter(params.min_diameter));
        }
        if !(0.0..=1.0).contains(&params.peaks_rel_threshold) {
            // NaN fails the range check as well
            return Err(ConfigError::PeaksRelThreshold(params.peaks_rel_threshold));
        }
        if !params.clahe_clip_limit.is_finite() || params.clahe_clip_limit < 0.0 {
            return Err(ConfigError::ClipLimit(params.clahe_clip_limit));
        }
        if params.clahe_tile_size < 1 {
            return Err(ConfigError::TileSize(params.clahe_tile_size));
        }

        Ok(Self {
            back_threshold: params.back_threshold,
            threshold: params.threshold,
            min_diameter: params.min_diameter,
            peaks_rel_threshold: params.peaks_rel_threshold,
            gaussian_kernel_size: odd_kernel_size("gaussian_kernel_size", params.gaussian_kernel_size)?,
            clahe_clip_limit: params.clahe_clip_limit,
            clahe_tile_size: params.clahe_tile_size,
            morphology_kernel_size: odd_kernel_size(
                "morphology_kernel_size",
                params.morphology_kernel_size,
            )?,
        })
    }

    pub fn back_threshold(&self) -> u8 {
        self.back_threshold
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn min_diameter(&self) -> u32 {
        self.min_diameter
    }

    pub fn peaks_rel_threshold(&self) -> f32 {
        self.peaks_rel_threshold
    }

    pub fn gaussian_kernel_size(&self) -> u32 {
        self.gaussian_kernel_size
    }

    pub fn clahe_clip_limit(&self) -> f32 {
        self.clahe_clip_limit
    }

    pub fn clahe_tile_size(&self) -> u32 {
        self.clahe_tile_size
    }

    pub fn morphology_kernel_size(&self) -> u32 {
        self.morphology_kernel_size
    }

    /// Returns the parameters this configuration was built from, after kernel
    /// size adjustment.
    pub fn params(&self) -> SegmentationParams {
        SegmentationParams {
            back_threshold: self.back_threshold,
            threshold: self.threshold,
            min_diameter: self.min_diameter,
            peaks_rel_threshold: self.peaks_rel_threshold,
            gaussian_kernel_size: self.gaussian_kernel_size,
            clahe_clip_limit: self.clahe_clip_limit,
            clahe_tile_size: self.clahe_tile_size,
            morphology_kernel_size: self.morphology_kernel_size,
        }
    }

    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut out = Vec::new();
        if self.threshold < self.back_threshold {
            out.push(ConfigWarning::ThresholdBelowBackground {
                threshold: self.threshold,
                back_threshold: self.back_threshold,
            });
        }
        out
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        let p = SegmentationParams::default();
        Self {
            back_threshold: p.back_threshold,
            threshold: p.threshold,
            min_diameter: p.min_diameter,
            peaks_rel_threshold: p.peaks_rel_threshold,
            gaussian_kernel_size: p.gaussian_kernel_size,
            clahe_clip_limit: p.clahe_clip_limit,
            clahe_tile_size: p.clahe_tile_size,
            morphology_kernel_size: p.morphology_kernel_size,
        }
    }
}

fn odd_kernel_size(field: &'static str, value: u32) -> Result<u32, ConfigError> {
    if value < 1 {
        return Err(ConfigError::KernelSize { field, value });
    }
    if value % 2 == 0 { Ok(value + 1) } else { Ok(value) }
}
