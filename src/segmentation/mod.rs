//! Mushroom detection: turns a color photograph into circle hypotheses.
//!
//! Stage order: [`preprocess`] -> [`remove_background`] -> mask ->
//! [`distance_transform`] (raw) -> [`clahe`] -> [`distance_transform`]
//! (equalized) -> [`find_peaks`] -> [`extract_circles`]. [`Segmenter`] wires
//! them together.

pub mod background;
pub mod circles;
pub mod clahe;
pub mod config;
pub mod distance;
pub mod peaks;
pub mod pipeline;
pub mod preprocess;
pub mod raster;

pub use background::remove_background;
pub use circles::{Circle, compensation_coefficient, extract_circles};
pub use clahe::clahe;
pub use config::{ConfigError, ConfigWarning, SegmentationConfig, SegmentationParams};
pub use distance::{DistanceMap, MaskInput, distance_transform};
pub use peaks::{Peak, find_peaks};
pub use pipeline::{LogObserver, NoopObserver, Segmenter, Stage, StageEvent, StageObserver, StageOutputs};
pub use preprocess::preprocess;

use kornia::image::ImageError;

/// Errors that can occur inside the detection pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SegmentationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("kornia image error: {0}")]
    Kornia(#[from] ImageError),
}
