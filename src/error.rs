use crate::io::ResourceError;
use crate::segmentation::{ConfigError, SegmentationError};
use crate::visualize::VisualizeError;

/// Everything a full run (load, segment, export, draw) can fail with.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Segmentation(#[from] SegmentationError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error("visualization failed: {0}")]
    Visualize(#[from] VisualizeError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
