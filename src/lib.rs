//! Detects roughly circular objects (mushrooms) in photographs.
//!
//! ```no_run
//! use mushroom_segmenter::{io, segmentation::{Segmenter, SegmentationConfig}};
//!
//! let image = io::load_image("tray.jpg")?;
//! let circles = Segmenter::new(SegmentationConfig::default()).segment(&image)?;
//! for c in &circles {
//!     println!("{} {} {} {}", c.x, c.y, c.radius1, c.radius2);
//! }
//! # Ok::<(), mushroom_segmenter::Error>(())
//! ```

pub mod error;
pub mod export;
pub mod io;
pub mod segmentation;
pub mod test_image_gen;
pub mod visualize;

pub use error::{Error, Result};
pub use segmentation::{Circle, SegmentationConfig, SegmentationParams, Segmenter};
