//! Annotated renderings of detection results.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};
use serde::{Deserialize, Serialize};

use crate::segmentation::Circle;

const CENTER_DOT_RADIUS: i32 = 3;

/// Colors (RGB) and stroke width used when drawing circles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawingStyle {
    pub center_color: [u8; 3],
    pub radius1_color: [u8; 3],
    pub radius2_color: [u8; 3],
    pub line_thickness: u32,
}

impl Default for DrawingStyle {
    fn default() -> Self {
        Self {
            center_color: [0, 0, 255],
            radius1_color: [0, 255, 0],
            radius2_color: [255, 0, 0],
            line_thickness: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VisualizeError {
    #[error("line_thickness must be at least 1")]
    LineThickness,
    #[error("overlay alpha must be in 0.0..=1.0, got {0}")]
    Alpha(f32),
    #[error("cannot place {first:?} and {second:?} side by side ({orientation:?})")]
    DimensionMismatch {
        first: (u32, u32),
        second: (u32, u32),
        orientation: Orientation,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Default)]
pub struct Visualizer {
    style: DrawingStyle,
}

impl Visualizer {
    pub fn new(style: DrawingStyle) -> Result<Self, VisualizeError> {
        if style.line_thickness < 1 {
            return Err(VisualizeError::LineThickness);
        }
        Ok(Self { style })
    }

    pub fn style(&self) -> &DrawingStyle {
        &self.style
    }

    /// Center dot plus one ring per radius estimate, on a copy of `image`.
    pub fn draw_circles(&self, image: &RgbImage, circles: &[Circle]) -> RgbImage {
        let mut canvas = image.clone();
        self.draw_circles_mut(&mut canvas, circles);
        canvas
    }

    pub fn draw_circles_mut(&self, canvas: &mut RgbImage, circles: &[Circle]) {
        for c in circles {
            let center = (c.x as i32, c.y as i32);
            draw_filled_circle_mut(canvas, center, CENTER_DOT_RADIUS, Rgb(self.style.center_color));
            draw_ring(canvas, center, c.radius1 as i32, self.style.line_thickness, Rgb(self.style.radius1_color));
            draw_ring(canvas, center, c.radius2 as i32, self.style.line_thickness, Rgb(self.style.radius2_color));
        }
    }

    /// Filled `radius2` discs blended at `alpha` over the image, then the
    /// regular rings on top.
    pub fn create_overlay(&self, image: &RgbImage, circles: &[Circle], alpha: f32) -> Result<RgbImage, VisualizeError> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(VisualizeError::Alpha(alpha));
        }

        let mut overlay = image.clone();
        for c in circles {
            draw_filled_circle_mut(
                &mut overlay,
                (c.x as i32, c.y as i32),
                c.radius2 as i32,
                Rgb(self.style.radius2_color),
            );
        }

        let mut out = image.clone();
        for (dst, src) in out.pixels_mut().zip(overlay.pixels()) {
            for ch in 0..3 {
                let blended = alpha * src[ch] as f32 + (1.0 - alpha) * dst[ch] as f32;
                dst[ch] = blended.round().clamp(0.0, 255.0) as u8;
            }
        }

        self.draw_circles_mut(&mut out, circles);
        Ok(out)
    }
}

/// Ring of the given stroke width centered on `radius`.
fn draw_ring(canvas: &mut RgbImage, center: (i32, i32), radius: i32, thickness: u32, color: Rgb<u8>) {
    let t = thickness as i32;
    let inner = radius - t / 2;
    for r in inner..inner + t {
        if r >= 0 {
            draw_hollow_circle_mut(canvas, center, r, color);
        }
    }
}

/// Original and annotated images next to each other.
pub fn create_comparison(
    original: &RgbImage,
    processed: &RgbImage,
    orientation: Orientation,
) -> Result<RgbImage, VisualizeError> {
    let (w1, h1) = original.dimensions();
    let (w2, h2) = processed.dimensions();
    let mismatch = || VisualizeError::DimensionMismatch {
        first: (w1, h1),
        second: (w2, h2),
        orientation,
    };

    let (out_w, out_h, offset) = match orientation {
        Orientation::Horizontal if h1 == h2 => (w1 + w2, h1, (w1, 0)),
        Orientation::Vertical if w1 == w2 => (w1, h1 + h2, (0, h1)),
        _ => return Err(mismatch()),
    };

    let mut out = RgbImage::new(out_w, out_h);
    for (x, y, px) in original.enumerate_pixels() {
        out.put_pixel(x, y, *px);
    }
    for (x, y, px) in processed.enumerate_pixels() {
        out.put_pixel(x + offset.0, y + offset.1, *px);
    }
    Ok(out)
}
