use image::{GrayImage, Luma};
use imageproc::distance_transform::euclidean_squared_distance_transform;

use super::config::SegmentationConfig;
use super::raster::{ensure_non_empty, threshold_binary};
use super::SegmentationError;

/// What the caller hands to [`distance_transform`].
///
/// [`Segmenter`](super::Segmenter) always passes masked grayscale. `Binary`
/// is for callers that already hold a mask, such as the output of
/// [`remove_background`](super::remove_background).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskInput {
    /// Already a mask: any non-zero pixel is foreground.
    Binary,
    /// Grayscale that must first be binarized at the config's `threshold`.
    Grayscale,
}

/// Per-pixel Euclidean distance to the nearest background pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMap {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl DistanceMap {
    pub fn zeros(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    /// Wraps a row-major buffer; `None` if the length does not match.
    pub fn from_raw(width: u32, height: u32, data: Vec<f32>) -> Option<Self> {
        (data.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn at(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        (x < self.width && y < self.height).then(|| self.at(x, y))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(0.0, f32::max)
    }
}

pub fn distance_transform(
    image: &GrayImage,
    input: MaskInput,
    config: &SegmentationConfig,
) -> Result<DistanceMap, SegmentationError> {
    let (width, height) = image.dimensions();
    ensure_non_empty(width, height)?;

    let mask = match input {
        MaskInput::Binary => image.clone(),
        MaskInput::Grayscale => threshold_binary(image, config.threshold())?,
    };
    Ok(euclidean_distance(&mask))
}

/// Exact Euclidean distance of every non-zero pixel to the closest zero pixel.
///
/// A mask with no zero pixel is measured against the image border instead,
/// so the map stays finite.
pub fn euclidean_distance(mask: &GrayImage) -> DistanceMap {
    let (width, height) = mask.dimensions();
    let foreground = mask.pixels().filter(|p| p[0] != 0).count();
    if foreground == 0 {
        return DistanceMap::zeros(width, height);
    }

    if foreground < mask.len() {
        return DistanceMap {
            width,
            height,
            data: background_distances(&invert(mask)),
        };
    }

    // pad by one background pixel on every side, then crop back
    let padded = GrayImage::from_fn(width + 2, height + 2, |x, y| {
        let inside = x >= 1 && y >= 1 && x <= width && y <= height;
        Luma([if inside { 0 } else { 255 }])
    });
    let full = background_distances(&padded);
    let stride = width as usize + 2;
    let mut data = Vec::with_capacity(width as usize * height as usize);
    for y in 1..=height as usize {
        data.extend_from_slice(&full[y * stride + 1..y * stride + 1 + width as usize]);
    }
    DistanceMap {
        width,
        height,
        data,
    }
}

// imageproc measures the distance to the nearest *non-zero* pixel, so the
// input here is the inverted mask.
fn background_distances(inverted: &GrayImage) -> Vec<f32> {
    euclidean_squared_distance_transform(inverted)
        .into_raw()
        .into_iter()
        .map(|d2| d2.sqrt() as f32)
        .collect()
}

fn invert(mask: &GrayImage) -> GrayImage {
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        Luma([if mask.get_pixel(x, y)[0] == 0 { 255 } else { 0 }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn square_center_is_farthest_from_background() {
        let mut mask = GrayImage::new(11, 11);
        for y in 2..9 {
            for x in 2..9 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let map = euclidean_distance(&mask);
        assert_relative_eq!(map.at(5, 5), 4.0);
        assert_relative_eq!(map.at(2, 5), 1.0);
        assert_relative_eq!(map.at(0, 0), 0.0);
        assert_relative_eq!(map.max(), 4.0);
    }

    #[test]
    fn grayscale_input_is_binarized_at_threshold() {
        let cfg = SegmentationConfig::default();
        let img = GrayImage::from_fn(5, 1, |x, _| Luma([if x == 2 { 200 } else { 120 }]));
        let map = distance_transform(&img, MaskInput::Grayscale, &cfg).expect("distance");
        assert_relative_eq!(map.at(2, 0), 1.0);
        assert_relative_eq!(map.at(1, 0), 0.0);

        let raw = distance_transform(&img, MaskInput::Binary, &cfg).expect("distance");
        assert!(raw.at(1, 0) > 0.0);
    }

    #[test]
    fn all_foreground_is_measured_to_the_border() {
        let mask = GrayImage::from_pixel(5, 5, Luma([255]));
        let map = euclidean_distance(&mask);
        assert_relative_eq!(map.at(0, 0), 1.0);
        assert_relative_eq!(map.at(2, 2), 3.0);
        assert!(map.as_slice().iter().all(|d| d.is_finite()));
    }
}
