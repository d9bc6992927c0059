//! Contrast-limited adaptive histogram equalization.
//!
//! The image is split into a `tiles x tiles` grid. Each tile gets its own
//! clipped-histogram lookup table and every output pixel is bilinearly
//! interpolated between the four nearest tile tables. Images that do not
//! divide evenly into the grid are padded on the bottom/right by reflecting
//! about the last row/column (the edge pixel itself is not repeated).

use image::GrayImage;

use super::SegmentationError;
use super::raster::ensure_non_empty;

const BINS: usize = 256;

pub fn clahe(image: &GrayImage, clip_limit: f32, tiles: u32) -> Result<GrayImage, SegmentationError> {
    let (width, height) = image.dimensions();
    ensure_non_empty(width, height)?;

    let w = width as usize;
    let h = height as usize;
    let tiles = tiles.max(1) as usize;
    let tile_w = w.div_ceil(tiles);
    let tile_h = h.div_ceil(tiles);
    let tile_area = tile_w * tile_h;

    let clip = if clip_limit > 0.0 {
        ((clip_limit * tile_area as f32 / BINS as f32) as usize).max(1)
    } else {
        0
    };

    let src = image.as_raw();
    let lut_scale = 255.0 / tile_area as f32;
    let mut luts = vec![[0u8; BINS]; tiles * tiles];

    for ty in 0..tiles {
        for tx in 0..tiles {
            let mut hist = [0usize; BINS];
            for y in ty * tile_h..(ty + 1) * tile_h {
                let row = reflect_101(y, h) * w;
                for x in tx * tile_w..(tx + 1) * tile_w {
                    hist[src[row + reflect_101(x, w)] as usize] += 1;
                }
            }

            if clip > 0 {
                clip_histogram(&mut hist, clip);
            }

            let lut = &mut luts[ty * tiles + tx];
            let mut sum = 0usize;
            for (value, &count) in hist.iter().enumerate() {
                sum += count;
                lut[value] = (sum as f32 * lut_scale).round().min(255.0) as u8;
            }
        }
    }

    let inv_tw = 1.0 / tile_w as f32;
    let inv_th = 1.0 / tile_h as f32;
    let last = tiles as isize - 1;
    let mut out = GrayImage::new(width, height);
    let dst: &mut [u8] = &mut out;

    for y in 0..h {
        let tyf = y as f32 * inv_th - 0.5;
        let ty_floor = tyf.floor();
        let ya = tyf - ty_floor;
        let ty1 = (ty_floor as isize).clamp(0, last) as usize;
        let ty2 = (ty_floor as isize + 1).clamp(0, last) as usize;

        for x in 0..w {
            let txf = x as f32 * inv_tw - 0.5;
            let tx_floor = txf.floor();
            let xa = txf - tx_floor;
            let tx1 = (tx_floor as isize).clamp(0, last) as usize;
            let tx2 = (tx_floor as isize + 1).clamp(0, last) as usize;

            let v = src[y * w + x] as usize;
            let top = luts[ty1 * tiles + tx1][v] as f32 * (1.0 - xa)
                + luts[ty1 * tiles + tx2][v] as f32 * xa;
            let bottom = luts[ty2 * tiles + tx1][v] as f32 * (1.0 - xa)
                + luts[ty2 * tiles + tx2][v] as f32 * xa;
            let res = top * (1.0 - ya) + bottom * ya;
            dst[y * w + x] = res.round().clamp(0.0, 255.0) as u8;
        }
    }

    Ok(out)
}

/// Clamps every bin to `clip` and spreads the excess back over all bins.
fn clip_histogram(hist: &mut [usize; BINS], clip: usize) {
    let mut excess = 0usize;
    for count in hist.iter_mut() {
        if *count > clip {
            excess += *count - clip;
            *count = clip;
        }
    }

    let batch = excess / BINS;
    let mut residual = excess - batch * BINS;
    for count in hist.iter_mut() {
        *count += batch;
    }

    if residual > 0 {
        let step = (BINS / residual).max(1);
        let mut i = 0;
        while i < BINS && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

fn reflect_101(i: usize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n - 1);
    let m = i % period;
    if m < n { m } else { period - m }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn reflection_skips_the_edge_pixel() {
        assert_eq!(reflect_101(4, 5), 4);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(3, 1), 0);
    }

    #[test]
    fn clipped_histogram_keeps_its_mass() {
        let mut hist = [0usize; BINS];
        hist[0] = 600;
        hist[255] = 25;
        clip_histogram(&mut hist, 4);
        assert_eq!(hist.iter().sum::<usize>(), 625);
        assert!(hist.iter().all(|&c| c <= 4 + 3));
    }

    #[test]
    fn white_stays_white_and_black_stays_dark() {
        let img = GrayImage::from_fn(64, 64, |x, _| Luma([if x < 32 { 0 } else { 255 }]));
        let out = clahe(&img, 2.0, 8).expect("clahe");
        for (src, dst) in img.pixels().zip(out.pixels()) {
            if src[0] == 255 {
                assert_eq!(dst[0], 255);
            } else {
                assert!(dst[0] < 20, "black mapped to {}", dst[0]);
            }
        }
    }

    #[test]
    fn more_tiles_than_pixels_is_fine() {
        let img = GrayImage::from_pixel(3, 2, Luma([77]));
        let out = clahe(&img, 2.0, 8).expect("clahe");
        assert_eq!(out.dimensions(), (3, 2));
    }
}
