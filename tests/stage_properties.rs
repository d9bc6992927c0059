use image::{Rgb, RgbImage};
use mushroom_segmenter::io::{self, ResourceError};
use mushroom_segmenter::segmentation::{
    MaskInput, SegmentationConfig, Segmenter, distance_transform, preprocess, remove_background,
};
use mushroom_segmenter::test_image_gen::{Disk, generate_test_image, white_disks};

fn noise_image(width: u32, height: u32, seed: u32) -> RgbImage {
    let mut state = seed;
    RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        };
        Rgb([next(), next(), next()])
    })
}

#[test]
fn background_mask_is_binary_on_noise() {
    let cfg = SegmentationConfig::default();
    for seed in [1, 7, 42] {
        let img = noise_image(64, 48, seed);
        let pre = preprocess(&img, &cfg).expect("preprocess");
        assert_eq!(pre.dimensions(), (64, 48));
        let mask = remove_background(&pre, &cfg).expect("mask");
        assert!(mask.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }
}

#[test]
fn stage_outputs_are_consistent() {
    let img = white_disks(
        240,
        180,
        &[Disk::new(70.0, 90.0, 35.0), Disk::new(170.0, 90.0, 30.0)],
    );
    let cfg = SegmentationConfig::default();
    let out = Segmenter::new(cfg.clone()).run_stages(&img).expect("stages");

    for (x, y, px) in out.masked.enumerate_pixels() {
        if out.mask.get_pixel(x, y)[0] == 0 {
            assert_eq!(px[0], 0, "masked pixel outside mask at ({x},{y})");
        }
        if px[0] == 0 {
            assert_eq!(out.raw_map.at(x, y), 0.0);
        }
    }
    assert!(out.raw_map.as_slice().iter().all(|d| *d >= 0.0));
    assert!(out.equalized_map.max() > 0.0);

    let md2 = (cfg.min_diameter() * cfg.min_diameter()) as i64;
    for (i, a) in out.peaks.iter().enumerate() {
        assert!(out.equalized_map.at(a.col, a.row) > 0.0);
        for b in &out.peaks[i + 1..] {
            let dr = a.row as i64 - b.row as i64;
            let dc = a.col as i64 - b.col as i64;
            assert!(dr * dr + dc * dc >= md2, "{a:?} too close to {b:?}");
        }
    }
    assert!(out.circles.len() <= out.peaks.len());
    assert_eq!(out.circles, Segmenter::new(cfg).segment(&img).expect("segment"));
}

#[test]
fn background_mask_feeds_distance_as_binary_input() {
    let img = white_disks(160, 120, &[Disk::new(80.0, 60.0, 30.0)]);
    let cfg = SegmentationConfig::default();
    let out = Segmenter::new(cfg.clone()).run_stages(&img).expect("stages");

    let map = distance_transform(&out.mask, MaskInput::Binary, &cfg).expect("distance");
    assert_eq!(map.dimensions(), out.mask.dimensions());
    for (x, y, px) in out.mask.enumerate_pixels() {
        if px[0] == 0 {
            assert_eq!(map.at(x, y), 0.0);
        } else {
            assert!(map.at(x, y) > 0.0);
        }
    }
    // the dilated mask reaches further than the thresholded disk
    assert!(map.max() > out.raw_map.max());
}

#[test]
fn missing_input_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("nope.png");
    assert!(matches!(
        io::validate_image_path(&missing),
        Err(ResourceError::NotFound(_))
    ));
    assert!(matches!(
        io::validate_image_path(dir.path()),
        Err(ResourceError::NotAFile(_))
    ));
}

#[test]
fn unsupported_extension_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, b"not an image").expect("write");
    match io::validate_image_path(&notes) {
        Err(ResourceError::UnsupportedFormat { ext, .. }) => assert_eq!(ext, "txt"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn generated_scene_round_trips_through_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scene.png");
    generate_test_image(path.to_str().expect("utf8 path")).expect("generate");

    let validated = io::validate_image_path(&path).expect("valid input");
    let img = io::load_image(&validated).expect("load");
    assert_eq!(img.dimensions(), (520, 420));

    let circles = Segmenter::default().segment(&img).expect("segment");
    assert!(!circles.is_empty());

    let annotated_path = dir.path().join("out/annotated.png");
    io::save_image(&img, &annotated_path).expect("save");
    assert!(annotated_path.is_file());
}
