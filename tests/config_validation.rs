use mushroom_segmenter::segmentation::{ConfigError, ConfigWarning, SegmentationConfig, SegmentationParams};

fn build(params: SegmentationParams) -> Result<SegmentationConfig, ConfigError> {
    SegmentationConfig::new(params)
}

#[test]
fn back_threshold_255_is_rejected() {
    let err = build(SegmentationParams {
        back_threshold: 255,
        ..Default::default()
    })
    .unwrap_err();
    assert_eq!(err, ConfigError::BackThreshold(255));

    assert!(
        build(SegmentationParams {
            back_threshold: 254,
            threshold: 255,
            ..Default::default()
        })
        .is_ok()
    );
}

#[test]
fn zero_min_diameter_is_rejected() {
    let err = build(SegmentationParams {
        min_diameter: 0,
        ..Default::default()
    })
    .unwrap_err();
    assert_eq!(err, ConfigError::MinDiameter(0));
}

#[test]
fn peaks_threshold_must_be_a_fraction() {
    for bad in [-0.1f32, 1.5, f32::NAN] {
        let res = build(SegmentationParams {
            peaks_rel_threshold: bad,
            ..Default::default()
        });
        assert!(matches!(res, Err(ConfigError::PeaksRelThreshold(_))), "{bad} accepted");
    }
    for ok in [0.0f32, 0.5, 1.0] {
        assert!(
            build(SegmentationParams {
                peaks_rel_threshold: ok,
                ..Default::default()
            })
            .is_ok()
        );
    }
}

#[test]
fn clahe_parameters_are_checked() {
    assert!(matches!(
        build(SegmentationParams {
            clahe_clip_limit: -1.0,
            ..Default::default()
        }),
        Err(ConfigError::ClipLimit(_))
    ));
    assert!(matches!(
        build(SegmentationParams {
            clahe_clip_limit: f32::INFINITY,
            ..Default::default()
        }),
        Err(ConfigError::ClipLimit(_))
    ));
    assert!(matches!(
        build(SegmentationParams {
            clahe_tile_size: 0,
            ..Default::default()
        }),
        Err(ConfigError::TileSize(0))
    ));
}

#[test]
fn zero_kernel_sizes_are_rejected_and_even_ones_bumped() {
    assert_eq!(
        build(SegmentationParams {
            gaussian_kernel_size: 0,
            ..Default::default()
        })
        .unwrap_err(),
        ConfigError::KernelSize {
            field: "gaussian_kernel_size",
            value: 0
        }
    );
    assert_eq!(
        build(SegmentationParams {
            morphology_kernel_size: 0,
            ..Default::default()
        })
        .unwrap_err(),
        ConfigError::KernelSize {
            field: "morphology_kernel_size",
            value: 0
        }
    );

    let cfg = build(SegmentationParams {
        gaussian_kernel_size: 2,
        morphology_kernel_size: 8,
        ..Default::default()
    })
    .expect("even sizes are adjusted, not rejected");
    assert_eq!(cfg.gaussian_kernel_size(), 3);
    assert_eq!(cfg.morphology_kernel_size(), 9);

    let odd = build(SegmentationParams {
        gaussian_kernel_size: 7,
        ..Default::default()
    })
    .expect("odd");
    assert_eq!(odd.gaussian_kernel_size(), 7);
}

#[test]
fn threshold_below_background_warns() {
    let cfg = build(SegmentationParams {
        back_threshold: 120,
        threshold: 90,
        ..Default::default()
    })
    .expect("accepted with a warning");
    assert_eq!(
        cfg.warnings(),
        vec![ConfigWarning::ThresholdBelowBackground {
            threshold: 90,
            back_threshold: 120
        }]
    );
    assert!(cfg.warnings()[0].to_string().contains("below back_threshold"));
}

#[test]
fn params_round_trip_through_json() {
    let params = SegmentationParams {
        min_diameter: 44,
        peaks_rel_threshold: 0.25,
        ..Default::default()
    };
    let text = serde_json::to_string(&params).expect("serialize");
    let back: SegmentationParams = serde_json::from_str(&text).expect("deserialize");
    assert_eq!(back, params);
    assert_eq!(build(back).expect("valid").min_diameter(), 44);
}
