use std::fmt;
use std::time::{Duration, Instant};

use image::{GrayImage, RgbImage};

use super::background::remove_background;
use super::circles::{Circle, extract_circles};
use super::clahe::clahe;
use super::config::SegmentationConfig;
use super::distance::{DistanceMap, MaskInput, distance_transform};
use super::peaks::{Peak, find_peaks};
use super::preprocess::preprocess;
use super::raster::apply_mask;
use super::SegmentationError;

/// Pipeline step reported to a [`StageObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Preprocess,
    BackgroundRemoval,
    Masking,
    RawDistance,
    Equalization,
    EqualizedDistance,
    PeakDetection,
    CircleExtraction,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Preprocess => "preprocess",
            Stage::BackgroundRemoval => "background_removal",
            Stage::Masking => "masking",
            Stage::RawDistance => "raw_distance",
            Stage::Equalization => "equalization",
            Stage::EqualizedDistance => "equalized_distance",
            Stage::PeakDetection => "peak_detection",
            Stage::CircleExtraction => "circle_extraction",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Emitted once per completed stage.
///
/// `count` is stage specific: foreground pixels for mask-producing stages,
/// number of peaks or circles for the last two, `None` otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageEvent {
    pub stage: Stage,
    pub elapsed: Duration,
    pub count: Option<usize>,
}

pub trait StageObserver {
    fn on_stage(&mut self, event: &StageEvent);
}

impl<F: FnMut(&StageEvent)> StageObserver for F {
    fn on_stage(&mut self, event: &StageEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StageObserver for NoopObserver {
    fn on_stage(&mut self, _event: &StageEvent) {}
}

/// Forwards events to the `log` facade at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl StageObserver for LogObserver {
    fn on_stage(&mut self, event: &StageEvent) {
        match event.count {
            Some(count) => log::debug!(
                "stage {} took {:.2?} (count {count})",
                event.stage,
                event.elapsed
            ),
            None => log::debug!("stage {} took {:.2?}", event.stage, event.elapsed),
        }
    }
}

/// Runs the full detection pipeline with one fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    config: SegmentationConfig,
}

impl Segmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    pub fn segment(&self, image: &RgbImage) -> Result<Vec<Circle>, SegmentationError> {
        self.segment_with_observer(image, &mut NoopObserver)
    }

    pub fn segment_with_observer(
        &self,
        image: &RgbImage,
        observer: &mut dyn StageObserver,
    ) -> Result<Vec<Circle>, SegmentationError> {
        let cfg = &self.config;

        let preprocessed = timed(observer, Stage::Preprocess, |_| None, || preprocess(image, cfg))?;
        let mask = timed(
            observer,
            Stage::BackgroundRemoval,
            |m| Some(foreground(m)),
            || remove_background(&preprocessed, cfg),
        )?;
        let masked = timed(
            observer,
            Stage::Masking,
            |m| Some(foreground(m)),
            || apply_mask(&preprocessed, &mask),
        )?;
        let raw_map = timed(observer, Stage::RawDistance, |_| None, || {
            distance_transform(&masked, MaskInput::Grayscale, cfg)
        })?;
        let equalized = timed(observer, Stage::Equalization, |_| None, || {
            clahe(&masked, cfg.clahe_clip_limit(), cfg.clahe_tile_size())
        })?;
        let equalized_map = timed(observer, Stage::EqualizedDistance, |_| None, || {
            distance_transform(&equalized, MaskInput::Grayscale, cfg)
        })?;
        let peaks: Vec<Peak> = timed(
            observer,
            Stage::PeakDetection,
            |p: &Vec<Peak>| Some(p.len()),
            || Ok(find_peaks(&equalized_map, cfg)),
        )?;
        timed(
            observer,
            Stage::CircleExtraction,
            |c: &Vec<Circle>| Some(c.len()),
            || extract_circles(&peaks, &raw_map, &equalized_map, cfg),
        )
    }

    /// Intermediate products of one run, for debugging and visualization.
    pub fn run_stages(&self, image: &RgbImage) -> Result<StageOutputs, SegmentationError> {
        let cfg = &self.config;
        let preprocessed = preprocess(image, cfg)?;
        let mask = remove_background(&preprocessed, cfg)?;
        let masked = apply_mask(&preprocessed, &mask)?;
        let raw_map = distance_transform(&masked, MaskInput::Grayscale, cfg)?;
        let equalized = clahe(&masked, cfg.clahe_clip_limit(), cfg.clahe_tile_size())?;
        let equalized_map = distance_transform(&equalized, MaskInput::Grayscale, cfg)?;
        let peaks = find_peaks(&equalized_map, cfg);
        let circles = extract_circles(&peaks, &raw_map, &equalized_map, cfg)?;
        Ok(StageOutputs {
            preprocessed,
            mask,
            masked,
            equalized,
            raw_map,
            equalized_map,
            peaks,
            circles,
        })
    }
}

/// Everything [`Segmenter::run_stages`] produced along the way.
#[derive(Debug, Clone)]
pub struct StageOutputs {
    pub preprocessed: GrayImage,
    pub mask: GrayImage,
    pub masked: GrayImage,
    pub equalized: GrayImage,
    pub raw_map: DistanceMap,
    pub equalized_map: DistanceMap,
    pub peaks: Vec<Peak>,
    pub circles: Vec<Circle>,
}

fn foreground(image: &GrayImage) -> usize {
    image.pixels().filter(|p| p[0] != 0).count()
}

fn timed<T>(
    observer: &mut dyn StageObserver,
    stage: Stage,
    count: impl Fn(&T) -> Option<usize>,
    run: impl FnOnce() -> Result<T, SegmentationError>,
) -> Result<T, SegmentationError> {
    let start = Instant::now();
    let out = run()?;
    observer.on_stage(&StageEvent {
        stage,
        elapsed: start.elapsed(),
        count: count(&out),
    });
    Ok(out)
}
