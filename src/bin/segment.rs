use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde_json::json;

use mushroom_segmenter::export::{write_csv_file, write_json_file};
use mushroom_segmenter::io::{load_image, save_image, validate_image_path, validate_output_path};
use mushroom_segmenter::segmentation::{LogObserver, SegmentationConfig, SegmentationParams, Segmenter};
use mushroom_segmenter::visualize::{DrawingStyle, Visualizer};

const OVERLAY_ALPHA: f32 = 0.3;

#[derive(Parser, Debug)]
#[command(
    name = "mushroom-segment",
    about = "Detect and measure circular objects (mushrooms) in images",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Segment one image and write the detected circles as CSV
    Segment(SegmentArgs),
}

#[derive(Args, Debug)]
struct SegmentArgs {
    /// Input image (jpg, jpeg, png, bmp, tif, tiff)
    input_image: PathBuf,

    /// Output CSV file
    #[arg(short = 'o', long = "output-csv", default_value = "results.csv")]
    output_csv: PathBuf,

    /// Also write results as JSON with run metadata
    #[arg(long = "output-json")]
    output_json: Option<PathBuf>,

    /// Save an annotated copy of the input
    #[arg(short = 's', long = "save-visualization")]
    save_visualization: Option<PathBuf>,

    /// Blend filled discs under the rings in the saved visualization
    #[arg(long)]
    overlay: bool,

    /// Background threshold (0-254)
    #[arg(long, default_value_t = 100)]
    back_threshold: u8,

    /// Object threshold (0-255)
    #[arg(long, default_value_t = 150)]
    threshold: u8,

    /// Minimum object diameter in pixels
    #[arg(long, default_value_t = 30)]
    min_diameter: u32,

    /// Relative peak threshold (0-1)
    #[arg(long = "peaks-threshold", default_value_t = 0.1)]
    peaks_threshold: f32,

    /// Gaussian blur kernel size (even values are bumped to odd)
    #[arg(long, default_value_t = 5)]
    gaussian_kernel_size: u32,

    /// CLAHE clip limit
    #[arg(long, default_value_t = 2.0)]
    clahe_clip_limit: f32,

    /// CLAHE tiles per axis
    #[arg(long, default_value_t = 8)]
    clahe_tile_size: u32,

    /// Morphology kernel size (even values are bumped to odd)
    #[arg(long, default_value_t = 3)]
    morphology_kernel_size: u32,

    /// Ring stroke width in the visualization
    #[arg(long, default_value_t = 2)]
    line_thickness: u32,
}

impl SegmentArgs {
    fn params(&self) -> SegmentationParams {
        SegmentationParams {
            back_threshold: self.back_threshold,
            threshold: self.threshold,
            min_diameter: self.min_diameter,
            peaks_rel_threshold: self.peaks_threshold,
            gaussian_kernel_size: self.gaussian_kernel_size,
            clahe_clip_limit: self.clahe_clip_limit,
            clahe_tile_size: self.clahe_tile_size,
            morphology_kernel_size: self.morphology_kernel_size,
        }
    }
}

fn run_segment(args: &SegmentArgs) -> mushroom_segmenter::Result<()> {
    let config = SegmentationConfig::new(args.params())?;
    for warning in config.warnings() {
        log::warn!("{warning}");
    }

    let style = DrawingStyle {
        line_thickness: args.line_thickness,
        ..DrawingStyle::default()
    };
    let visualizer = Visualizer::new(style)?;

    let input_path = validate_image_path(&args.input_image)?;
    let output_csv = validate_output_path(&args.output_csv)?;

    log::info!("Processing image: {}", input_path.display());
    let image = load_image(&input_path)?;

    let segmenter = Segmenter::new(config);
    let circles = segmenter.segment_with_observer(&image, &mut LogObserver)?;
    log::info!("Detected {} objects", circles.len());

    write_csv_file(&circles, &output_csv, true)?;
    log::info!("Results saved to: {}", output_csv.display());

    if let Some(json_path) = &args.output_json {
        let metadata = json!({
            "input": input_path.display().to_string(),
            "width": image.width(),
            "height": image.height(),
            "config": segmenter.config(),
        });
        write_json_file(&circles, json_path, Some(&metadata))?;
        log::info!("JSON results saved to: {}", json_path.display());
    }

    if let Some(vis_path) = &args.save_visualization {
        let annotated = if args.overlay {
            visualizer.create_overlay(&image, &circles, OVERLAY_ALPHA)?
        } else {
            visualizer.draw_circles(&image, &circles)
        };
        save_image(&annotated, vis_path)?;
        log::info!("Visualization saved to: {}", vis_path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Segment(args) => run_segment(args),
    };

    match result {
        Ok(()) => {
            log::info!("Processing completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
