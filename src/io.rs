//! Image loading/saving and path checks around the pipeline.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;

pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

/// Failures reading inputs or writing artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("image file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("path is not a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("unsupported image format {ext:?} for {}; supported: {}", path.display(), SUPPORTED_EXTENSIONS.join(", "))]
    UnsupportedFormat { path: PathBuf, ext: String },
    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn is_image_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(OsStr::to_str) else {
        return false;
    };
    SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

fn check_extension(path: &Path) -> Result<(), ResourceError> {
    if is_image_file(path) {
        return Ok(());
    }
    Err(ResourceError::UnsupportedFormat {
        path: path.to_path_buf(),
        ext: path
            .extension()
            .and_then(OsStr::to_str)
            .unwrap_or_default()
            .to_string(),
    })
}

/// Input must exist, be a regular file and carry a supported extension.
pub fn validate_image_path(path: impl AsRef<Path>) -> Result<PathBuf, ResourceError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ResourceError::NotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(ResourceError::NotAFile(path.to_path_buf()));
    }
    check_extension(path)?;
    Ok(path.to_path_buf())
}

/// Makes sure the parent directory of an output path exists.
pub fn validate_output_path(path: impl AsRef<Path>) -> Result<PathBuf, ResourceError> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    Ok(path.to_path_buf())
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), ResourceError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| ResourceError::OutputDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

pub fn load_image(path: impl AsRef<Path>) -> Result<RgbImage, ResourceError> {
    let path = path.as_ref();
    check_extension(path)?;
    let img = image::open(path)?.to_rgb8();
    log::debug!("loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img)
}

/// Encodes by file extension, creating parent directories first.
pub fn save_image(image: &RgbImage, path: impl AsRef<Path>) -> Result<(), ResourceError> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    image.save(path)?;
    log::debug!("saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_insensitive() {
        assert!(is_image_file(Path::new("a/b/shrooms.JPG")));
        assert!(is_image_file(Path::new("x.tiff")));
        assert!(!is_image_file(Path::new("x.gif")));
        assert!(!is_image_file(Path::new("noext")));
    }
}
