//! CSV and JSON writers for detected circles.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::io::{ResourceError, ensure_parent_dir};
use crate::segmentation::Circle;

pub const CSV_HEADER: [&str; 4] = ["X", "Y", "Radius_1", "Radius_2"];

/// JSON document shape: `{ circles, count, metadata? }`.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub circles: &'a [Circle],
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<&'a serde_json::Value>,
}

pub fn write_csv<W: Write>(circles: &[Circle], writer: W, header: bool) -> Result<(), ResourceError> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    if header {
        wtr.write_record(CSV_HEADER)?;
    }
    for c in circles {
        wtr.serialize((c.x, c.y, c.radius1, c.radius2))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv_file(circles: &[Circle], path: impl AsRef<Path>, header: bool) -> Result<(), ResourceError> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    write_csv(circles, File::create(path)?, header)?;
    log::debug!("exported {} circles to {}", circles.len(), path.display());
    Ok(())
}

pub fn write_json<W: Write>(
    circles: &[Circle],
    writer: W,
    metadata: Option<&serde_json::Value>,
) -> Result<(), ResourceError> {
    let report = JsonReport {
        circles,
        count: circles.len(),
        metadata,
    };
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn write_json_file(
    circles: &[Circle],
    path: impl AsRef<Path>,
    metadata: Option<&serde_json::Value>,
) -> Result<(), ResourceError> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    write_json(circles, File::create(path)?, metadata)?;
    log::debug!("exported JSON results to {}", path.display());
    Ok(())
}
