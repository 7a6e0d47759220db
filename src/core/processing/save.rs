use std::path::Path;

use tracing::info;

use crate::core::processing::resize::{ResampleFilter, calculate_resize_dimensions, resize_raster};
use crate::core::raster::Raster;
use crate::error::Result;
use crate::io::writers::metadata::{EditMetadata, create_metadata_sidecar};
use crate::io::writers::write;
use crate::types::OutputFormat;

/// Fit the long side of `img` to `target_size` with Lanczos3, never upscaling.
pub fn downscale_to(img: &Raster, target_size: Option<usize>) -> Result<Raster> {
    let Some(target) = target_size else {
        return Ok(img.clone());
    };
    let (cols, rows) = calculate_resize_dimensions(img.width(), img.height(), target);
    if (cols, rows) == (img.width(), img.height()) {
        return Ok(img.clone());
    }
    info!(
        "Resizing {}x{} -> {}x{}",
        img.width(),
        img.height(),
        cols,
        rows
    );
    resize_raster(img, cols, rows, ResampleFilter::Lanczos3)
}

/// Write `img` to `output`, optionally downscaled, with an optional JSON
/// sidecar describing the edit. The format falls back to the output extension.
pub fn save_raster(
    img: &Raster,
    output: &Path,
    format: Option<OutputFormat>,
    target_size: Option<usize>,
    quality: u8,
    metadata: Option<EditMetadata>,
) -> Result<()> {
    let format = match format {
        Some(f) => f,
        None => OutputFormat::from_path(output)?,
    };
    let final_img = downscale_to(img, target_size)?;
    write(&final_img, output, format, quality)?;

    if let Some(mut meta) = metadata {
        meta.width = final_img.width();
        meta.height = final_img.height();
        meta.channels = final_img.channels();
        meta.format = format.extension().to_string();
        create_metadata_sidecar(output, &meta)?;
    }

    info!(
        "save_raster: {} {}x{} written to {:?}",
        format,
        final_img.width(),
        final_img.height(),
        output
    );
    Ok(())
}
