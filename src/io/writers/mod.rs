//! Output encoders for JPEG, PNG and TIFF, plus the JSON metadata sidecar.
pub mod jpeg;
pub mod metadata;
pub mod png;
pub mod tiff;

use std::path::Path;

use crate::core::raster::Raster;
use crate::error::Result;
use crate::types::OutputFormat;

/// Encode to bytes in the requested format.
pub fn encode(img: &Raster, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Jpeg => jpeg::encode_jpeg(img, quality),
        OutputFormat::Png => png::encode_png(img),
        OutputFormat::Tiff => self::tiff::encode_tiff(img),
    }
}

/// Write to `output` in the requested format.
pub fn write(img: &Raster, output: &Path, format: OutputFormat, quality: u8) -> Result<()> {
    match format {
        OutputFormat::Jpeg => jpeg::write_jpeg(output, img, quality),
        OutputFormat::Png => png::write_png(output, img),
        OutputFormat::Tiff => self::tiff::write_tiff(output, img),
    }
}
