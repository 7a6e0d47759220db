use jpeg_encoder::{ColorType, Encoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::core::raster::Raster;
use crate::error::{Error, Result};

/// Quality used for data URLs and default file output.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

fn check_dimensions(img: &Raster) -> Result<(u16, u16)> {
    let cols = u16::try_from(img.width()).map_err(|_| Error::invalid("width", img.width()))?;
    let rows = u16::try_from(img.height()).map_err(|_| Error::invalid("height", img.height()))?;
    Ok((cols, rows))
}

fn color_type(img: &Raster) -> ColorType {
    if img.is_gray() {
        ColorType::Luma
    } else {
        ColorType::Rgb
    }
}

/// Encode to an in-memory JPEG. Gray rasters produce single-channel JPEGs.
pub fn encode_jpeg(img: &Raster, quality: u8) -> Result<Vec<u8>> {
    let (cols, rows) = check_dimensions(img)?;
    let mut buf = Vec::new();
    let encoder = Encoder::new(&mut buf, quality.clamp(1, 100));
    encoder.encode(&img.to_interleaved(), cols, rows, color_type(img))?;
    Ok(buf)
}

pub fn write_jpeg(output: &Path, img: &Raster, quality: u8) -> Result<()> {
    let (cols, rows) = check_dimensions(img)?;
    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    let encoder = Encoder::new(&mut writer, quality.clamp(1, 100));
    encoder.encode(&img.to_interleaved(), cols, rows, color_type(img))?;
    Ok(())
}
