use std::io::Cursor;
use std::path::Path;

use image::ImageFormat;

use crate::core::raster::Raster;
use crate::error::Result;

pub fn encode_png(img: &Raster) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    img.to_dynamic()?.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}

pub fn write_png(output: &Path, img: &Raster) -> Result<()> {
    img.to_dynamic()?.save_with_format(output, ImageFormat::Png)?;
    Ok(())
}
