use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;
use tiff::encoder::{TiffEncoder, colortype};

use crate::core::raster::Raster;
use crate::error::Result;

fn write_tiff_to<W: Write + Seek>(writer: W, img: &Raster) -> Result<()> {
    let mut encoder = TiffEncoder::new(writer)?;
    let (cols, rows) = (img.width() as u32, img.height() as u32);
    let data = img.to_interleaved();
    if img.is_gray() {
        encoder.write_image::<colortype::Gray8>(cols, rows, &data)?;
    } else {
        encoder.write_image::<colortype::RGB8>(cols, rows, &data)?;
    }
    Ok(())
}

/// Uncompressed 8-bit TIFF, Gray8 or RGB8 by channel count.
pub fn write_tiff(output: &Path, img: &Raster) -> Result<()> {
    let file = File::create(output)?;
    write_tiff_to(BufWriter::new(file), img)
}

pub fn encode_tiff(img: &Raster) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_tiff_to(&mut cursor, img)?;
    Ok(cursor.into_inner())
}
