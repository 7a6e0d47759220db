use std::path::Path;

use image::ImageReader;
use tracing::debug;

use crate::core::raster::Raster;
use crate::error::Result;

/// Decode any supported container (JPEG, PNG, GIF, BMP, TIFF, WebP) from memory.
pub fn decode_bytes(bytes: &[u8]) -> Result<Raster> {
    let img = image::load_from_memory(bytes)?;
    debug!(
        "decoded {}x{} {:?}",
        img.width(),
        img.height(),
        img.color()
    );
    Raster::from_dynamic(img)
}

/// Read and decode an image file, sniffing the format from content.
pub fn load_image(path: &Path) -> Result<Raster> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    debug!("loaded {:?}: {}x{}", path, img.width(), img.height());
    Raster::from_dynamic(img)
}

/// Extensions accepted when scanning directories.
pub fn is_supported_extension(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|e| {
            matches!(
                e.as_str(),
                "jpg" | "jpeg" | "png" | "gif" | "bmp" | "tif" | "tiff" | "webp"
            )
        })
}
