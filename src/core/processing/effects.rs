//! Whole-image effects: gray conversion, negative and fixed-threshold binarization.
use ndarray::{Array2, Axis};
use tracing::debug;

use crate::core::processing::adjust::apply_lut;
use crate::core::raster::Raster;
use crate::types::GrayMethod;

/// ITU-R BT.709 luminosity coefficients
pub const LUMA_R: f64 = 0.2126;
pub const LUMA_G: f64 = 0.7152;
pub const LUMA_B: f64 = 0.0722;

/// BT.709 luma of one RGB sample, truncated to u8.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    (LUMA_R * r as f64 + LUMA_G * g as f64 + LUMA_B * b as f64).clamp(0.0, 255.0) as u8
}

/// Single luma plane for any raster; gray input is copied.
pub fn luma_plane(img: &Raster) -> Array2<u8> {
    gray_plane(img, GrayMethod::Luma)
}

fn gray_plane(img: &Raster, method: GrayMethod) -> Array2<u8> {
    if img.is_gray() {
        return img.plane(0).to_owned();
    }
    let (h, w) = (img.height(), img.width());
    let view = img.view();
    Array2::from_shape_fn((h, w), |(y, x)| {
        let (r, g, b) = (view[[y, x, 0]], view[[y, x, 1]], view[[y, x, 2]]);
        match method {
            GrayMethod::Luma => luma(r, g, b),
            GrayMethod::Average => ((r as f64 + g as f64 + b as f64) / 3.0) as u8,
        }
    })
}

/// Convert to a single-channel raster. Gray input is returned unchanged.
pub fn grayscale(img: &Raster, method: GrayMethod) -> Raster {
    debug!("grayscale: method={:?}", method);
    if img.is_gray() {
        return img.clone();
    }
    Raster::wrap(gray_plane(img, method).insert_axis(Axis(2)))
}

/// Photographic negative: `255 - v` on every channel.
pub fn negative(img: &Raster) -> Raster {
    let mut lut = [0u8; 256];
    for (v, slot) in lut.iter_mut().enumerate() {
        *slot = 255 - v as u8;
    }
    apply_lut(img, &lut)
}

/// Luma gray, then `v >= threshold => 255`, else 0. Output is single-channel.
pub fn binarize(img: &Raster, threshold: i32) -> Raster {
    debug!("binarize: threshold={}", threshold);
    let mut lut = [0u8; 256];
    for (v, slot) in lut.iter_mut().enumerate() {
        *slot = if v as i32 >= threshold { 255 } else { 0 };
    }
    apply_lut(&grayscale(img, GrayMethod::Luma), &lut)
}
