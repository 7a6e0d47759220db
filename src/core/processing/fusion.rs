//! Two-image fusion: plain alpha blending and blending after histogram equalization.
use ndarray::Zip;
use tracing::{debug, info};

use crate::core::processing::histogram::{equalize_luma, equalize_per_channel};
use crate::core::processing::resize::resize_to_match;
use crate::core::raster::Raster;
use crate::error::Result;
use crate::types::FusionMode;

/// `s = alpha * a + (1 - alpha) * b`.
///
/// Both inputs are promoted to RGB, `b` is resized bilinearly to `a`'s size
/// and `alpha` is clamped to [0, 1].
pub fn blend(a: &Raster, b: &Raster, alpha: f64) -> Result<Raster> {
    let alpha = if alpha.is_nan() { 0.5 } else { alpha.clamp(0.0, 1.0) };
    let a = a.to_rgb();
    let b = resize_to_match(&b.to_rgb(), &a)?;
    debug!(
        "blend: alpha={:.3} size={}x{}",
        alpha,
        a.width(),
        a.height()
    );

    let mut out = a.clone();
    Zip::from(out.array_mut())
        .and(b.array())
        .par_for_each(|o, &bv| {
            let s = alpha * (*o as f64) + (1.0 - alpha) * bv as f64;
            *o = s.clamp(0.0, 255.0) as u8;
        });
    Ok(out)
}

/// Equalize both images, per channel or through luma, then blend.
pub fn blend_equalized(a: &Raster, b: &Raster, alpha: f64, per_channel: bool) -> Result<Raster> {
    let a = a.to_rgb();
    let b = resize_to_match(&b.to_rgb(), &a)?;
    let (a_eq, b_eq) = if per_channel {
        (equalize_per_channel(&a), equalize_per_channel(&b))
    } else {
        (equalize_luma(&a), equalize_luma(&b))
    };
    blend(&a_eq, &b_eq, alpha)
}

pub fn fuse(
    a: &Raster,
    b: &Raster,
    mode: FusionMode,
    alpha: f64,
    per_channel: bool,
) -> Result<Raster> {
    info!("Fusing images: mode={} alpha={:.2}", mode, alpha);
    match mode {
        FusionMode::Normal => blend(a, b, alpha),
        FusionMode::Equalized => blend_equalized(a, b, alpha, per_channel),
    }
}
