//! Tone adjustments: global and per-channel brightness plus logarithmic,
//! exponential and gamma contrast curves.
//!
//! Every curve is a function of a single 8-bit value, so each one is
//! precomputed into a 256-entry lookup table and then mapped over the
//! raster in parallel. Float results are clamped to [0, 255] and truncated.
use ndarray::Axis;
use tracing::debug;

use crate::core::raster::Raster;
use crate::error::{Error, Result};

pub type Lut = [u8; 256];

/// Build a LUT from a float curve, clamping then truncating.
pub fn build_lut<F: Fn(f64) -> f64>(curve: F) -> Lut {
    let mut lut = [0u8; 256];
    for (v, slot) in lut.iter_mut().enumerate() {
        *slot = curve(v as f64).clamp(0.0, 255.0) as u8;
    }
    lut
}

fn offset_lut(delta: i32) -> Lut {
    let mut lut = [0u8; 256];
    for (v, slot) in lut.iter_mut().enumerate() {
        *slot = (v as i32).saturating_add(delta).clamp(0, 255) as u8;
    }
    lut
}

/// Apply one LUT to every channel.
pub fn apply_lut(img: &Raster, lut: &Lut) -> Raster {
    let mut out = img.clone();
    out.array_mut().par_mapv_inplace(|v| lut[v as usize]);
    out
}

/// Apply one LUT per channel; `luts.len()` must equal the channel count.
pub fn apply_channel_luts(img: &Raster, luts: &[Lut]) -> Raster {
    debug_assert_eq!(luts.len(), img.channels());
    let mut out = img.clone();
    for (c, lut) in luts.iter().enumerate() {
        out.array_mut()
            .index_axis_mut(Axis(2), c)
            .par_mapv_inplace(|v| lut[v as usize]);
    }
    out
}

/// Add `delta` to every sample. Gray stays gray.
pub fn brightness_global(img: &Raster, delta: i32) -> Raster {
    debug!("brightness_global: delta={}", delta);
    apply_lut(img, &offset_lut(delta))
}

/// Add a separate offset to R, G and B. Gray input is promoted to RGB first.
pub fn brightness_per_channel(img: &Raster, delta_r: i32, delta_g: i32, delta_b: i32) -> Raster {
    debug!(
        "brightness_per_channel: r={} g={} b={}",
        delta_r, delta_g, delta_b
    );
    let rgb = img.to_rgb();
    let luts = [offset_lut(delta_r), offset_lut(delta_g), offset_lut(delta_b)];
    apply_channel_luts(&rgb, &luts)
}

/// Scale constant that maps 255 onto 255 for the log curve.
pub fn full_range_log_constant() -> f64 {
    255.0 / (1.0 + 255.0_f64).ln()
}

/// `s = c * ln(1 + r)`; `None` uses the full-range constant.
pub fn log_contrast(img: &Raster, c: Option<f64>) -> Raster {
    let c = c.unwrap_or_else(full_range_log_constant);
    debug!("log_contrast: c={:.4}", c);
    apply_lut(img, &build_lut(|r| c * (1.0 + r).ln()))
}

/// `s = (e^(k r) - 1) / (e^(255 k) - 1) * 255`.
///
/// Larger `k` pushes contrast into the highlights. `k = 0` degenerates to
/// an all-black image because of the epsilon guard in the denominator.
pub fn exp_contrast(img: &Raster, k: f64) -> Raster {
    debug!("exp_contrast: k={:.4}", k);
    let denom = (k * 255.0).exp() - 1.0 + 1e-12;
    apply_lut(img, &build_lut(|r| ((k * r).exp() - 1.0) / denom * 255.0))
}

/// `s = 255 * (r / 255)^gamma`. Below 1 brightens, above 1 darkens.
pub fn gamma(img: &Raster, gamma: f64) -> Result<Raster> {
    if !gamma.is_finite() || gamma < 0.0 {
        return Err(Error::invalid("gamma", gamma));
    }
    debug!("gamma: {:.3}", gamma);
    Ok(apply_lut(
        img,
        &build_lut(|r| (r / 255.0).powf(gamma) * 255.0),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Raster {
        Raster::from_gray(256, 1, (0..=255u8).collect()).unwrap()
    }

    #[test]
    fn brightness_saturates_both_ends() {
        let img = Raster::from_rgb(1, 1, vec![10, 128, 250]).unwrap();
        assert_eq!(brightness_global(&img, 20).pixel(0, 0), vec![30, 148, 255]);
        assert_eq!(brightness_global(&img, -20).pixel(0, 0), vec![0, 108, 230]);
    }

    #[test]
    fn extreme_offsets_clamp_instead_of_wrapping() {
        let img = Raster::from_rgb(1, 1, vec![10, 128, 250]).unwrap();
        assert_eq!(brightness_global(&img, i32::MAX).pixel(0, 0), vec![255, 255, 255]);
        assert_eq!(brightness_global(&img, i32::MIN).pixel(0, 0), vec![0, 0, 0]);
        let out = brightness_per_channel(&img, i32::MAX, i32::MIN, 0);
        assert_eq!(out.pixel(0, 0), vec![255, 0, 250]);
    }

    #[test]
    fn brightness_keeps_gray() {
        let out = brightness_global(&ramp(), 5);
        assert!(out.is_gray());
        assert_eq!(out.pixel(0, 0), vec![5]);
    }

    #[test]
    fn per_channel_promotes_gray() {
        let img = Raster::from_gray(1, 1, vec![100]).unwrap();
        let out = brightness_per_channel(&img, 10, -10, 200);
        assert_eq!(out.pixel(0, 0), vec![110, 90, 255]);
    }

    #[test]
    fn log_default_covers_range() {
        let out = log_contrast(&ramp(), None);
        assert_eq!(out.pixel(0, 0), vec![0]);
        // float rounding may land just under 255
        assert!(out.pixel(255, 0)[0] >= 254);
        // log curve lifts shadows
        assert!(out.pixel(10, 0)[0] > 10);
    }

    #[test]
    fn log_with_explicit_constant() {
        let out = log_contrast(&ramp(), Some(10.0));
        // 10 * ln(256) = 55.45
        assert_eq!(out.pixel(255, 0), vec![55]);
    }

    #[test]
    fn exp_curve_endpoints_and_shape() {
        let out = exp_contrast(&ramp(), 0.02);
        assert_eq!(out.pixel(0, 0), vec![0]);
        assert!(out.pixel(255, 0)[0] >= 254);
        // exponential curve darkens midtones
        assert!(out.pixel(128, 0)[0] < 128);
    }

    #[test]
    fn exp_zero_k_is_black() {
        let out = exp_contrast(&ramp(), 0.0);
        assert!(out.array().iter().all(|&v| v == 0));
    }

    #[test]
    fn gamma_identity_and_validation() {
        let img = ramp();
        let same = gamma(&img, 1.0).unwrap();
        // 255 * (v/255) can fall a hair short of v
        for (a, b) in img.array().iter().zip(same.array().iter()) {
            assert!(a.abs_diff(*b) <= 1);
        }
        assert!(gamma(&img, 0.5).unwrap().pixel(64, 0)[0] > 64);
        assert!(gamma(&img, -1.0).is_err());
        assert!(gamma(&img, f64::NAN).is_err());
    }
}
