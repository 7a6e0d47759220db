//! RGB and CMYK layer extraction.
//!
//! CMYK planes are derived from RGB with the naive subtractive model
//! `K = 1 - max(R', G', B')`, `C = (1 - R' - K) / (1 - K)` and so on. They are
//! quantized to u8 and reconstructed with `R = 1 - min(1, C + K)`.
use ndarray::{Array3, Axis, Zip};
use tracing::debug;

use crate::core::raster::Raster;
use crate::types::{CmykLayer, RgbLayer};

/// `(height, width, 4)` array of C, M, Y, K planes in 0..=255.
pub type CmykPlanes = Array3<u8>;

/// Keep one RGB channel and zero the other two. Gray input is promoted first.
pub fn extract_rgb_layer(img: &Raster, layer: RgbLayer) -> Raster {
    debug!("extract_rgb_layer: {}", layer);
    let mut out = img.to_rgb();
    for (c, mut plane) in out.array_mut().axis_iter_mut(Axis(2)).enumerate() {
        if c != layer.index() {
            plane.fill(0);
        }
    }
    out
}

/// All three RGB layers in R, G, B order.
pub fn extract_rgb_layers(img: &Raster) -> Vec<Raster> {
    RgbLayer::ALL
        .iter()
        .map(|&l| extract_rgb_layer(img, l))
        .collect()
}

#[inline]
fn rgb_to_cmyk_px(r: u8, g: u8, b: u8) -> [u8; 4] {
    let (r, g, b) = (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);
    let k = 1.0 - r.max(g).max(b);
    let denom = (1.0 - k) + 1e-12;
    let q = |v: f64| (v * 255.0).clamp(0.0, 255.0) as u8;
    [
        q((1.0 - r - k) / denom),
        q((1.0 - g - k) / denom),
        q((1.0 - b - k) / denom),
        q(k),
    ]
}

/// Convert to quantized CMYK planes.
pub fn rgb_to_cmyk(img: &Raster) -> CmykPlanes {
    let rgb = img.to_rgb();
    let mut out = Array3::<u8>::zeros((rgb.height(), rgb.width(), 4));
    Zip::from(out.lanes_mut(Axis(2)))
        .and(rgb.array().lanes(Axis(2)))
        .par_for_each(|mut dst, src| {
            let cmyk = rgb_to_cmyk_px(src[0], src[1], src[2]);
            for (d, v) in dst.iter_mut().zip(cmyk) {
                *d = v;
            }
        });
    out
}

/// Four masked copies of the CMYK planes, each keeping one plane only.
pub fn extract_cmyk_layers(img: &Raster) -> Vec<CmykPlanes> {
    let cmyk = rgb_to_cmyk(img);
    CmykLayer::ALL
        .iter()
        .map(|layer| {
            let mut masked = cmyk.clone();
            for (i, mut plane) in masked.axis_iter_mut(Axis(2)).enumerate() {
                if i != layer.index() {
                    plane.fill(0);
                }
            }
            masked
        })
        .collect()
}

/// Reconstruct RGB from quantized CMYK planes.
pub fn cmyk_to_rgb(cmyk: &CmykPlanes) -> Raster {
    let (h, w, _) = cmyk.dim();
    let mut out = Array3::<u8>::zeros((h, w, 3));
    Zip::from(out.lanes_mut(Axis(2)))
        .and(cmyk.lanes(Axis(2)))
        .par_for_each(|mut dst, src| {
            let k = src[3] as f64 / 255.0;
            for c in 0..3 {
                let v = src[c] as f64 / 255.0;
                dst[c] = ((1.0 - (v + k).min(1.0)) * 255.0).clamp(0.0, 255.0) as u8;
            }
        });
    Raster::wrap(out)
}

/// Zero one CMYK plane and rebuild RGB.
pub fn suppress_cmyk_layer(img: &Raster, layer: CmykLayer) -> Raster {
    debug!("suppress_cmyk_layer: {}", layer);
    let mut cmyk = rgb_to_cmyk(img);
    cmyk.index_axis_mut(Axis(2), layer.index()).fill(0);
    cmyk_to_rgb(&cmyk)
}

/// Viewable rendering of one CMYK plane: the other three are zeroed and the
/// result is reconstructed to RGB.
pub fn extract_cmyk_layer(img: &Raster, layer: CmykLayer) -> Raster {
    debug!("extract_cmyk_layer: {}", layer);
    let mut cmyk = rgb_to_cmyk(img);
    for (i, mut plane) in cmyk.axis_iter_mut(Axis(2)).enumerate() {
        if i != layer.index() {
            plane.fill(0);
        }
    }
    cmyk_to_rgb(&cmyk)
}
