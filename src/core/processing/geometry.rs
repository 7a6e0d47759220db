//! Crop, area zoom and free-angle rotation.
//!
//! Coordinates are pixel indices with `(x1, y1)` inclusive and `(x2, y2)`
//! exclusive. Rotation angles are in degrees, counter-clockwise as seen on screen.
use ndarray::{Array3, s};
use tracing::debug;

use crate::core::processing::effects::luma;
use crate::core::processing::resize::{ResampleFilter, resize_raster};
use crate::core::raster::Raster;
use crate::error::{Error, Result};

/// Axis-aligned pixel rectangle; `x2`/`y2` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl Rect {
    pub fn new(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Clamp into an image of `width` x `height`. Never collapses to zero area.
    pub fn clamp_to(&self, width: usize, height: usize) -> (usize, usize, usize, usize) {
        let (w, h) = (width as i64, height as i64);
        let x1 = self.x1.clamp(0, w - 1);
        let y1 = self.y1.clamp(0, h - 1);
        let x2 = self.x2.clamp(x1 + 1, w);
        let y2 = self.y2.clamp(y1 + 1, h);
        (x1 as usize, y1 as usize, x2 as usize, y2 as usize)
    }
}

pub fn crop(img: &Raster, rect: Rect) -> Raster {
    let (x1, y1, x2, y2) = rect.clamp_to(img.width(), img.height());
    debug!("crop: ({}, {}) .. ({}, {})", x1, y1, x2, y2);
    Raster::wrap(img.view().slice(s![y1..y2, x1..x2, ..]).to_owned())
}

/// Largest zoom output side; the JPEG limit.
pub const MAX_ZOOM_SIDE: usize = u16::MAX as usize;

fn zoomed_side(lo: i64, hi: i64, scale: f64, arg: &'static str) -> Result<usize> {
    let side = (hi.saturating_sub(lo) as f64 * scale).floor().max(1.0);
    if side > MAX_ZOOM_SIDE as f64 {
        return Err(Error::invalid(arg, side));
    }
    Ok(side as usize)
}

/// Crop `rect`, then scale it by `scale` with bilinear filtering. The output
/// size follows the requested rectangle, not the clamped one, and each side
/// is capped at `MAX_ZOOM_SIDE`.
pub fn zoom(img: &Raster, rect: Rect, scale: f64) -> Result<Raster> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::invalid("scale", scale));
    }
    let cols = zoomed_side(rect.x1, rect.x2, scale, "width")?;
    let rows = zoomed_side(rect.y1, rect.y2, scale, "height")?;
    let sub = crop(img, rect);
    debug!("zoom: scale={:.2} -> {}x{}", scale, cols, rows);
    resize_raster(&sub, cols, rows, ResampleFilter::Bilinear)
}

/// Output canvas size after rotating a `width` x `height` image.
pub fn rotated_bounds(width: usize, height: usize, angle_deg: f64) -> (usize, usize) {
    let theta = angle_deg.to_radians();
    let (sin, cos) = theta.sin_cos();
    let (hw, hh) = (width as f64 / 2.0, height as f64 / 2.0);
    let corners = [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)];

    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for (x, y) in corners {
        let rx = x * cos + y * sin;
        let ry = -x * sin + y * cos;
        min_x = min_x.min(rx);
        max_x = max_x.max(rx);
        min_y = min_y.min(ry);
        max_y = max_y.max(ry);
    }
    // Tolerance absorbs cos/sin noise at right angles
    let cols = ((max_x - min_x) - 1e-9).ceil().max(1.0) as usize;
    let rows = ((max_y - min_y) - 1e-9).ceil().max(1.0) as usize;
    (cols, rows)
}

/// Rotate counter-clockwise by `angle_deg` with bilinear sampling.
///
/// With `expand` the canvas grows to hold the whole rotated image, otherwise
/// the input size is kept and corners are clipped. Uncovered pixels get
/// `fill` (its luma on gray rasters).
pub fn rotate(img: &Raster, angle_deg: f64, expand: bool, fill: [u8; 3]) -> Result<Raster> {
    if !angle_deg.is_finite() {
        return Err(Error::invalid("angle", angle_deg));
    }
    let (w, h, ch) = (img.width(), img.height(), img.channels());
    let (out_w, out_h) = if expand {
        rotated_bounds(w, h, angle_deg)
    } else {
        (w, h)
    };
    debug!(
        "rotate: {:.2} deg, {}x{} -> {}x{}",
        angle_deg, w, h, out_w, out_h
    );

    let fill_px: Vec<u8> = if ch == 1 {
        vec![luma(fill[0], fill[1], fill[2])]
    } else {
        fill.to_vec()
    };

    let theta = angle_deg.to_radians();
    let (sin, cos) = theta.sin_cos();
    let (cx, cy) = (w as f64 / 2.0, h as f64 / 2.0);
    let (ocx, ocy) = (out_w as f64 / 2.0, out_h as f64 / 2.0);
    let src = img.view();
    let max_x = (w - 1) as f64;
    let max_y = (h - 1) as f64;
    const EPS: f64 = 1e-6;

    let mut out = Array3::<u8>::zeros((out_h, out_w, ch));
    for oy in 0..out_h {
        for ox in 0..out_w {
            // Inverse mapping from output pixel centre to source coordinates
            let dx = ox as f64 + 0.5 - ocx;
            let dy = oy as f64 + 0.5 - ocy;
            let sx = dx * cos - dy * sin + cx - 0.5;
            let sy = dx * sin + dy * cos + cy - 0.5;

            if sx < -EPS || sy < -EPS || sx > max_x + EPS || sy > max_y + EPS {
                for c in 0..ch {
                    out[[oy, ox, c]] = fill_px[c];
                }
                continue;
            }

            let sx = sx.clamp(0.0, max_x);
            let sy = sy.clamp(0.0, max_y);
            let x0 = sx.floor() as usize;
            let y0 = sy.floor() as usize;
            let x1 = (x0 + 1).min(w - 1);
            let y1 = (y0 + 1).min(h - 1);
            let fx = sx - x0 as f64;
            let fy = sy - y0 as f64;

            for c in 0..ch {
                let top = src[[y0, x0, c]] as f64 * (1.0 - fx) + src[[y0, x1, c]] as f64 * fx;
                let bottom = src[[y1, x0, c]] as f64 * (1.0 - fx) + src[[y1, x1, c]] as f64 * fx;
                let v = top * (1.0 - fy) + bottom * fy;
                out[[oy, ox, c]] = (v + 0.5).clamp(0.0, 255.0) as u8;
            }
        }
    }
    Raster::new(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(w: usize, h: usize) -> Raster {
        Raster::from_gray(w, h, (0..(w * h) as u8).collect()).unwrap()
    }

    #[test]
    fn crop_clamps_and_never_empties() {
        let img = numbered(4, 3);
        let c = crop(&img, Rect::new(1, 1, 3, 3));
        assert_eq!((c.width(), c.height()), (2, 2));
        assert_eq!(c.to_interleaved(), vec![5, 6, 9, 10]);

        let c = crop(&img, Rect::new(-5, -5, 100, 100));
        assert_eq!((c.width(), c.height()), (4, 3));

        let c = crop(&img, Rect::new(10, 10, 2, 2));
        assert_eq!((c.width(), c.height()), (1, 1));
        assert_eq!(c.pixel(0, 0), vec![11]);
    }

    #[test]
    fn zoom_scales_requested_area() {
        let img = Raster::filled(10, 10, 3, 50).unwrap();
        let z = zoom(&img, Rect::new(2, 2, 6, 5), 2.0).unwrap();
        assert_eq!((z.width(), z.height()), (8, 6));
        assert!(zoom(&img, Rect::new(0, 0, 2, 2), 0.0).is_err());
        let tiny = zoom(&img, Rect::new(0, 0, 2, 2), 0.1).unwrap();
        assert_eq!((tiny.width(), tiny.height()), (1, 1));
    }

    #[test]
    fn zoom_rejects_oversized_output() {
        let img = Raster::filled(10, 10, 3, 50).unwrap();
        assert!(matches!(
            zoom(&img, Rect::new(0, 0, 70_000, 1), 1.0),
            Err(Error::InvalidArgument { arg: "width", .. })
        ));
        assert!(matches!(
            zoom(&img, Rect::new(0, 0, 4, 4), 1e9),
            Err(Error::InvalidArgument { arg: "width", .. })
        ));
        assert!(zoom(&img, Rect::new(i64::MIN, 0, i64::MAX, 1), 1.0).is_err());
        let edge = zoom(&img, Rect::new(0, 0, MAX_ZOOM_SIDE as i64, 1), 1.0).unwrap();
        assert_eq!(edge.width(), MAX_ZOOM_SIDE);
    }

    #[test]
    fn rotate_zero_is_identity() {
        let img = numbered(3, 2);
        assert_eq!(rotate(&img, 0.0, true, [0, 0, 0]).unwrap(), img);
    }

    #[test]
    fn rotate_quarter_turn_counter_clockwise() {
        // 0 1 2
        // 3 4 5
        let img = numbered(3, 2);
        let r = rotate(&img, 90.0, true, [0, 0, 0]).unwrap();
        assert_eq!((r.width(), r.height()), (2, 3));
        // top-right corner moves to the top-left
        assert_eq!(r.to_interleaved(), vec![2, 5, 1, 4, 0, 3]);
    }

    #[test]
    fn rotate_without_expand_keeps_size_and_fills() {
        let img = Raster::filled(10, 4, 3, 200).unwrap();
        let r = rotate(&img, 45.0, false, [1, 2, 3]).unwrap();
        assert_eq!((r.width(), r.height()), (10, 4));
        assert_eq!(r.pixel(0, 0), vec![1, 2, 3]);
        assert_eq!(r.pixel(5, 2), vec![200, 200, 200]);
    }

    #[test]
    fn bounds_of_diagonal_rotation() {
        let (w, h) = rotated_bounds(10, 10, 45.0);
        assert_eq!((w, h), (15, 15));
    }
}
