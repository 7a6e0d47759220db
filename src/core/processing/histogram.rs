//! 256-bin histograms, summary statistics, histogram equalization and a
//! simple bar-chart rendering for display.
use ndarray::{Array2, Array3, ArrayView2, Axis, Zip};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::processing::adjust::Lut;
use crate::core::processing::effects::luma_plane;
use crate::core::raster::Raster;
use crate::error::{Error, Result};

pub const NUM_BINS: usize = 256;

/// Summary statistics derived from a histogram.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelStats {
    pub count: u64,
    pub min: u8,
    pub max: u8,
    pub mean: f64,
    pub std: f64,
    pub median: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelHistogram {
    pub name: String,
    pub bins: Vec<u64>,
    pub stats: ChannelStats,
}

/// Per-channel histograms of one raster. RGB rasters carry R, G, B and Luma
/// series; gray rasters carry a single Gray series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub width: usize,
    pub height: usize,
    pub channels: Vec<ChannelHistogram>,
}

impl Histogram {
    pub fn channel(&self, name: &str) -> Option<&ChannelHistogram> {
        self.channels.iter().find(|c| c.name == name)
    }
}

/// Count occurrences of each 8-bit value in a plane.
pub fn count_bins(plane: ArrayView2<u8>) -> [u64; NUM_BINS] {
    let mut bins = [0u64; NUM_BINS];
    for &v in plane.iter() {
        bins[v as usize] += 1;
    }
    bins
}

/// Statistics straight from the bins, without revisiting the pixels.
pub fn stats_from_bins(bins: &[u64; NUM_BINS]) -> ChannelStats {
    let count: u64 = bins.iter().sum();
    if count == 0 {
        return ChannelStats::default();
    }

    let min = bins.iter().position(|&n| n > 0).unwrap_or(0) as u8;
    let max = bins.iter().rposition(|&n| n > 0).unwrap_or(0) as u8;

    let mut sum = 0.0_f64;
    for (v, &n) in bins.iter().enumerate() {
        sum += v as f64 * n as f64;
    }
    let mean = sum / count as f64;
    let mut m2 = 0.0_f64;
    for (v, &n) in bins.iter().enumerate() {
        let d = v as f64 - mean;
        m2 += d * d * n as f64;
    }
    let std = (m2 / count as f64).sqrt();

    // Invert the CDF at floor(n * 0.5), clamped to the last sample
    let mut target = count / 2;
    if target >= count {
        target = count - 1;
    }
    let mut cumsum = 0u64;
    let mut median = max;
    for (v, &n) in bins.iter().enumerate() {
        cumsum += n;
        if target < cumsum {
            median = v as u8;
            break;
        }
    }

    ChannelStats {
        count,
        min,
        max,
        mean,
        std,
        median,
    }
}

fn series(name: &str, plane: ArrayView2<u8>) -> ChannelHistogram {
    let bins = count_bins(plane);
    ChannelHistogram {
        name: name.to_string(),
        bins: bins.to_vec(),
        stats: stats_from_bins(&bins),
    }
}

/// Histogram of every channel, plus BT.709 luma for RGB input.
pub fn compute_histogram(img: &Raster) -> Histogram {
    let channels = if img.is_gray() {
        vec![series("Gray", img.plane(0))]
    } else {
        let luma = luma_plane(img);
        vec![
            series("R", img.plane(0)),
            series("G", img.plane(1)),
            series("B", img.plane(2)),
            series("Luma", luma.view()),
        ]
    };
    Histogram {
        width: img.width(),
        height: img.height(),
        channels,
    }
}

/// Equalization LUT: normalized CDF, with empty leading bins mapped to 0.
pub fn equalization_lut(bins: &[u64; NUM_BINS]) -> Lut {
    let mut cdf = [0u64; NUM_BINS];
    let mut acc = 0u64;
    for (i, &n) in bins.iter().enumerate() {
        acc += n;
        cdf[i] = acc;
    }
    let cdf_min = cdf.iter().copied().find(|&c| c > 0).unwrap_or(0) as f64;
    let cdf_max = acc as f64;
    let span = cdf_max - cdf_min + 1e-12;

    let mut lut = [0u8; NUM_BINS];
    for (slot, &c) in lut.iter_mut().zip(cdf.iter()) {
        if c > 0 {
            *slot = ((c as f64 - cdf_min) * 255.0 / span).clamp(0.0, 255.0) as u8;
        }
    }
    lut
}

/// Equalize one gray plane.
pub fn equalize_plane(plane: ArrayView2<u8>) -> Array2<u8> {
    let lut = equalization_lut(&count_bins(plane));
    plane.mapv(|v| lut[v as usize])
}

/// Equalize each channel independently. Gray input stays gray.
pub fn equalize_per_channel(img: &Raster) -> Raster {
    debug!("equalize_per_channel: {} channels", img.channels());
    let mut out = img.clone();
    for c in 0..img.channels() {
        let eq = equalize_plane(img.plane(c));
        out.array_mut().index_axis_mut(Axis(2), c).assign(&eq);
    }
    out
}

/// Equalize luma and rescale RGB by the per-pixel gain `leq / max(l, 1)`.
pub fn equalize_luma(img: &Raster) -> Raster {
    debug!("equalize_luma");
    let rgb = img.to_rgb();
    let luma = luma_plane(&rgb);
    let leq = equalize_plane(luma.view());

    let mut out = rgb.clone();
    Zip::from(out.array_mut().lanes_mut(Axis(2)))
        .and(&luma)
        .and(&leq)
        .for_each(|mut px, &l, &le| {
            let gain = (le as f64 + 1e-6) / (l as f64).max(1.0);
            for v in px.iter_mut() {
                *v = (*v as f64 * gain).clamp(0.0, 255.0) as u8;
            }
        });
    out
}

fn series_color(name: &str) -> [u8; 3] {
    match name {
        "R" => [230, 40, 40],
        "G" => [40, 200, 40],
        "B" => [50, 90, 240],
        "Luma" => [150, 150, 150],
        _ => [235, 235, 235],
    }
}

/// Draw the histogram as an RGB bar chart on a black background.
/// Overlapping series are combined with a lighten blend, bar heights are
/// scaled to the tallest bin across all series.
pub fn render_histogram(hist: &Histogram, width: usize, height: usize) -> Result<Raster> {
    if width == 0 || height == 0 {
        return Err(Error::EmptyImage { width, height });
    }
    let peak = hist
        .channels
        .iter()
        .flat_map(|c| c.bins.iter().copied())
        .max()
        .unwrap_or(0)
        .max(1);

    let mut canvas = Array3::<u8>::zeros((height, width, 3));
    for ch in &hist.channels {
        let color = series_color(&ch.name);
        for x in 0..width {
            let bin = (x * NUM_BINS / width).min(NUM_BINS - 1);
            let n = ch.bins.get(bin).copied().unwrap_or(0);
            let bar = ((n as f64 / peak as f64) * height as f64).round() as usize;
            for y in height.saturating_sub(bar)..height {
                for c in 0..3 {
                    let px = &mut canvas[[y, x, c]];
                    *px = (*px).max(color[c]);
                }
            }
        }
    }
    Raster::new(canvas)
}
