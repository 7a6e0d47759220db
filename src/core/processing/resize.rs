use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use tracing::debug;

use crate::core::raster::Raster;
use crate::error::{Error, Result};

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum ResampleFilter {
    Nearest,
    #[default]
    Bilinear,
    Lanczos3,
}

impl ResampleFilter {
    fn algorithm(&self) -> ResizeAlg {
        match self {
            ResampleFilter::Nearest => ResizeAlg::Nearest,
            ResampleFilter::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
            ResampleFilter::Lanczos3 => ResizeAlg::Convolution(FilterType::Lanczos3),
        }
    }
}

fn to_u32(value: usize, arg: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::invalid(arg, value))
}

/// Resize to an exact `target_cols` x `target_rows`, keeping the channel count.
pub fn resize_raster(
    img: &Raster,
    target_cols: usize,
    target_rows: usize,
    filter: ResampleFilter,
) -> Result<Raster> {
    if target_cols == 0 || target_rows == 0 {
        return Err(Error::EmptyImage {
            width: target_cols,
            height: target_rows,
        });
    }
    if target_cols == img.width() && target_rows == img.height() {
        return Ok(img.clone());
    }
    debug!(
        "resize_raster: {}x{} -> {}x{} ({:?})",
        img.width(),
        img.height(),
        target_cols,
        target_rows,
        filter
    );

    let pixel_type = if img.is_gray() {
        PixelType::U8
    } else {
        PixelType::U8x3
    };
    let resize_options = ResizeOptions::new().resize_alg(filter.algorithm());
    let mut resizer = Resizer::new();

    let src_image = Image::from_vec_u8(
        to_u32(img.width(), "width")?,
        to_u32(img.height(), "height")?,
        img.to_interleaved(),
        pixel_type,
    )
    .map_err(Error::external)?;
    let mut dst_image = Image::new(
        to_u32(target_cols, "width")?,
        to_u32(target_rows, "height")?,
        pixel_type,
    );
    resizer
        .resize(&src_image, &mut dst_image, &resize_options)
        .map_err(Error::external)?;

    let data = dst_image.into_vec();
    if img.is_gray() {
        Raster::from_gray(target_cols, target_rows, data)
    } else {
        Raster::from_rgb(target_cols, target_rows, data)
    }
}

/// Bilinear resize of `img` onto the size of `base`.
pub fn resize_to_match(img: &Raster, base: &Raster) -> Result<Raster> {
    resize_raster(img, base.width(), base.height(), ResampleFilter::Bilinear)
}

/// Fit the long side to `target_size`, never upscaling.
pub fn calculate_resize_dimensions(
    original_cols: usize,
    original_rows: usize,
    target_size: usize,
) -> (usize, usize) {
    let short_side = original_rows.min(original_cols);
    let long_side = original_rows.max(original_cols);

    if target_size >= long_side {
        return (original_cols, original_rows);
    }

    let scale_factor = target_size as f64 / long_side as f64;
    let new_short_side = ((short_side as f64 * scale_factor).round() as usize).max(1);

    if original_cols > original_rows {
        (target_size, new_short_side)
    } else {
        (new_short_side, target_size)
    }
}
