//! 8-bit raster container shared by every processing stage.
//!
//! Pixels live in an `ndarray::Array3<u8>` shaped `(height, width, channels)`
//! where `channels` is 1 (gray) or 3 (RGB). Alpha is dropped on the way in.
use image::{DynamicImage, GrayImage, RgbImage};
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    data: Array3<u8>,
}

impl Raster {
    /// Wrap an `(height, width, channels)` array. Rejects empty images and
    /// channel counts other than 1 or 3.
    pub fn new(data: Array3<u8>) -> Result<Self> {
        let (height, width, channels) = data.dim();
        if height == 0 || width == 0 {
            return Err(Error::EmptyImage { width, height });
        }
        if channels != 1 && channels != 3 {
            return Err(Error::UnsupportedChannels { channels });
        }
        Ok(Self { data })
    }

    /// Wrap an array already known to satisfy the shape rules.
    pub(crate) fn wrap(data: Array3<u8>) -> Self {
        debug_assert!(data.dim().0 > 0 && data.dim().1 > 0);
        debug_assert!(matches!(data.dim().2, 1 | 3));
        Self { data }
    }

    pub fn from_gray(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        let data = Array3::from_shape_vec((height, width, 1), pixels).map_err(Error::external)?;
        Self::new(data)
    }

    pub fn from_rgb(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        let data = Array3::from_shape_vec((height, width, 3), pixels).map_err(Error::external)?;
        Self::new(data)
    }

    pub fn from_plane(plane: Array2<u8>) -> Result<Self> {
        Self::new(plane.insert_axis(Axis(2)))
    }

    /// Uniform image filled with `value` in every channel.
    pub fn filled(width: usize, height: usize, channels: usize, value: u8) -> Result<Self> {
        Self::new(Array3::from_elem((height, width, channels), value))
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    pub fn is_gray(&self) -> bool {
        self.channels() == 1
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    pub fn plane(&self, channel: usize) -> ArrayView2<'_, u8> {
        self.data.index_axis(Axis(2), channel)
    }

    pub fn array(&self) -> &Array3<u8> {
        &self.data
    }

    pub fn array_mut(&mut self) -> &mut Array3<u8> {
        &mut self.data
    }

    pub fn into_array(self) -> Array3<u8> {
        self.data
    }

    /// Row-major interleaved bytes.
    pub fn to_interleaved(&self) -> Vec<u8> {
        match self.data.as_slice() {
            Some(s) => s.to_vec(),
            None => self.data.iter().copied().collect(),
        }
    }

    /// Replicate gray into R=G=B; RGB input is returned as-is.
    pub fn to_rgb(&self) -> Raster {
        if !self.is_gray() {
            return self.clone();
        }
        let (h, w, _) = self.data.dim();
        let gray = self.plane(0);
        let data = Array3::from_shape_fn((h, w, 3), |(y, x, _)| gray[[y, x]]);
        Raster { data }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Vec<u8> {
        (0..self.channels()).map(|c| self.data[[y, x, c]]).collect()
    }

    pub fn from_dynamic(img: DynamicImage) -> Result<Self> {
        if img.color().has_color() {
            let rgb = img.to_rgb8();
            let (w, h) = rgb.dimensions();
            Self::from_rgb(w as usize, h as usize, rgb.into_raw())
        } else {
            let gray = img.to_luma8();
            let (w, h) = gray.dimensions();
            Self::from_gray(w as usize, h as usize, gray.into_raw())
        }
    }

    pub fn to_dynamic(&self) -> Result<DynamicImage> {
        let (w, h) = (self.width() as u32, self.height() as u32);
        let raw = self.to_interleaved();
        if self.is_gray() {
            GrayImage::from_raw(w, h, raw)
                .map(DynamicImage::ImageLuma8)
                .ok_or_else(|| Error::Processing("gray buffer size mismatch".into()))
        } else {
            RgbImage::from_raw(w, h, raw)
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(|| Error::Processing("rgb buffer size mismatch".into()))
        }
    }
}
