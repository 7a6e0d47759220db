use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::params::{EditorParams, FilterRequest};
use crate::core::processing::fusion::fuse;
use crate::core::processing::histogram::{Histogram, compute_histogram};
use crate::core::processing::pipeline::{apply_all, apply_filter};
use crate::core::raster::Raster;
use crate::error::{Error, Result};
use crate::io::data_url::raster_to_data_url;
use crate::io::decode::decode_bytes;
use crate::io::writers::jpeg::DEFAULT_JPEG_QUALITY;
use crate::types::{FusionMode, OutputFormat};

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// What the session remembers about the uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub name: String,
    pub content_type: String,
    pub width: usize,
    pub height: usize,
    pub uploaded_at: DateTime<Utc>,
}

fn default_alpha() -> f64 {
    0.5
}

fn default_per_channel() -> bool {
    true
}

/// Fusion options as sent by the client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionRequest {
    #[serde(default)]
    pub fusion_type: FusionMode,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Equalize each RGB channel separately instead of through luma
    #[serde(default = "default_per_channel")]
    pub per_channel: bool,
}

impl Default for FusionRequest {
    fn default() -> Self {
        Self {
            fusion_type: FusionMode::Normal,
            alpha: default_alpha(),
            per_channel: default_per_channel(),
        }
    }
}

/// One editing session: the uploaded original, the working image that
/// single filters accumulate on, and the anti-forgery token requests must echo.
///
/// A new current image is only committed once its JPEG data URL has been
/// encoded, so a failed response leaves the session as it was.
#[derive(Debug, Clone)]
pub struct EditorSession {
    original: Option<Raster>,
    current: Option<Raster>,
    current_url: Option<String>,
    info: Option<ImageInfo>,
    csrf_token: Option<String>,
    quality: u8,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    pub fn new() -> Self {
        Self {
            original: None,
            current: None,
            current_url: None,
            info: None,
            csrf_token: None,
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Require `token` on every request handled for this session.
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// JPEG quality used for response images.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn original(&self) -> Option<&Raster> {
        self.original.as_ref()
    }

    pub fn current(&self) -> Option<&Raster> {
        self.current.as_ref()
    }

    pub fn info(&self) -> Option<&ImageInfo> {
        self.info.as_ref()
    }

    fn require_current(&self) -> Result<&Raster> {
        self.current.as_ref().ok_or(Error::NoImage)
    }

    fn require_original(&self) -> Result<&Raster> {
        self.original.as_ref().ok_or(Error::NoOriginal)
    }

    fn encode(&self, img: &Raster) -> Result<String> {
        raster_to_data_url(img, OutputFormat::Jpeg, self.quality)
    }

    fn commit(&mut self, img: Raster) -> Result<&Raster> {
        let url = self.encode(&img)?;
        self.current_url = Some(url);
        Ok(self.current.insert(img))
    }

    /// Decode an uploaded file and make it both the original and the
    /// current image.
    pub fn upload(&mut self, name: &str, content_type: &str, bytes: &[u8]) -> Result<&ImageInfo> {
        if !content_type.starts_with("image/") {
            return Err(Error::invalid("content_type", content_type));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(Error::TooLarge {
                size: bytes.len(),
                max: MAX_UPLOAD_BYTES,
            });
        }

        let img = decode_bytes(bytes)?.to_rgb();
        let url = self.encode(&img)?;
        info!(
            "Uploaded {:?} ({}, {} bytes): {}x{}",
            name,
            content_type,
            bytes.len(),
            img.width(),
            img.height()
        );

        let info = ImageInfo {
            name: name.to_string(),
            content_type: content_type.to_string(),
            width: img.width(),
            height: img.height(),
            uploaded_at: Utc::now(),
        };
        self.original = Some(img.clone());
        self.current = Some(img);
        self.current_url = Some(url);
        Ok(self.info.insert(info))
    }

    /// Apply one filter to the current image.
    pub fn apply_filter(&mut self, request: &FilterRequest) -> Result<&Raster> {
        let out = apply_filter(self.require_current()?, request)?;
        let out = self.commit(out)?;
        info!("Filter {} applied", request.tag());
        Ok(out)
    }

    /// Rebuild the current image from the original with the full slider state.
    pub fn apply_multiple_filters(&mut self, params: &EditorParams) -> Result<&Raster> {
        let out = apply_all(self.require_original()?, params)?;
        self.commit(out)
    }

    /// Fuse two images and make the result current. The result is sized
    /// like `first`.
    pub fn fuse(&mut self, first: &Raster, second: &Raster, request: &FusionRequest) -> Result<&Raster> {
        let out = fuse(
            first,
            second,
            request.fusion_type,
            request.alpha,
            request.per_channel,
        )?;
        self.commit(out)
    }

    pub fn histogram(&self) -> Result<Histogram> {
        Ok(compute_histogram(self.require_current()?))
    }

    /// Discard every edit and go back to the uploaded image.
    pub fn reset(&mut self) -> Result<&Raster> {
        let original = self.require_original()?.clone();
        debug!("Session reset to original");
        self.commit(original)
    }

    /// The current image as a JPEG data URL.
    pub fn current_data_url(&self) -> Result<String> {
        self.current_url.clone().ok_or(Error::NoImage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::writers::png::encode_png;

    fn png(width: usize, height: usize, value: u8) -> Vec<u8> {
        encode_png(&Raster::filled(width, height, 3, value).unwrap()).unwrap()
    }

    #[test]
    fn upload_sets_original_and_current() {
        let mut session = EditorSession::new();
        let info = session.upload("a.png", "image/png", &png(4, 3, 50)).unwrap();
        assert_eq!((info.width, info.height), (4, 3));
        assert_eq!(session.original(), session.current());
    }

    #[test]
    fn upload_promotes_gray_to_rgb() {
        let gray = encode_png(&Raster::filled(2, 2, 1, 9).unwrap()).unwrap();
        let mut session = EditorSession::new();
        session.upload("g.png", "image/png", &gray).unwrap();
        assert_eq!(session.current().unwrap().channels(), 3);
    }

    #[test]
    fn upload_validation() {
        let mut session = EditorSession::new();
        assert!(matches!(
            session.upload("a.txt", "text/plain", b"hello"),
            Err(Error::InvalidArgument { .. })
        ));
        let big = vec![0u8; MAX_UPLOAD_BYTES + 1];
        assert!(matches!(
            session.upload("big.png", "image/png", &big),
            Err(Error::TooLarge { .. })
        ));
        assert!(session.current().is_none());
    }

    #[test]
    fn filters_need_an_image() {
        let mut session = EditorSession::new();
        assert!(matches!(
            session.apply_filter(&FilterRequest::Negative),
            Err(Error::NoImage)
        ));
        assert!(matches!(
            session.apply_multiple_filters(&EditorParams::default()),
            Err(Error::NoOriginal)
        ));
        assert!(matches!(session.reset(), Err(Error::NoOriginal)));
    }

    #[test]
    fn single_filters_accumulate_and_pipeline_restarts() {
        let mut session = EditorSession::new();
        session.upload("a.png", "image/png", &png(2, 2, 50)).unwrap();

        session.apply_filter(&FilterRequest::Negative).unwrap();
        let twice = session.apply_filter(&FilterRequest::Negative).unwrap();
        assert_eq!(twice.pixel(0, 0), vec![50, 50, 50]);

        session
            .apply_filter(&FilterRequest::BrightnessGlobal { delta: 10 })
            .unwrap();
        let params = EditorParams {
            global_brightness: Some(120),
            ..Default::default()
        };
        let out = session.apply_multiple_filters(&params).unwrap();
        assert_eq!(out.pixel(1, 1), vec![70, 70, 70]);
    }

    #[test]
    fn reset_restores_original() {
        let mut session = EditorSession::new();
        session.upload("a.png", "image/png", &png(2, 2, 50)).unwrap();
        session.apply_filter(&FilterRequest::Negative).unwrap();
        let restored = session.reset().unwrap().clone();
        assert_eq!(Some(&restored), session.original());
    }

    #[test]
    fn fuse_replaces_current() {
        let mut session = EditorSession::new();
        let a = Raster::filled(4, 4, 3, 200).unwrap();
        let b = Raster::filled(2, 2, 3, 100).unwrap();
        let out = session.fuse(&a, &b, &FusionRequest::default()).unwrap();
        assert_eq!((out.width(), out.height()), (4, 4));
        assert!(out.pixel(0, 0).iter().all(|&v| (149..=150).contains(&v)));
        assert!(session.current().is_some());
    }

    #[test]
    fn failed_encode_keeps_previous_image() {
        let mut session = EditorSession::new();
        session.upload("a.png", "image/png", &png(10, 10, 40)).unwrap();
        let before = session.current_data_url().unwrap();

        // wider than a JPEG can hold
        let wide = Raster::filled(70_000, 1, 3, 10).unwrap();
        assert!(session.fuse(&wide, &wide, &FusionRequest::default()).is_err());
        let current = session.current().unwrap();
        assert_eq!((current.width(), current.height()), (10, 10));
        assert_eq!(session.current_data_url().unwrap(), before);
    }

    #[test]
    fn oversized_zoom_is_rejected_without_changing_current() {
        let mut session = EditorSession::new();
        session.upload("a.png", "image/png", &png(10, 10, 40)).unwrap();
        let zoom = FilterRequest::Zoom {
            x1: 0,
            y1: 0,
            x2: 70_000,
            y2: 1,
            escala: 1.0,
        };
        assert!(matches!(
            session.apply_filter(&zoom),
            Err(Error::InvalidArgument { arg: "width", .. })
        ));
        assert_eq!(session.current(), session.original());
    }

    #[test]
    fn data_url_is_jpeg() {
        let mut session = EditorSession::new().with_quality(80);
        session.upload("a.png", "image/png", &png(8, 8, 128)).unwrap();
        let url = session.current_data_url().unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }
}
