//! Crate-level error type and `Result` alias for structured error handling.
//! Converts underlying I/O, decode and encode errors, and provides semantic
//! variants for argument validation, session state and request routing.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("JPEG encode error: {0}")]
    JpegEncode(#[from] jpeg_encoder::EncodingError),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("image must not be empty, got {width}x{height}")]
    EmptyImage { width: usize, height: usize },

    #[error("unsupported channel count: {channels}")]
    UnsupportedChannels { channels: usize },

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("file too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("no image loaded")]
    NoImage,

    #[error("no original image loaded")]
    NoOriginal,

    #[error("invalid data URL: {0}")]
    DataUrl(String),

    #[error("unrecognized filter type: {0}")]
    UnknownFilter(String),

    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("csrf token missing or invalid")]
    Csrf,

    #[error("processing error: {0}")]
    Processing(String),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    pub fn external<E: std::fmt::Display>(e: E) -> Self {
        Error::External(e.to_string())
    }

    pub(crate) fn invalid(arg: &'static str, value: impl ToString) -> Self {
        Error::InvalidArgument {
            arg,
            value: value.to_string(),
        }
    }
}
