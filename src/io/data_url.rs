//! `data:<mime>;base64,<payload>` encoding and decoding.
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::core::raster::Raster;
use crate::error::{Error, Result};
use crate::io::decode::decode_bytes;
use crate::io::writers::encode;
use crate::types::OutputFormat;

/// Build a base64 data URL around already-encoded bytes.
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Encode a raster and wrap it in a data URL.
pub fn raster_to_data_url(img: &Raster, format: OutputFormat, quality: u8) -> Result<String> {
    let bytes = encode(img, format, quality)?;
    Ok(to_data_url(format.mime(), &bytes))
}

/// Split a data URL into its MIME type and decoded payload.
///
/// A bare base64 string without the `data:` prefix is accepted and reported
/// with an empty MIME type.
pub fn parse_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let url = url.trim();
    let (mime, payload) = match url.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| Error::DataUrl("missing ',' separator".into()))?;
            let mime = match header.strip_suffix(";base64") {
                Some(m) => m,
                None => return Err(Error::DataUrl("only base64 payloads are supported".into())),
            };
            (mime.to_string(), payload)
        }
        None => (String::new(), url),
    };
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| Error::DataUrl(e.to_string()))?;
    Ok((mime, bytes))
}

/// Decode the image carried by a data URL.
pub fn raster_from_data_url(url: &str) -> Result<Raster> {
    let (_, bytes) = parse_data_url(url)?;
    decode_bytes(&bytes)
}
