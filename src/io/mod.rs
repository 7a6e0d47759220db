//! I/O layer: decoding uploads and files, data URLs for the request layer,
//! and `writers` for JPEG/PNG/TIFF outputs and metadata sidecars.
pub mod data_url;
pub mod decode;
pub mod writers;

pub use data_url::{parse_data_url, raster_from_data_url, raster_to_data_url, to_data_url};
pub use decode::{decode_bytes, load_image};
