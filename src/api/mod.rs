//! High-level, ergonomic library API: the editor session and its endpoint
//! router, plus file and directory helpers that run the slider pipeline on
//! disk images. Prefer these entrypoints over the low-level processing
//! modules when integrating imgedit.
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};

pub mod service;
pub mod session;

pub use service::{EditorService, Request, Response};
pub use session::{EditorSession, FusionRequest, ImageInfo, MAX_UPLOAD_BYTES};

use crate::core::params::EditorParams;
use crate::core::processing::pipeline::apply_all;
use crate::core::processing::save::save_raster;
use crate::core::raster::Raster;
use crate::error::{Error, Result};
use crate::io::decode::{is_supported_extension, load_image};
use crate::io::writers::metadata::EditMetadata;
use crate::types::OutputFormat;

/// Output options shared by the file helpers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputOptions {
    /// `None` picks the format from the output extension
    pub format: Option<OutputFormat>,
    pub quality: u8,
    /// Write a `<stem>.json` sidecar next to each output
    pub sidecar: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format: None,
            quality: crate::io::writers::jpeg::DEFAULT_JPEG_QUALITY,
            sidecar: false,
        }
    }
}

/// Load `input`, run the slider pipeline on it and return the result.
pub fn process_file_to_raster(input: &Path, params: &EditorParams) -> Result<Raster> {
    let original = load_image(input)?;
    apply_all(&original, params)
}

/// Load `input`, run the slider pipeline and write the result to `output`,
/// downscaled to `params.size` when set.
pub fn process_file_to_path(
    input: &Path,
    output: &Path,
    params: &EditorParams,
    options: &OutputOptions,
) -> Result<()> {
    let edited = process_file_to_raster(input, params)?;
    let metadata = options.sidecar.then(|| EditMetadata {
        source: Some(input.display().to_string()),
        operations: params.steps().iter().map(|s| s.to_string()).collect(),
        width: 0,
        height: 0,
        channels: 0,
        format: String::new(),
        created_at: Utc::now(),
        parameters: serde_json::to_value(params).ok(),
    });
    save_raster(
        &edited,
        output,
        options.format,
        params.size,
        options.quality,
        metadata,
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Regular files directly inside `input_dir`, sorted by name.
pub fn iterate_images(input_dir: &Path) -> Result<std::vec::IntoIter<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(input_dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files.into_iter())
}

/// Run the pipeline on every image in `input_dir`, writing `<stem>.<ext>`
/// files into `output_dir`. Files without an image extension are skipped.
/// If `continue_on_error` is true, failures are counted in the report and
/// processing continues; otherwise the first error is returned.
pub fn process_directory_to_path(
    input_dir: &Path,
    output_dir: &Path,
    params: &EditorParams,
    format: OutputFormat,
    options: &OutputOptions,
    continue_on_error: bool,
) -> Result<BatchReport> {
    std::fs::create_dir_all(output_dir)?;

    let mut report = BatchReport::default();
    let options = OutputOptions {
        format: Some(format),
        ..*options
    };

    for path in iterate_images(input_dir)? {
        if !is_supported_extension(&path) {
            info!("Skipping non-image file: {:?}", path);
            report.skipped += 1;
            continue;
        }
        let stem = path
            .file_stem()
            .ok_or_else(|| Error::Processing(format!("no file name in {:?}", path)))?
            .to_string_lossy()
            .into_owned();
        let output_path = output_dir.join(format!("{}.{}", stem, format.extension()));

        info!("Processing: {:?} -> {:?}", path, output_path);
        match process_file_to_path(&path, &output_path, params, &options) {
            Ok(()) => report.processed += 1,
            Err(e) => {
                warn!("Error processing {:?}: {}", path, e);
                report.errors += 1;
                if !continue_on_error {
                    return Err(e);
                }
            }
        }
    }

    info!(
        "Batch complete: processed={} skipped={} errors={}",
        report.processed, report.skipped, report.errors
    );
    Ok(report)
}
