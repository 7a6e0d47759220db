#![doc = r##"
imgedit: an 8-bit image editing backend.

This crate provides the pixel work behind a browser image editor: brightness and
contrast curves, grayscale, negative, binarization, RGB/CMYK layers, histograms
and equalization, two-image fusion, crop, zoom and rotation. It also provides the
request/response layer the editor's controller talks to (`/upload/`,
`/apply-filter/`, `/apply-multiple-filters/`, ...), as an in-process API. It
powers the `imgedit` CLI and can be embedded in your own Rust applications.

Stability
---------
The public library API is experimental in initial releases and may evolve as
the crate stabilizes. Breaking changes can occur.

Add dependency
--------------
```toml
[dependencies]
imgedit = "0.1"
```

Quick start: run the slider pipeline on a file
-----------------------------------------------
```rust,no_run
use std::path::Path;
use imgedit::{process_file_to_path, EditorParams, OutputOptions};

fn main() -> imgedit::Result<()> {
    let params = EditorParams {
        global_brightness: Some(120), // slider 0..200, 100 is neutral
        log_contrast: Some(40.0),     // slider 0..100, 0 disables
        grayscale: true,
        size: Some(1024),
        ..Default::default()
    };

    process_file_to_path(
        Path::new("/data/photo.png"),
        Path::new("/out/photo.jpg"),
        &params,
        &OutputOptions::default(),
    )
}
```

Single filters in memory
------------------------
```rust,no_run
use std::path::Path;
use imgedit::{apply_filter, load_image, FilterRequest};

fn main() -> imgedit::Result<()> {
    let img = load_image(Path::new("/data/photo.png"))?;

    // Same JSON the editor sends to `/apply-filter/`
    let request = FilterRequest::from_json(r#"{"filter_type": "binario", "umbral": 100}"#)?;
    let binary = apply_filter(&img, &request)?;

    let rotated = apply_filter(&binary, &FilterRequest::Rotate {
        angulo: 30.0,
        expand: true,
        fill: [255, 255, 255],
    })?;
    println!("{}x{}", rotated.width(), rotated.height());
    Ok(())
}
```

Editor session and endpoints
----------------------------
```rust,no_run
use imgedit::{EditorService, EditorSession, Request};
use serde_json::json;

fn main() -> imgedit::Result<()> {
    let session = EditorSession::new().with_csrf_token("token-from-form");
    let mut service = EditorService::new(session);

    let upload = Request::post("/upload/", json!({
        "name": "photo.png",
        "data": "data:image/png;base64,iVBORw0KGgo...",
    }))
    .with_csrf_token("token-from-form");
    let response = service.handle(&upload);
    println!("{}", response.to_json()?);

    let filter = Request::post("/apply-filter/", json!({"filter_type": "negativo"}))
        .with_csrf_token("token-from-form");
    let response = service.handle(&filter);
    // `filtered_image_url` holds a `data:image/jpeg;base64,...` URL
    assert!(response.success);
    Ok(())
}
```

Batch helpers
-------------
```rust,no_run
use std::path::Path;
use imgedit::{process_directory_to_path, EditorParams, OutputFormat, OutputOptions};

fn main() -> imgedit::Result<()> {
    let params = EditorParams { negative: true, ..Default::default() };

    let report = process_directory_to_path(
        Path::new("/data/photos"),
        Path::new("/out"),
        &params,
        OutputFormat::Jpeg,
        &OutputOptions::default(),
        true, // continue_on_error
    )?;

    println!("processed={} skipped={} errors={}", report.processed, report.skipped, report.errors);
    Ok(())
}
```

Error handling
--------------
All public functions return `imgedit::Result<T>`; match on `imgedit::Error` to handle
specific cases, e.g. decode failures or a session with no image loaded.

```rust,no_run
use imgedit::{EditorSession, Error, FilterRequest};

fn main() {
    let mut session = EditorSession::new();
    match session.apply_filter(&FilterRequest::Negative) {
        Ok(_) => {}
        Err(Error::NoImage) => eprintln!("upload an image first"),
        Err(Error::Decode(e)) => eprintln!("decode error: {e}"),
        Err(other) => eprintln!("other error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`]: sessions, endpoint routing and file/batch helpers.
- [`core::processing`]: the filters, histogram, fusion and geometry operations.
- [`types`]: enums shared across the crate (e.g. `OutputFormat`, `GrayMethod`, `CmykLayer`).
- [`io`]: decoding, data URLs and writers.
- [`error`]: crate-level `Error` and `Result`.
"##]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use core::params::{EditorParams, FilterRequest};
pub use core::raster::Raster;
pub use error::{Error, Result};
pub use types::{CmykLayer, FusionMode, GrayMethod, OutputFormat, RgbLayer};

// Processing entry points
pub use core::processing::histogram::{Histogram, compute_histogram};
pub use core::processing::pipeline::{apply_all, apply_filter};

// Readers and writers
pub use io::data_url::{raster_from_data_url, raster_to_data_url};
pub use io::decode::{decode_bytes, load_image};
pub use io::writers::metadata::{EditMetadata, create_metadata_sidecar};

// High-level API re-exports
pub use api::{
    BatchReport, EditorService, EditorSession, FusionRequest, ImageInfo, OutputOptions, Request,
    Response, iterate_images, process_directory_to_path, process_file_to_path,
    process_file_to_raster,
};
