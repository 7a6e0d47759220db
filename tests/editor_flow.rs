use std::path::Path;

use imgedit::io::data_url::to_data_url;
use imgedit::io::writers::png::{encode_png, write_png};
use imgedit::{
    EditorParams, EditorService, EditorSession, OutputFormat, OutputOptions, Raster, Request,
    load_image, process_directory_to_path, process_file_to_path,
};
use serde_json::{Value, json};

fn gradient(width: usize, height: usize) -> Raster {
    let mut pixels = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&[(x * 16) as u8, (y * 16) as u8, 128]);
        }
    }
    Raster::from_rgb(width, height, pixels).unwrap()
}

fn upload_request(img: &Raster) -> Request {
    let data = to_data_url("image/png", &encode_png(img).unwrap());
    Request::post("/upload/", json!({"name": "g.png", "data": data}))
}

#[test]
fn browser_session_round() {
    let mut service = EditorService::new(EditorSession::new().with_csrf_token("abc"));
    let original = gradient(8, 6);

    let resp = service.handle(&upload_request(&original).with_csrf_token("abc"));
    assert!(resp.success, "{:?}", resp.error);
    assert_eq!(resp.image_size, Some([8, 6]));

    // Single filters accumulate on the current image.
    for body in [
        json!({"filter_type": "grises"}),
        json!({"filter_type": "negativo"}),
    ] {
        let resp = service.handle(&Request::post("/apply-filter/", body).with_csrf_token("abc"));
        assert!(resp.success, "{:?}", resp.error);
    }
    assert_eq!(service.session().current().unwrap().channels(), 1);

    // The slider pipeline always restarts from the upload.
    let resp = service.handle(
        &Request::post(
            "/apply-multiple-filters/",
            json!({"red_brightness": 120, "green_brightness": 100, "blue_brightness": 100}),
        )
        .with_csrf_token("abc"),
    );
    assert!(resp.success);
    let current = service.session().current().unwrap();
    assert_eq!(current.channels(), 3);
    assert_eq!(current.pixel(1, 0), vec![36, 0, 128]);

    let resp = service.handle(&Request::post("/histogram/", Value::Null).with_csrf_token("abc"));
    let hist = resp.histogram.unwrap();
    assert_eq!(hist.channel("B").unwrap().bins[128], 48);

    let resp = service.handle(&Request::post("/reset/", Value::Null).with_csrf_token("abc"));
    assert!(resp.success);
    assert_eq!(service.session().current(), Some(&original));

    let resp = service.handle(&Request::post("/reset/", Value::Null));
    assert_eq!(resp.error.as_deref(), Some("csrf token missing or invalid"));
}

#[test]
fn geometry_requests_change_dimensions() {
    let mut service = EditorService::default();
    service.handle(&upload_request(&gradient(8, 6)));

    let resp = service.handle(&Request::post(
        "/apply-filter/",
        json!({"filter_type": "recorte", "x1": 2, "y1": 1, "x2": 100, "y2": 5}),
    ));
    assert!(resp.success, "{:?}", resp.error);
    let img = service.session().current().unwrap();
    assert_eq!((img.width(), img.height()), (6, 4));

    service.handle(&Request::post(
        "/apply-filter/",
        json!({"filter_type": "rotacion", "angulo": 90}),
    ));
    let img = service.session().current().unwrap();
    assert_eq!((img.width(), img.height()), (4, 6));
}

fn write_inputs(dir: &Path) {
    write_png(&dir.join("one.png"), &gradient(16, 8)).unwrap();
    write_png(&dir.join("two.png"), &gradient(8, 16)).unwrap();
    std::fs::write(dir.join("readme.md"), "not an image").unwrap();
}

#[test]
fn directory_pipeline_to_jpeg() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_inputs(input.path());

    let params = EditorParams {
        exp_contrast: Some(50.0),
        size: Some(4),
        ..Default::default()
    };
    let options = OutputOptions {
        sidecar: true,
        ..Default::default()
    };
    let report = process_directory_to_path(
        input.path(),
        output.path(),
        &params,
        OutputFormat::Jpeg,
        &options,
        false,
    )
    .unwrap();
    assert_eq!((report.processed, report.skipped, report.errors), (2, 1, 0));

    let one = load_image(&output.path().join("one.jpg")).unwrap();
    assert_eq!((one.width(), one.height()), (4, 2));
    let two = load_image(&output.path().join("two.jpg")).unwrap();
    assert_eq!((two.width(), two.height()), (2, 4));
    assert!(output.path().join("one.json").exists());
}

#[test]
fn single_file_keeps_size_without_target() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());
    let out = dir.path().join("out.png");
    process_file_to_path(
        &dir.path().join("one.png"),
        &out,
        &EditorParams::default(),
        &OutputOptions::default(),
    )
    .unwrap();
    assert_eq!(load_image(&out).unwrap(), gradient(16, 8));
    assert!(!dir.path().join("out.json").exists());
}
