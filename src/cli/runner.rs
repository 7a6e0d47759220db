use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use imgedit::api::{
    EditorService, EditorSession, OutputOptions, Request, process_directory_to_path,
};
use imgedit::core::processing::fusion::fuse;
use imgedit::core::processing::histogram::{compute_histogram, render_histogram};
use imgedit::core::processing::pipeline::{apply_all, apply_filter};
use imgedit::core::processing::save::save_raster;
use imgedit::io::writers::metadata::EditMetadata;
use imgedit::{EditorParams, FilterRequest, Raster, load_image};

use super::args::{
    BatchArgs, CliArgs, Command, FilterArgs, FuseArgs, HistogramArgs, IoArgs, LayerArgs,
    ServeScriptArgs, SliderArgs,
};
use super::errors::AppError;

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub(crate) fn parse_size(size: &str) -> Result<Option<usize>, AppError> {
    if size == "original" {
        return Ok(None);
    }
    let parsed_size = size.parse::<usize>().map_err(|_| AppError::InvalidSize {
        size: size.to_string(),
    })?;
    if parsed_size == 0 {
        return Err(AppError::ZeroSize { size: parsed_size });
    }
    Ok(Some(parsed_size))
}

/// Build a filter request from `--filter` (tag or JSON object) and `--set` pairs.
pub(crate) fn build_filter(filter: &str, params: &[String]) -> Result<FilterRequest, AppError> {
    let mut body = if filter.trim_start().starts_with('{') {
        match serde_json::from_str::<Value>(filter)? {
            Value::Object(map) => map,
            _ => {
                return Err(AppError::InvalidFilter {
                    filter: filter.to_string(),
                });
            }
        }
    } else {
        let mut map = Map::new();
        map.insert("filter_type".into(), Value::String(filter.to_string()));
        map
    };

    for param in params {
        let (key, raw) = param.split_once('=').ok_or_else(|| AppError::InvalidParam {
            param: param.clone(),
        })?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        body.insert(key.trim().to_string(), value);
    }

    Ok(FilterRequest::from_value(Value::Object(body))?)
}

/// Slider state from `--params` with individual flags layered on top.
pub(crate) fn merge_sliders(sliders: &SliderArgs) -> Result<EditorParams, AppError> {
    let mut params = match &sliders.params {
        Some(path) => EditorParams::from_path(path)?,
        None => EditorParams::default(),
    };
    macro_rules! overlay {
        ($($field:ident),*) => {
            $(if sliders.$field.is_some() {
                params.$field = sliders.$field;
            })*
        };
    }
    overlay!(
        global_brightness,
        red_brightness,
        green_brightness,
        blue_brightness,
        log_contrast,
        exp_contrast,
        threshold
    );
    params.grayscale |= sliders.grayscale;
    params.negative |= sliders.negative;
    params.binary |= sliders.binary;
    Ok(params)
}

fn write_output(
    img: &Raster,
    io: &IoArgs,
    args_quality: u8,
    sidecar: bool,
    operations: Vec<String>,
    parameters: Option<Value>,
) -> Result<(), AppError> {
    let size = parse_size(&io.size)?;
    let metadata = sidecar.then(|| EditMetadata {
        source: Some(io.input.display().to_string()),
        operations,
        width: 0,
        height: 0,
        channels: 0,
        format: String::new(),
        created_at: Utc::now(),
        parameters,
    });
    save_raster(img, &io.output, io.format, size, args_quality, metadata)?;
    info!("Successfully processed: {:?} -> {:?}", io.input, io.output);
    Ok(())
}

/// Load, apply one request and write, the shared path of the single-filter commands.
fn run_request(
    io: &IoArgs,
    request: &FilterRequest,
    quality: u8,
    sidecar: bool,
) -> Result<(), AppError> {
    let img = load_image(&io.input)?;
    let out = apply_filter(&img, request)?;
    write_output(
        &out,
        io,
        quality,
        sidecar,
        vec![request.tag().to_string()],
        serde_json::to_value(request).ok(),
    )
}

fn run_filter(args: &FilterArgs, quality: u8, sidecar: bool) -> Result<(), AppError> {
    let request = build_filter(&args.filter, &args.params)?;
    run_request(&args.io, &request, quality, sidecar)
}

fn run_pipeline(io: &IoArgs, sliders: &SliderArgs, quality: u8, sidecar: bool) -> Result<(), AppError> {
    let params = merge_sliders(sliders)?;
    let img = load_image(&io.input)?;
    let out = apply_all(&img, &params)?;
    let operations = params.steps().iter().map(|s| s.to_string()).collect();
    write_output(
        &out,
        io,
        quality,
        sidecar,
        operations,
        serde_json::to_value(&params).ok(),
    )
}

fn run_fuse(args: &FuseArgs, quality: u8) -> Result<(), AppError> {
    let first = load_image(&args.first)?;
    let second = load_image(&args.second)?;
    let out = fuse(&first, &second, args.mode, args.alpha, !args.luma)?;
    save_raster(&out, &args.output, args.format, None, quality, None)?;
    info!(
        "Fused {:?} + {:?} -> {:?}",
        args.first, args.second, args.output
    );
    Ok(())
}

fn parse_fill(values: &[u8]) -> Result<[u8; 3], AppError> {
    <[u8; 3]>::try_from(values).map_err(|_| AppError::InvalidFill {
        count: values.len(),
    })
}

fn run_layer(args: &LayerArgs, quality: u8, sidecar: bool) -> Result<(), AppError> {
    let request = match (args.rgb, args.cmyk) {
        (Some(capa), _) => FilterRequest::RgbLayer { capa },
        (None, Some(capa)) if args.suppress => FilterRequest::SuppressCmyk { capa },
        (None, Some(capa)) => FilterRequest::CmykLayer { capa },
        (None, None) => {
            return Err(imgedit::Error::MissingArgument {
                arg: "--rgb or --cmyk".to_string(),
            }
            .into());
        }
    };
    run_request(&args.io, &request, quality, sidecar)
}

fn run_histogram(args: &HistogramArgs, quality: u8) -> Result<(), AppError> {
    let img = load_image(&args.input)?;
    let hist = compute_histogram(&img);
    let json = serde_json::to_string_pretty(&hist)?;
    match &args.json {
        Some(path) => {
            fs::write(path, json)?;
            info!("Histogram written to {:?}", path);
        }
        None if args.chart.is_none() => println!("{}", json),
        None => {}
    }
    if let Some(chart) = &args.chart {
        let rendered = render_histogram(&hist, args.chart_width, args.chart_height)?;
        save_raster(&rendered, chart, None, None, quality, None)?;
        info!("Histogram chart written to {:?}", chart);
    }
    Ok(())
}

fn run_batch(args: &BatchArgs, quality: u8, sidecar: bool) -> Result<(), AppError> {
    let mut params = merge_sliders(&args.sliders)?;
    if let Some(size) = parse_size(&args.size)? {
        params.size = Some(size);
    }
    let options = OutputOptions {
        format: Some(args.format),
        quality,
        sidecar,
    };

    info!("Starting batch processing from directory: {:?}", args.input_dir);
    info!("Output directory: {:?}", args.output_dir);

    let report = process_directory_to_path(
        &args.input_dir,
        &args.output_dir,
        &params,
        args.format,
        &options,
        args.continue_on_error,
    )?;

    info!("Batch processing complete!");
    println!(
        "processed={} skipped={} errors={}",
        report.processed, report.skipped, report.errors
    );
    Ok(())
}

/// Replay a JSON Lines request script against one session, printing one
/// response per request. Blank lines and lines starting with `#` are ignored.
pub(crate) fn run_script(
    script: &Path,
    session: EditorSession,
    out: &mut dyn Write,
) -> Result<EditorService, AppError> {
    let reader = BufReader::new(fs::File::open(script)?);
    let mut service = EditorService::new(session);

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let request: Request = serde_json::from_str(trimmed).map_err(|source| AppError::Script {
            line: idx + 1,
            source,
        })?;
        let response = service.handle(&request);
        if !response.success {
            warn!(
                "line {}: {} -> {}",
                idx + 1,
                request.path,
                response.error.as_deref().unwrap_or_default()
            );
        }
        writeln!(out, "{}", response.to_json()?)?;
    }
    Ok(service)
}

fn run_serve_script(args: &ServeScriptArgs, quality: u8) -> Result<(), AppError> {
    let mut session = EditorSession::new().with_quality(quality);
    if let Some(token) = &args.csrf_token {
        session = session.with_csrf_token(token.clone());
    }

    let service = match &args.output {
        Some(path) => {
            let mut file = fs::File::create(path)?;
            run_script(&args.script, session, &mut file)?
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            run_script(&args.script, session, &mut lock)?
        }
    };

    if let Some(save) = &args.save {
        match service.session().current() {
            Some(img) => {
                save_raster(img, save, None, None, quality, None)?;
                info!("Final image saved to {:?}", save);
            }
            None => warn!("No image in session; nothing saved to {:?}", save),
        }
    }
    Ok(())
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.log);

    let quality = args.quality;
    let sidecar = args.sidecar;
    match &args.command {
        Command::Filter(f) => run_filter(f, quality, sidecar)?,
        Command::Pipeline(p) => run_pipeline(&p.io, &p.sliders, quality, sidecar)?,
        Command::Fuse(f) => run_fuse(f, quality)?,
        Command::Layer(l) => run_layer(l, quality, sidecar)?,
        Command::Histogram(h) => run_histogram(h, quality)?,
        Command::Crop(c) => {
            let r = c.rect;
            let request = FilterRequest::Crop {
                x1: r.x1,
                y1: r.y1,
                x2: r.x2,
                y2: r.y2,
            };
            run_request(&c.io, &request, quality, sidecar)?
        }
        Command::Zoom(z) => {
            let r = z.rect;
            let request = FilterRequest::Zoom {
                x1: r.x1,
                y1: r.y1,
                x2: r.x2,
                y2: r.y2,
                escala: z.scale,
            };
            run_request(&z.io, &request, quality, sidecar)?
        }
        Command::Rotate(r) => {
            let fill = parse_fill(&r.fill)?;
            let request = FilterRequest::Rotate {
                angulo: r.angle,
                expand: !r.no_expand,
                fill,
            };
            run_request(&r.io, &request, quality, sidecar)?
        }
        Command::Batch(b) => run_batch(b, quality, sidecar)?,
        Command::ServeScript(s) => run_serve_script(s, quality)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgedit::io::writers::png::write_png;

    #[test]
    fn size_parsing() {
        assert_eq!(parse_size("original").unwrap(), None);
        assert_eq!(parse_size("512").unwrap(), Some(512));
        assert!(matches!(parse_size("0"), Err(AppError::ZeroSize { .. })));
        assert!(matches!(parse_size("big"), Err(AppError::InvalidSize { .. })));
    }

    #[test]
    fn fill_needs_three_values() {
        assert_eq!(parse_fill(&[255, 0, 10]).unwrap(), [255, 0, 10]);
        assert!(matches!(parse_fill(&[1, 2]), Err(AppError::InvalidFill { count: 2 })));
        assert!(matches!(parse_fill(&[1, 2, 3, 4]), Err(AppError::InvalidFill { count: 4 })));
    }

    #[test]
    fn filter_from_tag_and_pairs() {
        let r = build_filter("binario", &["umbral=90".to_string()]).unwrap();
        assert_eq!(r, FilterRequest::Binary { umbral: 90 });

        let r = build_filter("capa_rgb", &["capa=g".to_string()]).unwrap();
        assert_eq!(r, FilterRequest::RgbLayer { capa: imgedit::RgbLayer::G });

        let r = build_filter(r#"{"filter_type":"brillo_global","delta":-20}"#, &[]).unwrap();
        assert_eq!(r, FilterRequest::BrightnessGlobal { delta: -20 });

        assert!(matches!(
            build_filter("negativo", &["oops".to_string()]),
            Err(AppError::InvalidParam { .. })
        ));
        assert!(matches!(
            build_filter("[1,2]", &[]),
            Err(AppError::Editor(_))
        ));
    }

    #[test]
    fn sliders_override_params_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        fs::write(&path, r#"{"global_brightness":150,"negative":true}"#).unwrap();
        let sliders = SliderArgs {
            params: Some(path),
            global_brightness: Some(90),
            binary: true,
            ..Default::default()
        };
        let params = merge_sliders(&sliders).unwrap();
        assert_eq!(params.global_brightness, Some(90));
        assert!(params.negative);
        assert!(params.binary);
    }

    #[test]
    fn script_replay() {
        let dir = tempfile::tempdir().unwrap();
        let img_path = dir.path().join("a.png");
        write_png(&img_path, &Raster::filled(3, 3, 3, 40).unwrap()).unwrap();
        let data = imgedit::io::data_url::to_data_url("image/png", &fs::read(&img_path).unwrap());

        let script = dir.path().join("s.jsonl");
        let lines = [
            serde_json::json!({"path": "/upload/", "body": {"name": "a.png", "data": data}}),
            serde_json::json!({"path": "/apply-filter/", "body": {"filter_type": "negativo"}}),
            serde_json::json!({"method": "GET", "path": "/reset/"}),
        ];
        let mut text = String::from("# session\n\n");
        for l in &lines {
            text.push_str(&l.to_string());
            text.push('\n');
        }
        fs::write(&script, text).unwrap();

        let mut out = Vec::new();
        let service = run_script(&script, EditorSession::new(), &mut out).unwrap();
        let responses: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["success"], true);
        assert_eq!(responses[1]["success"], true);
        assert_eq!(responses[2]["error"], "method not allowed");
        assert_eq!(
            service.session().current().unwrap().pixel(0, 0),
            vec![215, 215, 215]
        );
    }

    #[test]
    fn script_reports_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("s.jsonl");
        fs::write(&script, "{\"path\": \"/reset/\"}\nnot json\n").unwrap();
        let mut out = Vec::new();
        match run_script(&script, EditorSession::new(), &mut out) {
            Err(AppError::Script { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }
}
