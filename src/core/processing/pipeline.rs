use tracing::{debug, info};

use crate::core::params::{EditorParams, FilterRequest, NEUTRAL_BRIGHTNESS};
use crate::core::processing::adjust::{
    brightness_global, brightness_per_channel, exp_contrast, gamma, log_contrast,
};
use crate::core::processing::effects::{binarize, grayscale, negative};
use crate::core::processing::geometry::{Rect, crop, rotate, zoom};
use crate::core::processing::layers::{
    extract_cmyk_layer, extract_rgb_layer, suppress_cmyk_layer,
};
use crate::core::raster::Raster;
use crate::error::Result;
use crate::types::GrayMethod;

/// Apply a single filter request to `img`.
pub fn apply_filter(img: &Raster, request: &FilterRequest) -> Result<Raster> {
    debug!("apply_filter: {:?}", request);
    let out = match *request {
        FilterRequest::BrightnessGlobal { delta } => brightness_global(img, delta),
        FilterRequest::BrightnessChannels {
            delta_r,
            delta_g,
            delta_b,
        } => brightness_per_channel(img, delta_r, delta_g, delta_b),
        FilterRequest::LogContrast { c } => log_contrast(img, c),
        FilterRequest::ExpContrast { k } => exp_contrast(img, k),
        FilterRequest::Gamma { gamma: g } => gamma(img, g)?,
        FilterRequest::Grayscale { metodo } => grayscale(img, metodo),
        FilterRequest::Negative => negative(img),
        FilterRequest::Binary { umbral } => binarize(img, umbral),
        FilterRequest::Crop { x1, y1, x2, y2 } => crop(img, Rect::new(x1, y1, x2, y2)),
        FilterRequest::Zoom {
            x1,
            y1,
            x2,
            y2,
            escala,
        } => zoom(img, Rect::new(x1, y1, x2, y2), escala)?,
        FilterRequest::Rotate {
            angulo,
            expand,
            fill,
        } => rotate(img, angulo, expand, fill)?,
        FilterRequest::RgbLayer { capa } => extract_rgb_layer(img, capa),
        FilterRequest::CmykLayer { capa } => extract_cmyk_layer(img, capa),
        FilterRequest::SuppressCmyk { capa } => suppress_cmyk_layer(img, capa),
    };
    Ok(out)
}

/// Map the log-contrast slider (0..=100) onto the curve constant `c`.
/// The browser sends the same `c` to `/apply-filter/`.
pub fn log_slider_to_constant(value: f64) -> f64 {
    value / 100.0
}

/// Map the exp-contrast slider (0..=100) onto `k` in 0..=0.1.
pub fn exp_slider_to_k(value: f64) -> f64 {
    value / 100.0 * 0.1
}

/// Replay the whole slider state on `original`, in a fixed order:
/// global brightness, channel brightness, log contrast, exp contrast,
/// grayscale, negative, binarization.
pub fn apply_all(original: &Raster, params: &EditorParams) -> Result<Raster> {
    let mut img = original.clone();

    if let Some(v) = params.global_brightness {
        let delta = v.saturating_sub(NEUTRAL_BRIGHTNESS);
        info!("Pipeline: global brightness delta={}", delta);
        img = brightness_global(&img, delta);
    }

    if params.red_brightness.is_some()
        || params.green_brightness.is_some()
        || params.blue_brightness.is_some()
    {
        let d = |v: Option<i32>| {
            v.unwrap_or(NEUTRAL_BRIGHTNESS)
                .saturating_sub(NEUTRAL_BRIGHTNESS)
        };
        let (dr, dg, db) = (
            d(params.red_brightness),
            d(params.green_brightness),
            d(params.blue_brightness),
        );
        info!("Pipeline: channel brightness r={} g={} b={}", dr, dg, db);
        img = brightness_per_channel(&img, dr, dg, db);
    }

    if let Some(v) = params.log_contrast.filter(|&v| v > 0.0) {
        let c = log_slider_to_constant(v);
        info!("Pipeline: log contrast c={:.3}", c);
        img = log_contrast(&img, Some(c));
    }

    if let Some(v) = params.exp_contrast.filter(|&v| v > 0.0) {
        let k = exp_slider_to_k(v);
        info!("Pipeline: exp contrast k={:.4}", k);
        img = exp_contrast(&img, k);
    }

    if params.grayscale {
        info!("Pipeline: grayscale");
        img = grayscale(&img, GrayMethod::Luma);
    }

    if params.negative {
        info!("Pipeline: negative");
        img = negative(&img);
    }

    if params.binary {
        info!("Pipeline: binary threshold={}", params.threshold());
        img = binarize(&img, params.threshold());
    }

    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Raster {
        Raster::from_rgb(2, 1, vec![10, 100, 200, 50, 60, 70]).unwrap()
    }

    #[test]
    fn neutral_params_leave_image_untouched() {
        let img = sample();
        assert_eq!(apply_all(&img, &EditorParams::default()).unwrap(), img);
        let params = EditorParams {
            global_brightness: Some(100),
            red_brightness: Some(100),
            log_contrast: Some(0.0),
            ..Default::default()
        };
        assert_eq!(apply_all(&img, &params).unwrap(), img);
    }

    #[test]
    fn brightness_steps_use_slider_offsets() {
        let params = EditorParams {
            global_brightness: Some(110),
            blue_brightness: Some(90),
            ..Default::default()
        };
        let out = apply_all(&sample(), &params).unwrap();
        assert_eq!(out.pixel(0, 0), vec![20, 110, 200]);
        assert_eq!(out.pixel(1, 0), vec![60, 70, 70]);
    }

    #[test]
    fn effects_run_after_contrast_in_order() {
        let params = EditorParams {
            grayscale: true,
            negative: true,
            binary: true,
            threshold: Some(128),
            ..Default::default()
        };
        let out = apply_all(&sample(), &params).unwrap();
        assert!(out.is_gray());
        // luma(10,100,200)=88 -> negative 167 -> binary 255
        assert_eq!(out.pixel(0, 0), vec![255]);
        // luma(50,60,70)=58 -> 197 -> 255
        assert_eq!(out.pixel(1, 0), vec![255]);
    }

    #[test]
    fn log_slider_matches_single_filter() {
        let img = sample();
        let params = EditorParams {
            log_contrast: Some(50.0),
            ..Default::default()
        };
        let via_slider = apply_all(&img, &params).unwrap();
        let direct = apply_filter(&img, &FilterRequest::LogContrast { c: Some(0.5) }).unwrap();
        assert_eq!(via_slider, direct);
        // 0.5 * ln(101) = 2.31
        assert_eq!(via_slider.pixel(0, 0)[1], 2);
    }

    #[test]
    fn slider_mappings() {
        assert!((exp_slider_to_k(50.0) - 0.05).abs() < 1e-12);
        assert!((log_slider_to_constant(50.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn extreme_brightness_sliders_saturate() {
        let params = EditorParams {
            global_brightness: Some(i32::MIN),
            red_brightness: Some(i32::MAX),
            ..Default::default()
        };
        let out = apply_all(&sample(), &params).unwrap();
        assert_eq!(out.pixel(0, 0), vec![255, 0, 0]);
        let params = EditorParams {
            global_brightness: Some(i32::MAX),
            ..Default::default()
        };
        let out = apply_all(&sample(), &params).unwrap();
        assert_eq!(out.pixel(1, 0), vec![255, 255, 255]);
    }

    #[test]
    fn single_filters_dispatch() {
        let img = sample();
        let neg = apply_filter(&img, &FilterRequest::Negative).unwrap();
        assert_eq!(neg.pixel(0, 0), vec![245, 155, 55]);
        let cropped = apply_filter(
            &img,
            &FilterRequest::Crop {
                x1: 1,
                y1: 0,
                x2: 2,
                y2: 1,
            },
        )
        .unwrap();
        assert_eq!(cropped.pixel(0, 0), vec![50, 60, 70]);
        assert!(apply_filter(&img, &FilterRequest::Gamma { gamma: -2.0 }).is_err());
    }
}
