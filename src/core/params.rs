use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::{CmykLayer, GrayMethod, RgbLayer};

/// Wire tags accepted in the `filter_type` field.
pub const FILTER_TAGS: &[&str] = &[
    "brillo_global",
    "brillo_canal",
    "contraste_log",
    "contraste_exp",
    "contraste_gamma",
    "grises",
    "negativo",
    "binario",
    "recorte",
    "zoom",
    "rotacion",
    "capa_rgb",
    "capa_cmyk",
    "suprimir_cmyk",
];

fn default_k() -> f64 {
    0.01
}

fn default_gamma() -> f64 {
    1.0
}

fn default_threshold() -> i32 {
    128
}

fn default_scale() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

/// One filter applied to the current image, as sent to `/apply-filter/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "filter_type")]
pub enum FilterRequest {
    #[serde(rename = "brillo_global")]
    BrightnessGlobal {
        #[serde(default)]
        delta: i32,
    },
    #[serde(rename = "brillo_canal")]
    BrightnessChannels {
        #[serde(default)]
        delta_r: i32,
        #[serde(default)]
        delta_g: i32,
        #[serde(default)]
        delta_b: i32,
    },
    #[serde(rename = "contraste_log")]
    LogContrast {
        #[serde(default)]
        c: Option<f64>,
    },
    #[serde(rename = "contraste_exp")]
    ExpContrast {
        #[serde(default = "default_k")]
        k: f64,
    },
    #[serde(rename = "contraste_gamma")]
    Gamma {
        #[serde(default = "default_gamma")]
        gamma: f64,
    },
    #[serde(rename = "grises")]
    Grayscale {
        #[serde(default)]
        metodo: GrayMethod,
    },
    #[serde(rename = "negativo")]
    Negative,
    #[serde(rename = "binario")]
    Binary {
        #[serde(default = "default_threshold")]
        umbral: i32,
    },
    #[serde(rename = "recorte")]
    Crop { x1: i64, y1: i64, x2: i64, y2: i64 },
    #[serde(rename = "zoom")]
    Zoom {
        x1: i64,
        y1: i64,
        x2: i64,
        y2: i64,
        #[serde(default = "default_scale")]
        escala: f64,
    },
    #[serde(rename = "rotacion")]
    Rotate {
        angulo: f64,
        #[serde(default = "default_true")]
        expand: bool,
        #[serde(default)]
        fill: [u8; 3],
    },
    #[serde(rename = "capa_rgb")]
    RgbLayer { capa: RgbLayer },
    #[serde(rename = "capa_cmyk")]
    CmykLayer { capa: CmykLayer },
    #[serde(rename = "suprimir_cmyk")]
    SuppressCmyk { capa: CmykLayer },
}

impl FilterRequest {
    /// Parse a request body, reporting an unknown `filter_type` by name.
    pub fn from_value(value: Value) -> Result<Self> {
        let tag = match value.get("filter_type") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => return Err(Error::UnknownFilter(other.to_string())),
            None => {
                return Err(Error::MissingArgument {
                    arg: "filter_type".to_string(),
                });
            }
        };
        if !FILTER_TAGS.contains(&tag.as_str()) {
            return Err(Error::UnknownFilter(tag));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json(body: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(body)?)
    }

    /// The wire tag of this request.
    pub fn tag(&self) -> &'static str {
        match self {
            FilterRequest::BrightnessGlobal { .. } => "brillo_global",
            FilterRequest::BrightnessChannels { .. } => "brillo_canal",
            FilterRequest::LogContrast { .. } => "contraste_log",
            FilterRequest::ExpContrast { .. } => "contraste_exp",
            FilterRequest::Gamma { .. } => "contraste_gamma",
            FilterRequest::Grayscale { .. } => "grises",
            FilterRequest::Negative => "negativo",
            FilterRequest::Binary { .. } => "binario",
            FilterRequest::Crop { .. } => "recorte",
            FilterRequest::Zoom { .. } => "zoom",
            FilterRequest::Rotate { .. } => "rotacion",
            FilterRequest::RgbLayer { .. } => "capa_rgb",
            FilterRequest::CmykLayer { .. } => "capa_cmyk",
            FilterRequest::SuppressCmyk { .. } => "suprimir_cmyk",
        }
    }
}

/// Slider neutral position for the brightness controls.
pub const NEUTRAL_BRIGHTNESS: i32 = 100;

/// Slider state sent to `/apply-multiple-filters/`. Also the config file
/// format for the CLI pipeline and batch modes.
///
/// Brightness sliders run 0..=200 with 100 as neutral; contrast sliders run
/// 0..=100 where 0 disables the step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorParams {
    pub global_brightness: Option<i32>,
    pub red_brightness: Option<i32>,
    pub green_brightness: Option<i32>,
    pub blue_brightness: Option<i32>,
    pub log_contrast: Option<f64>,
    pub exp_contrast: Option<f64>,
    pub grayscale: bool,
    pub negative: bool,
    pub binary: bool,
    pub threshold: Option<i32>,
    /// Long-side size for file outputs; `None` keeps the original size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

impl EditorParams {
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn threshold(&self) -> i32 {
        self.threshold.unwrap_or(default_threshold())
    }

    /// True when no step of the pipeline would change the image.
    pub fn is_neutral(&self) -> bool {
        let neutral = |v: Option<i32>| v.is_none_or(|v| v == NEUTRAL_BRIGHTNESS);
        neutral(self.global_brightness)
            && neutral(self.red_brightness)
            && neutral(self.green_brightness)
            && neutral(self.blue_brightness)
            && self.log_contrast.is_none_or(|v| v <= 0.0)
            && self.exp_contrast.is_none_or(|v| v <= 0.0)
            && !self.grayscale
            && !self.negative
            && !self.binary
    }

    /// Filter tags of the steps `apply_all` would run, in order.
    pub fn steps(&self) -> Vec<&'static str> {
        let mut steps = Vec::new();
        if self.global_brightness.is_some() {
            steps.push("brillo_global");
        }
        if self.red_brightness.is_some()
            || self.green_brightness.is_some()
            || self.blue_brightness.is_some()
        {
            steps.push("brillo_canal");
        }
        if self.log_contrast.is_some_and(|v| v > 0.0) {
            steps.push("contraste_log");
        }
        if self.exp_contrast.is_some_and(|v| v > 0.0) {
            steps.push("contraste_exp");
        }
        if self.grayscale {
            steps.push("grises");
        }
        if self.negative {
            steps.push("negativo");
        }
        if self.binary {
            steps.push("binario");
        }
        steps
    }
}
