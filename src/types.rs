//! Shared types and enums used across imgedit.
//! Includes `OutputFormat`, `GrayMethod`, `RgbLayer`, `CmykLayer` and `FusionMode`.
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum OutputFormat {
    Jpeg, // Lossy
    Png,
    Tiff,
}

impl OutputFormat {
    /// Infer the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "tif" | "tiff" => Ok(OutputFormat::Tiff),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Tiff => "tiff",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Tiff => "image/tiff",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Jpeg => write!(f, "JPEG"),
            OutputFormat::Png => write!(f, "PNG"),
            OutputFormat::Tiff => write!(f, "TIFF"),
        }
    }
}

/// Gray conversion weights.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default, Serialize, Deserialize,
)]
pub enum GrayMethod {
    /// ITU-R BT.709 luminance
    #[default]
    #[serde(rename = "luma")]
    Luma,
    /// Plain channel average
    #[serde(rename = "promedio", alias = "average")]
    #[value(alias = "promedio")]
    Average,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RgbLayer {
    R,
    G,
    B,
}

impl RgbLayer {
    pub fn index(&self) -> usize {
        match self {
            RgbLayer::R => 0,
            RgbLayer::G => 1,
            RgbLayer::B => 2,
        }
    }

    pub const ALL: [RgbLayer; 3] = [RgbLayer::R, RgbLayer::G, RgbLayer::B];
}

impl std::fmt::Display for RgbLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RgbLayer::R => "R",
            RgbLayer::G => "G",
            RgbLayer::B => "B",
        };
        write!(f, "{}", s)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CmykLayer {
    C,
    M,
    Y,
    K,
}

impl CmykLayer {
    pub fn index(&self) -> usize {
        match self {
            CmykLayer::C => 0,
            CmykLayer::M => 1,
            CmykLayer::Y => 2,
            CmykLayer::K => 3,
        }
    }

    pub const ALL: [CmykLayer; 4] = [CmykLayer::C, CmykLayer::M, CmykLayer::Y, CmykLayer::K];
}

impl std::str::FromStr for CmykLayer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "c" => Ok(CmykLayer::C),
            "m" => Ok(CmykLayer::M),
            "y" => Ok(CmykLayer::Y),
            "k" => Ok(CmykLayer::K),
            _ => Err(Error::invalid("layer", s)),
        }
    }
}

impl std::fmt::Display for CmykLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CmykLayer::C => "C",
            CmykLayer::M => "M",
            CmykLayer::Y => "Y",
            CmykLayer::K => "K",
        };
        write!(f, "{}", s)
    }
}

#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FusionMode {
    #[default]
    Normal,
    Equalized,
}

impl std::fmt::Display for FusionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FusionMode::Normal => write!(f, "Normal"),
            FusionMode::Equalized => write!(f, "Equalized"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_from_extension() {
        assert_eq!(
            OutputFormat::from_path(Path::new("a/b.JPG")).unwrap(),
            OutputFormat::Jpeg
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("x.tif")).unwrap(),
            OutputFormat::Tiff
        );
        assert!(OutputFormat::from_path(Path::new("x.bmp")).is_err());
        assert!(OutputFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn wire_names() {
        assert_eq!(serde_json::to_string(&GrayMethod::Average).unwrap(), "\"promedio\"");
        assert_eq!(
            serde_json::from_str::<FusionMode>("\"equalized\"").unwrap(),
            FusionMode::Equalized
        );
        assert_eq!(serde_json::from_str::<CmykLayer>("\"k\"").unwrap(), CmykLayer::K);
        assert!("z".parse::<CmykLayer>().is_err());
        assert_eq!("M".parse::<CmykLayer>().unwrap(), CmykLayer::M);
    }
}
