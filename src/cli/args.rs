use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use imgedit::types::OutputFormat;
use imgedit::{CmykLayer, FusionMode, RgbLayer};

#[derive(Parser, Debug)]
#[command(name = "imgedit", version, about = "imgedit CLI")]
pub struct CliArgs {
    /// Enable debug logging (otherwise RUST_LOG is honoured)
    #[arg(long, global = true, default_value_t = false)]
    pub log: bool,

    /// JPEG quality for JPEG outputs (1-100)
    #[arg(long, global = true, default_value_t = 90,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Write a JSON metadata sidecar next to each output image
    #[arg(long, global = true, default_value_t = false)]
    pub sidecar: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply one filter, given as a JSON request or a filter tag
    Filter(FilterArgs),
    /// Replay the slider pipeline from a params file and/or flags
    Pipeline(PipelineArgs),
    /// Fuse two images
    Fuse(FuseArgs),
    /// Extract an RGB or CMYK layer, or suppress a CMYK layer
    Layer(LayerArgs),
    /// Print or save the histogram of an image
    Histogram(HistogramArgs),
    /// Crop to a rectangle
    Crop(CropArgs),
    /// Crop to a rectangle and scale it up
    Zoom(ZoomArgs),
    /// Rotate counter-clockwise by an angle in degrees
    Rotate(RotateArgs),
    /// Run the slider pipeline over every image in a directory
    Batch(BatchArgs),
    /// Replay endpoint requests (one JSON object per line) against one session
    ServeScript(ServeScriptArgs),
}

/// Input and output shared by the single-image commands.
#[derive(Args, Debug, Clone)]
pub struct IoArgs {
    /// Input image
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output image
    #[arg(short, long)]
    pub output: PathBuf,

    /// Output format (defaults to the output extension)
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Long-side size of the output. Options:
    /// - Custom: any positive integer (e.g., 1024)
    /// - Original: "original" (no scaling)
    #[arg(long, default_value = "original")]
    pub size: String,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Filter tag (e.g. negativo) or a full JSON request
    #[arg(long)]
    pub filter: String,

    /// Extra request fields as key=value (value parsed as JSON when possible)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

/// Slider flags; each one overrides the same field of `--params`.
#[derive(Args, Debug, Clone, Default)]
pub struct SliderArgs {
    /// JSON file with the slider state
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Global brightness slider (0-200, 100 is neutral)
    #[arg(long)]
    pub global_brightness: Option<i32>,

    #[arg(long)]
    pub red_brightness: Option<i32>,

    #[arg(long)]
    pub green_brightness: Option<i32>,

    #[arg(long)]
    pub blue_brightness: Option<i32>,

    /// Log contrast slider (0-100, 0 disables)
    #[arg(long)]
    pub log_contrast: Option<f64>,

    /// Exponential contrast slider (0-100, 0 disables)
    #[arg(long)]
    pub exp_contrast: Option<f64>,

    #[arg(long, default_value_t = false)]
    pub grayscale: bool,

    #[arg(long, default_value_t = false)]
    pub negative: bool,

    #[arg(long, default_value_t = false)]
    pub binary: bool,

    /// Binarization threshold (default 128)
    #[arg(long)]
    pub threshold: Option<i32>,
}

#[derive(Args, Debug)]
pub struct PipelineArgs {
    #[command(flatten)]
    pub io: IoArgs,

    #[command(flatten)]
    pub sliders: SliderArgs,
}

#[derive(Args, Debug)]
pub struct FuseArgs {
    /// Base image; the result has its size
    #[arg(long)]
    pub first: PathBuf,

    /// Image blended over the base, resized to match
    #[arg(long)]
    pub second: PathBuf,

    #[arg(short, long)]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value_t = FusionMode::Normal)]
    pub mode: FusionMode,

    /// Weight of the first image (0-1)
    #[arg(long, default_value_t = 0.5)]
    pub alpha: f64,

    /// Equalize through luma instead of per channel (equalized mode)
    #[arg(long, default_value_t = false)]
    pub luma: bool,

    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Args, Debug)]
pub struct LayerArgs {
    #[command(flatten)]
    pub io: IoArgs,

    #[arg(long, value_enum, required_unless_present = "cmyk", conflicts_with = "cmyk")]
    pub rgb: Option<RgbLayer>,

    #[arg(long, value_enum, required_unless_present = "rgb")]
    pub cmyk: Option<CmykLayer>,

    /// Remove the CMYK layer instead of extracting it
    #[arg(long, default_value_t = false, requires = "cmyk", conflicts_with = "rgb")]
    pub suppress: bool,
}

#[derive(Args, Debug)]
pub struct HistogramArgs {
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write the histogram JSON here instead of stdout
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Render a bar chart image
    #[arg(long)]
    pub chart: Option<PathBuf>,

    #[arg(long, default_value_t = 512)]
    pub chart_width: usize,

    #[arg(long, default_value_t = 200)]
    pub chart_height: usize,
}

/// Rectangle corners, clamped to the image.
#[derive(Args, Debug, Clone, Copy)]
pub struct RectArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub x1: i64,
    #[arg(long, allow_negative_numbers = true)]
    pub y1: i64,
    #[arg(long, allow_negative_numbers = true)]
    pub x2: i64,
    #[arg(long, allow_negative_numbers = true)]
    pub y2: i64,
}

#[derive(Args, Debug)]
pub struct CropArgs {
    #[command(flatten)]
    pub io: IoArgs,

    #[command(flatten)]
    pub rect: RectArgs,
}

#[derive(Args, Debug)]
pub struct ZoomArgs {
    #[command(flatten)]
    pub io: IoArgs,

    #[command(flatten)]
    pub rect: RectArgs,

    #[arg(long, default_value_t = 2.0)]
    pub scale: f64,
}

#[derive(Args, Debug)]
pub struct RotateArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Degrees, counter-clockwise
    #[arg(long, allow_negative_numbers = true)]
    pub angle: f64,

    /// Keep the input size instead of growing to fit the rotated image
    #[arg(long, default_value_t = false)]
    pub no_expand: bool,

    /// Background color as r,g,b
    #[arg(long, value_delimiter = ',', default_values_t = [0u8, 0, 0])]
    pub fill: Vec<u8>,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Input directory containing images
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Output directory
    #[arg(long)]
    pub output_dir: PathBuf,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Jpeg)]
    pub format: OutputFormat,

    #[arg(long, default_value = "original")]
    pub size: String,

    /// Continue with the remaining files when one fails
    #[arg(long, default_value_t = false)]
    pub continue_on_error: bool,

    #[command(flatten)]
    pub sliders: SliderArgs,
}

#[derive(Args, Debug)]
pub struct ServeScriptArgs {
    /// JSON Lines file of requests ({"method", "path", "csrf_token", "body"})
    #[arg(long)]
    pub script: PathBuf,

    /// Require this CSRF token on every request
    #[arg(long)]
    pub csrf_token: Option<String>,

    /// Write responses here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Save the final current image here
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_filter_command() {
        let args = CliArgs::try_parse_from([
            "imgedit", "--log", "filter", "-i", "a.png", "-o", "b.jpg", "--filter", "binario",
            "--set", "umbral=90",
        ])
        .unwrap();
        assert!(args.log);
        assert_eq!(args.quality, 90);
        match args.command {
            Command::Filter(f) => {
                assert_eq!(f.filter, "binario");
                assert_eq!(f.params, vec!["umbral=90".to_string()]);
                assert_eq!(f.io.size, "original");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn layer_requires_exactly_one_kind() {
        assert!(CliArgs::try_parse_from(["imgedit", "layer", "-i", "a", "-o", "b"]).is_err());
        assert!(
            CliArgs::try_parse_from([
                "imgedit", "layer", "-i", "a", "-o", "b", "--rgb", "r", "--cmyk", "c"
            ])
            .is_err()
        );
        assert!(
            CliArgs::try_parse_from(["imgedit", "layer", "-i", "a", "-o", "b", "--rgb", "r", "--suppress"])
                .is_err()
        );
        assert!(
            CliArgs::try_parse_from(["imgedit", "layer", "-i", "a", "-o", "b", "--cmyk", "k", "--suppress"])
                .is_ok()
        );
    }

    #[test]
    fn rotate_fill_and_negative_angle() {
        let args = CliArgs::try_parse_from([
            "imgedit", "rotate", "-i", "a", "-o", "b", "--angle", "-30", "--fill", "255,0,10",
        ])
        .unwrap();
        match args.command {
            Command::Rotate(r) => {
                assert_eq!(r.angle, -30.0);
                assert_eq!(r.fill, vec![255, 0, 10]);
            }
            other => panic!("unexpected {:?}", other),
        }

        let args =
            CliArgs::try_parse_from(["imgedit", "rotate", "-i", "a", "-o", "b", "--angle", "5"])
                .unwrap();
        match args.command {
            Command::Rotate(r) => assert_eq!(r.fill, vec![0, 0, 0]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn quality_is_range_checked() {
        assert!(
            CliArgs::try_parse_from(["imgedit", "--quality", "0", "histogram", "-i", "a"]).is_err()
        );
    }
}
