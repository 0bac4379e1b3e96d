use clap::{Parser, ValueEnum};
use depthframe::{Centering, FrameDims, VertexLayout};
use std::path::PathBuf;

pub const DEFAULT_FRAME_WIDTH: u32 = 784;
pub const DEFAULT_FRAME_HEIGHT: u32 = 448;
pub const DEFAULT_EYE_DISTANCE: f32 = 500.0;

/// Where depth/color pairs come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Animated ripple surface generated in-process.
    Synthetic,
    /// A color image (and optional raw depth file) re-posted at the frame rate.
    Static,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    /// x, y, z per point.
    Position,
    /// x, y, z and a default +Z normal per point.
    PositionNormal,
}

impl From<LayoutArg> for VertexLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Position => VertexLayout::Position,
            LayoutArg::PositionNormal => VertexLayout::PositionNormal,
        }
    }
}

/// `depth_viewer` - live point-cloud view of a streaming depth map.
///
/// Every depth pixel becomes one point, colored by the aligned color frame.
/// Drag to orbit, scroll to zoom, W/A/S/D to pan.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Depth/color frame width in pixels. Frames of any other size are rejected.
    #[arg(
        long,
        env = "DEPTHVIEW_WIDTH",
        default_value_t = DEFAULT_FRAME_WIDTH,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub width: u32,

    /// Depth/color frame height in pixels.
    #[arg(
        long,
        env = "DEPTHVIEW_HEIGHT",
        default_value_t = DEFAULT_FRAME_HEIGHT,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub height: u32,

    /// Multiplier applied to every depth value.
    #[arg(long, env = "DEPTHVIEW_DEPTH_SCALE", default_value_t = 1.0)]
    pub depth_scale: f32,

    #[arg(long, value_enum, env = "DEPTHVIEW_LAYOUT", default_value_t = LayoutArg::Position)]
    pub layout: LayoutArg,

    /// Keep the grid in pixel coordinates instead of centering it on the origin.
    #[arg(long, env = "DEPTHVIEW_NO_CENTER")]
    pub no_center: bool,

    /// Initial distance of the eye along +Z.
    #[arg(long, env = "DEPTHVIEW_EYE_DISTANCE", default_value_t = DEFAULT_EYE_DISTANCE)]
    pub eye_distance: f32,

    #[arg(long, value_enum, env = "DEPTHVIEW_SOURCE", default_value_t = SourceKind::Synthetic)]
    pub source: SourceKind,

    /// Color image for the static source.
    #[arg(long, env = "DEPTHVIEW_COLOR_IMAGE", required_if_eq("source", "static"))]
    pub color_image: Option<PathBuf>,

    /// Raw little-endian f32 depth grid for the static source. Flat if omitted.
    #[arg(long, env = "DEPTHVIEW_DEPTH_FILE")]
    pub depth_file: Option<PathBuf>,

    /// Frames per second produced by the frame source.
    #[arg(long, env = "DEPTHVIEW_FPS", default_value_t = 30.0)]
    pub fps: f64,

    /// WGSL file replacing the built-in point shader.
    #[arg(long, env = "DEPTHVIEW_SHADER")]
    pub shader: Option<PathBuf>,

    #[arg(long, default_value_t = 1280)]
    pub window_width: u32,

    #[arg(long, default_value_t = 720)]
    pub window_height: u32,
}

impl Config {
    pub fn cloud_settings(&self) -> CloudSettings {
        CloudSettings {
            dims: FrameDims::new(self.width, self.height),
            depth_scale: self.depth_scale,
            layout: self.layout.into(),
            centering: if self.no_center {
                Centering::None
            } else {
                Centering::GridCenter
            },
            eye_distance: self.eye_distance,
        }
    }
}

/// Fixed-for-lifetime parameters of one point-cloud renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudSettings {
    pub dims: FrameDims,
    pub depth_scale: f32,
    pub layout: VertexLayout,
    pub centering: Centering,
    pub eye_distance: f32,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            dims: FrameDims::new(DEFAULT_FRAME_WIDTH, DEFAULT_FRAME_HEIGHT),
            depth_scale: 1.0,
            layout: VertexLayout::Position,
            centering: Centering::GridCenter,
            eye_distance: DEFAULT_EYE_DISTANCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_live_layout() {
        let config = Config::parse_from(["depth_viewer"]);
        assert_eq!(config.cloud_settings(), CloudSettings::default());
    }

    #[test]
    fn flags_map_onto_settings() {
        let config = Config::parse_from([
            "depth_viewer",
            "--width",
            "64",
            "--height",
            "32",
            "--layout",
            "position-normal",
            "--no-center",
            "--depth-scale",
            "4",
        ]);
        let settings = config.cloud_settings();
        assert_eq!(settings.dims, FrameDims::new(64, 32));
        assert_eq!(settings.layout, VertexLayout::PositionNormal);
        assert_eq!(settings.centering, Centering::None);
        assert_eq!(settings.depth_scale, 4.0);
    }

    #[test]
    fn zero_frame_size_is_refused() {
        assert!(Config::try_parse_from(["depth_viewer", "--width", "0"]).is_err());
        assert!(Config::try_parse_from(["depth_viewer", "--height", "0"]).is_err());
        assert!(Config::try_parse_from(["depth_viewer", "--width", "1", "--height", "1"]).is_ok());
    }

    #[test]
    fn static_source_needs_an_image() {
        assert!(Config::try_parse_from(["depth_viewer", "--source", "static"]).is_err());
    }
}
