//! Viewer configuration
//!
//! Everything the viewer needs to start is collected in [`ViewerConfig`], parsed
//! from the command line (or the `UCHO_*` environment variables). Defaults match
//! the constants the inner-ear viewer has always used.

use std::path::PathBuf;

use clap::Parser;

use crate::scene::slice_plane::StepPolicy;
use crate::volume::window_level::WindowLevel;

pub const DEFAULT_WINDOW_WIDTH: u32 = 1600;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 1200;
pub const DEFAULT_COLOR_WINDOW: f32 = 1000.0;
pub const DEFAULT_COLOR_LEVEL: f32 = 500.0;
pub const DEFAULT_OPACITY: f32 = 0.8;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ucho",
    version,
    about = "View an NRRD scan with orthogonal slices and VTK surface meshes"
)]
pub struct ViewerConfig {
    /// NRRD volume (.nrrd or detached .nhdr header)
    #[arg(env = "UCHO_VOLUME")]
    pub volume: PathBuf,

    /// Directory containing legacy .vtk surface meshes
    #[arg(env = "UCHO_MESH_DIR")]
    pub mesh_dir: PathBuf,

    /// Scene window width in pixels
    #[arg(long, default_value_t = DEFAULT_WINDOW_WIDTH)]
    pub width: u32,

    /// Scene window height in pixels
    #[arg(long, default_value_t = DEFAULT_WINDOW_HEIGHT)]
    pub height: u32,

    /// Grayscale window (display range width) for the slice planes
    #[arg(long = "window", default_value_t = DEFAULT_COLOR_WINDOW)]
    pub color_window: f32,

    /// Grayscale level (display range center) for the slice planes
    #[arg(long = "level", default_value_t = DEFAULT_COLOR_LEVEL)]
    pub color_level: f32,

    /// Initial opacity of every surface, between 0.1 and 1.0
    #[arg(long, default_value_t = DEFAULT_OPACITY)]
    pub opacity: f32,

    /// Let the arrow and z/x keys step slices past the volume bounds
    #[arg(long)]
    pub unclamped: bool,
}

impl ViewerConfig {
    /// Checks the values clap cannot check on its own.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.1..=1.0).contains(&self.opacity) {
            return Err(format!(
                "opacity must be between 0.1 and 1.0, got {}",
                self.opacity
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err("window size must be non-zero".to_string());
        }
        self.window_level()
            .map(|_| ())
            .ok_or_else(|| {
                format!(
                    "invalid window/level {}/{}",
                    self.color_window, self.color_level
                )
            })
    }

    pub fn window_level(&self) -> Option<WindowLevel> {
        WindowLevel::new(self.color_window, self.color_level)
    }

    pub fn step_policy(&self) -> StepPolicy {
        if self.unclamped {
            StepPolicy::Unbounded
        } else {
            StepPolicy::Clamped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ViewerConfig {
        ViewerConfig::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults_match_viewer_constants() {
        let config = parse(&["ucho", "ear.nrrd", "models"]);
        assert_eq!(config.width, 1600);
        assert_eq!(config.height, 1200);
        assert_eq!(config.color_window, 1000.0);
        assert_eq!(config.color_level, 500.0);
        assert_eq!(config.opacity, 0.8);
        assert_eq!(config.step_policy(), StepPolicy::Clamped);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unclamped_flag() {
        let config = parse(&["ucho", "ear.nrrd", "models", "--unclamped"]);
        assert_eq!(config.step_policy(), StepPolicy::Unbounded);
    }

    #[test]
    fn test_rejects_out_of_range_opacity() {
        let config = parse(&["ucho", "ear.nrrd", "models", "--opacity", "1.5"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_positive_window() {
        let config = parse(&["ucho", "ear.nrrd", "models", "--window", "0"]);
        assert!(config.validate().is_err());
    }
}
