//! Command-line argument parsing for the Farview preview.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Farview preview command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "farview-preview", about = "Render the Farview sky and a far-away mesh to PNG")]
pub struct CliArgs {
    /// Image width in pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels.
    #[arg(long)]
    pub height: Option<u32>,

    /// Output PNG path.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Camera world X coordinate.
    #[arg(long, allow_negative_numbers = true)]
    pub camera_x: Option<f64>,

    /// Camera world Y coordinate.
    #[arg(long, allow_negative_numbers = true)]
    pub camera_y: Option<f64>,

    /// Camera world Z coordinate.
    #[arg(long, allow_negative_numbers = true)]
    pub camera_z: Option<f64>,

    /// Near plane distance.
    #[arg(long)]
    pub z_near: Option<f32>,

    /// Far plane distance.
    #[arg(long)]
    pub z_far: Option<f32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.preview.width = w;
        }
        if let Some(h) = args.height {
            self.preview.height = h;
        }
        if let Some(ref path) = args.output {
            self.preview.output = path.clone();
        }
        for (axis, value) in [args.camera_x, args.camera_y, args.camera_z].into_iter().enumerate() {
            if let Some(v) = value {
                self.camera.position[axis] = v;
            }
        }
        if let Some(near) = args.z_near {
            self.depth.z_near = near;
        }
        if let Some(far) = args.z_far {
            self.depth.z_far = far;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
