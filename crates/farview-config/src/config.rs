//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use farview_math::DepthRange;
use farview_sky::{SkyParams, StarLayer};
use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level preview configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Camera placement.
    pub camera: CameraConfig,
    /// Near/far planes for logarithmic depth.
    pub depth: DepthConfig,
    /// Sky synthesis tunables.
    pub sky: SkyConfig,
    /// Output image and demo mesh.
    pub preview: PreviewConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Absolute world position.
    pub position: [f64; 3],
    /// Viewing direction; normalized on use.
    pub look_dir: [f32; 3],
    /// Approximate up vector.
    pub up: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
}

/// Depth range configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DepthConfig {
    /// Near plane distance. Must be positive.
    pub z_near: f32,
    /// Far plane distance. Must exceed `z_near`.
    pub z_far: f32,
}

/// One starfield grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StarLayerConfig {
    /// Lattice density multiplier.
    pub scale: f32,
    /// Intensity weight.
    pub weight: f32,
}

/// Sky configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SkyConfig {
    /// Star probability multiplier.
    pub density: f32,
    /// Star radius multiplier.
    pub star_size: f32,
    /// Base star probability.
    pub base_density: f32,
    /// Lattice cells per unit of direction length.
    pub grid_scale: f32,
    /// Starfield grids, summed.
    pub star_layers: Vec<StarLayerConfig>,
    /// Nebula color where the cloud noise is low.
    pub green_tint: [f32; 3],
    /// Nebula color where the cloud noise is high.
    pub purple_tint: [f32; 3],
}

/// Preview output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreviewConfig {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Output PNG path.
    pub output: PathBuf,
    /// Icosphere subdivision level of the demo mesh.
    pub mesh_subdivisions: u32,
    /// Demo mesh radius in world units.
    pub mesh_radius: f64,
    /// Demo mesh centre in world coordinates.
    pub mesh_center: [f64; 3],
    /// Turn the camera toward the mesh before rendering.
    pub look_at_mesh: bool,
    /// Number of tectonic plates painted on the demo mesh.
    pub plate_count: usize,
    /// Seed for plate layout and classification.
    pub plate_seed: u64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [200_000_000.0, -100_000_000.0, 50_000_000.0],
            look_dir: [0.0, 0.0, -1.0],
            up: [0.0, 1.0, 0.0],
            fov_y_degrees: 60.0,
        }
    }
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            z_near: 0.1,
            z_far: 1.0e9,
        }
    }
}

impl Default for SkyConfig {
    fn default() -> Self {
        let params = SkyParams::default();
        Self {
            density: params.density,
            star_size: params.star_size,
            base_density: params.base_density,
            grid_scale: params.grid_scale,
            star_layers: params
                .star_layers
                .iter()
                .map(|l| StarLayerConfig {
                    scale: l.scale,
                    weight: l.weight,
                })
                .collect(),
            green_tint: params.green_tint.to_array(),
            purple_tint: params.purple_tint.to_array(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            output: PathBuf::from("farview.png"),
            mesh_subdivisions: 3,
            mesh_radius: 1000.0,
            mesh_center: [200_000_000.0, -100_000_000.0, 49_995_000.0],
            look_at_mesh: true,
            plate_count: 40,
            plate_seed: 1,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Conversions ---

/// Smallest `|look_dir x up|` that still fixes a camera roll.
const MIN_ORIENTATION_SINE: f32 = 1e-4;

fn unit_or(v: [f32; 3], fallback: Vec3) -> Vec3 {
    let v = Vec3::from_array(v).normalize_or_zero();
    if v == Vec3::ZERO { fallback } else { v }
}

impl CameraConfig {
    pub fn position(&self) -> DVec3 {
        DVec3::from_array(self.position)
    }

    pub fn look_dir(&self) -> Vec3 {
        unit_or(self.look_dir, Vec3::NEG_Z)
    }

    pub fn up(&self) -> Vec3 {
        unit_or(self.up, Vec3::Y)
    }

    pub fn fov_y_radians(&self) -> f32 {
        self.fov_y_degrees.to_radians()
    }
}

impl DepthConfig {
    pub fn range(&self) -> Result<DepthRange, ConfigError> {
        Ok(DepthRange::new(self.z_near, self.z_far)?)
    }
}

impl SkyConfig {
    pub fn to_params(&self) -> SkyParams {
        SkyParams {
            density: self.density,
            star_size: self.star_size,
            base_density: self.base_density,
            grid_scale: self.grid_scale,
            star_layers: self
                .star_layers
                .iter()
                .map(|l| StarLayer::new(l.scale, l.weight))
                .collect(),
            green_tint: Vec3::from_array(self.green_tint),
            purple_tint: Vec3::from_array(self.purple_tint),
        }
    }
}

impl PreviewConfig {
    pub fn mesh_center(&self) -> DVec3 {
        DVec3::from_array(self.mesh_center)
    }
}

impl Config {
    /// Direction the preview camera faces once `look_at_mesh` is applied.
    pub fn effective_look_dir(&self) -> Vec3 {
        if self.preview.look_at_mesh {
            let to_mesh =
                (self.preview.mesh_center() - self.camera.position()).normalize_or_zero();
            if to_mesh != DVec3::ZERO {
                return to_mesh.as_vec3();
            }
        }
        self.camera.look_dir()
    }
}

// --- Validation ---

impl Config {
    /// Reject settings the renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.depth.range()?;

        if self.preview.width == 0 || self.preview.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "preview size must be non-zero, got {}x{}",
                self.preview.width, self.preview.height
            )));
        }
        if !(self.camera.fov_y_degrees > 0.0 && self.camera.fov_y_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "fov_y_degrees must lie in (0, 180), got {}",
                self.camera.fov_y_degrees
            )));
        }
        if self.camera.look_dir == [0.0; 3] {
            return Err(ConfigError::Invalid("camera look_dir must be non-zero".to_string()));
        }
        let (look_dir, up) = (self.effective_look_dir(), self.camera.up());
        if look_dir.cross(up).length() < MIN_ORIENTATION_SINE {
            return Err(ConfigError::Invalid(format!(
                "camera look direction {look_dir} is parallel to up {up}"
            )));
        }
        if !(self.sky.grid_scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "sky grid_scale must be positive, got {}",
                self.sky.grid_scale
            )));
        }
        if let Some(layer) = self.sky.star_layers.iter().find(|l| !(l.scale > 0.0)) {
            return Err(ConfigError::Invalid(format!(
                "star layer scale must be positive, got {}",
                layer.scale
            )));
        }
        if !(self.preview.mesh_radius > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "mesh_radius must be positive, got {}",
                self.preview.mesh_radius
            )));
        }
        if self.preview.plate_count == 0 {
            return Err(ConfigError::Invalid("plate_count must be positive".to_string()));
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

/// File name of the config inside its directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Platform config directory for Farview (`<config_dir>/farview`), if the
/// platform has one.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("farview"))
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError {
    let path = path.to_path_buf();
    move |source| ConfigError::WriteError { path, source }
}

impl Config {
    /// Load `config.ron` from `config_dir`, writing the defaults there first
    /// when the file does not exist yet.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Wrote default config to {}", config_path.display());
            return Ok(config);
        }
        let config = read_config(&config_path)?;
        log::info!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    /// Write this config to `config_dir/config.ron`, creating the directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(write_error(config_dir))?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        std::fs::write(&config_path, serialized).map_err(write_error(&config_path))
    }

    /// Re-read `config.ron`. Returns `Some` only when the file differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = read_config(&config_dir.join(CONFIG_FILE_NAME))?;
        if &fresh == self {
            return Ok(None);
        }
        log::info!("Config changed on disk");
        Ok(Some(fresh))
    }
}
