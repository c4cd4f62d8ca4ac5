//! Farview preview: render the procedural sky and a mesh placed far from the
//! world origin, then write the result to a PNG.

mod mesh;
mod output;
mod plates;

use clap::Parser;
use farview_config::{CliArgs, Config, default_config_dir};
use farview_math::decode_relative_checked;
use farview_render::{Camera, ObjectVertex, render_sky_image, run_object_vertices};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::mesh::{Icosphere, splat_vertices};
use crate::output::{PreviewError, write_png};
use crate::plates::{PlateKind, cluster_regions, create_regions, planet_vertices};

/// Pixels brighter than this on every channel are counted as stars.
const STAR_PIXEL_THRESHOLD: f32 = 0.5;

fn build_camera(config: &Config) -> Camera {
    let mut camera = Camera {
        position: config.camera.position(),
        look_dir: config.camera.look_dir(),
        up: config.camera.up(),
        fov_y: config.camera.fov_y_radians(),
        z_near: config.depth.z_near,
        z_far: config.depth.z_far,
        ..Camera::default()
    };
    camera.set_aspect_ratio(config.preview.width as f32, config.preview.height as f32);
    if config.preview.look_at_mesh {
        camera.look_at(config.preview.mesh_center());
    }
    camera
}

/// The demo planet: an icosphere split into seeded tectonic plates.
fn build_planet(config: &Config) -> Vec<ObjectVertex> {
    let preview = &config.preview;
    let sphere = Icosphere::new(preview.mesh_subdivisions);
    let regions = create_regions(&sphere);
    let mut rng = ChaCha8Rng::seed_from_u64(preview.plate_seed);
    let plates = cluster_regions(&mut rng, &regions, preview.plate_count);
    let continental = plates
        .iter()
        .filter(|p| p.kind == PlateKind::Continental)
        .count();
    info!(
        regions = regions.len(),
        plates = plates.len(),
        continental,
        seed = preview.plate_seed,
        "Clustered tectonic plates"
    );
    planet_vertices(&sphere, &regions, &plates, preview.mesh_center(), preview.mesh_radius)
}

fn run(config: &Config) -> Result<(), PreviewError> {
    let camera = build_camera(config);
    let frame = camera.frame_uniform()?;
    info!(
        position = ?camera.position,
        look_dir = ?camera.look_dir,
        z_near = camera.z_near,
        z_far = camera.z_far,
        "Camera ready"
    );

    let vertices = build_planet(config);
    info!(vertices = vertices.len(), "Built planet");

    let camera_packed = camera.packed_position();
    let imprecise = vertices
        .iter()
        .filter(|v| decode_relative_checked(v.position, camera_packed).is_err())
        .count();
    if imprecise > 0 {
        warn!(imprecise, "Vertices too far from camera for exact f32 offsets");
    }

    let varyings = run_object_vertices(&frame, &vertices);
    let visible: Vec<f32> = varyings
        .iter()
        .filter(|v| v.in_clip_volume())
        .map(|v| v.ndc_depth())
        .collect();
    if visible.is_empty() {
        warn!("Mesh is outside the view volume");
    } else {
        let min = visible.iter().copied().fold(f32::INFINITY, f32::min);
        let max = visible.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        info!(visible = visible.len(), min_depth = min, max_depth = max, "Projected mesh");
    }

    let params = config.sky.to_params();
    let (width, height) = (config.preview.width, config.preview.height);
    let mut image = render_sky_image(&frame, &params, width, height);
    let star_pixels = image
        .pixels
        .iter()
        .filter(|p| p.truncate().min_element() > STAR_PIXEL_THRESHOLD)
        .count();
    info!(width, height, star_pixels, "Rendered sky");

    let splatted = splat_vertices(&mut image, &varyings);
    info!(splatted, "Overlaid mesh vertices");

    write_png(&image, &config.preview.output)?;
    info!(path = %config.preview.output.display(), "Wrote preview");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .ok_or(PreviewError::NoConfigDir)?;
    let mut config = Config::load_or_create(&config_dir)?;
    config.apply_cli_overrides(&args);
    config.validate()?;

    let log_dir = config_dir.join("logs");
    farview_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));
    info!(config_dir = %config_dir.display(), "Farview preview starting");

    run(&config)?;
    Ok(())
}
