//! Procedural sky: a hashed starfield and a value-noise nebula, both evaluated
//! purely from a view direction.
//!
//! Everything here is a pure function of its inputs, so the same code drives
//! the CPU preview renderer and serves as the reference for the WGSL port.

mod hash;
pub mod nebula;
mod noise;
pub mod starfield;

use glam::{Vec3, Vec4};

pub use hash::{FRACT_MAX, fract, hash3, mix, smoothstep};
pub use nebula::nebula;
pub use noise::{fractal_noise, value_noise};
pub use starfield::{DEFAULT_STAR_LAYERS, StarLayer, star_test, stars};

/// Default per-cell star probability multiplier.
pub const DENSITY: f32 = 0.005;
/// Default star radius multiplier.
pub const STAR_SIZE: f32 = 0.1;
/// Default base probability, multiplied with [`DENSITY`].
pub const BASE_DENSITY: f32 = 0.9995;
/// Default lattice cells per unit of direction length.
pub const STAR_GRID_SCALE: f32 = 150.0;

pub const GREEN_TINT: Vec3 = Vec3::new(0.1, 0.4, 0.3);
pub const PURPLE_TINT: Vec3 = Vec3::new(0.4, 0.1, 0.5);

/// Tunables for the sky synthesizer.
#[derive(Clone, Debug, PartialEq)]
pub struct SkyParams {
    pub density: f32,
    pub star_size: f32,
    pub base_density: f32,
    pub grid_scale: f32,
    pub star_layers: Vec<StarLayer>,
    pub green_tint: Vec3,
    pub purple_tint: Vec3,
}

impl Default for SkyParams {
    fn default() -> Self {
        Self {
            density: DENSITY,
            star_size: STAR_SIZE,
            base_density: BASE_DENSITY,
            grid_scale: STAR_GRID_SCALE,
            star_layers: DEFAULT_STAR_LAYERS.to_vec(),
            green_tint: GREEN_TINT,
            purple_tint: PURPLE_TINT,
        }
    }
}

/// Final sky color for a view direction: nebula plus stars, opaque.
///
/// `dir` should be unit length; the sky pipeline normalizes the interpolated
/// direction before calling this. Output is not clamped.
pub fn shade(dir: Vec3, params: &SkyParams) -> Vec4 {
    let color = nebula(dir, params) + Vec3::splat(stars(dir, params));
    color.extend(1.0)
}
