//! Hashed-grid starfield.
//!
//! The view direction is scaled onto an integer lattice; each lattice cell
//! independently decides whether it holds a star, how large it is, and where
//! its centre points. A star's centre always lies inside its own cell, and a
//! direction is lit by the brightest star among its cell and the 26 cells
//! around it, so stars no wider than one cell fade out smoothly across cell
//! faces. The result is a pure function of the direction and [`SkyParams`].

use glam::Vec3;

use crate::SkyParams;
use crate::hash::{hash3, mix, smoothstep};

/// Offset decorrelating the star centre jitter from the presence/size hash.
const CENTER_SEED: Vec3 = Vec3::new(17.13, 41.71, 73.37);

/// Angular radius range of a star before `star_size` scaling.
const MIN_STAR_RADIUS: f32 = 0.001;
const MAX_STAR_RADIUS: f32 = 0.01;

/// One starfield grid: the direction is multiplied by `scale` before lattice
/// lookup and the layer's intensity is weighted by `weight`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarLayer {
    pub scale: f32,
    pub weight: f32,
}

impl StarLayer {
    pub const fn new(scale: f32, weight: f32) -> Self {
        Self { scale, weight }
    }
}

/// The two grids enabled by default: a primary field and a sparser, dimmer
/// field at 1.5x lattice density.
pub const DEFAULT_STAR_LAYERS: [StarLayer; 2] =
    [StarLayer::new(1.0, 1.0), StarLayer::new(1.5, 0.5)];

/// Probability that a lattice cell holds a star.
#[inline]
pub fn presence_threshold(params: &SkyParams) -> f32 {
    params.base_density * params.density
}

/// Unit direction of the star centre held by `cell` on the lattice sphere of
/// radius `lattice_radius`, or `None` when no candidate falls inside the cell.
///
/// The hashed jitter point is projected onto the sphere first, then the cell
/// midpoint. A projection that lands in another cell is rejected.
fn star_centre(cell: Vec3, lattice_radius: f32) -> Option<Vec3> {
    [cell + hash3(cell + CENTER_SEED), cell + 0.5]
        .into_iter()
        .map(Vec3::normalize_or_zero)
        .find(|centre| (*centre * lattice_radius).floor() == cell)
}

/// Star intensity in `[0, 1]` for direction `v`.
///
/// `v` need not be unit length: its magnitude selects the lattice density
/// (this is how [`stars`] layers grids), while the distance to the star centre
/// is measured between directions.
pub fn star_test(v: Vec3, params: &SkyParams) -> f32 {
    let scaled = v * params.grid_scale;
    let lattice_radius = scaled.length();
    let home = scaled.floor();
    let dir = v.normalize_or_zero();
    let threshold = presence_threshold(params);

    let mut brightest = 0.0_f32;
    for z in -1..=1 {
        for y in -1..=1 {
            for x in -1..=1 {
                let cell = home + Vec3::new(x as f32, y as f32, z as f32);
                let h = hash3(cell);
                if h.x > threshold {
                    continue;
                }
                let Some(centre) = star_centre(cell, lattice_radius) else {
                    continue;
                };
                let size = mix(MIN_STAR_RADIUS, MAX_STAR_RADIUS, h.y) * params.star_size;
                let d = dir.distance(centre);
                brightest = brightest.max(1.0 - smoothstep(0.8 * size, size, d));
            }
        }
    }
    brightest
}

/// Weighted sum of [`star_test`] over every configured layer.
pub fn stars(dir: Vec3, params: &SkyParams) -> f32 {
    params
        .star_layers
        .iter()
        .map(|layer| layer.weight * star_test(dir * layer.scale, params))
        .sum()
}
