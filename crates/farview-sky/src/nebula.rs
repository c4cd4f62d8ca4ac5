//! Faint two-tone nebula glow behind the starfield.

use glam::Vec3;

use crate::SkyParams;
use crate::hash::smoothstep;
use crate::noise::fractal_noise;

/// Peak brightness of the nebula before tinting.
const MAX_INTENSITY: f32 = 0.2;

/// Three fractal samples at 1x, 2x and 4x frequency, blended 0.6 / 0.3 / 0.1
/// and cubed so only the densest regions light up. Returns the cubed blend and
/// the 2x sample, which also drives the tint.
fn cloud_density(dir: Vec3) -> (f32, f32) {
    let n1 = fractal_noise(dir, 4);
    let n2 = fractal_noise(dir * 2.0, 3);
    let n3 = fractal_noise(dir * 4.0, 2);
    let blend = 0.6 * n1 + 0.3 * n2 + 0.1 * n3;
    (blend * blend * blend, n2)
}

/// Map a cubed cloud density onto `[0, MAX_INTENSITY]`.
#[inline]
pub fn nebula_intensity(density: f32) -> f32 {
    smoothstep(0.2, 0.8, density) * MAX_INTENSITY
}

/// Blend from the green tint toward the purple tint by `t`.
#[inline]
pub fn nebula_tint(t: f32, params: &SkyParams) -> Vec3 {
    params.green_tint.lerp(params.purple_tint, t)
}

/// Nebula color for a view direction. Non-negative whenever both tints are.
pub fn nebula(dir: Vec3, params: &SkyParams) -> Vec3 {
    let (density, n2) = cloud_density(dir);
    nebula_tint(n2, params) * nebula_intensity(density)
}
