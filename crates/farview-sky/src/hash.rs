//! Hashing helpers shared by the noise and starfield code.

use glam::{Vec3, Vec3Swizzles};

const HASH_SCALE: Vec3 = Vec3::new(0.1031, 0.1030, 0.0973);

/// Largest `f32` below 1.
pub const FRACT_MAX: f32 = 1.0 - f32::EPSILON / 2.0;

/// `x - floor(x)` per component, in `[0, 1)` for negative inputs too.
///
/// A tiny negative `x` makes `x - floor(x)` round to exactly 1, so the result
/// is capped at [`FRACT_MAX`].
#[inline]
pub fn fract(v: Vec3) -> Vec3 {
    (v - v.floor()).min(Vec3::splat(FRACT_MAX))
}

/// Hermite blend matching the WGSL builtin: `0` below `edge0`, `1` above
/// `edge1`, `3t² - 2t³` in between.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Deterministic 3D → 3D hash with every component in `[0, 1)`.
///
/// Arithmetic-only (no tables, no integer ops), so the WGSL port produces the
/// same lattice values as this function up to float rounding.
#[inline]
pub fn hash3(p: Vec3) -> Vec3 {
    let mut p = fract(p * HASH_SCALE);
    p += p.dot(p.yxz() + 33.33);
    fract((p.xxy() + p.yxx()) * p.zyx())
}
