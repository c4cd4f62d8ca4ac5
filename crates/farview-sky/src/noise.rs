//! Lattice value noise and its fractal sum.

use glam::Vec3;

use crate::hash::{fract, hash3, mix};

/// Trilinear blend of the hashed lattice values around `p`, smoothed with
/// `3t² - 2t³`. Output lies in `[0, 1]` and is continuous everywhere.
pub fn value_noise(p: Vec3) -> f32 {
    let cell = p.floor();
    let f = fract(p);
    let u = f * f * (3.0 - 2.0 * f);

    let corner = |x: f32, y: f32, z: f32| hash3(cell + Vec3::new(x, y, z)).x;

    let x00 = mix(corner(0.0, 0.0, 0.0), corner(1.0, 0.0, 0.0), u.x);
    let x10 = mix(corner(0.0, 1.0, 0.0), corner(1.0, 1.0, 0.0), u.x);
    let x01 = mix(corner(0.0, 0.0, 1.0), corner(1.0, 0.0, 1.0), u.x);
    let x11 = mix(corner(0.0, 1.0, 1.0), corner(1.0, 1.0, 1.0), u.x);

    let y0 = mix(x00, x10, u.y);
    let y1 = mix(x01, x11, u.y);
    mix(y0, y1, u.z)
}

/// Sum of `octaves` layers of [`value_noise`], starting at amplitude 0.5 and
/// frequency 1 and halving / doubling each octave. Zero octaves yields 0.
pub fn fractal_noise(p: Vec3, octaves: u32) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut frequency = 1.0;
    for _ in 0..octaves {
        value += amplitude * value_noise(p * frequency);
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    value
}
