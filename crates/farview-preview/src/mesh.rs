//! Demo geometry: a subdivided icosphere placed anywhere in the world.

use std::collections::HashMap;

use farview_render::{ObjectVaryings, ObjectVertex, SkyImage, object_fragment};
use glam::DVec3;

const PHI: f64 = 1.618_033_988_749_895; // Golden ratio

#[rustfmt::skip]
const ICOSAHEDRON_VERTICES: [DVec3; 12] = [
    DVec3::new(-1.0,  PHI,  0.0),
    DVec3::new( 1.0,  PHI,  0.0),
    DVec3::new(-1.0, -PHI,  0.0),
    DVec3::new( 1.0, -PHI,  0.0),
    DVec3::new( 0.0, -1.0,  PHI),
    DVec3::new( 0.0,  1.0,  PHI),
    DVec3::new( 0.0, -1.0, -PHI),
    DVec3::new( 0.0,  1.0, -PHI),
    DVec3::new( PHI,  0.0, -1.0),
    DVec3::new( PHI,  0.0,  1.0),
    DVec3::new(-PHI,  0.0, -1.0),
    DVec3::new(-PHI,  0.0,  1.0),
];

#[rustfmt::skip]
const ICOSAHEDRON_INDICES: [u32; 60] = [
    0, 11, 5,  0, 5, 1,  0, 1, 7,  0, 7, 10,  0, 10, 11,
    1, 5, 9,  5, 11, 4,  11, 10, 2,  10, 7, 6,  7, 1, 8,
    3, 9, 4,  3, 4, 2,  3, 2, 6,  3, 6, 8,  3, 8, 9,
    4, 9, 5,  2, 4, 11,  6, 2, 10,  8, 6, 7,  9, 8, 1,
];

/// Unit-sphere mesh: directions plus a triangle list.
#[derive(Debug, Clone, Default)]
pub struct Icosphere {
    pub directions: Vec<DVec3>,
    pub indices: Vec<u32>,
}

impl Icosphere {
    /// Build an icosahedron and split every triangle into four `subdivisions`
    /// times, pushing new vertices back onto the unit sphere.
    pub fn new(subdivisions: u32) -> Self {
        let mut sphere = Self {
            directions: ICOSAHEDRON_VERTICES.iter().map(|v| v.normalize()).collect(),
            indices: ICOSAHEDRON_INDICES.to_vec(),
        };
        for _ in 0..subdivisions {
            sphere.subdivide();
        }
        sphere
    }

    fn subdivide(&mut self) {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut indices = Vec::with_capacity(self.indices.len() * 4);

        let mut midpoint = |a: u32, b: u32, directions: &mut Vec<DVec3>| -> u32 {
            let key = if a < b { (a, b) } else { (b, a) };
            *midpoints.entry(key).or_insert_with(|| {
                let mid = (directions[a as usize] + directions[b as usize]).normalize();
                directions.push(mid);
                (directions.len() - 1) as u32
            })
        };

        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0], tri[1], tri[2]);
            let ab = midpoint(a, b, &mut self.directions);
            let bc = midpoint(b, c, &mut self.directions);
            let ca = midpoint(c, a, &mut self.directions);
            indices.extend_from_slice(&[a, ab, ca, ab, b, bc, ca, bc, c, ab, bc, ca]);
        }
        self.indices = indices;
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Paint every visible projected vertex into `image` as a single pixel.
/// Returns the number of pixels written.
pub fn splat_vertices(image: &mut SkyImage, varyings: &[ObjectVaryings]) -> usize {
    let (width, height) = (image.width as f32, image.height as f32);
    let mut written = 0;
    for v in varyings.iter().filter(|v| v.in_clip_volume()) {
        let ndc = v.clip_position.truncate() / v.clip_position.w;
        let px = ((ndc.x + 1.0) * 0.5 * width).floor();
        let py = ((1.0 - ndc.y) * 0.5 * height).floor();
        if px < 0.0 || py < 0.0 || px >= width || py >= height {
            continue;
        }
        let index = py as usize * image.width as usize + px as usize;
        image.pixels[index] = object_fragment(v);
        written += 1;
    }
    written
}
