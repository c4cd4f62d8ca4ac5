//! Data-parallel CPU execution of the per-vertex and per-pixel stages.
//!
//! Every stage is a pure function of its input element and a shared
//! [`FrameUniform`], so the work splits over rayon's pool with no
//! synchronisation beyond the final collect.

use farview_math::{PackedPosition, decode_relative};
use farview_sky::{SkyParams, shade};
use glam::{Mat4, Vec2, Vec3, Vec4};
use rayon::prelude::*;
use tracing::debug;

use crate::frame::FrameUniform;
use crate::object::{ObjectVaryings, ObjectVertex, object_vertex};

/// Run the object vertex stage over a vertex buffer.
pub fn run_object_vertices(frame: &FrameUniform, vertices: &[ObjectVertex]) -> Vec<ObjectVaryings> {
    debug!("Running object stage over {} vertices", vertices.len());
    vertices.par_iter().map(|v| object_vertex(frame, v)).collect()
}

/// Parallel counterpart of [`farview_math::decode_relative_batch`].
pub fn decode_relative_par(positions: &[PackedPosition], camera: PackedPosition) -> Vec<Vec3> {
    positions
        .par_iter()
        .map(|&p| decode_relative(p, camera))
        .collect()
}

/// An unclamped linear-color image, row-major, top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct SkyImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Vec4>,
}

impl SkyImage {
    pub fn pixel(&self, x: u32, y: u32) -> Vec4 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Clamp to `[0, 1]` and quantize to 8-bit RGBA.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| {
                p.clamp(Vec4::ZERO, Vec4::ONE)
                    .to_array()
                    .map(|c| (c * 255.0).round() as u8)
            })
            .collect()
    }
}

/// Camera-relative view direction through a point in normalized device
/// coordinates, recovered from the inverse view-projection on the near plane.
pub fn view_direction(inverse_view_projection: Mat4, ndc: Vec2) -> Vec3 {
    inverse_view_projection
        .project_point3(ndc.extend(0.0))
        .normalize_or_zero()
}

/// Evaluate the sky for every pixel centre of a `width × height` viewport.
/// One rayon task per row.
pub fn render_sky_image(
    frame: &FrameUniform,
    params: &SkyParams,
    width: u32,
    height: u32,
) -> SkyImage {
    let inverse = frame.view_projection_matrix().inverse();
    let mut pixels = vec![Vec4::ZERO; width as usize * height as usize];
    if !pixels.is_empty() {
        pixels
            .par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                let ndc_y = 1.0 - (y as f32 + 0.5) / height as f32 * 2.0;
                for (x, pixel) in row.iter_mut().enumerate() {
                    let ndc_x = (x as f32 + 0.5) / width as f32 * 2.0 - 1.0;
                    let dir = view_direction(inverse, Vec2::new(ndc_x, ndc_y));
                    *pixel = shade(dir, params);
                }
            });
    }
    debug!("Rendered {}x{} sky image", width, height);
    SkyImage {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::sky::{SkyVertex, build_near_field_quad, sky_fragment, sky_vertex};
    use farview_math::decode_relative_batch;
    use glam::DVec3;

    #[test]
    fn test_parallel_decode_matches_sequential() {
        let camera = PackedPosition::from_world(DVec3::new(1.0e8, -1.0e8, 5.0e7));
        let positions: Vec<PackedPosition> = (0..5_000)
            .map(|i| {
                let i = f64::from(i);
                PackedPosition::from_world(camera.to_world() + DVec3::new(i * 0.25, -i, i * 3.5))
            })
            .collect();
        let mut sequential = Vec::new();
        decode_relative_batch(&positions, camera, &mut sequential);
        assert_eq!(decode_relative_par(&positions, camera), sequential);
    }

    #[test]
    fn test_object_stage_preserves_order() {
        let frame = Camera::default().frame_uniform().unwrap();
        let vertices: Vec<ObjectVertex> = (0..1_000)
            .map(|i| ObjectVertex::from_world(DVec3::new(0.0, 0.0, -1.0 - f64::from(i)), [1.0; 4]))
            .collect();
        let out = run_object_vertices(&frame, &vertices);
        assert_eq!(out.len(), vertices.len());
        for (v, o) in vertices.iter().zip(&out) {
            assert_eq!(*o, object_vertex(&frame, v));
        }
    }

    #[test]
    fn test_centre_pixel_looks_along_view_direction() {
        let camera = Camera {
            look_dir: Vec3::new(0.6, 0.0, -0.8),
            ..Camera::default()
        };
        let frame = camera.frame_uniform().unwrap();
        let inverse = frame.view_projection_matrix().inverse();
        let dir = view_direction(inverse, Vec2::ZERO);
        assert!((dir - camera.look_dir).length() < 1e-4, "centre direction {dir}");
    }

    #[test]
    fn test_corner_directions_match_near_field_quad() {
        let camera = Camera {
            look_dir: Vec3::new(0.0, 0.6, -0.8),
            aspect_ratio: 2.0,
            ..Camera::default()
        };
        let frame = camera.frame_uniform().unwrap();
        let inverse = frame.view_projection_matrix().inverse();
        let quad = build_near_field_quad(&camera);
        let corners = [
            Vec2::new(-1.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
        ];
        for (corner, ndc) in quad.iter().zip(corners) {
            let dir = view_direction(inverse, ndc);
            assert!(
                (dir - corner.normalize()).length() < 1e-3,
                "ndc {ndc} gave {dir}, quad corner points along {}",
                corner.normalize()
            );
        }
    }

    #[test]
    fn test_sky_image_matches_sky_pipeline_at_centre() {
        let camera = Camera {
            look_dir: Vec3::new(-0.2, 0.3, -0.9).normalize(),
            aspect_ratio: 1.0,
            ..Camera::default()
        };
        let params = SkyParams::default();
        let frame = camera.frame_uniform().unwrap();
        let image = render_sky_image(&frame, &params, 3, 3);

        let centre = SkyVertex::new(camera.look_dir * camera.z_near * 1.01);
        let varyings = sky_vertex(&frame, &centre);
        let expected = sky_fragment(&varyings, &params);
        assert!((image.pixel(1, 1) - expected).abs().max_element() < 1e-3);
    }

    #[test]
    fn test_sky_image_dimensions_and_opacity() {
        let frame = Camera::default().frame_uniform().unwrap();
        let image = render_sky_image(&frame, &SkyParams::default(), 17, 9);
        assert_eq!(image.pixels.len(), 17 * 9);
        assert!(image.pixels.iter().all(|p| p.w == 1.0 && p.is_finite()));

        let rgba = image.to_rgba8();
        assert_eq!(rgba.len(), 17 * 9 * 4);
        assert!(rgba.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn test_empty_sky_image() {
        let frame = Camera::default().frame_uniform().unwrap();
        let image = render_sky_image(&frame, &SkyParams::default(), 0, 4);
        assert!(image.pixels.is_empty());
        assert!(image.to_rgba8().is_empty());
    }

    #[test]
    fn test_rgba8_quantization_clamps() {
        let image = SkyImage {
            width: 2,
            height: 1,
            pixels: vec![Vec4::new(-0.5, 0.5, 2.0, 1.0), Vec4::new(0.0, 1.0, 0.25, 1.0)],
        };
        assert_eq!(image.to_rgba8(), vec![0, 128, 255, 255, 0, 255, 64, 255]);
    }
}
