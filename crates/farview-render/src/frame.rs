//! The per-frame uniform shared by the object and sky stages.

use bytemuck::{Pod, Zeroable};
use farview_math::{DepthRange, PackedPosition};
use glam::Mat4;

/// Read-only per-frame data, laid out to match the WGSL `FrameUniform` block.
///
/// The view matrix is rotation-only: the camera sits at the relative origin
/// and its world position travels as `camera_packed_position`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniform {
    pub view: [[f32; 4]; 4],                     // 64 bytes, mat4x4
    pub projection: [[f32; 4]; 4],               // 64 bytes, mat4x4
    pub camera_packed_position: PackedPosition,  // 16 bytes, vec4<u32>
    pub z_near: f32,
    pub z_far: f32,
    pub _padding: [f32; 2],
}

static_assertions::assert_eq_size!(FrameUniform, [u8; 160]);

impl FrameUniform {
    pub fn new(
        view: Mat4,
        projection: Mat4,
        camera_packed_position: PackedPosition,
        depth: DepthRange,
    ) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            camera_packed_position,
            z_near: depth.z_near,
            z_far: depth.z_far,
            _padding: [0.0; 2],
        }
    }

    #[inline]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view)
    }

    #[inline]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.projection)
    }

    #[inline]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// The stored depth bounds. Not re-validated.
    #[inline]
    pub fn depth_range(&self) -> DepthRange {
        DepthRange {
            z_near: self.z_near,
            z_far: self.z_far,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DVec3, Vec3};
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_frame_uniform_layout() {
        assert_eq!(offset_of!(FrameUniform, view), 0);
        assert_eq!(offset_of!(FrameUniform, projection), 64);
        assert_eq!(offset_of!(FrameUniform, camera_packed_position), 128);
        assert_eq!(offset_of!(FrameUniform, z_near), 144);
        assert_eq!(offset_of!(FrameUniform, z_far), 148);
        assert_eq!(size_of::<FrameUniform>(), 160);
        assert_eq!(size_of::<FrameUniform>() % 16, 0, "uniform size must be 16-byte aligned");
    }

    #[test]
    fn test_matrices_round_trip() {
        let view = Mat4::look_to_rh(Vec3::ZERO, Vec3::new(1.0, 0.0, -1.0).normalize(), Vec3::Y);
        let projection = Mat4::perspective_rh(1.0, 1.5, 0.1, 1000.0);
        let depth = DepthRange::new(0.1, 1000.0).unwrap();
        let frame = FrameUniform::new(view, projection, PackedPosition::ORIGIN, depth);
        assert_eq!(frame.view_matrix(), view);
        assert_eq!(frame.projection_matrix(), projection);
        assert_eq!(frame.view_projection_matrix(), projection * view);
        assert_eq!(frame.depth_range(), depth);
    }

    #[test]
    fn test_bytes_carry_packed_words() {
        let camera = PackedPosition::from_world(DVec3::new(-12.5, 3.0, 1.0e6));
        let frame = FrameUniform::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            camera,
            DepthRange::new(1.0, 2.0).unwrap(),
        );
        let bytes = bytemuck::bytes_of(&frame);
        let words: &[u32] = bytemuck::cast_slice(&bytes[128..144]);
        assert_eq!(words, &camera.words());
        assert_eq!(f32::from_le_bytes(bytes[144..148].try_into().unwrap()), 1.0);
        assert_eq!(f32::from_le_bytes(bytes[148..152].try_into().unwrap()), 2.0);
    }
}
