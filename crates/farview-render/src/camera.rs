//! Camera with a double-precision world position and a rotation-only view.

use farview_math::{DepthRange, DepthRangeError, PackedPosition};
use glam::{DVec3, Mat4, Vec3};

use crate::frame::FrameUniform;

/// Smallest `|look_dir × up|` between the normalized vectors for which the
/// view basis is well defined.
pub const MIN_ORIENTATION_SINE: f32 = 1e-4;

/// Reasons a camera cannot produce a frame.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CameraError {
    #[error("look direction {look_dir} is parallel to up {up}")]
    DegenerateOrientation { look_dir: Vec3, up: Vec3 },
    #[error(transparent)]
    DepthRange(#[from] DepthRangeError),
}

/// A perspective camera in a world too large for `f32`.
///
/// Rendering happens in camera-relative space: geometry is decoded relative to
/// [`Camera::packed_position`], so the view matrix only rotates and the camera
/// sits at the relative origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Absolute world position.
    pub position: DVec3,
    /// Unit viewing direction.
    pub look_dir: Vec3,
    /// Approximate up vector; need not be orthogonal to `look_dir`.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub z_near: f32,
    /// Far clip plane distance (always positive, > z_near).
    pub z_far: f32,
}

impl Camera {
    /// View matrix for camera-relative geometry.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(Vec3::ZERO, self.look_dir, self.up)
    }

    /// Standard right-handed perspective. The object stage overwrites clip `z`
    /// with logarithmic depth, so only x, y and w of this projection matter there.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.z_near, self.z_far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Unit vector pointing to the right of the view.
    pub fn right(&self) -> Vec3 {
        self.look_dir.cross(self.up).normalize_or_zero()
    }

    /// Update the aspect ratio from a viewport size.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        self.aspect_ratio = width / height;
    }

    /// Point the camera at a world position. Leaves `look_dir` unchanged when
    /// `target` coincides with the camera.
    pub fn look_at(&mut self, target: DVec3) {
        let dir = (target - self.position).normalize_or_zero();
        if dir != DVec3::ZERO {
            self.look_dir = dir.as_vec3();
        }
    }

    pub fn packed_position(&self) -> PackedPosition {
        PackedPosition::from_world(self.position)
    }

    pub fn depth_range(&self) -> Result<DepthRange, DepthRangeError> {
        DepthRange::new(self.z_near, self.z_far)
    }

    /// Fail when `look_dir` and `up` are zero, non-finite or parallel, which
    /// leaves the view matrix undefined.
    pub fn check_orientation(&self) -> Result<(), CameraError> {
        let sine = self
            .look_dir
            .normalize_or_zero()
            .cross(self.up.normalize_or_zero())
            .length();
        if sine >= MIN_ORIENTATION_SINE {
            return Ok(());
        }
        Err(CameraError::DegenerateOrientation {
            look_dir: self.look_dir,
            up: self.up,
        })
    }

    /// Build the per-frame uniform, rejecting a degenerate orientation or an
    /// unusable near/far pair.
    pub fn frame_uniform(&self) -> Result<FrameUniform, CameraError> {
        self.check_orientation()?;
        Ok(FrameUniform::new(
            self.view_matrix(),
            self.projection_matrix(),
            self.packed_position(),
            self.depth_range()?,
        ))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            look_dir: Vec3::NEG_Z,
            up: Vec3::Y,
            fov_y: std::f32::consts::FRAC_PI_4, // 45 degrees
            aspect_ratio: 16.0 / 9.0,
            z_near: 0.1,
            z_far: 1.0e9,
        }
    }
}
