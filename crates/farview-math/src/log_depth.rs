use glam::Vec4;

/// Logarithmic depth for a linear view-space distance.
///
/// `(ln z_view - ln z_near) / (ln z_far - ln z_near)`: exactly `0.0` at
/// `z_near`, exactly `1.0` at `z_far`, strictly increasing in between.
///
/// `z_view <= 0` or `z_near <= 0` yields a non-finite result; callers keep
/// geometry in front of the camera and validate the range with [`DepthRange`].
#[inline]
pub fn log_depth(z_view: f32, z_near: f32, z_far: f32) -> f32 {
    let log_near = z_near.ln();
    (z_view.ln() - log_near) / (z_far.ln() - log_near)
}

/// Replace the `z` of a clip-space position with the logarithmic depth,
/// pre-multiplied by `w` so the perspective divide leaves `log_depth` behind.
#[inline]
pub fn apply_log_depth(clip: Vec4, z_view: f32, z_near: f32, z_far: f32) -> Vec4 {
    Vec4::new(
        clip.x,
        clip.y,
        log_depth(z_view, z_near, z_far) * clip.w,
        clip.w,
    )
}

/// Errors for an unusable near/far pair.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum DepthRangeError {
    #[error("depth range bounds must be finite (near {near}, far {far})")]
    NonFinite { near: f32, far: f32 },

    #[error("near plane must be positive, got {0}")]
    NonPositiveNear(f32),

    #[error("far plane {far} must lie beyond near plane {near}")]
    FarNotBeyondNear { near: f32, far: f32 },
}

/// A validated `0 < z_near < z_far` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRange {
    pub z_near: f32,
    pub z_far: f32,
}

impl DepthRange {
    /// Build a range, rejecting anything [`log_depth`] cannot map onto `[0, 1]`.
    pub fn new(z_near: f32, z_far: f32) -> Result<Self, DepthRangeError> {
        let range = Self { z_near, z_far };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), DepthRangeError> {
        let (near, far) = (self.z_near, self.z_far);
        if !near.is_finite() || !far.is_finite() {
            return Err(DepthRangeError::NonFinite { near, far });
        }
        if near <= 0.0 {
            return Err(DepthRangeError::NonPositiveNear(near));
        }
        if far <= near {
            return Err(DepthRangeError::FarNotBeyondNear { near, far });
        }
        Ok(())
    }

    #[inline]
    pub fn remap(&self, z_view: f32) -> f32 {
        log_depth(z_view, self.z_near, self.z_far)
    }

    #[inline]
    pub fn apply(&self, clip: Vec4, z_view: f32) -> Vec4 {
        apply_log_depth(clip, z_view, self.z_near, self.z_far)
    }
}
