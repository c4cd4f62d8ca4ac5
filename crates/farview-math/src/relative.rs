use glam::{IVec3, Vec3};

use crate::packed::{FRACTION_STEP, PackedPosition};

/// Largest per-axis integer delta for which the decoded `f32` still resolves
/// whole units exactly (2²³).
pub const MAX_SAFE_RELATIVE_DELTA: i32 = 8_388_608;

#[inline]
fn integer_delta(packed: PackedPosition, camera: PackedPosition) -> IVec3 {
    let a = packed.integer_parts();
    let b = camera.integer_parts();
    IVec3::new(
        a.x.wrapping_sub(b.x),
        a.y.wrapping_sub(b.y),
        a.z.wrapping_sub(b.z),
    )
}

/// Decode `packed` as an `f32` offset from `camera`.
///
/// This is the precision-critical path:
/// 1. Subtract the integer fields as `i32` (exact, however far both points
///    are from the world origin).
/// 2. Subtract the 14-bit fractions as `i32`. The result may be negative; it
///    is added to the integer delta rather than borrowed from it.
/// 3. Only the two small differences are converted to `f32`.
///
/// Does not fail. Wrapped or out-of-range inputs give a defined but wrong offset.
pub fn decode_relative(packed: PackedPosition, camera: PackedPosition) -> Vec3 {
    let whole = integer_delta(packed, camera);
    let fraction = packed.fraction_parts().as_ivec3() - camera.fraction_parts().as_ivec3();
    whole.as_vec3() + fraction.as_vec3() * FRACTION_STEP
}

/// Like [`decode_relative`], but returns `Err` when any axis delta exceeds
/// [`MAX_SAFE_RELATIVE_DELTA`]. The `Err` variant still carries the decoded
/// offset so callers can decide whether the precision loss matters.
pub fn decode_relative_checked(
    packed: PackedPosition,
    camera: PackedPosition,
) -> Result<Vec3, Vec3> {
    let relative = decode_relative(packed, camera);
    let whole = integer_delta(packed, camera).abs();
    if whole.max_element() > MAX_SAFE_RELATIVE_DELTA {
        Err(relative)
    } else {
        Ok(relative)
    }
}

/// Decode a slice of packed positions relative to one camera.
pub fn decode_relative_batch(
    positions: &[PackedPosition],
    camera: PackedPosition,
    out: &mut Vec<Vec3>,
) {
    out.clear();
    out.reserve(positions.len());
    out.extend(positions.iter().map(|&p| decode_relative(p, camera)));
}
