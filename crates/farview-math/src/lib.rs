//! Packed world coordinates, camera-relative decoding, and logarithmic depth
//! for the Farview renderer.

mod log_depth;
mod packed;
mod relative;

pub use log_depth::{DepthRange, DepthRangeError, apply_log_depth, log_depth};
pub use packed::{
    FRACTION_BITS, FRACTION_SCALE, FRACTION_STEP, PackedPosition, XY_INTEGER_BITS, Z_INTEGER_BITS,
};
pub use relative::{
    MAX_SAFE_RELATIVE_DELTA, decode_relative, decode_relative_batch, decode_relative_checked,
};
