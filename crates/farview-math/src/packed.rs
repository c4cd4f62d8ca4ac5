//! Bit-interleaved fixed-point world coordinates.
//!
//! A [`PackedPosition`] stores three axes in 128 bits spread across four `u32`
//! words, the exact layout the vertex shader reads from a `vec4<u32>` attribute.
//! Word `w0` holds the least significant bits:
//!
//! ```text
//!  bit 127                                                                bit 0
//!  [ X: 29 int | 14 frac ][ Y: 29 int | 14 frac ][ Z: 28 int | 14 frac ]
//!  |<------- 43 -------->||<------- 43 -------->||<------- 42 -------->|
//! ```
//!
//! Each axis is a two's-complement fixed-point number with 14 fractional bits,
//! so `axis = integer + fraction / 16384`. Integer ranges are `[-2^28, 2^28)`
//! for X and Y and `[-2^27, 2^27)` for Z; values outside wrap silently.

use bytemuck::{Pod, Zeroable};
use glam::{DVec3, IVec3, UVec3, UVec4, Vec3};

/// Fractional bits per axis.
pub const FRACTION_BITS: u32 = 14;

/// `2^FRACTION_BITS`: fraction units per world unit.
pub const FRACTION_SCALE: f32 = 16384.0;

/// World units per fraction unit (≈ 6.1×10⁻⁵).
pub const FRACTION_STEP: f32 = 1.0 / FRACTION_SCALE;

/// Width of the signed integer field for the X and Y axes.
pub const XY_INTEGER_BITS: u32 = 29;

/// Width of the signed integer field for the Z axis.
pub const Z_INTEGER_BITS: u32 = 28;

const FRACTION_MASK: u32 = (1 << FRACTION_BITS) - 1;

// Axis offsets when the four words are read as one little-endian u128.
const X_SHIFT: u32 = 85;
const Y_SHIFT: u32 = 42;
const Z_SHIFT: u32 = 0;

/// A world-space position packed into 128 bits.
///
/// The struct is `Pod` and matches both the `Uint32x4` vertex attribute and
/// the `vec4<u32>` uniform field, so slices of it upload without conversion.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct PackedPosition {
    words: [u32; 4],
}

static_assertions::assert_eq_size!(PackedPosition, [u32; 4]);

/// Sign-extend the low `bits` bits of `value`.
#[inline]
const fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

/// One axis as a masked fixed-point field, ready to be shifted into place.
#[inline]
fn axis_field(integer: i32, fraction: u32, integer_bits: u32) -> u128 {
    let integer_mask = (1u128 << integer_bits) - 1;
    (((integer as u32) as u128 & integer_mask) << FRACTION_BITS)
        | (fraction & FRACTION_MASK) as u128
}

/// Two's-complement fixed-point value of one world axis in 1/16384 units.
#[inline]
fn fixed_point(value: f64) -> i64 {
    let whole = value.floor();
    let remainder = (value - whole) * FRACTION_SCALE as f64;
    (whole as i64) * (1 << FRACTION_BITS) + remainder as i64
}

impl PackedPosition {
    /// The packed origin `(0, 0, 0)`.
    pub const ORIGIN: Self = Self { words: [0; 4] };

    /// Wrap four raw storage words (`w0` least significant).
    pub const fn from_words(words: [u32; 4]) -> Self {
        Self { words }
    }

    /// The four raw storage words.
    pub const fn words(self) -> [u32; 4] {
        self.words
    }

    /// Build from the little-endian 128-bit view of the words.
    pub const fn from_bits(bits: u128) -> Self {
        Self {
            words: [
                bits as u32,
                (bits >> 32) as u32,
                (bits >> 64) as u32,
                (bits >> 96) as u32,
            ],
        }
    }

    /// The words as a single little-endian `u128`.
    pub const fn to_bits(self) -> u128 {
        (self.words[0] as u128)
            | ((self.words[1] as u128) << 32)
            | ((self.words[2] as u128) << 64)
            | ((self.words[3] as u128) << 96)
    }

    /// Encode integer and fractional parts.
    ///
    /// Integers are truncated to their field width (two's-complement wrap)
    /// and fractions to 14 bits.
    pub fn from_parts(integer: IVec3, fraction: UVec3) -> Self {
        let x = axis_field(integer.x, fraction.x, XY_INTEGER_BITS);
        let y = axis_field(integer.y, fraction.y, XY_INTEGER_BITS);
        let z = axis_field(integer.z, fraction.z, Z_INTEGER_BITS);
        Self::from_bits((x << X_SHIFT) | (y << Y_SHIFT) | (z << Z_SHIFT))
    }

    /// Encode an absolute world position.
    ///
    /// Each axis becomes the fixed-point value `floor(v) * 16384 + remainder`,
    /// with the remainder truncated to 1/16384, before being split back into
    /// integer and fraction fields. A remainder that rounds up to a whole unit
    /// (tiny negative inputs) carries into the integer part instead of being
    /// masked away.
    pub fn from_world(position: DVec3) -> Self {
        let x = fixed_point(position.x);
        let y = fixed_point(position.y);
        let z = fixed_point(position.z);
        let integer = IVec3::new(
            (x >> FRACTION_BITS) as i32,
            (y >> FRACTION_BITS) as i32,
            (z >> FRACTION_BITS) as i32,
        );
        let mask = FRACTION_MASK as i64;
        let fraction = UVec3::new((x & mask) as u32, (y & mask) as u32, (z & mask) as u32);
        Self::from_parts(integer, fraction)
    }

    /// Signed integer part of each axis.
    pub fn integer_parts(self) -> IVec3 {
        let [w0, w1, w2, w3] = self.words;
        let x = w3 >> 3;
        let y = ((w2 & 0x001F_FFFF) << 8) | (w1 >> 24);
        let z = ((w1 & 0x0000_03FF) << 18) | (w0 >> 14);
        IVec3::new(
            sign_extend(x, XY_INTEGER_BITS),
            sign_extend(y, XY_INTEGER_BITS),
            sign_extend(z, Z_INTEGER_BITS),
        )
    }

    /// Fractional part of each axis in 1/16384 units (`0..16384`).
    pub fn fraction_parts(self) -> UVec3 {
        let [w0, w1, w2, w3] = self.words;
        let x = ((w3 & 0x7) << 11) | (w2 >> 21);
        let y = (w1 >> 10) & FRACTION_MASK;
        let z = w0 & FRACTION_MASK;
        UVec3::new(x, y, z)
    }

    /// Exact absolute decode. Every field fits in an `f64` mantissa.
    pub fn to_world(self) -> DVec3 {
        self.integer_parts().as_dvec3() + self.fraction_parts().as_dvec3() / FRACTION_SCALE as f64
    }
}

impl From<DVec3> for PackedPosition {
    fn from(value: DVec3) -> Self {
        Self::from_world(value)
    }
}

impl From<Vec3> for PackedPosition {
    fn from(value: Vec3) -> Self {
        Self::from_world(value.as_dvec3())
    }
}

impl From<UVec4> for PackedPosition {
    fn from(value: UVec4) -> Self {
        Self::from_words(value.to_array())
    }
}

impl From<PackedPosition> for UVec4 {
    fn from(value: PackedPosition) -> Self {
        UVec4::from_array(value.words)
    }
}
