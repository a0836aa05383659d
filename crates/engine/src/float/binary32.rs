//! IEEE 754 binary32 (single precision).

use std::fmt;

use super::Floating;

/// A binary32 value held as its raw bit pattern.
///
/// Equality is bitwise: `+0 != -0` and a NaN equals itself when the payloads
/// match. Use the comparison operations for IEEE ordering.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Float32(u32);

impl Float32 {
    /// Wraps a raw bit pattern.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bit pattern.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Reinterprets a host `f32`. The bit pattern is taken verbatim.
    pub fn from_f32(value: f32) -> Self {
        Self(value.to_bits())
    }

    /// Reinterprets the bits as a host `f32`, for display.
    pub fn to_f32(self) -> f32 {
        f32::from_bits(self.0)
    }
}

impl Floating for Float32 {
    const WIDTH: u32 = 32;
    const EXPONENT_BITS: u32 = 8;
    const FRACTION_BITS: u32 = 23;
    const SUFFIX: &'static str = "s";

    #[inline]
    fn from_raw(bits: u64) -> Self {
        Self(bits as u32)
    }

    #[inline]
    fn to_raw(self) -> u64 {
        u64::from(self.0)
    }
}

impl fmt::Debug for Float32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Float32({:#010x} = {:e})", self.0, self.to_f32())
    }
}

impl fmt::Display for Float32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_f32(), f)
    }
}
