//! IEEE 754 binary64 (double precision).

use std::fmt;

use super::Floating;

/// A binary64 value held as its raw bit pattern.
///
/// Equality is bitwise, as for [`Float32`](super::Float32).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Float64(u64);

impl Float64 {
    /// Wraps a raw bit pattern.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw bit pattern.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Reinterprets a host `f64`. The bit pattern is taken verbatim.
    pub fn from_f64(value: f64) -> Self {
        Self(value.to_bits())
    }

    /// Reinterprets the bits as a host `f64`, for display.
    pub fn to_f64(self) -> f64 {
        f64::from_bits(self.0)
    }
}

impl Floating for Float64 {
    const WIDTH: u32 = 64;
    const EXPONENT_BITS: u32 = 11;
    const FRACTION_BITS: u32 = 52;
    const SUFFIX: &'static str = "d";

    #[inline]
    fn from_raw(bits: u64) -> Self {
        Self(bits)
    }

    #[inline]
    fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Float64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Float64({:#018x} = {:e})", self.0, self.to_f64())
    }
}

impl fmt::Display for Float64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_f64(), f)
    }
}
