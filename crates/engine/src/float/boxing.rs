//! NaN boxing of binary32 values in 64-bit floating-point registers.
//!
//! With the D extension present, FP registers are 64 bits wide and a binary32
//! value must be stored with the upper 32 bits all ones (unprivileged spec
//! §12.2).
//!
//! - **Boxing** ([`box_f32`]): sets the upper half when writing a binary32 result.
//! - **Unboxing** ([`unbox_f32`]): an improperly boxed register reads as the
//!   canonical NaN.
//! - **Register images** ([`RegisterImage`]): the per-format read/write rule
//!   used by the floating-point instructions.

use super::{Float32, Float64, Floating};

/// Upper-32-bit mask used for NaN boxing validation.
const NAN_BOX_MASK: u64 = 0xFFFF_FFFF_0000_0000;

/// Boxes a binary32 value into a 64-bit register image.
#[inline]
pub fn box_f32(value: Float32) -> u64 {
    u64::from(value.bits()) | NAN_BOX_MASK
}

/// Unboxes a 64-bit register image into a binary32 value.
///
/// A value that is not properly boxed reads as the canonical quiet NaN.
#[inline]
pub fn unbox_f32(raw: u64) -> Float32 {
    if raw & NAN_BOX_MASK == NAN_BOX_MASK {
        Float32::from_bits(raw as u32)
    } else {
        Float32::nan()
    }
}

/// A format that can be held in a floating-point register.
///
/// `boxed` is true when the registers are 64 bits wide (D enabled); an F-only
/// machine keeps binary32 values unboxed in the low half.
pub trait RegisterImage: Floating {
    /// Reads a value from a register image.
    fn from_register(raw: u64, boxed: bool) -> Self;

    /// Register image of a value.
    fn to_register(self, boxed: bool) -> u64;
}

impl RegisterImage for Float32 {
    fn from_register(raw: u64, boxed: bool) -> Self {
        if boxed {
            unbox_f32(raw)
        } else {
            Self::from_bits(raw as u32)
        }
    }

    fn to_register(self, boxed: bool) -> u64 {
        if boxed {
            box_f32(self)
        } else {
            u64::from(self.bits())
        }
    }
}

impl RegisterImage for Float64 {
    fn from_register(raw: u64, _boxed: bool) -> Self {
        Self::from_bits(raw)
    }

    fn to_register(self, _boxed: bool) -> u64 {
        self.bits()
    }
}
