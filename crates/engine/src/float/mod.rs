//! Software IEEE 754 binary floating point.
//!
//! Values are raw bit patterns; every operation is computed exactly on an
//! [`ExactFloat`] and rounded once, so results are bit-identical across hosts
//! and honour all five RISC-V rounding modes. The module provides:
//! 1. **Contract:** the [`Floating`] trait, implemented by [`Float32`] and [`Float64`].
//! 2. **Encoding:** the correctly rounded `ExactFloat` → binary encoder.
//! 3. **Operations:** arithmetic, comparisons, and conversions written once against the trait.
//! 4. **Register glue:** NaN boxing of binary32 values in 64-bit registers.

/// Correctly rounded arithmetic (add, multiply, divide, square root, FMA).
pub mod arith;

/// binary32 format.
pub mod binary32;

/// binary64 format.
pub mod binary64;

/// NaN boxing of binary32 values in 64-bit FP registers.
pub mod boxing;

/// Min/max selection and ordered/unordered comparison predicates.
pub mod compare;

/// Float ↔ integer and float ↔ float conversions.
pub mod convert;

/// Exact → binary encoder shared by all formats.
mod encode;

/// Rounding mode and exception flags.
pub mod env;

/// Arbitrary-precision intermediate value.
pub mod exact;

use std::fmt;

use num_bigint::BigUint;
use thiserror::Error;

pub use self::binary32::Float32;
pub use self::binary64::Float64;
pub use self::boxing::RegisterImage;
pub use self::env::{Environment, Flags, RoundingMode};
pub use self::exact::ExactFloat;

/// Contract violations of the float API.
///
/// These are programming errors on the caller's side and never IEEE exceptions,
/// which are reported through [`Flags`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FloatError {
    /// `to_exact` was called on zero, an infinity, or a NaN.
    #[error("no exact finite non-zero value for bit pattern {0:#x}")]
    NotFiniteNonZero(u64),
}

/// IEEE 754 class of a value, in RISC-V `fclass` bit order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FloatClass {
    /// −∞.
    NegativeInfinity,
    /// Negative normal number.
    NegativeNormal,
    /// Negative subnormal number.
    NegativeSubnormal,
    /// −0.
    NegativeZero,
    /// +0.
    PositiveZero,
    /// Positive subnormal number.
    PositiveSubnormal,
    /// Positive normal number.
    PositiveNormal,
    /// +∞.
    PositiveInfinity,
    /// Signalling NaN.
    SignalingNan,
    /// Quiet NaN.
    QuietNan,
}

impl FloatClass {
    /// The one-hot 10-bit mask written by `fclass.s`/`fclass.d`.
    pub fn mask(self) -> u64 {
        1 << self as u32
    }
}

/// Capability set of one IEEE 754 binary interchange format.
///
/// Implementors only provide the field widths and the raw-bit conversions;
/// classification, the canonical constants, and the exact conversions are
/// derived from those, so every format shares one implementation.
pub trait Floating: Copy + PartialEq + Eq + fmt::Debug + Send + Sync + 'static {
    /// Total encoding width in bits.
    const WIDTH: u32;
    /// Width of the biased exponent field.
    const EXPONENT_BITS: u32;
    /// Width of the trailing significand field.
    const FRACTION_BITS: u32;
    /// Exponent bias.
    const BIAS: i64 = (1 << (Self::EXPONENT_BITS - 1)) - 1;
    /// Largest unbiased exponent of a finite value.
    const MAX_EXPONENT: i64 = Self::BIAS;
    /// Smallest unbiased exponent of a normal value.
    const MIN_EXPONENT: i64 = 1 - Self::BIAS;
    /// Short format suffix used in mnemonics (`s`, `d`).
    const SUFFIX: &'static str;

    /// Builds a value from the low `WIDTH` bits of `bits`.
    fn from_raw(bits: u64) -> Self;

    /// Raw bit pattern, zero-extended to 64 bits.
    fn to_raw(self) -> u64;

    /// Mask of the sign bit.
    #[inline]
    fn sign_mask() -> u64 {
        1 << (Self::WIDTH - 1)
    }

    /// Mask of the trailing significand field.
    #[inline]
    fn fraction_mask() -> u64 {
        (1 << Self::FRACTION_BITS) - 1
    }

    /// All-ones biased exponent (infinities and NaNs).
    #[inline]
    fn exponent_all_ones() -> u64 {
        (1 << Self::EXPONENT_BITS) - 1
    }

    /// Most significant fraction bit; set for quiet NaNs.
    #[inline]
    fn quiet_bit() -> u64 {
        1 << (Self::FRACTION_BITS - 1)
    }

    /// Biased exponent field.
    #[inline]
    fn exponent_field(self) -> u64 {
        (self.to_raw() >> Self::FRACTION_BITS) & Self::exponent_all_ones()
    }

    /// Trailing significand field.
    #[inline]
    fn fraction_field(self) -> u64 {
        self.to_raw() & Self::fraction_mask()
    }

    /// +0.
    fn zero() -> Self {
        Self::from_raw(0)
    }

    /// −0.
    fn negative_zero() -> Self {
        Self::from_raw(Self::sign_mask())
    }

    /// The canonical quiet NaN (positive, quiet bit only).
    fn nan() -> Self {
        Self::from_raw((Self::exponent_all_ones() << Self::FRACTION_BITS) | Self::quiet_bit())
    }

    /// +∞.
    fn infinity() -> Self {
        Self::from_raw(Self::exponent_all_ones() << Self::FRACTION_BITS)
    }

    /// −∞.
    fn negative_infinity() -> Self {
        Self::from_raw(Self::sign_mask() | (Self::exponent_all_ones() << Self::FRACTION_BITS))
    }

    /// Largest finite magnitude with the given sign.
    fn max_value(negative: bool) -> Self {
        let magnitude = ((Self::exponent_all_ones() - 1) << Self::FRACTION_BITS)
            | Self::fraction_mask();
        Self::from_raw(if negative {
            magnitude | Self::sign_mask()
        } else {
            magnitude
        })
    }

    /// True for ±0.
    fn is_zero(self) -> bool {
        self.to_raw() & !Self::sign_mask() == 0
    }

    /// True for ±∞.
    fn is_infinite(self) -> bool {
        self.exponent_field() == Self::exponent_all_ones() && self.fraction_field() == 0
    }

    /// True for normal numbers.
    fn is_normal(self) -> bool {
        let exponent = self.exponent_field();
        exponent != 0 && exponent != Self::exponent_all_ones()
    }

    /// True for subnormal numbers (zero excluded).
    fn is_subnormal(self) -> bool {
        self.exponent_field() == 0 && self.fraction_field() != 0
    }

    /// True for any NaN.
    fn is_nan(self) -> bool {
        self.exponent_field() == Self::exponent_all_ones() && self.fraction_field() != 0
    }

    /// True only for signalling NaNs (quiet bit clear).
    fn is_signalling(self) -> bool {
        self.is_nan() && self.fraction_field() & Self::quiet_bit() == 0
    }

    /// True when the sign bit is set, including −0 and negative NaNs.
    fn is_sign_minus(self) -> bool {
        self.to_raw() & Self::sign_mask() != 0
    }

    /// True for zero, subnormal and normal values.
    fn is_finite(self) -> bool {
        self.exponent_field() != Self::exponent_all_ones()
    }

    /// Flips the sign bit. Quiet: never raises flags, also for NaNs.
    fn negate(self) -> Self {
        Self::from_raw(self.to_raw() ^ Self::sign_mask())
    }

    /// Clears the sign bit.
    fn abs(self) -> Self {
        Self::from_raw(self.to_raw() & !Self::sign_mask())
    }

    /// `self` with the sign bit of `sign`.
    fn copy_sign(self, sign: Self) -> Self {
        Self::from_raw((self.to_raw() & !Self::sign_mask()) | (sign.to_raw() & Self::sign_mask()))
    }

    /// IEEE class of the value.
    fn classify(self) -> FloatClass {
        let negative = self.is_sign_minus();
        if self.is_nan() {
            if self.is_signalling() {
                FloatClass::SignalingNan
            } else {
                FloatClass::QuietNan
            }
        } else if self.is_infinite() {
            if negative {
                FloatClass::NegativeInfinity
            } else {
                FloatClass::PositiveInfinity
            }
        } else if self.is_zero() {
            if negative {
                FloatClass::NegativeZero
            } else {
                FloatClass::PositiveZero
            }
        } else if self.is_subnormal() {
            if negative {
                FloatClass::NegativeSubnormal
            } else {
                FloatClass::PositiveSubnormal
            }
        } else if negative {
            FloatClass::NegativeNormal
        } else {
            FloatClass::PositiveNormal
        }
    }

    /// Exact value of a finite, non-zero number.
    ///
    /// Normal numbers get their implicit leading one re-inserted. Zeros,
    /// infinities and NaNs have no such value and must be handled first.
    fn to_exact(self) -> Result<ExactFloat, FloatError> {
        if self.is_zero() || !self.is_finite() {
            return Err(FloatError::NotFiniteNonZero(self.to_raw()));
        }
        Ok(exact_unchecked(self))
    }

    /// Correctly rounded encoding of `value` in this format.
    fn from_exact(value: &ExactFloat, env: &mut Environment) -> Self {
        encode::encode(value, env)
    }
}

/// Exact value of a finite number whose classification was already checked.
///
/// Zero maps to an exact zero; callers never pass infinities or NaNs.
pub(crate) fn exact_unchecked<F: Floating>(value: F) -> ExactFloat {
    debug_assert!(value.is_finite(), "exact value requested for {value:?}");
    let exponent_field = value.exponent_field();
    let fraction = value.fraction_field();
    let (significand, exponent) = if exponent_field == 0 {
        (fraction, F::MIN_EXPONENT - i64::from(F::FRACTION_BITS))
    } else {
        (
            fraction | (1 << F::FRACTION_BITS),
            exponent_field as i64 - F::BIAS - i64::from(F::FRACTION_BITS),
        )
    };
    ExactFloat::new(value.is_sign_minus(), exponent, BigUint::from(significand))
}
