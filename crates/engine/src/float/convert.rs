//! Conversions between floats, integers, and formats.
//!
//! Float → integer conversions clamp to the destination range and report
//! out-of-range operands (including NaNs and infinities) with `invalid` only;
//! in-range lossy conversions raise `inexact`. NaN converts to the maximum
//! value, as RISC-V `fcvt` requires.

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use super::env::{Environment, Flags};
use super::exact::ExactFloat;
use super::{Floating, exact_unchecked};

/// Rounds `value` to an integer in `[min, max]` using `env.mode`.
///
/// With `quiet` set, an in-range lossy rounding does not raise `inexact`.
pub fn convert_to_integral<F: Floating>(
    value: F,
    max: &BigInt,
    min: &BigInt,
    env: &mut Environment,
    quiet: bool,
) -> BigInt {
    if value.is_nan() {
        env.raise(Flags::INVALID);
        return max.clone();
    }
    if value.is_infinite() {
        env.raise(Flags::INVALID);
        return if value.is_sign_minus() {
            min.clone()
        } else {
            max.clone()
        };
    }
    if value.is_zero() {
        return BigInt::from(0);
    }

    let mut scratch = Environment::new(env.mode);
    let rounded = exact_unchecked(value).to_integral(&mut scratch);
    if &rounded > max {
        env.raise(Flags::INVALID);
        return max.clone();
    }
    if &rounded < min {
        env.raise(Flags::INVALID);
        return min.clone();
    }
    if scratch.inexact() && !quiet {
        env.raise(Flags::INEXACT);
    }
    rounded
}

/// Converts to a signed 32-bit integer (`fcvt.w`).
pub fn convert_to_int<F: Floating>(value: F, env: &mut Environment, quiet: bool) -> i32 {
    let bounds = (BigInt::from(i32::MAX), BigInt::from(i32::MIN));
    convert_to_integral(value, &bounds.0, &bounds.1, env, quiet)
        .to_i32()
        .unwrap_or_default()
}

/// Converts to an unsigned 32-bit integer (`fcvt.wu`).
pub fn convert_to_unsigned_int<F: Floating>(value: F, env: &mut Environment, quiet: bool) -> u32 {
    let bounds = (BigInt::from(u32::MAX), BigInt::from(0));
    convert_to_integral(value, &bounds.0, &bounds.1, env, quiet)
        .to_u32()
        .unwrap_or_default()
}

/// Converts to a signed 64-bit integer (`fcvt.l`).
pub fn convert_to_long<F: Floating>(value: F, env: &mut Environment, quiet: bool) -> i64 {
    let bounds = (BigInt::from(i64::MAX), BigInt::from(i64::MIN));
    convert_to_integral(value, &bounds.0, &bounds.1, env, quiet)
        .to_i64()
        .unwrap_or_default()
}

/// Converts to an unsigned 64-bit integer (`fcvt.lu`).
pub fn convert_to_unsigned_long<F: Floating>(
    value: F,
    env: &mut Environment,
    quiet: bool,
) -> u64 {
    let bounds = (BigInt::from(u64::MAX), BigInt::from(0));
    convert_to_integral(value, &bounds.0, &bounds.1, env, quiet)
        .to_u64()
        .unwrap_or_default()
}

/// Converts a signed integer, rounding in `env.mode` when it does not fit.
pub fn convert_from_int<F: Floating>(value: i64, env: &mut Environment) -> F {
    if value == 0 {
        return F::zero();
    }
    F::from_exact(&ExactFloat::from_i128(i128::from(value)), env)
}

/// Converts an unsigned integer, rounding in `env.mode` when it does not fit.
pub fn convert_from_unsigned<F: Floating>(value: u64, env: &mut Environment) -> F {
    if value == 0 {
        return F::zero();
    }
    F::from_exact(&ExactFloat::from_i128(i128::from(value)), env)
}

/// Converts between formats (`fcvt.s.d`, `fcvt.d.s`).
///
/// Widening is always exact; narrowing rounds and may overflow or underflow.
/// NaNs become the destination's canonical NaN.
pub fn convert_format<A: Floating, B: Floating>(value: A, env: &mut Environment) -> B {
    if value.is_nan() {
        if value.is_signalling() {
            env.raise(Flags::INVALID);
        }
        return B::nan();
    }
    let negative = value.is_sign_minus();
    if value.is_infinite() {
        return if negative {
            B::negative_infinity()
        } else {
            B::infinity()
        };
    }
    if value.is_zero() {
        return if negative {
            B::negative_zero()
        } else {
            B::zero()
        };
    }
    B::from_exact(&exact_unchecked(value), env)
}
