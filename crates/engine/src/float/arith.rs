//! Correctly rounded arithmetic, generic over [`Floating`].
//!
//! Every operation handles the IEEE special operands first, then computes the
//! exact result as an [`ExactFloat`] (division and square root carry a sticky
//! bit below the rounding position) and encodes it once with
//! [`Floating::from_exact`].
//!
//! NaN results are always the canonical quiet NaN, matching RISC-V, which does
//! not propagate NaN payloads.

use super::env::{Environment, Flags, RoundingMode};
use super::exact::ExactFloat;
use super::{Floating, exact_unchecked};

/// Returns the canonical NaN if any operand is a NaN, raising `invalid` for
/// signalling ones.
fn propagate_nan<F: Floating>(operands: &[F], env: &mut Environment) -> Option<F> {
    if operands.iter().any(|value| value.is_signalling()) {
        env.raise(Flags::INVALID);
    }
    operands.iter().any(|value| value.is_nan()).then(F::nan)
}

/// Signed zero produced by an exact cancellation.
fn cancelled_zero<F: Floating>(env: &Environment) -> F {
    if env.mode == RoundingMode::Rdn {
        F::negative_zero()
    } else {
        F::zero()
    }
}

fn invalid<F: Floating>(env: &mut Environment) -> F {
    env.raise(Flags::INVALID);
    F::nan()
}

fn signed_zero<F: Floating>(negative: bool) -> F {
    if negative {
        F::negative_zero()
    } else {
        F::zero()
    }
}

fn signed_infinity<F: Floating>(negative: bool) -> F {
    if negative {
        F::negative_infinity()
    } else {
        F::infinity()
    }
}

/// Rounds a finite exact result, mapping an exact zero to the cancellation zero.
fn round_sum<F: Floating>(sum: &ExactFloat, env: &mut Environment) -> F {
    if sum.is_zero() {
        cancelled_zero(env)
    } else {
        F::from_exact(sum, env)
    }
}

/// `a + b`.
pub fn add<F: Floating>(a: F, b: F, env: &mut Environment) -> F {
    if let Some(nan) = propagate_nan(&[a, b], env) {
        return nan;
    }
    match (a.is_infinite(), b.is_infinite()) {
        (true, true) if a.is_sign_minus() != b.is_sign_minus() => return invalid(env),
        (true, _) => return a,
        (false, true) => return b,
        (false, false) => {}
    }
    if a.is_zero() && b.is_zero() {
        return if a.is_sign_minus() == b.is_sign_minus() {
            a
        } else {
            cancelled_zero(env)
        };
    }
    let sum = exact_unchecked(a).add(&exact_unchecked(b));
    round_sum(&sum, env)
}

/// `a - b`.
pub fn subtract<F: Floating>(a: F, b: F, env: &mut Environment) -> F {
    if let Some(nan) = propagate_nan(&[a, b], env) {
        return nan;
    }
    add(a, b.negate(), env)
}

/// `a * b`.
pub fn multiply<F: Floating>(a: F, b: F, env: &mut Environment) -> F {
    if let Some(nan) = propagate_nan(&[a, b], env) {
        return nan;
    }
    let negative = a.is_sign_minus() != b.is_sign_minus();
    if a.is_infinite() || b.is_infinite() {
        if a.is_zero() || b.is_zero() {
            return invalid(env);
        }
        return signed_infinity(negative);
    }
    if a.is_zero() || b.is_zero() {
        return signed_zero(negative);
    }
    F::from_exact(&exact_unchecked(a).multiply(&exact_unchecked(b)), env)
}

/// `a / b`.
pub fn divide<F: Floating>(a: F, b: F, env: &mut Environment) -> F {
    if let Some(nan) = propagate_nan(&[a, b], env) {
        return nan;
    }
    let negative = a.is_sign_minus() != b.is_sign_minus();
    match (a.is_infinite(), b.is_infinite()) {
        (true, true) => return invalid(env),
        (true, false) => return signed_infinity(negative),
        (false, true) => return signed_zero(negative),
        (false, false) => {}
    }
    if b.is_zero() {
        if a.is_zero() {
            return invalid(env);
        }
        env.raise(Flags::DIVIDE_BY_ZERO);
        return signed_infinity(negative);
    }
    if a.is_zero() {
        return signed_zero(negative);
    }

    let dividend = exact_unchecked(a);
    let divisor = exact_unchecked(b);
    // Enough extra quotient bits that the sticky bit sits below every rounding position.
    let scale = u64::from(F::FRACTION_BITS) + 3 + divisor.bit_length();
    let numerator = dividend.significand() << scale;
    let quotient = &numerator / divisor.significand();
    let exact = (&quotient * divisor.significand()) == numerator;
    let exponent = dividend.exponent() - divisor.exponent() - scale as i64;
    let result = if exact {
        ExactFloat::new(negative, exponent, quotient)
    } else {
        ExactFloat::new(negative, exponent - 1, (quotient << 1u32) + 1u32)
    };
    F::from_exact(&result, env)
}

/// `sqrt(a)`. The square root of −0 is −0.
pub fn square_root<F: Floating>(a: F, env: &mut Environment) -> F {
    if let Some(nan) = propagate_nan(&[a], env) {
        return nan;
    }
    if a.is_zero() {
        return a;
    }
    if a.is_sign_minus() {
        return invalid(env);
    }
    if a.is_infinite() {
        return a;
    }

    let value = exact_unchecked(a);
    let mut significand = value.significand().clone();
    let mut exponent = value.exponent();
    if exponent % 2 != 0 {
        significand <<= 1u32;
        exponent -= 1;
    }
    let scale = u64::from(F::FRACTION_BITS) + 3;
    significand <<= 2 * scale;
    exponent -= 2 * scale as i64;
    let root = significand.sqrt();
    let exact = &root * &root == significand;
    let result = if exact {
        ExactFloat::new(false, exponent / 2, root)
    } else {
        ExactFloat::new(false, exponent / 2 - 1, (root << 1u32) + 1u32)
    };
    F::from_exact(&result, env)
}

/// `a * b + c` with a single rounding.
///
/// `inf * 0` is invalid even when `c` is a quiet NaN.
pub fn fused_multiply_add<F: Floating>(a: F, b: F, c: F, env: &mut Environment) -> F {
    let product_invalid =
        (a.is_infinite() && b.is_zero()) || (a.is_zero() && b.is_infinite());
    if product_invalid {
        let _ = propagate_nan(&[c], env);
        return invalid(env);
    }
    if let Some(nan) = propagate_nan(&[a, b, c], env) {
        return nan;
    }

    let product_negative = a.is_sign_minus() != b.is_sign_minus();
    if a.is_infinite() || b.is_infinite() {
        if c.is_infinite() && c.is_sign_minus() != product_negative {
            return invalid(env);
        }
        return signed_infinity(product_negative);
    }
    if c.is_infinite() {
        return c;
    }
    if a.is_zero() || b.is_zero() {
        if !c.is_zero() {
            return c;
        }
        return if c.is_sign_minus() == product_negative {
            c
        } else {
            cancelled_zero(env)
        };
    }

    let product = exact_unchecked(a).multiply(&exact_unchecked(b));
    let sum = if c.is_zero() {
        product
    } else {
        product.add(&exact_unchecked(c))
    };
    round_sum(&sum, env)
}

/// Rounds to an integral value in `env.mode`, raising `inexact` when the value
/// changes. The sign of a zero result follows the operand.
pub fn round_to_integral<F: Floating>(a: F, env: &mut Environment) -> F {
    if let Some(nan) = propagate_nan(&[a], env) {
        return nan;
    }
    if a.is_zero() || a.is_infinite() {
        return a;
    }
    let rounded = exact_unchecked(a).round_to_integral(env);
    if rounded.is_zero() {
        return signed_zero(a.is_sign_minus());
    }
    F::from_exact(&rounded, env)
}

/// `fsgnjn`: magnitude of `a`, inverted sign of `b`.
pub fn copy_sign_negated<F: Floating>(a: F, b: F) -> F {
    a.copy_sign(b.negate())
}

/// `fsgnjx`: magnitude of `a`, sign of `a` xor sign of `b`.
pub fn copy_sign_xor<F: Floating>(a: F, b: F) -> F {
    if b.is_sign_minus() { a.negate() } else { a }
}
