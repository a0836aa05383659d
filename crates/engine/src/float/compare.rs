//! Min/max selection and comparison predicates, generic over [`Floating`].
//!
//! NaN rules:
//! - [`minimum`]/[`maximum`]: a NaN operand yields the other operand; two NaNs
//!   yield the canonical NaN. Signalling NaNs raise nothing.
//! - [`minimum_number`]/[`maximum_number`]: as above, but a signalling NaN
//!   raises `invalid` first. This is RISC-V `fmin`/`fmax`.
//! - [`min_num`]/[`max_num`]: any signalling NaN raises `invalid` and yields the
//!   canonical NaN immediately.
//! - Quiet predicates raise `invalid` only for signalling NaNs, signalling
//!   predicates for any NaN; both are false when unordered.

use std::cmp::Ordering;

use super::env::{Environment, Flags};
use super::{Floating, exact_unchecked};

/// Orders two non-NaN values; the two zeros compare equal.
pub fn compare_no_nan<F: Floating>(a: F, b: F) -> Ordering {
    debug_assert!(!a.is_nan() && !b.is_nan(), "compare_no_nan on NaN");
    if a.is_zero() && b.is_zero() {
        return Ordering::Equal;
    }
    match (a.is_infinite(), b.is_infinite()) {
        (true, true) => {
            return b.is_sign_minus().cmp(&a.is_sign_minus());
        }
        (true, false) => {
            return if a.is_sign_minus() {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        (false, true) => {
            return if b.is_sign_minus() {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }
        (false, false) => {}
    }
    exact_unchecked(a).compare_to(&exact_unchecked(b))
}

/// Picks the smaller of two ordered values, with `-0 < +0`.
fn select_min<F: Floating>(a: F, b: F) -> F {
    match compare_no_nan(a, b) {
        Ordering::Less => a,
        Ordering::Greater => b,
        Ordering::Equal => {
            if b.is_sign_minus() {
                b
            } else {
                a
            }
        }
    }
}

/// Picks the larger of two ordered values, with `+0 > -0`.
fn select_max<F: Floating>(a: F, b: F) -> F {
    match compare_no_nan(a, b) {
        Ordering::Greater => a,
        Ordering::Less => b,
        Ordering::Equal => {
            if b.is_sign_minus() {
                a
            } else {
                b
            }
        }
    }
}

/// NaN-avoiding selection shared by the min/max variants.
fn select_non_nan<F: Floating>(a: F, b: F, pick: fn(F, F) -> F) -> F {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => F::nan(),
        (true, false) => b,
        (false, true) => a,
        (false, false) => pick(a, b),
    }
}

fn raise_if_signalling<F: Floating>(a: F, b: F, env: &mut Environment) -> bool {
    let signalling = a.is_signalling() || b.is_signalling();
    if signalling {
        env.raise(Flags::INVALID);
    }
    signalling
}

/// Smaller operand; a NaN operand yields the other one.
pub fn minimum<F: Floating>(a: F, b: F, _env: &mut Environment) -> F {
    select_non_nan(a, b, select_min)
}

/// Larger operand; a NaN operand yields the other one.
pub fn maximum<F: Floating>(a: F, b: F, _env: &mut Environment) -> F {
    select_non_nan(a, b, select_max)
}

/// [`minimum`], raising `invalid` for signalling NaN operands.
pub fn minimum_number<F: Floating>(a: F, b: F, env: &mut Environment) -> F {
    let _ = raise_if_signalling(a, b, env);
    select_non_nan(a, b, select_min)
}

/// [`maximum`], raising `invalid` for signalling NaN operands.
pub fn maximum_number<F: Floating>(a: F, b: F, env: &mut Environment) -> F {
    let _ = raise_if_signalling(a, b, env);
    select_non_nan(a, b, select_max)
}

/// IEEE 754-2008 `minNum`: a signalling NaN operand yields the canonical NaN.
pub fn min_num<F: Floating>(a: F, b: F, env: &mut Environment) -> F {
    if raise_if_signalling(a, b, env) {
        return F::nan();
    }
    select_non_nan(a, b, select_min)
}

/// IEEE 754-2008 `maxNum`: a signalling NaN operand yields the canonical NaN.
pub fn max_num<F: Floating>(a: F, b: F, env: &mut Environment) -> F {
    if raise_if_signalling(a, b, env) {
        return F::nan();
    }
    select_non_nan(a, b, select_max)
}

fn quiet<F: Floating>(a: F, b: F, env: &mut Environment, holds: fn(Ordering) -> bool) -> bool {
    if a.is_nan() || b.is_nan() {
        let _ = raise_if_signalling(a, b, env);
        return false;
    }
    holds(compare_no_nan(a, b))
}

fn signaling<F: Floating>(a: F, b: F, env: &mut Environment, holds: fn(Ordering) -> bool) -> bool {
    if a.is_nan() || b.is_nan() {
        env.raise(Flags::INVALID);
    }
    quiet(a, b, env, holds)
}

/// `a == b`; quiet.
pub fn compare_quiet_equal<F: Floating>(a: F, b: F, env: &mut Environment) -> bool {
    quiet(a, b, env, Ordering::is_eq)
}

/// `a < b`; quiet.
pub fn compare_quiet_less_than<F: Floating>(a: F, b: F, env: &mut Environment) -> bool {
    quiet(a, b, env, Ordering::is_lt)
}

/// `a <= b`; quiet.
pub fn compare_quiet_less_than_equal<F: Floating>(a: F, b: F, env: &mut Environment) -> bool {
    quiet(a, b, env, Ordering::is_le)
}

/// `a > b`; quiet.
pub fn compare_quiet_greater_than<F: Floating>(a: F, b: F, env: &mut Environment) -> bool {
    quiet(a, b, env, Ordering::is_gt)
}

/// `a >= b`; quiet.
pub fn compare_quiet_greater_than_equal<F: Floating>(a: F, b: F, env: &mut Environment) -> bool {
    quiet(a, b, env, Ordering::is_ge)
}

/// True iff either operand is a NaN; quiet.
pub fn compare_quiet_unordered<F: Floating>(a: F, b: F, env: &mut Environment) -> bool {
    let _ = raise_if_signalling(a, b, env);
    a.is_nan() || b.is_nan()
}

/// `a == b`; signalling.
pub fn compare_signaling_equal<F: Floating>(a: F, b: F, env: &mut Environment) -> bool {
    signaling(a, b, env, Ordering::is_eq)
}

/// `a < b`; signalling.
pub fn compare_signaling_less_than<F: Floating>(a: F, b: F, env: &mut Environment) -> bool {
    signaling(a, b, env, Ordering::is_lt)
}

/// `a <= b`; signalling.
pub fn compare_signaling_less_than_equal<F: Floating>(a: F, b: F, env: &mut Environment) -> bool {
    signaling(a, b, env, Ordering::is_le)
}

/// `a > b`; signalling.
pub fn compare_signaling_greater_than<F: Floating>(a: F, b: F, env: &mut Environment) -> bool {
    signaling(a, b, env, Ordering::is_gt)
}

/// `a >= b`; signalling.
pub fn compare_signaling_greater_than_equal<F: Floating>(
    a: F,
    b: F,
    env: &mut Environment,
) -> bool {
    signaling(a, b, env, Ordering::is_ge)
}
