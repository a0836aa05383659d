//! Correctly rounded `ExactFloat` → binary encoder.
//!
//! One implementation serves every format; only the field widths and bias
//! taken from the [`Floating`] constants differ between binary32 and binary64.
//!
//! The value is classified by the unbiased exponent of its leading one:
//! - above `MAX_EXPONENT`: overflow, resolved by the rounding direction;
//! - below `MIN_EXPONENT`: subnormal, rounded to a multiple of the smallest
//!   subnormal (a carry out of the fraction yields the smallest normal);
//! - otherwise: normal, rounded to `FRACTION_BITS + 1` significant bits (a carry
//!   out of the significand bumps the exponent and may itself overflow).

use num_traits::ToPrimitive;

use super::Floating;
use super::env::{Environment, Flags, RoundingMode};
use super::exact::{ExactFloat, rounds_away, split_at};

pub(crate) fn encode<F: Floating>(value: &ExactFloat, env: &mut Environment) -> F {
    if value.is_zero() {
        return if value.sign() {
            F::negative_zero()
        } else {
            F::zero()
        };
    }

    let value = value.normalize();
    let negative = value.sign();
    let sign_bits = if negative { F::sign_mask() } else { 0 };
    let precision = u64::from(F::FRACTION_BITS) + 1;
    let bit_length = value.bit_length();
    let exponent = value
        .exponent()
        .saturating_add(bit_length as i64 - 1);

    if exponent > F::MAX_EXPONENT {
        return overflow(negative, env);
    }

    if exponent < F::MIN_EXPONENT {
        let quantum = F::MIN_EXPONENT - i64::from(F::FRACTION_BITS);
        let shift = quantum.saturating_sub(value.exponent());
        if shift <= 0 {
            let fraction = (value.significand() << shift.unsigned_abs())
                .to_u64()
                .unwrap_or_default();
            return F::from_raw(sign_bits | fraction);
        }
        // Past one bit beyond the significand, every value rounds the same way.
        let (kept, remainder) = split_at(value.significand(), (shift as u64).min(bit_length + 1));
        let mut fraction = kept.to_u64().unwrap_or_default();
        if let Some(remainder) = remainder {
            env.raise(Flags::UNDERFLOW | Flags::INEXACT);
            if rounds_away(env.mode, negative, fraction & 1 == 1, remainder) {
                fraction += 1;
            }
        }
        return F::from_raw(sign_bits | fraction);
    }

    let significand = if bit_length <= precision {
        (value.significand() << (precision - bit_length))
            .to_u64()
            .unwrap_or_default()
    } else {
        let (kept, remainder) = split_at(value.significand(), bit_length - precision);
        let mut significand = kept.to_u64().unwrap_or_default();
        if let Some(remainder) = remainder {
            env.raise(Flags::INEXACT);
            if rounds_away(env.mode, negative, significand & 1 == 1, remainder) {
                significand += 1;
            }
        }
        significand
    };

    // A significand that rounded up to 2^precision carries into the exponent field.
    let biased = (exponent + F::BIAS) as u64;
    let raw = (biased << F::FRACTION_BITS) + significand - (1 << F::FRACTION_BITS);
    let result = F::from_raw(sign_bits | raw);
    if result.is_infinite() {
        env.raise(Flags::OVERFLOW | Flags::INEXACT);
    }
    result
}

/// Result of a value whose exponent exceeds the format's range.
fn overflow<F: Floating>(negative: bool, env: &mut Environment) -> F {
    env.raise(Flags::OVERFLOW | Flags::INEXACT);
    let to_infinity = match env.mode {
        RoundingMode::Rne | RoundingMode::Rmm => true,
        RoundingMode::Rtz => false,
        RoundingMode::Rup => !negative,
        RoundingMode::Rdn => negative,
    };
    if !to_infinity {
        F::max_value(negative)
    } else if negative {
        F::negative_infinity()
    } else {
        F::infinity()
    }
}
