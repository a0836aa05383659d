//! Arbitrary-precision intermediate float.
//!
//! An [`ExactFloat`] holds `(-1)^sign * significand * 2^exponent` with an
//! unbounded significand. Every format conversion and every arithmetic result
//! passes through this type before being rounded back into a binary format, so
//! no precision is lost before the single, final rounding step.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

use super::env::{Environment, Flags, RoundingMode};

/// Decides whether a discarded fraction rounds the kept magnitude away from zero.
///
/// `negative` is the sign of the value, `kept_is_odd` the parity of the truncated
/// magnitude, and `remainder` the discarded bits compared against exactly one
/// half of the discarded range. Callers only ask when the remainder is non-zero.
pub(crate) fn rounds_away(
    mode: RoundingMode,
    negative: bool,
    kept_is_odd: bool,
    remainder: Ordering,
) -> bool {
    match mode {
        RoundingMode::Rne => match remainder {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => kept_is_odd,
        },
        RoundingMode::Rmm => remainder != Ordering::Less,
        RoundingMode::Rtz => false,
        RoundingMode::Rup => !negative,
        RoundingMode::Rdn => negative,
    }
}

/// Splits `magnitude` into `(magnitude >> shift, remainder vs. half)`.
///
/// `shift` must be positive. The second element is `None` when nothing was
/// discarded.
pub(crate) fn split_at(magnitude: &BigUint, shift: u64) -> (BigUint, Option<Ordering>) {
    let kept = magnitude >> shift;
    let discarded = magnitude - (&kept << shift);
    if discarded.is_zero() {
        return (kept, None);
    }
    let half = BigUint::one() << (shift - 1);
    (kept, Some(discarded.cmp(&half)))
}

/// Exact binary floating-point value with an unbounded significand.
#[derive(Clone)]
pub struct ExactFloat {
    sign: bool,
    exponent: i64,
    significand: BigUint,
}

impl ExactFloat {
    /// Creates `(-1)^sign * significand * 2^exponent`. The significand is not normalized.
    ///
    /// Any exponent is accepted. Exponent arithmetic saturates at the `i64`
    /// limits, where every value is far outside both binary formats.
    pub fn new(sign: bool, exponent: i64, significand: BigUint) -> Self {
        Self {
            sign,
            exponent,
            significand,
        }
    }

    /// Positive exact zero.
    pub fn zero() -> Self {
        Self::new(false, 0, BigUint::zero())
    }

    /// Exact value of an arbitrary integer.
    pub fn from_big_int(value: &BigInt) -> Self {
        Self::new(value.sign() == Sign::Minus, 0, value.magnitude().clone())
    }

    /// Exact value of a machine integer.
    pub fn from_i128(value: i128) -> Self {
        Self::new(value < 0, 0, BigUint::from(value.unsigned_abs()))
    }

    /// Sign of the value; true means negative.
    pub fn sign(&self) -> bool {
        self.sign
    }

    /// Exponent applied to the significand.
    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    /// Unnormalized significand magnitude.
    pub fn significand(&self) -> &BigUint {
        &self.significand
    }

    /// Returns true if the value is exactly zero (of either sign).
    pub fn is_zero(&self) -> bool {
        self.significand.is_zero()
    }

    /// Number of significant bits in the significand.
    pub fn bit_length(&self) -> u64 {
        self.significand.bits()
    }

    /// Canonical form: no trailing zero bits in the significand.
    ///
    /// A zero significand becomes zero with exponent 0; the sign is kept so that
    /// signed zeros survive the round trip.
    pub fn normalize(&self) -> Self {
        match self.significand.trailing_zeros() {
            None => Self::new(self.sign, 0, BigUint::zero()),
            Some(0) => self.clone(),
            Some(tz) => Self::new(
                self.sign,
                self.exponent.saturating_add(tz as i64),
                &self.significand >> tz,
            ),
        }
    }

    /// Value with the opposite sign.
    pub fn negate(&self) -> Self {
        Self::new(!self.sign, self.exponent, self.significand.clone())
    }

    /// Value with a positive sign.
    pub fn abs(&self) -> Self {
        Self::new(false, self.exponent, self.significand.clone())
    }

    /// Multiplies the value by `2^amount`.
    pub fn shift(&self, amount: i64) -> Self {
        Self::new(
            self.sign,
            self.exponent.saturating_add(amount),
            self.significand.clone(),
        )
    }

    /// Signed significand scaled so that its exponent is `exponent`.
    ///
    /// `exponent` must not exceed `self.exponent`.
    fn aligned(&self, exponent: i64) -> BigInt {
        let magnitude = &self.significand << self.exponent.abs_diff(exponent);
        BigInt::from_biguint(if self.sign { Sign::Minus } else { Sign::Plus }, magnitude)
    }

    /// Exact sum. A zero result takes the sign of `self`; IEEE signed-zero rules
    /// are applied by the caller, which knows the rounding mode.
    pub fn add(&self, other: &Self) -> Self {
        if other.is_zero() {
            return self.clone();
        }
        if self.is_zero() {
            return other.clone();
        }
        let exponent = self.exponent.min(other.exponent);
        let sum = self.aligned(exponent) + other.aligned(exponent);
        if sum.is_zero() {
            return Self::new(self.sign, 0, BigUint::zero());
        }
        Self::new(sum.sign() == Sign::Minus, exponent, sum.magnitude().clone())
    }

    /// Exact product.
    pub fn multiply(&self, other: &Self) -> Self {
        Self::new(
            self.sign != other.sign,
            self.exponent.saturating_add(other.exponent),
            &self.significand * &other.significand,
        )
    }

    /// Exact numeric comparison; both zeros compare equal.
    pub fn compare_to(&self, other: &Self) -> Ordering {
        match (self.is_zero(), other.is_zero()) {
            (true, true) => return Ordering::Equal,
            (true, false) => {
                return if other.sign {
                    Ordering::Greater
                } else {
                    Ordering::Less
                };
            }
            (false, true) => {
                return if self.sign {
                    Ordering::Less
                } else {
                    Ordering::Greater
                };
            }
            (false, false) => {}
        }
        if self.sign != other.sign {
            return if self.sign {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        let magnitude = self.compare_magnitude(other);
        if self.sign {
            magnitude.reverse()
        } else {
            magnitude
        }
    }

    /// Compares `|self|` with `|other|` for non-zero values.
    fn compare_magnitude(&self, other: &Self) -> Ordering {
        let top_self = self.exponent.saturating_add(self.bit_length() as i64);
        let top_other = other.exponent.saturating_add(other.bit_length() as i64);
        if top_self != top_other {
            return top_self.cmp(&top_other);
        }
        let exponent = self.exponent.min(other.exponent);
        let a = &self.significand << self.exponent.abs_diff(exponent);
        let b = &other.significand << other.exponent.abs_diff(exponent);
        a.cmp(&b)
    }

    /// Rounds to an integer according to `env.mode`.
    ///
    /// Raises `inexact` if the value was not already integral.
    pub fn to_integral(&self, env: &mut Environment) -> BigInt {
        let magnitude = self.integral_magnitude(env);
        BigInt::from_biguint(if self.sign { Sign::Minus } else { Sign::Plus }, magnitude)
    }

    /// Rounds to an integral value, keeping the sign even when the result is zero.
    pub fn round_to_integral(&self, env: &mut Environment) -> Self {
        Self::new(self.sign, 0, self.integral_magnitude(env))
    }

    fn integral_magnitude(&self, env: &mut Environment) -> BigUint {
        if self.exponent >= 0 {
            return &self.significand << self.exponent as u64;
        }
        let shift = self.exponent.unsigned_abs();
        if shift > self.bit_length() + 1 {
            // Every bit is below the half-ulp position.
            if self.is_zero() {
                return BigUint::zero();
            }
            env.raise(Flags::INEXACT);
            let away = rounds_away(env.mode, self.sign, false, Ordering::Less);
            return if away { BigUint::one() } else { BigUint::zero() };
        }
        let (kept, remainder) = split_at(&self.significand, shift);
        match remainder {
            None => kept,
            Some(remainder) => {
                env.raise(Flags::INEXACT);
                let odd = kept.bit(0);
                if rounds_away(env.mode, self.sign, odd, remainder) {
                    kept + 1u32
                } else {
                    kept
                }
            }
        }
    }
}

impl PartialEq for ExactFloat {
    fn eq(&self, other: &Self) -> bool {
        self.compare_to(other) == Ordering::Equal
    }
}

impl Eq for ExactFloat {}

impl PartialOrd for ExactFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExactFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_to(other)
    }
}

impl fmt::Debug for ExactFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:#x}p{}",
            if self.sign { "-" } else { "" },
            self.significand,
            self.exponent
        )
    }
}
