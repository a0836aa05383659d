//! Arithmetic checked bit-for-bit against host IEEE arithmetic.
//!
//! The host computes binary32/binary64 operations correctly rounded to
//! nearest-even, so every non-NaN result must match exactly.

use proptest::prelude::*;
use rvisa_engine::float::arith::{
    add, divide, fused_multiply_add, multiply, round_to_integral, square_root, subtract,
};
use rvisa_engine::float::{Environment, Flags, Float32, Float64, Floating, RoundingMode};

fn f32v(value: f32) -> Float32 {
    Float32::from_f32(value)
}

fn f64v(value: f64) -> Float64 {
    Float64::from_f64(value)
}

proptest! {
    #[test]
    fn binary32_add_matches_host(a in any::<u32>(), b in any::<u32>()) {
        let (x, y) = (f32::from_bits(a), f32::from_bits(b));
        let expected = x + y;
        prop_assume!(!expected.is_nan());
        let mut env = Environment::default();
        let got = add(Float32::from_bits(a), Float32::from_bits(b), &mut env);
        prop_assert_eq!(got.bits(), expected.to_bits());
    }

    #[test]
    fn binary32_multiply_matches_host(a in any::<u32>(), b in any::<u32>()) {
        let (x, y) = (f32::from_bits(a), f32::from_bits(b));
        let expected = x * y;
        prop_assume!(!expected.is_nan());
        let mut env = Environment::default();
        let got = multiply(Float32::from_bits(a), Float32::from_bits(b), &mut env);
        prop_assert_eq!(got.bits(), expected.to_bits());
    }

    #[test]
    fn binary32_divide_matches_host(a in any::<u32>(), b in any::<u32>()) {
        let (x, y) = (f32::from_bits(a), f32::from_bits(b));
        let expected = x / y;
        prop_assume!(!expected.is_nan());
        let mut env = Environment::default();
        let got = divide(Float32::from_bits(a), Float32::from_bits(b), &mut env);
        prop_assert_eq!(got.bits(), expected.to_bits());
    }

    #[test]
    fn binary64_arithmetic_matches_host(a in any::<f64>(), b in any::<f64>()) {
        let mut env = Environment::default();
        let cases = [
            (subtract(f64v(a), f64v(b), &mut env), a - b),
            (multiply(f64v(a), f64v(b), &mut env), a * b),
            (divide(f64v(a), f64v(b), &mut env), a / b),
        ];
        for (got, expected) in cases {
            if !expected.is_nan() {
                prop_assert_eq!(got.bits(), expected.to_bits());
            }
        }
    }

    #[test]
    fn square_root_matches_host(bits in any::<u64>()) {
        let value = f64::from_bits(bits);
        let expected = value.sqrt();
        prop_assume!(!expected.is_nan());
        let mut env = Environment::default();
        prop_assert_eq!(square_root(Float64::from_bits(bits), &mut env).bits(), expected.to_bits());
    }

    #[test]
    fn fused_multiply_add_matches_host(a in any::<f32>(), b in any::<f32>(), c in any::<f32>()) {
        let expected = a.mul_add(b, c);
        prop_assume!(!expected.is_nan());
        let mut env = Environment::default();
        prop_assert_eq!(fused_multiply_add(f32v(a), f32v(b), f32v(c), &mut env).bits(), expected.to_bits());
    }
}

#[test]
fn invalid_operations_produce_the_canonical_nan() {
    let cases = [
        add(Float32::infinity(), Float32::negative_infinity(), &mut Environment::default()),
        multiply(Float32::zero(), Float32::infinity(), &mut Environment::default()),
        divide(Float32::zero(), Float32::negative_zero(), &mut Environment::default()),
        divide(Float32::infinity(), Float32::infinity(), &mut Environment::default()),
        square_root(f32v(-1.0), &mut Environment::default()),
    ];
    for result in cases {
        assert_eq!(result, Float32::nan());
    }

    let mut env = Environment::default();
    let _ = square_root(f32v(-4.0), &mut env);
    assert_eq!(env.flags, Flags::INVALID);
}

#[test]
fn division_by_zero_is_a_signed_infinity() {
    let mut env = Environment::default();
    assert_eq!(divide(f32v(-3.0), Float32::zero(), &mut env), Float32::negative_infinity());
    assert_eq!(env.flags, Flags::DIVIDE_BY_ZERO);
}

#[test]
fn signalling_operand_raises_invalid_quiet_does_not() {
    let mut env = Environment::default();
    let _ = add(Float32::from_bits(0x7F80_0001), f32v(1.0), &mut env);
    assert!(env.invalid());

    let mut env = Environment::default();
    let result = add(Float32::nan(), f32v(1.0), &mut env);
    assert!(result.is_nan());
    assert!(env.flags.is_empty());
}

#[test]
fn exact_cancellation_sign_follows_the_rounding_mode() {
    let mut env = Environment::new(RoundingMode::Rdn);
    assert_eq!(subtract(f64v(1.5), f64v(1.5), &mut env), Float64::negative_zero());
    let mut env = Environment::new(RoundingMode::Rup);
    assert_eq!(subtract(f64v(1.5), f64v(1.5), &mut env), Float64::zero());
}

#[test]
fn directed_rounding_brackets_the_exact_quotient() {
    let mut down = Environment::new(RoundingMode::Rdn);
    let mut up = Environment::new(RoundingMode::Rup);
    let low = divide(f32v(1.0), f32v(3.0), &mut down);
    let high = divide(f32v(1.0), f32v(3.0), &mut up);
    assert_eq!(high.bits() - low.bits(), 1);
    assert!(down.inexact() && up.inexact());
}

#[test]
fn round_to_integral_by_mode() {
    let cases = [
        (RoundingMode::Rne, 2.5, 2.0),
        (RoundingMode::Rmm, 2.5, 3.0),
        (RoundingMode::Rtz, -2.7, -2.0),
        (RoundingMode::Rdn, -2.1, -3.0),
        (RoundingMode::Rup, 2.1, 3.0),
    ];
    for (mode, input, expected) in cases {
        let mut env = Environment::new(mode);
        assert_eq!(round_to_integral(f64v(input), &mut env).to_f64(), expected, "{mode:?}");
        assert!(env.inexact());
    }

    let mut env = Environment::new(RoundingMode::Rne);
    let small = round_to_integral(f64v(-0.25), &mut env);
    assert_eq!(small, Float64::negative_zero());
}
