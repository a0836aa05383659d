//! Integer and format conversions.

use rvisa_engine::float::convert::{
    convert_format, convert_from_int, convert_from_unsigned, convert_to_int, convert_to_long,
    convert_to_unsigned_int, convert_to_unsigned_long,
};
use rvisa_engine::float::{Environment, Flags, Float32, Float64, Floating, RoundingMode};

#[test]
fn small_integers_round_trip() {
    let mut env = Environment::default();
    let value: Float64 = convert_from_int(-1, &mut env);
    assert_eq!(value.to_f64(), -1.0);
    assert_eq!(convert_to_int(value, &mut env, false), -1);
    assert!(env.flags.is_empty());
}

#[test]
fn nan_converts_to_the_maximum() {
    let mut env = Environment::default();
    assert_eq!(convert_to_int(Float32::nan(), &mut env, false), i32::MAX);
    assert_eq!(env.flags, Flags::INVALID);

    let mut env = Environment::default();
    assert_eq!(convert_to_unsigned_long(Float64::nan(), &mut env, false), u64::MAX);
    assert_eq!(env.flags, Flags::INVALID);
}

#[test]
fn out_of_range_values_clamp_with_invalid_only() {
    let mut env = Environment::default();
    assert_eq!(convert_to_int(Float64::from_f64(3e10), &mut env, false), i32::MAX);
    assert_eq!(convert_to_int(Float64::negative_infinity(), &mut env, false), i32::MIN);
    assert_eq!(env.flags, Flags::INVALID);

    let mut env = Environment::default();
    assert_eq!(convert_to_unsigned_int(Float32::from_f32(-1.0), &mut env, false), 0);
    assert_eq!(env.flags, Flags::INVALID);
}

#[test]
fn small_negative_fractions_round_to_zero_for_unsigned() {
    let mut env = Environment::new(RoundingMode::Rtz);
    assert_eq!(convert_to_unsigned_int(Float32::from_f32(-0.5), &mut env, false), 0);
    assert_eq!(env.flags, Flags::INEXACT);
}

#[test]
fn integer_conversion_honours_the_rounding_mode() {
    let half = Float32::from_f32(2.5);

    let mut env = Environment::new(RoundingMode::Rne);
    assert_eq!(convert_to_int(half, &mut env, false), 2);
    assert_eq!(env.flags, Flags::INEXACT);

    let mut env = Environment::new(RoundingMode::Rmm);
    assert_eq!(convert_to_int(half, &mut env, false), 3);

    let mut env = Environment::new(RoundingMode::Rdn);
    assert_eq!(convert_to_long(Float32::from_f32(-2.5), &mut env, false), -3);
}

#[test]
fn quiet_conversion_suppresses_inexact() {
    let mut env = Environment::default();
    assert_eq!(convert_to_int(Float32::from_f32(7.75), &mut env, true), 8);
    assert!(env.flags.is_empty());
}

#[test]
fn wide_integers_round_when_they_do_not_fit() {
    let mut env = Environment::default();
    let value: Float32 = convert_from_unsigned(u64::MAX, &mut env);
    assert_eq!(value.bits(), 0x5F80_0000);
    assert_eq!(env.flags, Flags::INEXACT);

    let mut env = Environment::default();
    let exact: Float64 = convert_from_int(i64::from(i32::MIN), &mut env);
    assert_eq!(exact.to_f64(), -2_147_483_648.0);
    assert!(env.flags.is_empty());
}

#[test]
fn zero_converts_to_positive_zero() {
    let mut env = Environment::new(RoundingMode::Rdn);
    let value: Float32 = convert_from_int(0, &mut env);
    assert_eq!(value, Float32::zero());
}

#[test]
fn widening_is_exact() {
    let mut env = Environment::default();
    let wide: Float64 = convert_format(Float32::from_f32(0.1), &mut env);
    assert_eq!(wide.to_f64(), f64::from(0.1f32));
    assert!(env.flags.is_empty());

    let tiny: Float64 = convert_format(Float32::from_bits(1), &mut env);
    assert_eq!(tiny.to_f64(), f64::from(f32::from_bits(1)));
    assert!(env.flags.is_empty());
}

#[test]
fn narrowing_rounds_and_overflows() {
    let mut env = Environment::default();
    let third: Float32 = convert_format(Float64::from_f64(1.0 / 3.0), &mut env);
    assert_eq!(third.to_f32(), (1.0f64 / 3.0) as f32);
    assert_eq!(env.flags, Flags::INEXACT);

    let mut env = Environment::default();
    let huge: Float32 = convert_format(Float64::from_f64(1e300), &mut env);
    assert_eq!(huge, Float32::infinity());
    assert!(env.overflow() && env.inexact());
}

#[test]
fn format_conversion_canonicalizes_nans() {
    let mut env = Environment::default();
    let quiet: Float64 = convert_format(Float32::from_bits(0xFFC0_1234), &mut env);
    assert_eq!(quiet, Float64::nan());
    assert!(env.flags.is_empty());

    let signalling: Float64 = convert_format(Float32::from_bits(0x7FA0_0000), &mut env);
    assert_eq!(signalling, Float64::nan());
    assert_eq!(env.flags, Flags::INVALID);
}

#[test]
fn infinities_and_zeros_keep_their_sign() {
    let mut env = Environment::default();
    let inf: Float32 = convert_format(Float64::negative_infinity(), &mut env);
    let zero: Float32 = convert_format(Float64::negative_zero(), &mut env);
    assert_eq!(inf, Float32::negative_infinity());
    assert_eq!(zero, Float32::negative_zero());
    assert!(env.flags.is_empty());
}
