//! Min/max selection and comparison predicates.

use std::cmp::Ordering;

use rvisa_engine::float::compare::{
    compare_no_nan, compare_quiet_equal, compare_quiet_greater_than_equal,
    compare_quiet_less_than, compare_quiet_unordered, compare_signaling_equal,
    compare_signaling_less_than, compare_signaling_less_than_equal, max_num, maximum,
    maximum_number, min_num, minimum, minimum_number,
};
use rvisa_engine::float::{Environment, Float32, Float64, Floating};

const SIGNALLING: u32 = 0x7FA0_0000;

fn f32v(value: f32) -> Float32 {
    Float32::from_f32(value)
}

#[test]
fn minimum_ignores_a_quiet_nan_operand() {
    let mut env = Environment::default();
    assert_eq!(minimum(Float32::nan(), f32v(5.0), &mut env), f32v(5.0));
    assert_eq!(minimum(f32v(5.0), Float32::nan(), &mut env), f32v(5.0));
    assert_eq!(maximum(Float32::nan(), f32v(-5.0), &mut env), f32v(-5.0));
    assert!(env.flags.is_empty());
}

#[test]
fn two_signalling_nans_give_the_canonical_nan_without_invalid() {
    let snan = Float32::from_bits(SIGNALLING);
    let mut env = Environment::default();
    assert_eq!(minimum(snan, snan, &mut env), Float32::nan());
    assert_eq!(maximum(snan, snan, &mut env), Float32::nan());
    assert!(!env.invalid());
}

#[test]
fn number_variants_raise_invalid_for_signalling_nans() {
    let snan = Float32::from_bits(SIGNALLING);
    let mut env = Environment::default();
    assert_eq!(minimum_number(snan, f32v(5.0), &mut env), f32v(5.0));
    assert!(env.invalid());

    let mut env = Environment::default();
    assert_eq!(maximum_number(f32v(1.0), snan, &mut env), f32v(1.0));
    assert!(env.invalid());
}

#[test]
fn min_num_returns_nan_for_signalling_operands() {
    let snan = Float32::from_bits(SIGNALLING);
    let mut env = Environment::default();
    assert_eq!(min_num(snan, f32v(5.0), &mut env), Float32::nan());
    assert!(env.invalid());

    let mut env = Environment::default();
    assert_eq!(max_num(Float32::nan(), f32v(5.0), &mut env), f32v(5.0));
    assert!(env.flags.is_empty());
}

#[test]
fn signed_zeros_are_ordered_by_min_and_max() {
    let mut env = Environment::default();
    let (neg, pos) = (Float64::negative_zero(), Float64::zero());
    assert_eq!(minimum(pos, neg, &mut env), neg);
    assert_eq!(minimum(neg, pos, &mut env), neg);
    assert_eq!(maximum(neg, pos, &mut env), pos);
    assert_eq!(maximum(pos, neg, &mut env), pos);
    assert_eq!(compare_no_nan(neg, pos), Ordering::Equal);
}

#[test]
fn infinities_bound_every_finite_value() {
    let big = Float64::max_value(false);
    assert_eq!(compare_no_nan(Float64::infinity(), big), Ordering::Greater);
    assert_eq!(compare_no_nan(Float64::negative_infinity(), big.negate()), Ordering::Less);
    assert_eq!(
        compare_no_nan(Float64::infinity(), Float64::negative_infinity()),
        Ordering::Greater
    );
    assert_eq!(compare_no_nan(Float64::from_f64(-1.0), Float64::from_f64(0.5)), Ordering::Less);
}

#[test]
fn quiet_predicates_raise_only_for_signalling_nans() {
    let mut env = Environment::default();
    assert!(!compare_quiet_less_than(Float32::nan(), f32v(1.0), &mut env));
    assert!(!compare_quiet_equal(Float32::nan(), Float32::nan(), &mut env));
    assert!(compare_quiet_unordered(Float32::nan(), f32v(1.0), &mut env));
    assert!(env.flags.is_empty());

    assert!(!compare_quiet_equal(Float32::from_bits(SIGNALLING), f32v(1.0), &mut env));
    assert!(env.invalid());
}

#[test]
fn signalling_predicates_raise_for_any_nan() {
    let mut env = Environment::default();
    assert!(!compare_signaling_less_than(Float32::nan(), f32v(1.0), &mut env));
    assert!(env.invalid());

    let mut env = Environment::default();
    assert!(!compare_signaling_equal(f32v(2.0), Float32::nan(), &mut env));
    assert!(env.invalid());
}

#[test]
fn ordered_predicates() {
    let mut env = Environment::default();
    assert!(compare_quiet_less_than(f32v(1.0), f32v(2.0), &mut env));
    assert!(compare_signaling_less_than_equal(f32v(2.0), f32v(2.0), &mut env));
    assert!(compare_quiet_greater_than_equal(f32v(3.0), f32v(2.0), &mut env));
    assert!(compare_quiet_equal(Float32::negative_zero(), Float32::zero(), &mut env));
    assert!(env.flags.is_empty());
}
