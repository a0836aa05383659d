//! Format constants, classification and exact round-trips.

use num_bigint::BigUint;
use proptest::prelude::*;
use rvisa_engine::float::{Environment, Float32, Float64, FloatClass, FloatError, Floating};

#[test]
fn canonical_constants() {
    assert_eq!(Float32::zero().bits(), 0x0000_0000);
    assert_eq!(Float32::negative_zero().bits(), 0x8000_0000);
    assert_eq!(Float32::nan().bits(), 0x7FC0_0000);
    assert_eq!(Float32::infinity().bits(), 0x7F80_0000);
    assert_eq!(Float32::negative_infinity().bits(), 0xFF80_0000);
    assert_eq!(Float32::max_value(false).bits(), 0x7F7F_FFFF);

    assert_eq!(Float64::nan().bits(), 0x7FF8_0000_0000_0000);
    assert_eq!(Float64::infinity().bits(), 0x7FF0_0000_0000_0000);
    assert_eq!(Float64::max_value(true).bits(), 0xFFEF_FFFF_FFFF_FFFF);
}

#[test]
fn smallest_subnormal_decodes_exactly() {
    let tiny = Float32::from_bits(0x0000_0001);
    assert!(tiny.is_subnormal());

    let exact = tiny.to_exact().unwrap();
    assert_eq!(*exact.significand(), BigUint::from(1u32));
    assert_eq!(exact.exponent(), -149);
    assert!(!exact.sign());

    let mut env = Environment::default();
    assert_eq!(Float32::from_exact(&exact, &mut env), tiny);
    assert!(env.flags.is_empty());
}

#[test]
fn exact_value_of_special_operands_is_an_error() {
    for value in [
        Float32::zero(),
        Float32::negative_zero(),
        Float32::infinity(),
        Float32::nan(),
    ] {
        assert_eq!(
            value.to_exact(),
            Err(FloatError::NotFiniteNonZero(value.to_raw()))
        );
    }
}

#[test]
fn signalling_and_quiet_nans() {
    let signalling = Float32::from_bits(0x7FA0_0000);
    let quiet = Float32::from_bits(0x7FC0_0001);
    assert!(signalling.is_nan() && signalling.is_signalling());
    assert!(quiet.is_nan() && !quiet.is_signalling());
    assert_eq!(signalling.classify(), FloatClass::SignalingNan);
    assert_eq!(quiet.classify(), FloatClass::QuietNan);
}

#[test]
fn classify_masks_follow_fclass_bit_order() {
    let cases = [
        (Float64::negative_infinity(), 1 << 0),
        (Float64::from_f64(-1.5), 1 << 1),
        (Float64::from_bits(0x8000_0000_0000_0001), 1 << 2),
        (Float64::negative_zero(), 1 << 3),
        (Float64::zero(), 1 << 4),
        (Float64::from_bits(0x0000_0000_0000_0001), 1 << 5),
        (Float64::from_f64(2.0), 1 << 6),
        (Float64::infinity(), 1 << 7),
        (Float64::from_bits(0x7FF4_0000_0000_0000), 1 << 8),
        (Float64::nan(), 1 << 9),
    ];
    for (value, mask) in cases {
        assert_eq!(value.classify().mask(), mask, "{value:?}");
    }
}

#[test]
fn sign_helpers_are_quiet() {
    let value = Float32::from_f32(-2.5);
    assert_eq!(value.abs().to_f32(), 2.5);
    assert_eq!(value.negate().to_f32(), 2.5);
    assert_eq!(Float32::from_f32(3.0).copy_sign(value).to_f32(), -3.0);
    assert!(Float32::nan().negate().is_sign_minus());
}

proptest! {
    #[test]
    fn binary32_round_trips_through_exact(bits in any::<u32>()) {
        let value = Float32::from_bits(bits);
        prop_assume!(value.is_finite() && !value.is_zero());
        let mut env = Environment::default();
        let back = Float32::from_exact(&value.to_exact().unwrap(), &mut env);
        prop_assert_eq!(back, value);
        prop_assert!(env.flags.is_empty());
    }

    #[test]
    fn binary64_round_trips_through_exact(bits in any::<u64>()) {
        let value = Float64::from_bits(bits);
        prop_assume!(value.is_finite() && !value.is_zero());
        let mut env = Environment::default();
        let back = Float64::from_exact(&value.to_exact().unwrap(), &mut env);
        prop_assert_eq!(back, value);
        prop_assert!(env.flags.is_empty());
    }

    #[test]
    fn classification_is_exclusive(bits in any::<u32>()) {
        let value = Float32::from_bits(bits);
        let hits = [
            value.is_zero(),
            value.is_subnormal(),
            value.is_normal(),
            value.is_infinite(),
            value.is_nan(),
        ]
        .into_iter()
        .filter(|&hit| hit)
        .count();
        prop_assert_eq!(hits, 1);
    }

    #[test]
    fn host_values_survive_conversion(value in any::<f64>()) {
        prop_assume!(!value.is_nan());
        prop_assert_eq!(Float64::from_f64(value).to_f64().to_bits(), value.to_bits());
    }
}
