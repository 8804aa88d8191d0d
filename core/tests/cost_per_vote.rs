//! Cost-per-vote calculator tests.

use uplift_core::{cpv::calculate_cpv, error::UpliftError};

/// 100k mailers at $2 with a 5.8 point lift cost about $34.48 per vote.
#[test]
fn cpv_matches_reference_figure() {
    let cpv = calculate_cpv(100_000, 0.058, 2.0).unwrap();
    assert!((cpv - 34.48).abs() < 0.01, "cpv={cpv:.4}, expected ≈ 34.48");
}

/// The send volume cancels out: cpv == unit_cost / effect for any sends.
#[test]
fn cpv_is_independent_of_sends() {
    for sends in [1u64, 7, 1_000, 100_000, 9_999_999] {
        for effect in [0.01, 0.058, 0.32, -0.05] {
            let cpv = calculate_cpv(sends, effect, 2.0).unwrap();
            let expected = 2.0 / effect;
            assert!(
                (cpv - expected).abs() < 1e-9 * expected.abs(),
                "sends={sends} effect={effect}: cpv={cpv}, expected={expected}"
            );
        }
    }
}

/// A zero effect is an error, never infinity or NaN.
#[test]
fn zero_effect_fails() {
    let err = calculate_cpv(100_000, 0.0, 2.0).unwrap_err();
    assert!(matches!(err, UpliftError::InvalidEffect { .. }), "got {err:?}");

    let err = calculate_cpv(100_000, f64::NAN, 2.0).unwrap_err();
    assert!(matches!(err, UpliftError::InvalidEffect { .. }), "got {err:?}");
}

#[test]
fn zero_sends_and_bad_cost_fail() {
    assert!(matches!(
        calculate_cpv(0, 0.05, 2.0),
        Err(UpliftError::InvalidParameter { name: "sends", .. })
    ));
    assert!(matches!(
        calculate_cpv(10, 0.05, 0.0),
        Err(UpliftError::InvalidParameter { name: "unit_cost", .. })
    ));
    assert!(matches!(
        calculate_cpv(10, 0.05, -1.0),
        Err(UpliftError::InvalidParameter { name: "unit_cost", .. })
    ));
}
