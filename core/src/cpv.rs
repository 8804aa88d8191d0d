//! Cost-per-vote calculator.

use crate::error::{UpliftError, UpliftResult};

/// Cost of one additional favourable response.
///
/// `(unit_cost * sends) / (sends * effect)`, which reduces to
/// `unit_cost / effect`. A zero (or non-finite) effect has no defined
/// cost and is an error rather than infinity. A negative effect is
/// allowed and yields a negative cost.
pub fn calculate_cpv(sends: u64, effect: f64, unit_cost: f64) -> UpliftResult<f64> {
    if sends == 0 {
        return Err(UpliftError::InvalidParameter {
            name: "sends",
            reason: "must be positive".into(),
        });
    }
    if !(unit_cost.is_finite() && unit_cost > 0.0) {
        return Err(UpliftError::InvalidParameter {
            name: "unit_cost",
            reason: format!("must be a positive finite amount, got {unit_cost}"),
        });
    }
    if effect == 0.0 || !effect.is_finite() {
        return Err(UpliftError::InvalidEffect { effect });
    }

    let total_cost = unit_cost * sends as f64;
    let added_votes = sends as f64 * effect;
    Ok(total_cost / added_votes)
}
