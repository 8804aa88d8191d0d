//! Campaign simulator — business impact of mailing only the top of the
//! uplift ranking instead of a random send.

use crate::{
    cpv::calculate_cpv,
    error::{UpliftError, UpliftResult},
    uplift::{mean_response, RankedUpliftTable},
};
use serde::{Deserialize, Serialize};

/// Outcome of the random-send campaign the targeted one is compared to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Baseline {
    /// Mean response across the whole originally-treated group.
    pub response_rate: f64,
    /// Incremental response of a random send (treated − control rate).
    pub effect:        f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignMetrics {
    pub targeted_rows:          usize,
    pub targeted_response_rate: f64,
    pub baseline_rate:          f64,
    /// targeted_response_rate − baseline_rate
    pub uplift_diff:            f64,
    pub baseline_cpv:           f64,
    /// None when uplift_diff is exactly zero.
    pub targeted_cpv:           Option<f64>,
    pub added_votes:            f64,
    pub cost_savings:           Option<f64>,
    pub cost_decrease_pct:      Option<f64>,
}

/// Number of top-ranked rows a `fraction` of `len` selects.
///
/// The product is nudged down by a few ulps of `len` before rounding up,
/// so 0.1 * 30 selects 3 rows, not 4, at any table size.
pub fn selection_size(len: usize, fraction: f64) -> usize {
    let tolerance = len as f64 * f64::EPSILON * 4.0;
    let raw = (fraction * len as f64 - tolerance).ceil();
    (raw.max(1.0) as usize).min(len)
}

/// Negative lift is reported, not rejected: the metrics then show a
/// negative cost per vote and negative savings.
///
/// The baseline effect must be positive. With a non-positive effect the
/// baseline cost per vote is not a cost, and `cost_decrease_pct` would no
/// longer carry the sign of `baseline_cpv - targeted_cpv`.
pub fn simulate_campaign(
    ranked: &RankedUpliftTable,
    decile_fraction: f64,
    campaign_size: u64,
    unit_cost: f64,
    baseline: &Baseline,
) -> UpliftResult<CampaignMetrics> {
    if !(decile_fraction > 0.0 && decile_fraction <= 1.0) {
        return Err(UpliftError::InvalidFraction { name: "decile_fraction", value: decile_fraction });
    }
    if ranked.is_empty() {
        return Err(UpliftError::EmptyHoldout);
    }

    if !(baseline.effect > 0.0) {
        return Err(UpliftError::InvalidEffect { effect: baseline.effect });
    }
    let baseline_cpv = calculate_cpv(campaign_size, baseline.effect, unit_cost)?;

    let targeted_rows = selection_size(ranked.len(), decile_fraction);
    let targeted_response_rate =
        mean_response(&ranked.rows()[..targeted_rows]).ok_or(UpliftError::EmptyHoldout)?;

    let uplift_diff = targeted_response_rate - baseline.response_rate;
    let added_votes = uplift_diff * campaign_size as f64;

    let targeted_cpv = if uplift_diff == 0.0 {
        log::warn!("simulate: targeted rate equals baseline; cost per vote is undefined");
        None
    } else {
        Some(calculate_cpv(campaign_size, uplift_diff, unit_cost)?)
    };
    let cost_savings = targeted_cpv.map(|t| added_votes * (baseline_cpv - t));
    let cost_decrease_pct = targeted_cpv.map(|t| (baseline_cpv - t) / baseline_cpv);

    if uplift_diff < 0.0 {
        log::warn!("simulate: targeting underperforms the baseline (diff={uplift_diff:.4})");
    }

    let metrics = CampaignMetrics {
        targeted_rows,
        targeted_response_rate,
        baseline_rate: baseline.response_rate,
        uplift_diff,
        baseline_cpv,
        targeted_cpv,
        added_votes,
        cost_savings,
        cost_decrease_pct,
    };

    log::info!(
        "simulate: top {} rows, rate={:.4}, diff={:.4}, added_votes={:.0}",
        metrics.targeted_rows,
        metrics.targeted_response_rate,
        metrics.uplift_diff,
        metrics.added_votes
    );
    Ok(metrics)
}
