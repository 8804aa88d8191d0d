//! Experiment analyzer — treated vs control response rates and a
//! two-sided permutation test on their difference.
//!
//! Outcomes are binary, so each resample only needs to count how many
//! responders land in the relabelled treated group.

use crate::{
    dataset::Dataset,
    error::{UpliftError, UpliftResult},
    rng::{RngSlot, StageRng},
};
use serde::{Deserialize, Serialize};

/// Relative slack when comparing a resampled difference to the observed one.
const EXTREME_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperimentSummary {
    pub treated_count:   usize,
    pub control_count:   usize,
    pub treated_rate:    f64,
    pub control_rate:    f64,
    /// treated_rate − control_rate
    pub rate_difference: f64,
    pub p_value:         f64,
    pub resamples:       usize,
}

pub fn analyze_experiment(
    dataset: &Dataset,
    resamples: usize,
    seed: u64,
) -> UpliftResult<ExperimentSummary> {
    let mut treated = Vec::new();
    let mut control = Vec::new();
    for rec in dataset.records() {
        if dataset.treatment(rec) == 1 {
            treated.push(dataset.response(rec));
        } else {
            control.push(dataset.response(rec));
        }
    }

    let mut rng = StageRng::for_slot(seed, RngSlot::Permutation);
    let test = permutation_test(&treated, &control, resamples, &mut rng)?;

    let summary = ExperimentSummary {
        treated_count:   treated.len(),
        control_count:   control.len(),
        treated_rate:    test.treated_rate,
        control_rate:    test.control_rate,
        rate_difference: test.observed_difference,
        p_value:         test.p_value,
        resamples,
    };

    log::info!(
        "analyze: treated={} ({:.4}) control={} ({:.4}) diff={:.4} p={:.4}",
        summary.treated_count,
        summary.treated_rate,
        summary.control_count,
        summary.control_rate,
        summary.rate_difference,
        summary.p_value
    );
    Ok(summary)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PermutationTest {
    pub treated_rate:        f64,
    pub control_rate:        f64,
    pub observed_difference: f64,
    /// Share of resamples whose |difference| is at least the observed one.
    pub p_value:             f64,
}

/// Two-sided permutation test for the difference in mean of two groups
/// of 0/1 outcomes.
pub fn permutation_test(
    treated: &[u8],
    control: &[u8],
    resamples: usize,
    rng: &mut StageRng,
) -> UpliftResult<PermutationTest> {
    if treated.is_empty() {
        return Err(UpliftError::EmptyGroup { group: "treated" });
    }
    if control.is_empty() {
        return Err(UpliftError::EmptyGroup { group: "control" });
    }
    if resamples == 0 {
        return Err(UpliftError::InvalidParameter {
            name: "permutation_resamples",
            reason: "must be at least 1".into(),
        });
    }

    let n_t = treated.len();
    let n_c = control.len();
    let treated_hits: usize = treated.iter().map(|&v| usize::from(v)).sum();
    let control_hits: usize = control.iter().map(|&v| usize::from(v)).sum();
    let total_hits = treated_hits + control_hits;

    let difference = |hits_t: usize| {
        hits_t as f64 / n_t as f64 - (total_hits - hits_t) as f64 / n_c as f64
    };
    let observed = difference(treated_hits);
    let threshold = observed.abs() * (1.0 - EXTREME_TOLERANCE);

    let mut pooled: Vec<u8> = treated.iter().chain(control).copied().collect();
    let mut extreme = 0usize;
    for _ in 0..resamples {
        rng.shuffle(&mut pooled);
        let hits_t: usize = pooled[..n_t].iter().map(|&v| usize::from(v)).sum();
        if difference(hits_t).abs() >= threshold {
            extreme += 1;
        }
    }

    Ok(PermutationTest {
        treated_rate:        treated_hits as f64 / n_t as f64,
        control_rate:        control_hits as f64 / n_c as f64,
        observed_difference: observed,
        p_value:             extreme as f64 / resamples as f64,
    })
}
