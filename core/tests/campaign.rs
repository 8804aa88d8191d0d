//! Campaign simulator and gains table tests.

use uplift_core::{
    campaign::{selection_size, simulate_campaign, Baseline},
    cpv::calculate_cpv,
    error::UpliftError,
    gains::gains_table,
    uplift::{PredictionPair, RankedUpliftTable, UpliftRow},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Rows are given already in rank order; uplift strictly decreases.
fn ranked(responses: &[u8]) -> RankedUpliftTable {
    let n = responses.len();
    let rows = responses
        .iter()
        .enumerate()
        .map(|(i, &response)| {
            let uplift = (n - i) as f64 / (n + 1) as f64;
            UpliftRow {
                row_id: i,
                prediction: PredictionPair::new(uplift, 0.0),
                added_votes: 0,
                response,
                treatment: 1,
            }
        })
        .collect();
    RankedUpliftTable::new(rows)
}

/// `ranked` table whose top `top` rows of `n` all responded.
fn ranked_with_rate(n: usize, top: usize) -> RankedUpliftTable {
    let responses: Vec<u8> = (0..n).map(|i| u8::from(i < top)).collect();
    ranked(&responses)
}

fn baseline(rate: f64) -> Baseline {
    Baseline { response_rate: rate, effect: 0.058 }
}

fn baseline_with_effect(rate: f64, effect: f64) -> Baseline {
    Baseline { response_rate: rate, effect }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn top_half_of_four_rows_selects_two() {
    let table = ranked(&[1, 0, 1, 0]);
    let metrics = simulate_campaign(&table, 0.5, 100_000, 2.0, &baseline(0.34)).unwrap();

    assert_eq!(metrics.targeted_rows, 2);
    assert!((metrics.targeted_response_rate - 0.5).abs() < 1e-12);
}

/// baseline 0.34, targeted 0.66 → diff 0.32, 32 000 votes, $6.25 per vote.
#[test]
fn reference_campaign_figures() {
    // 66 responders in the top 10 % of 1000 rows → rate 0.66
    let responses: Vec<u8> = (0..1000).map(|i| u8::from(i < 66)).collect();
    let table = ranked(&responses);

    let metrics = simulate_campaign(&table, 0.1, 100_000, 2.0, &baseline(0.34)).unwrap();

    assert_eq!(metrics.targeted_rows, 100);
    assert!((metrics.targeted_response_rate - 0.66).abs() < 1e-12);
    assert!((metrics.uplift_diff - 0.32).abs() < 1e-9);
    assert!((metrics.added_votes - 32_000.0).abs() < 1e-6);

    let targeted_cpv = metrics.targeted_cpv.expect("defined cpv");
    assert!((targeted_cpv - 6.25).abs() < 1e-9, "targeted cpv={targeted_cpv}");

    let baseline_cpv = calculate_cpv(100_000, 0.058, 2.0).unwrap();
    assert!((metrics.baseline_cpv - baseline_cpv).abs() < 1e-12);

    let pct = metrics.cost_decrease_pct.unwrap();
    assert!(((baseline_cpv - 6.25) / baseline_cpv - pct).abs() < 1e-9);

    let savings = metrics.cost_savings.unwrap();
    assert!((savings - 32_000.0 * (baseline_cpv - 6.25)).abs() < 1e-3);
}

/// Sign of cost_decrease_pct follows sign of (baseline_cpv − targeted_cpv).
#[test]
fn cost_decrease_sign_matches_cpv_gap() {
    for effect in [0.001, 0.058, 0.4] {
        for top in [5usize, 20, 35, 50, 80, 100] {
            for rate in [0.05, 0.2, 0.3, 0.6] {
                let table = ranked_with_rate(100, top);
                let metrics =
                    simulate_campaign(&table, 0.5, 100_000, 2.0, &baseline_with_effect(rate, effect))
                        .unwrap();
                let (Some(t_cpv), Some(pct)) = (metrics.targeted_cpv, metrics.cost_decrease_pct)
                else {
                    continue;
                };
                let gap = metrics.baseline_cpv - t_cpv;
                assert_eq!(
                    gap > 0.0,
                    pct > 0.0,
                    "effect={effect} top={top} rate={rate}: gap={gap} pct={pct}"
                );
            }
        }
    }
}

/// Negative lift is a reportable result, not an error.
#[test]
fn negative_lift_still_reports() {
    let table = ranked(&[0, 0, 1, 1]);
    let metrics = simulate_campaign(&table, 0.5, 100_000, 2.0, &baseline(0.34)).unwrap();

    assert!(metrics.uplift_diff < 0.0);
    assert!(metrics.added_votes < 0.0);
    assert!(metrics.targeted_cpv.unwrap() < 0.0);
    assert!(metrics.cost_savings.unwrap() < 0.0);
}

/// Zero lift: cost per vote is undefined but the run still reports.
#[test]
fn zero_lift_leaves_cpv_undefined() {
    let table = ranked(&[1, 0, 1, 0]);
    let metrics = simulate_campaign(&table, 0.5, 100_000, 2.0, &baseline(0.5)).unwrap();

    assert_eq!(metrics.uplift_diff, 0.0);
    assert_eq!(metrics.added_votes, 0.0);
    assert!(metrics.targeted_cpv.is_none());
    assert!(metrics.cost_savings.is_none());
    assert!(metrics.cost_decrease_pct.is_none());
}

/// A random send that lost votes has no meaningful cost per vote to beat.
#[test]
fn non_positive_baseline_effect_is_rejected() {
    let table = ranked(&[1, 1, 0, 0]);
    for effect in [-0.02, -0.5, f64::NAN] {
        let result = simulate_campaign(&table, 0.5, 100_000, 2.0, &baseline_with_effect(0.34, effect));
        assert!(
            matches!(result, Err(UpliftError::InvalidEffect { .. })),
            "effect={effect}: got {result:?}"
        );
    }
}

#[test]
fn selection_rounds_up_and_is_at_least_one() {
    assert_eq!(selection_size(4, 0.5), 2);
    assert_eq!(selection_size(30, 0.1), 3);
    assert_eq!(selection_size(31, 0.1), 4);
    assert_eq!(selection_size(5, 0.01), 1);
    assert_eq!(selection_size(7, 1.0), 7);
}

#[test]
fn selection_stays_exact_on_large_tables() {
    for len in [30usize, 3_000, 3_000_000, 30_000_000_000, 1_000_000_000_000_000] {
        assert_eq!(selection_size(len, 0.1), len / 10, "len={len}");
        assert_eq!(selection_size(len, 0.5), len / 2, "len={len}");
    }
    assert_eq!(selection_size(30_000_000_001, 0.1), 3_000_000_001);
}

#[test]
fn invalid_inputs_fail() {
    let table = ranked(&[1, 0]);
    for bad in [0.0, -0.1, 1.1] {
        assert!(matches!(
            simulate_campaign(&table, bad, 100_000, 2.0, &baseline(0.34)),
            Err(UpliftError::InvalidFraction { .. })
        ));
    }

    let empty = RankedUpliftTable::new(Vec::new());
    assert!(matches!(
        simulate_campaign(&empty, 0.1, 100_000, 2.0, &baseline(0.34)),
        Err(UpliftError::EmptyHoldout)
    ));

    let zero_effect = Baseline { response_rate: 0.34, effect: 0.0 };
    assert!(matches!(
        simulate_campaign(&table, 0.5, 100_000, 2.0, &zero_effect),
        Err(UpliftError::InvalidEffect { .. })
    ));
}

#[test]
fn gains_capture_all_responders() {
    let table = ranked(&[1, 1, 1, 0, 1, 0, 0, 0, 0, 0]);
    let gains = gains_table(&table, 5).unwrap();

    assert_eq!(gains.len(), 5);
    assert_eq!(gains.iter().map(|g| g.rows).sum::<usize>(), 10);

    assert_eq!(gains[0].responders, 2);
    assert!((gains[0].cumulative_gain - 0.5).abs() < 1e-12);
    assert!((gains[0].lift - 2.5).abs() < 1e-12, "rate 1.0 over overall 0.4");

    let last = gains.last().unwrap();
    assert_eq!(last.cumulative_rows, 10);
    assert_eq!(last.cumulative_responders, 4);
    assert!((last.cumulative_gain - 1.0).abs() < 1e-12);
}

#[test]
fn gains_spread_remainder_over_leading_bins() {
    let table = ranked_with_rate(7, 3);
    let gains = gains_table(&table, 3).unwrap();
    let sizes: Vec<_> = gains.iter().map(|g| g.rows).collect();
    assert_eq!(sizes, vec![3, 2, 2]);

    // More bins than rows collapses to one row per bin.
    assert_eq!(gains_table(&table, 50).unwrap().len(), 7);
}
