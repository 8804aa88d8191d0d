//! Uplift scorer tests, driven by stub classifiers.

use std::cell::Cell;
use uplift_core::{
    classifier::Classifier,
    dataset::{Dataset, FeatureFrame, VoterRecord},
    error::{UpliftError, UpliftResult},
    types::{RESPONSE_COLUMN, TREATMENT_COLUMN},
    uplift::{score_uplift, PredictionPair, RankedUpliftTable, UpliftRow},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn columns() -> Vec<String> {
    vec!["age".into(), TREATMENT_COLUMN.into(), RESPONSE_COLUMN.into()]
}

/// (age, treatment, response) per row.
fn holdout(rows: &[(f64, u8, u8)]) -> Dataset {
    let records = rows
        .iter()
        .enumerate()
        .map(|(row_id, &(age, t, r))| VoterRecord {
            row_id,
            values: vec![age, f64::from(t), f64::from(r)],
        })
        .collect();
    Dataset::new(columns(), records).expect("valid holdout")
}

/// p = 0.2 + treatment * age / 200, so uplift = age / 200.
struct AgeStub {
    schema: Vec<String>,
    calls:  Cell<usize>,
}

impl AgeStub {
    fn new() -> Self {
        Self { schema: vec!["age".into(), TREATMENT_COLUMN.into()], calls: Cell::new(0) }
    }
}

impl Classifier for AgeStub {
    fn schema(&self) -> &[String] {
        &self.schema
    }

    fn predict(&self, frame: &FeatureFrame) -> UpliftResult<Vec<f64>> {
        self.calls.set(self.calls.get() + 1);
        Ok(frame.rows.iter().map(|r| 0.2 + r[1] * r[0] / 200.0).collect())
    }
}

/// Same probability regardless of treatment: every uplift is zero.
struct FlatStub {
    schema: Vec<String>,
}

impl Classifier for FlatStub {
    fn schema(&self) -> &[String] {
        &self.schema
    }

    fn predict(&self, frame: &FeatureFrame) -> UpliftResult<Vec<f64>> {
        Ok(vec![0.4; frame.len()])
    }
}

struct FailingStub {
    schema: Vec<String>,
}

impl Classifier for FailingStub {
    fn schema(&self) -> &[String] {
        &self.schema
    }

    fn predict(&self, _frame: &FeatureFrame) -> UpliftResult<Vec<f64>> {
        Err(UpliftError::classifier("model server unavailable"))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Only actually-treated rows survive, one output row per treated input.
#[test]
fn output_contains_only_treated_rows() {
    let data = holdout(&[(30.0, 1, 1), (40.0, 0, 0), (50.0, 1, 0), (60.0, 0, 1), (70.0, 1, 1)]);
    let ranked = score_uplift(&AgeStub::new(), &data).unwrap();

    assert_eq!(ranked.len(), 3);
    assert!(ranked.rows().iter().all(|r| r.treatment == 1));

    let mut ids: Vec<_> = ranked.rows().iter().map(|r| r.row_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 2, 4]);
}

#[test]
fn output_is_sorted_descending_by_uplift() {
    let data = holdout(&[(25.0, 1, 0), (80.0, 1, 1), (45.0, 1, 0), (62.0, 1, 1), (33.0, 1, 1)]);
    let ranked = score_uplift(&AgeStub::new(), &data).unwrap();

    for pair in ranked.rows().windows(2) {
        assert!(
            pair[0].uplift() >= pair[1].uplift(),
            "not sorted: {} before {}",
            pair[0].uplift(),
            pair[1].uplift()
        );
    }
    assert_eq!(ranked.rows()[0].row_id, 1, "oldest voter should rank first");
}

/// Both variants are scored; uplift is their difference and responses
/// are joined back from the holdout.
#[test]
fn uplift_is_treated_minus_untreated() {
    let data = holdout(&[(100.0, 1, 1)]);
    let stub = AgeStub::new();
    let ranked = score_uplift(&stub, &data).unwrap();

    let row = &ranked.rows()[0];
    assert!((row.prediction.prob_if_treated - 0.7).abs() < 1e-12);
    assert!((row.prediction.prob_if_untreated - 0.2).abs() < 1e-12);
    assert!((row.uplift() - 0.5).abs() < 1e-12);
    assert_eq!(row.added_votes, 1, "0.7 vs 0.2 crosses the 0.5 threshold");
    assert_eq!(row.response, 1);
    assert_eq!(stub.calls.get(), 2, "expected one treated and one untreated batch");
}

/// Equal uplifts keep holdout order.
#[test]
fn ties_keep_input_order() {
    let data = holdout(&[(30.0, 1, 0), (40.0, 1, 1), (50.0, 0, 0), (60.0, 1, 0)]);
    let stub = FlatStub { schema: vec!["age".into(), TREATMENT_COLUMN.into()] };
    let ranked = score_uplift(&stub, &data).unwrap();

    let ids: Vec<_> = ranked.rows().iter().map(|r| r.row_id).collect();
    assert_eq!(ids, vec![0, 1, 3]);
    assert!(ranked.rows().iter().all(|r| r.uplift() == 0.0 && r.added_votes == 0));
}

#[test]
fn no_treated_rows_is_empty_holdout() {
    let data = holdout(&[(30.0, 0, 1), (40.0, 0, 0)]);
    let err = score_uplift(&AgeStub::new(), &data).unwrap_err();
    assert!(matches!(err, UpliftError::EmptyHoldout), "got {err:?}");
}

#[test]
fn classifier_failure_is_propagated() {
    let data = holdout(&[(30.0, 1, 1)]);
    let stub = FailingStub { schema: vec!["age".into(), TREATMENT_COLUMN.into()] };

    match score_uplift(&stub, &data).unwrap_err() {
        UpliftError::Classifier { message } => assert_eq!(message, "model server unavailable"),
        other => panic!("expected classifier error, got {other:?}"),
    }
}

#[test]
fn schema_mismatch_is_rejected_before_predicting() {
    let data = holdout(&[(30.0, 1, 1)]);
    let stub = AgeStub {
        schema: vec!["age".into(), "income".into(), TREATMENT_COLUMN.into()],
        calls:  Cell::new(0),
    };

    let err = score_uplift(&stub, &data).unwrap_err();
    assert!(matches!(err, UpliftError::SchemaMismatch { .. }), "got {err:?}");
    assert_eq!(stub.calls.get(), 0);
}

#[test]
fn predicted_margin_follows_threshold() {
    assert_eq!(PredictionPair::new(0.6, 0.4).predicted_margin(), 1);
    assert_eq!(PredictionPair::new(0.4, 0.6).predicted_margin(), -1);
    assert_eq!(PredictionPair::new(0.9, 0.7).predicted_margin(), 0);
    assert_eq!(PredictionPair::new(0.3, 0.1).predicted_margin(), 0);
}

#[test]
fn ranked_table_constructor_sorts() {
    let row = |row_id, uplift: f64| UpliftRow {
        row_id,
        prediction: PredictionPair::new(0.5 + uplift / 2.0, 0.5 - uplift / 2.0),
        added_votes: 0,
        response: 1,
        treatment: 1,
    };
    let table = RankedUpliftTable::new(vec![row(0, 0.1), row(1, 0.4), row(2, -0.2), row(3, 0.4)]);
    let ids: Vec<_> = table.rows().iter().map(|r| r.row_id).collect();
    assert_eq!(ids, vec![1, 3, 0, 2]);
}
