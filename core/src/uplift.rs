//! Uplift scorer — ranks holdout voters by estimated treatment effect.
//!
//! For each holdout row the classifier is asked twice: once with the
//! treatment indicator forced to 1 and once forced to 0. The difference
//! is the row's uplift.
//!
//! The classifier was fitted to predict response, not to estimate a
//! causal effect. Uplift here is the difference of two correlational
//! predictions and is an approximation of the true treatment effect.
//!
//! Only rows that were actually treated are kept: their observed
//! response is the outcome under treatment, which is what the decile
//! evaluation needs.

use crate::{
    classifier::{check_schema, validate_probabilities, Classifier},
    dataset::Dataset,
    error::{UpliftError, UpliftResult},
    types::RowId,
};
use serde::{Deserialize, Serialize};

/// Probability at or above which a prediction counts as a positive response.
pub const DECISION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PredictionPair {
    pub prob_if_treated:   f64,
    pub prob_if_untreated: f64,
    pub uplift:            f64,
}

impl PredictionPair {
    pub fn new(prob_if_treated: f64, prob_if_untreated: f64) -> Self {
        Self {
            prob_if_treated,
            prob_if_untreated,
            uplift: prob_if_treated - prob_if_untreated,
        }
    }

    /// Change in the binarised prediction caused by treatment: -1, 0 or 1.
    pub fn predicted_margin(&self) -> i8 {
        let treated = i8::from(self.prob_if_treated >= DECISION_THRESHOLD);
        let untreated = i8::from(self.prob_if_untreated >= DECISION_THRESHOLD);
        treated - untreated
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpliftRow {
    pub row_id:      RowId,
    pub prediction:  PredictionPair,
    /// Predicted-class margin between the two variants.
    pub added_votes: i8,
    pub response:    u8,
    pub treatment:   u8,
}

impl UpliftRow {
    pub fn uplift(&self) -> f64 {
        self.prediction.uplift
    }
}

/// Treated holdout rows, sorted by uplift, highest first.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedUpliftTable {
    rows: Vec<UpliftRow>,
}

impl RankedUpliftTable {
    /// Sort rows descending by uplift. The sort is stable, so ties keep
    /// their input order.
    pub fn new(mut rows: Vec<UpliftRow>) -> Self {
        rows.sort_by(|a, b| b.uplift().total_cmp(&a.uplift()));
        Self { rows }
    }

    pub fn rows(&self) -> &[UpliftRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Mean observed response across the whole table.
    pub fn response_rate(&self) -> Option<f64> {
        mean_response(&self.rows)
    }
}

pub(crate) fn mean_response(rows: &[UpliftRow]) -> Option<f64> {
    if rows.is_empty() {
        return None;
    }
    let hits: usize = rows.iter().map(|r| usize::from(r.response)).sum();
    Some(hits as f64 / rows.len() as f64)
}

pub fn score_uplift<C>(classifier: &C, holdout: &Dataset) -> UpliftResult<RankedUpliftTable>
where
    C: Classifier + ?Sized,
{
    if holdout.is_empty() {
        return Err(UpliftError::EmptyHoldout);
    }

    let treated_frame = holdout.features_with_treatment(1);
    let untreated_frame = holdout.features_with_treatment(0);
    check_schema(classifier.schema(), &treated_frame)?;

    let prob_if_treated =
        validate_probabilities(classifier.predict(&treated_frame)?, holdout.len())?;
    let prob_if_untreated =
        validate_probabilities(classifier.predict(&untreated_frame)?, holdout.len())?;

    let rows: Vec<UpliftRow> = holdout
        .records()
        .iter()
        .zip(prob_if_treated.iter().zip(&prob_if_untreated))
        .filter(|(rec, _)| holdout.treatment(rec) == 1)
        .map(|(rec, (&p_t, &p_u))| {
            let prediction = PredictionPair::new(p_t, p_u);
            UpliftRow {
                row_id:      rec.row_id,
                added_votes: prediction.predicted_margin(),
                prediction,
                response:    holdout.response(rec),
                treatment:   holdout.treatment(rec),
            }
        })
        .collect();

    if rows.is_empty() {
        return Err(UpliftError::EmptyHoldout);
    }

    let table = RankedUpliftTable::new(rows);
    log::info!(
        "score: {} holdout rows, {} treated rows ranked",
        holdout.len(),
        table.len()
    );
    if let (Some(top), Some(bottom)) = (table.rows().first(), table.rows().last()) {
        log::debug!("score: uplift range [{:.4}, {:.4}]", bottom.uplift(), top.uplift());
    }
    Ok(table)
}
