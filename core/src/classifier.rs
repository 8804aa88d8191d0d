//! Classifier seam.
//!
//! The uplift pipeline never trains or tunes a model itself. Any binary
//! classifier that returns calibrated positive-class probabilities over
//! the training-time feature schema can sit behind these traits.

use crate::{
    dataset::{Dataset, FeatureFrame},
    error::{UpliftError, UpliftResult},
};

/// A trained binary classifier.
pub trait Classifier {
    /// Feature columns the model was trained on, in order.
    fn schema(&self) -> &[String];

    /// Probability of a positive response for each row of `frame`.
    fn predict(&self, frame: &FeatureFrame) -> UpliftResult<Vec<f64>>;
}

/// Turns a training subset into a Classifier.
pub trait ClassifierTrainer {
    type Model: Classifier;

    fn train(&self, training: &Dataset) -> UpliftResult<Self::Model>;
}

/// The frame must carry exactly the training-time columns, in order.
pub fn check_schema(expected: &[String], frame: &FeatureFrame) -> UpliftResult<()> {
    if expected != frame.columns.as_slice() {
        return Err(UpliftError::SchemaMismatch {
            expected: expected.to_vec(),
            actual:   frame.columns.clone(),
        });
    }
    Ok(())
}

/// Reject classifier output that is the wrong length or not a probability.
pub fn validate_probabilities(probabilities: Vec<f64>, expected_len: usize) -> UpliftResult<Vec<f64>> {
    if probabilities.len() != expected_len {
        return Err(UpliftError::classifier(format!(
            "returned {} probabilities for {expected_len} rows",
            probabilities.len()
        )));
    }
    if let Some((row, p)) = probabilities
        .iter()
        .enumerate()
        .find(|(_, p)| !(0.0..=1.0).contains(*p))
    {
        return Err(UpliftError::classifier(format!(
            "row {row}: {p} is not a probability"
        )));
    }
    Ok(probabilities)
}
