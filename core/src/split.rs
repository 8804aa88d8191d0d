//! Train/holdout splitter.

use crate::{
    dataset::Dataset,
    error::{UpliftError, UpliftResult},
    rng::{RngSlot, StageRng},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub training: Dataset,
    pub holdout:  Dataset,
}

/// Shuffle row positions with the split stream for `seed`, then take the
/// first `round(train_fraction * n)` as training and the rest as holdout.
///
/// The same seed and input order always give the same partition.
pub fn split(dataset: &Dataset, train_fraction: f64, seed: u64) -> UpliftResult<Split> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(UpliftError::InvalidFraction { name: "train_fraction", value: train_fraction });
    }
    if dataset.is_empty() {
        return Err(UpliftError::EmptyDataset);
    }

    let n = dataset.len();
    let mut positions: Vec<usize> = (0..n).collect();
    let mut rng = StageRng::for_slot(seed, RngSlot::Split);
    log::debug!("split: shuffling {n} rows with the '{}' stream", rng.name);
    rng.shuffle(&mut positions);

    let n_train = ((train_fraction * n as f64).round() as usize).min(n);
    let (train_pos, holdout_pos) = positions.split_at(n_train);

    let result = Split {
        training: dataset.subset(train_pos),
        holdout:  dataset.subset(holdout_pos),
    };

    log::info!(
        "split: seed={seed} training={} holdout={}",
        result.training.len(),
        result.holdout.len()
    );
    Ok(result)
}
