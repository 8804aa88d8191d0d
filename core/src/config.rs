use crate::error::{UpliftError, UpliftResult};
use serde::{Deserialize, Serialize};

/// Which source columns survive feature selection, and which two of
/// them carry the treatment and response roles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureSelection {
    /// Predictor columns, by their source (uppercase) header names.
    pub columns: Vec<String>,
    /// Source column renamed to `treatment_indicator`.
    pub treatment_column: String,
    /// Source column renamed to `response_indicator`.
    pub response_column: String,
}

impl Default for FeatureSelection {
    fn default() -> Self {
        Self {
            columns: [
                "AGE", "GENDER_F", "HH_ND", "HH_NR", "HH_NI",
                "NH_WHITE", "NH_AA", "COMM_PT", "MED_AGE",
                "REG_DAYS", "PR_PELIG", "E_PELIG", "POLITICALC",
                "VG_08", "VG_10", "VG_12", "VPP_12",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            treatment_column: "MESSAGE_A".into(),
            response_column: "MOVED_AD".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Cost of one mailer, in dollars.
    pub unit_cost: f64,
    /// Number of voters the campaign will reach.
    pub campaign_size: u64,
    /// Share of rows assigned to training, in (0, 1).
    pub train_fraction: f64,
    pub seed: u64,
    /// Share of the ranked table targeted, in (0, 1].
    pub decile_fraction: f64,
    pub permutation_resamples: usize,
    pub gains_bins: usize,
    /// Build a per-column data profile while loading.
    pub emit_profile: bool,
    pub features: FeatureSelection,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            unit_cost:             2.0,
            campaign_size:         100_000,
            train_fraction:        0.8,
            seed:                  420,
            decile_fraction:       0.1,
            permutation_resamples: 10_000,
            gains_bins:            10,
            emit_profile:          false,
            features:              FeatureSelection::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file. Missing fields fall back to defaults.
    /// In tests, use PipelineConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: PipelineConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    /// Small, fast configuration for unit and integration tests.
    pub fn default_test() -> Self {
        Self {
            permutation_resamples: 500,
            features: FeatureSelection {
                columns: vec!["AGE".into(), "NH_WHITE".into(), "VG_12".into()],
                treatment_column: "MESSAGE_A".into(),
                response_column: "MOVED_AD".into(),
            },
            ..Self::default()
        }
    }

    /// Check every numeric parameter before any stage runs.
    pub fn validate(&self) -> UpliftResult<()> {
        if !(self.unit_cost.is_finite() && self.unit_cost > 0.0) {
            return Err(UpliftError::InvalidParameter {
                name: "unit_cost",
                reason: format!("must be a positive finite amount, got {}", self.unit_cost),
            });
        }
        if self.campaign_size == 0 {
            return Err(UpliftError::InvalidParameter {
                name: "campaign_size",
                reason: "must be positive".into(),
            });
        }
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(UpliftError::InvalidFraction {
                name: "train_fraction",
                value: self.train_fraction,
            });
        }
        if !(self.decile_fraction > 0.0 && self.decile_fraction <= 1.0) {
            return Err(UpliftError::InvalidFraction {
                name: "decile_fraction",
                value: self.decile_fraction,
            });
        }
        if self.permutation_resamples == 0 {
            return Err(UpliftError::InvalidParameter {
                name: "permutation_resamples",
                reason: "must be at least 1".into(),
            });
        }
        if self.gains_bins == 0 {
            return Err(UpliftError::InvalidParameter {
                name: "gains_bins",
                reason: "must be at least 1".into(),
            });
        }
        if self.features.treatment_column == self.features.response_column {
            return Err(UpliftError::InvalidParameter {
                name: "features",
                reason: "treatment and response must be different columns".into(),
            });
        }
        Ok(())
    }
}
