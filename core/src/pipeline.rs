//! The uplift pipeline — one linear batch run.
//!
//! EXECUTION ORDER (fixed):
//!   1. Load      raw table (+ optional data profile)
//!   2. Select    feature columns, indicator roles, lowercase names
//!   3. Analyze   treated vs control rates, permutation p-value
//!   4. Split     training / holdout, seeded
//!   5. Train     classifier on training (external)
//!   6. Score     uplift per treated holdout row, ranked
//!   7. Gains     cumulative gains / lift per rank bin
//!   8. Simulate  top-fraction campaign vs random-send baseline
//!
//! RULES:
//!   - Every stage takes immutable inputs and returns a new value.
//!   - Any error ends the run, tagged with the stage that raised it.
//!   - Nothing is retried.

use crate::{
    campaign::{simulate_campaign, Baseline, CampaignMetrics},
    classifier::ClassifierTrainer,
    config::PipelineConfig,
    error::UpliftResult,
    experiment::{analyze_experiment, ExperimentSummary},
    features::select_features,
    gains::{gains_table, GainsBin},
    loader::{load, LoadedTable},
    profile::DataProfile,
    split::split,
    types::Stage,
    uplift::score_uplift,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub profile:          Option<DataProfile>,
    pub selected_rows:    usize,
    pub selected_columns: Vec<String>,
    pub experiment:       ExperimentSummary,
    pub training_rows:    usize,
    pub holdout_rows:     usize,
    pub ranked_rows:      usize,
    pub baseline:         Baseline,
    pub gains:            Vec<GainsBin>,
    pub campaign:         CampaignMetrics,
}

pub struct UpliftPipeline {
    config: PipelineConfig,
}

impl UpliftPipeline {
    /// Validates the configuration up front so a bad parameter never
    /// reaches the middle of a run.
    pub fn new(config: PipelineConfig) -> UpliftResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the dataset at `path`, then run every later stage.
    pub fn run_path<T: ClassifierTrainer>(&self, path: &str, trainer: &T) -> UpliftResult<PipelineReport> {
        let loaded = load(path, self.config.emit_profile).map_err(|e| e.in_stage(Stage::Load))?;
        self.run(&loaded, trainer)
    }

    pub fn run<T: ClassifierTrainer>(&self, loaded: &LoadedTable, trainer: &T) -> UpliftResult<PipelineReport> {
        let cfg = &self.config;

        let dataset = select_features(&loaded.table, &cfg.features)
            .map_err(|e| e.in_stage(Stage::Select))?;

        let experiment = analyze_experiment(&dataset, cfg.permutation_resamples, cfg.seed)
            .map_err(|e| e.in_stage(Stage::Analyze))?;

        let parts = split(&dataset, cfg.train_fraction, cfg.seed)
            .map_err(|e| e.in_stage(Stage::Split))?;

        let model = trainer
            .train(&parts.training)
            .map_err(|e| e.in_stage(Stage::Train))?;

        let ranked = score_uplift(&model, &parts.holdout)
            .map_err(|e| e.in_stage(Stage::Score))?;

        let gains = gains_table(&ranked, cfg.gains_bins)
            .map_err(|e| e.in_stage(Stage::Gains))?;

        let baseline = Baseline {
            response_rate: experiment.treated_rate,
            effect:        experiment.rate_difference,
        };
        let campaign = simulate_campaign(
            &ranked,
            cfg.decile_fraction,
            cfg.campaign_size,
            cfg.unit_cost,
            &baseline,
        )
        .map_err(|e| e.in_stage(Stage::Simulate))?;

        Ok(PipelineReport {
            profile:          loaded.profile.clone(),
            selected_rows:    dataset.len(),
            selected_columns: dataset.columns().to_vec(),
            experiment,
            training_rows:    parts.training.len(),
            holdout_rows:     parts.holdout.len(),
            ranked_rows:      ranked.len(),
            baseline,
            gains,
            campaign,
        })
    }
}
