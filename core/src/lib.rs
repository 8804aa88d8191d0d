//! Uplift modeling for a voter-persuasion mail campaign: feature
//! selection, experiment analysis, seeded train/holdout split, uplift
//! scoring against an external classifier, and cost-per-vote metrics.

pub mod campaign;
pub mod classifier;
pub mod config;
pub mod cpv;
pub mod dataset;
pub mod error;
pub mod experiment;
pub mod features;
pub mod gains;
pub mod loader;
pub mod pipeline;
pub mod profile;
pub mod rng;
pub mod service;
pub mod split;
pub mod types;
pub mod uplift;
