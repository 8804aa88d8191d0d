use crate::types::Stage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpliftError {
    // ── Input ────────────────────────────────────────────────────────
    #[error("Dataset file not found: {path}")]
    FileNotFound { path: String },

    #[error("Parse error: {context}")]
    Parse { context: String },

    #[error("Column '{column}' not present in input table")]
    MissingColumn { column: String },

    #[error("Column '{column}' row {row}: expected 0 or 1, got {value}")]
    NonBinaryIndicator { column: String, row: usize, value: f64 },

    #[error("Schema mismatch: expected {expected:?}, got {actual:?}")]
    SchemaMismatch { expected: Vec<String>, actual: Vec<String> },

    // ── Parameters ───────────────────────────────────────────────────
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Invalid fraction '{name}': {value} is outside the allowed range")]
    InvalidFraction { name: &'static str, value: f64 },

    #[error("Invalid effect size {effect}: cost per vote is undefined")]
    InvalidEffect { effect: f64 },

    // ── Empty collections ────────────────────────────────────────────
    #[error("Dataset has no rows")]
    EmptyDataset,

    #[error("Holdout has no treated rows to score")]
    EmptyHoldout,

    #[error("Experiment group '{group}' has no rows")]
    EmptyGroup { group: &'static str },

    // ── External services ────────────────────────────────────────────
    #[error("Classifier error: {message}")]
    Classifier { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Context ──────────────────────────────────────────────────────
    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<UpliftError>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse error classes used for reporting and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    InvalidParameter,
    EmptyCollection,
    ExternalService,
}

impl UpliftError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FileNotFound { .. }
            | Self::Parse { .. }
            | Self::MissingColumn { .. }
            | Self::NonBinaryIndicator { .. }
            | Self::SchemaMismatch { .. }
            | Self::Csv(_)
            | Self::Json(_) => ErrorCategory::Input,
            Self::InvalidParameter { .. }
            | Self::InvalidFraction { .. }
            | Self::InvalidEffect { .. } => ErrorCategory::InvalidParameter,
            Self::EmptyDataset | Self::EmptyHoldout | Self::EmptyGroup { .. } => {
                ErrorCategory::EmptyCollection
            }
            Self::Classifier { .. } | Self::Io(_) | Self::Other(_) => {
                ErrorCategory::ExternalService
            }
            Self::Stage { source, .. } => source.category(),
        }
    }

    /// Tag this error with the pipeline stage it surfaced in.
    /// Already-tagged errors keep their original stage.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            Self::Stage { .. } => self,
            other => Self::Stage { stage, source: Box::new(other) },
        }
    }

    /// The innermost error, with any stage wrapper removed.
    pub fn root(&self) -> &UpliftError {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn classifier(message: impl Into<String>) -> Self {
        Self::Classifier { message: message.into() }
    }
}

pub type UpliftResult<T> = Result<T, UpliftError>;
