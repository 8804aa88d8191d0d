//! Shared primitive types used across the whole pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a record in the source file (0-based, header excluded).
/// Stable across every derived view of the dataset.
pub type RowId = usize;

/// Canonical name of the treatment column after feature selection.
pub const TREATMENT_COLUMN: &str = "treatment_indicator";

/// Canonical name of the response column after feature selection.
pub const RESPONSE_COLUMN: &str = "response_indicator";

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Select,
    Analyze,
    Split,
    Train,
    Score,
    Gains,
    Simulate,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Load     => "load",
            Self::Select   => "select",
            Self::Analyze  => "analyze",
            Self::Split    => "split",
            Self::Train    => "train",
            Self::Score    => "score",
            Self::Gains    => "gains",
            Self::Simulate => "simulate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
