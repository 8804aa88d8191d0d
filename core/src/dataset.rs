//! In-process tabular data: named numeric columns over ordered records.
//!
//! A Dataset is immutable once built. Every derived view (subset,
//! feature frame, treatment override) is a new value.

use crate::{
    error::{UpliftError, UpliftResult},
    types::{RowId, RESPONSE_COLUMN, TREATMENT_COLUMN},
};

#[derive(Debug, Clone, PartialEq)]
pub struct VoterRecord {
    pub row_id: RowId,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns:       Vec<String>,
    treatment_idx: usize,
    response_idx:  usize,
    records:       Vec<VoterRecord>,
}

/// Predictor matrix handed to a classifier: every dataset column except
/// the response, in dataset order. The treatment indicator is included.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    pub columns: Vec<String>,
    pub rows:    Vec<Vec<f64>>,
}

impl FeatureFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Dataset {
    /// Build a dataset, checking record widths and that both indicator
    /// columns exist and hold only 0 or 1.
    pub fn new(columns: Vec<String>, records: Vec<VoterRecord>) -> UpliftResult<Self> {
        let find = |name: &str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| UpliftError::MissingColumn { column: name.to_string() })
        };
        let treatment_idx = find(TREATMENT_COLUMN)?;
        let response_idx = find(RESPONSE_COLUMN)?;

        for rec in &records {
            if rec.values.len() != columns.len() {
                return Err(UpliftError::Parse {
                    context: format!(
                        "row {}: {} values for {} columns",
                        rec.row_id,
                        rec.values.len(),
                        columns.len()
                    ),
                });
            }
            for (idx, name) in [(treatment_idx, TREATMENT_COLUMN), (response_idx, RESPONSE_COLUMN)] {
                let value = rec.values[idx];
                if value != 0.0 && value != 1.0 {
                    return Err(UpliftError::NonBinaryIndicator {
                        column: name.to_string(),
                        row: rec.row_id,
                        value,
                    });
                }
            }
        }

        Ok(Self { columns, treatment_idx, response_idx, records })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[VoterRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn row_ids(&self) -> Vec<RowId> {
        self.records.iter().map(|r| r.row_id).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn value(&self, record: &VoterRecord, column: &str) -> Option<f64> {
        self.column_index(column).map(|idx| record.values[idx])
    }

    pub fn treatment(&self, record: &VoterRecord) -> u8 {
        u8::from(record.values[self.treatment_idx] == 1.0)
    }

    pub fn response(&self, record: &VoterRecord) -> u8 {
        u8::from(record.values[self.response_idx] == 1.0)
    }

    /// New dataset holding the records at the given positions, in that order.
    pub fn subset(&self, positions: &[usize]) -> Dataset {
        Dataset {
            columns:       self.columns.clone(),
            treatment_idx: self.treatment_idx,
            response_idx:  self.response_idx,
            records:       positions.iter().map(|&p| self.records[p].clone()).collect(),
        }
    }

    pub fn feature_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != self.response_idx)
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub fn features(&self) -> FeatureFrame {
        self.build_frame(None)
    }

    /// Feature frame with the treatment indicator forced to `treatment`
    /// on every row. All other values are unchanged.
    pub fn features_with_treatment(&self, treatment: u8) -> FeatureFrame {
        self.build_frame(Some(f64::from(treatment)))
    }

    fn build_frame(&self, treatment_override: Option<f64>) -> FeatureFrame {
        let rows = self
            .records
            .iter()
            .map(|rec| {
                rec.values
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| *idx != self.response_idx)
                    .map(|(idx, &v)| match treatment_override {
                        Some(t) if idx == self.treatment_idx => t,
                        _ => v,
                    })
                    .collect()
            })
            .collect();

        FeatureFrame { columns: self.feature_columns(), rows }
    }
}
