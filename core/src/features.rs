//! Feature selector — narrows the raw table to the configured columns,
//! assigns the treatment and response roles, and lowercases names.
//!
//! The raw table is never modified; the result is a new Dataset.

use crate::{
    config::FeatureSelection,
    dataset::{Dataset, VoterRecord},
    error::{UpliftError, UpliftResult},
    loader::RawTable,
    types::{RESPONSE_COLUMN, TREATMENT_COLUMN},
};
use std::collections::HashSet;

pub fn select_features(raw: &RawTable, selection: &FeatureSelection) -> UpliftResult<Dataset> {
    // (source column, output name)
    let mut plan: Vec<(usize, String)> = Vec::with_capacity(selection.columns.len() + 2);
    let mut output_names = HashSet::new();

    let roles = [
        (&selection.treatment_column, TREATMENT_COLUMN),
        (&selection.response_column, RESPONSE_COLUMN),
    ];

    for source in &selection.columns {
        if roles.iter().any(|(role_source, _)| *role_source == source) {
            return Err(UpliftError::InvalidParameter {
                name: "features",
                reason: format!("'{source}' is listed both as a feature and as an indicator"),
            });
        }
        let idx = source_index(raw, source)?;
        let name = normalize_column_name(source);
        if roles.iter().any(|(_, canonical)| *canonical == name) {
            return Err(UpliftError::InvalidParameter {
                name: "features",
                reason: format!("'{source}' would be renamed to the reserved column '{name}'"),
            });
        }
        if !output_names.insert(name.clone()) {
            return Err(UpliftError::InvalidParameter {
                name: "features",
                reason: format!("column '{name}' selected twice"),
            });
        }
        plan.push((idx, name));
    }
    for (source, canonical) in roles {
        plan.push((source_index(raw, source)?, canonical.to_string()));
    }

    let records = raw
        .rows
        .iter()
        .enumerate()
        .map(|(row_id, row)| {
            let values = plan
                .iter()
                .map(|(idx, name)| parse_cell(row.get(*idx).map(String::as_str), row_id, name))
                .collect::<UpliftResult<Vec<f64>>>()?;
            Ok(VoterRecord { row_id, values })
        })
        .collect::<UpliftResult<Vec<_>>>()?;

    let columns = plan.into_iter().map(|(_, name)| name).collect();
    let dataset = Dataset::new(columns, records)?;

    log::info!(
        "select: kept {} of {} columns over {} rows",
        dataset.columns().len(),
        raw.headers.len(),
        dataset.len()
    );
    Ok(dataset)
}

/// `MED_AGE` → `med_age`, `Reg Days` → `reg_days`.
pub fn normalize_column_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' | '.' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

fn source_index(raw: &RawTable, source: &str) -> UpliftResult<usize> {
    raw.column_index(source)
        .ok_or_else(|| UpliftError::MissingColumn { column: source.to_string() })
}

fn parse_cell(cell: Option<&str>, row_id: usize, column: &str) -> UpliftResult<f64> {
    let text = cell.unwrap_or("").trim();
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| UpliftError::Parse {
            context: format!("row {row_id} column '{column}': '{text}' is not a number"),
        })
}
