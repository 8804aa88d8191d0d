//! Per-column data profile of a raw table.

use crate::loader::RawTable;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ColumnProfile {
    pub name:          String,
    pub numeric_count: usize,
    pub missing_count: usize,
    /// Cells that are present but do not parse as numbers.
    pub text_count:    usize,
    pub mean:          Option<f64>,
    pub min:           Option<f64>,
    pub max:           Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DataProfile {
    pub rows:    usize,
    pub columns: Vec<ColumnProfile>,
}

impl DataProfile {
    pub fn from_table(table: &RawTable) -> Self {
        let columns = table
            .headers
            .iter()
            .enumerate()
            .map(|(idx, name)| profile_column(name, table.rows.iter().map(|r| r.get(idx))))
            .collect();

        Self { rows: table.len(), columns }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }
}

fn profile_column<'a>(
    name: &str,
    cells: impl Iterator<Item = Option<&'a String>>,
) -> ColumnProfile {
    let mut numeric_count = 0;
    let mut missing_count = 0;
    let mut text_count = 0;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for cell in cells {
        match cell.map(|c| c.trim()) {
            None | Some("") | Some("NA") => missing_count += 1,
            Some(text) => match text.parse::<f64>() {
                Ok(v) if v.is_finite() => {
                    numeric_count += 1;
                    sum += v;
                    min = min.min(v);
                    max = max.max(v);
                }
                _ => text_count += 1,
            },
        }
    }

    let has_values = numeric_count > 0;
    ColumnProfile {
        name: name.to_string(),
        numeric_count,
        missing_count,
        text_count,
        mean: has_values.then(|| sum / numeric_count as f64),
        min:  has_values.then_some(min),
        max:  has_values.then_some(max),
    }
}

impl fmt::Display for DataProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  rows: {}", self.rows)?;
        for c in &self.columns {
            match (c.mean, c.min, c.max) {
                (Some(mean), Some(min), Some(max)) => writeln!(
                    f,
                    "  {:<16} n={:<7} missing={:<5} mean={mean:.3} min={min:.3} max={max:.3}",
                    c.name, c.numeric_count, c.missing_count
                )?,
                _ => writeln!(
                    f,
                    "  {:<16} n={:<7} missing={:<5} text={}",
                    c.name, c.numeric_count, c.missing_count, c.text_count
                )?,
            }
        }
        Ok(())
    }
}
