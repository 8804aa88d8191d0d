//! Dataset loader — reads the raw survey table from delimited text.
//!
//! Cells are kept as strings here. Numeric parsing happens in the
//! feature selector, which only touches the columns it keeps.

use crate::{
    error::{UpliftError, UpliftResult},
    profile::DataProfile,
};
use std::collections::HashSet;
use std::fs::File;
use std::io::{ErrorKind, Read};

#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows:    Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table:   RawTable,
    pub profile: Option<DataProfile>,
}

/// Read a comma-delimited file with a header row.
pub fn load(path: &str, emit_report: bool) -> UpliftResult<LoadedTable> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(UpliftError::FileNotFound { path: path.to_string() });
        }
        Err(e) => return Err(e.into()),
    };
    log::info!("load: reading {path}");
    load_from_reader(file, emit_report)
}

pub fn load_from_reader<R: Read>(reader: R, emit_report: bool) -> UpliftResult<LoadedTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| UpliftError::Parse { context: format!("header row: {e}") })?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(UpliftError::Parse { context: "missing header row".into() });
    }

    let mut seen = HashSet::new();
    for h in &headers {
        if !seen.insert(h.as_str()) {
            return Err(UpliftError::Parse { context: format!("duplicate column '{h}'") });
        }
        if !is_upper_snake(h) {
            log::warn!("load: header '{h}' does not follow the UPPER_SNAKE convention");
        }
    }

    let mut rows = Vec::new();
    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result
            .map_err(|e| UpliftError::Parse { context: format!("row {}: {e}", row_idx + 1) })?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    let table = RawTable { headers, rows };
    log::info!("load: {} rows x {} columns", table.len(), table.headers.len());

    let profile = emit_report.then(|| {
        let profile = DataProfile::from_table(&table);
        log::info!("load: data profile\n{profile}");
        profile
    });

    Ok(LoadedTable { table, profile })
}

fn is_upper_snake(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
