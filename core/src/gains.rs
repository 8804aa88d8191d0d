//! Cumulative gains and lift over an uplift ranking.
//!
//! Bins are contiguous slices of the ranked table of (near) equal size;
//! the first `len % bins` bins hold one extra row.

use crate::{
    error::{UpliftError, UpliftResult},
    uplift::RankedUpliftTable,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GainsBin {
    /// 1-based bin number, 1 = highest uplift.
    pub bin:                   usize,
    pub rows:                  usize,
    pub responders:            usize,
    pub response_rate:         f64,
    pub cumulative_rows:       usize,
    pub cumulative_responders: usize,
    /// Share of all responders captured up to and including this bin.
    pub cumulative_gain:       f64,
    /// Bin response rate over the table-wide response rate.
    pub lift:                  f64,
}

pub fn gains_table(ranked: &RankedUpliftTable, bins: usize) -> UpliftResult<Vec<GainsBin>> {
    if bins == 0 {
        return Err(UpliftError::InvalidParameter {
            name: "gains_bins",
            reason: "must be at least 1".into(),
        });
    }
    let overall_rate = ranked.response_rate().ok_or(UpliftError::EmptyHoldout)?;

    let n = ranked.len();
    let bins = bins.min(n);
    let total_responders: usize = ranked.rows().iter().map(|r| usize::from(r.response)).sum();
    let (base, extra) = (n / bins, n % bins);

    let mut table = Vec::with_capacity(bins);
    let mut start = 0;
    let mut cumulative_responders = 0;

    for bin in 0..bins {
        let size = base + usize::from(bin < extra);
        let slice = &ranked.rows()[start..start + size];
        let responders: usize = slice.iter().map(|r| usize::from(r.response)).sum();
        let response_rate = responders as f64 / size as f64;

        start += size;
        cumulative_responders += responders;

        table.push(GainsBin {
            bin: bin + 1,
            rows: size,
            responders,
            response_rate,
            cumulative_rows: start,
            cumulative_responders,
            cumulative_gain: if total_responders > 0 {
                cumulative_responders as f64 / total_responders as f64
            } else {
                0.0
            },
            lift: if overall_rate > 0.0 { response_rate / overall_rate } else { 0.0 },
        });
    }

    log::debug!("gains: {bins} bins over {n} ranked rows");
    Ok(table)
}
