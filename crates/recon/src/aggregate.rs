use std::collections::HashSet;

use tracing::info;

use crate::error::{ReconError, YearFailure};
use crate::model::{CanonicalRecord, CanonicalTable, Indicator, SurveyYear, YearOutcomes, YearTable};

/// Concatenate every year's cohort into the canonical table, 2015 first.
///
/// Refuses partial output: a year that failed or never ran is reported in
/// [`ReconError::IncompleteDataset`] together with every other failure.
pub fn assemble(mut outcomes: YearOutcomes) -> Result<CanonicalTable, ReconError> {
    let mut failures = Vec::new();
    let mut tables: Vec<YearTable> = Vec::with_capacity(SurveyYear::ALL.len());

    for year in SurveyYear::ALL {
        match outcomes.remove(&year) {
            Some(Ok(table)) => tables.push(table),
            Some(Err(e)) => failures.push(YearFailure { year, message: e.to_string() }),
            None => failures.push(YearFailure {
                year,
                message: "not reconciled".into(),
            }),
        }
    }

    if !failures.is_empty() {
        return Err(ReconError::IncompleteDataset { failures });
    }

    let mut seen: HashSet<(SurveyYear, String)> = HashSet::new();
    let mut records: Vec<CanonicalRecord> = Vec::with_capacity(tables.iter().map(|t| t.records.len()).sum());
    for table in tables {
        for record in table.records {
            if !seen.insert((record.year, record.country.clone())) {
                return Err(ReconError::DuplicateCountry {
                    year: record.year,
                    country: record.country,
                });
            }
            records.push(record);
        }
    }

    info!(records = records.len(), "assembled canonical table");
    Ok(CanonicalTable { records })
}

/// Round half away from zero to `precision` decimals.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// Display copy of the table: every indicator rounded, ranks untouched.
pub fn round_for_display(table: &CanonicalTable, precision: u32) -> CanonicalTable {
    let records = table
        .records
        .iter()
        .cloned()
        .map(|mut r| {
            for indicator in Indicator::ALL {
                let v = r.indicator_mut(indicator);
                *v = round_to(*v, precision);
            }
            r
        })
        .collect();
    CanonicalTable { records }
}
