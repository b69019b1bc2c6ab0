use crate::model::{ReconWarning, RunSummary, YearSummary, YearTable};

/// Per-year counts and warnings for the run report.
pub fn compute_summary<'a>(tables: impl IntoIterator<Item = &'a YearTable>) -> RunSummary {
    let mut years = Vec::new();
    let mut warnings = Vec::new();
    let mut total_records = 0;

    for table in tables {
        let degenerate_fields = table
            .warnings
            .iter()
            .map(|w| match w {
                ReconWarning::DegenerateCohort { field, .. } => *field,
            })
            .collect();

        total_records += table.records.len();
        years.push(YearSummary {
            year: table.year,
            records: table.records.len(),
            dropped: table.dropped.len(),
            degenerate_fields,
        });
        warnings.extend(table.warnings.iter().cloned());
    }

    RunSummary {
        total_records,
        years,
        warnings,
    }
}
