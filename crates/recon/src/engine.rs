use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::aggregate::{assemble, round_for_display};
use crate::adapter::adapter_for;
use crate::config::PipelineConfig;
use crate::correlation::correlation_matrix;
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::model::{
    CorrelationBasis, PipelineMeta, PipelineOutput, RawTable, SurveyYear, YearOutcomes, YearTable,
};
use crate::reconcile::{reconcile_year, ReconcileOptions};
use crate::region::RegionIndex;

/// The six raw tables of one run, keyed by year.
#[derive(Debug, Default)]
pub struct SourceSet {
    tables: BTreeMap<SurveyYear, RawTable>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table; a second table for the same year replaces the first.
    pub fn insert(&mut self, table: RawTable) {
        self.tables.insert(table.year, table);
    }

    pub fn get(&self, year: SurveyYear) -> Result<&RawTable, ReconError> {
        self.tables.get(&year).ok_or(ReconError::MissingSource { year })
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Parse one year's CSV text into a raw table.
pub fn load_csv_table(year: SurveyYear, csv_data: &str) -> Result<RawTable, ReconError> {
    RawTable::from_csv_str(year, csv_data)
}

/// Reconcile every year independently.
///
/// The reference year goes first; years that borrow its regions fail with
/// [`ReconError::MissingReference`] if it could not be reconciled. Other
/// years are unaffected by a neighbour's failure.
pub fn reconcile_all(sources: &SourceSet, options: &ReconcileOptions) -> YearOutcomes {
    let mut outcomes: YearOutcomes = BTreeMap::new();

    let reference_outcome = sources
        .get(SurveyYear::REFERENCE)
        .and_then(|raw| reconcile_year(raw, None, options));
    let reference = reference_outcome.as_ref().ok().map(RegionIndex::from_table);
    outcomes.insert(SurveyYear::REFERENCE, reference_outcome);

    for year in SurveyYear::ALL {
        if year == SurveyYear::REFERENCE {
            continue;
        }
        let index = if adapter_for(year).joins_reference() {
            reference.as_ref()
        } else {
            None
        };
        let outcome = sources
            .get(year)
            .and_then(|raw| reconcile_year(raw, index, options));
        if let Err(ref e) = outcome {
            warn!(%year, error = %e, "year failed to reconcile");
        }
        outcomes.insert(year, outcome);
    }

    outcomes
}

/// Run the whole pipeline once: reconcile, assemble, correlate, round.
pub fn run(config: &PipelineConfig, sources: &SourceSet) -> Result<PipelineOutput, ReconError> {
    let outcomes = reconcile_all(sources, &config.reconcile_options());

    let summary = {
        let ok: Vec<&YearTable> = outcomes.values().filter_map(|o| o.as_ref().ok()).collect();
        compute_summary(ok)
    };

    let table = assemble(outcomes)?;
    let precision = config.output.precision;
    let rounded = round_for_display(&table, precision);

    let correlation = match config.correlation.basis {
        CorrelationBasis::Rounded => correlation_matrix(&rounded),
        CorrelationBasis::Unrounded => correlation_matrix(&table),
    };

    info!(
        name = %config.name,
        records = rounded.len(),
        basis = %config.correlation.basis,
        "pipeline complete"
    );

    Ok(PipelineOutput {
        meta: PipelineMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            precision,
            correlation_basis: config.correlation.basis,
        },
        summary,
        table: rounded,
        correlation,
        unrounded: table,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER_2015: &str = "Country,Region,Happiness Rank,Happiness Score,Standard Error,Economy (GDP per Capita),Family,Health (Life Expectancy),Freedom,Trust (Government Corruption),Generosity,Dystopia Residual";

    #[test]
    fn source_set_reports_missing_year() {
        let mut set = SourceSet::new();
        set.insert(
            load_csv_table(
                SurveyYear::Y2015,
                &format!("{HEADER_2015}\nA,r,1,7.5,0.03,1.4,1.3,0.9,0.6,0.4,0.3,2.5\n"),
            )
            .unwrap(),
        );
        assert_eq!(set.len(), 1);
        assert!(set.get(SurveyYear::Y2015).is_ok());
        assert!(matches!(
            set.get(SurveyYear::Y2019),
            Err(ReconError::MissingSource { year: SurveyYear::Y2019 })
        ));
    }

    #[test]
    fn joined_years_fail_without_reference() {
        let set = SourceSet::new();
        let outcomes = reconcile_all(&set, &ReconcileOptions::default());
        assert_eq!(outcomes.len(), 6);
        assert!(outcomes.values().all(|o| o.is_err()));
        assert!(matches!(
            outcomes[&SurveyYear::Y2016],
            Err(ReconError::MissingSource { .. })
        ));
    }
}
