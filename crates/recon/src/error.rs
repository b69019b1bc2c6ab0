use serde::Serialize;
use thiserror::Error;

use crate::model::SurveyYear;

#[derive(Debug, Error)]
pub enum ReconError {
    /// Source lacks a field its year's adapter requires.
    #[error("{year}: missing required field '{field}'")]
    SchemaMismatch { year: SurveyYear, field: String },

    /// Region join against the reference year matched nothing, or too little.
    #[error("{year}: region join matched {matched} countries, {unmatched} unmatched")]
    JoinMismatch {
        year: SurveyYear,
        matched: usize,
        unmatched: usize,
    },

    /// Year joins regions from the reference year, but no reference was supplied.
    #[error("{year}: region join requires the {} reference table", SurveyYear::REFERENCE)]
    MissingReference { year: SurveyYear },

    #[error("{year}: source has no data rows")]
    EmptySource { year: SurveyYear },

    #[error("{year}, row {row}: country name is empty")]
    MissingCountry { year: SurveyYear, row: usize },

    #[error("{year}, row {row}: cannot parse '{field}' value '{value}' as a number")]
    InvalidNumber {
        year: SurveyYear,
        row: usize,
        field: String,
        value: String,
    },

    #[error("{year}, row {row}: cannot parse rank '{value}'")]
    InvalidRank {
        year: SurveyYear,
        row: usize,
        value: String,
    },

    #[error("{year}: country '{country}' appears more than once")]
    DuplicateCountry { year: SurveyYear, country: String },

    #[error("unknown survey year: {0}")]
    UnknownYear(i64),

    #[error("no source table for {year}")]
    MissingSource { year: SurveyYear },

    /// Aggregator refuses partial output.
    #[error("cannot assemble canonical table: {}", describe_failures(.failures))]
    IncompleteDataset { failures: Vec<YearFailure> },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("config validation error: {0}")]
    ConfigValidation(String),
}

/// A year that could not be reconciled, kept for the incomplete-dataset report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearFailure {
    pub year: SurveyYear,
    pub message: String,
}

fn describe_failures(failures: &[YearFailure]) -> String {
    let parts: Vec<String> = failures
        .iter()
        .map(|f| format!("[{}] {}", f.year, f.message))
        .collect();
    format!("{} year(s) failed: {}", failures.len(), parts.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mismatch_names_year_and_field() {
        let err = ReconError::SchemaMismatch {
            year: SurveyYear::Y2018,
            field: "Overall rank".into(),
        };
        assert_eq!(err.to_string(), "2018: missing required field 'Overall rank'");
    }

    #[test]
    fn incomplete_dataset_lists_every_failure() {
        let err = ReconError::IncompleteDataset {
            failures: vec![
                YearFailure { year: SurveyYear::Y2017, message: "boom".into() },
                YearFailure { year: SurveyYear::Y2019, message: "bust".into() },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 year(s) failed"));
        assert!(msg.contains("[2017] boom"));
        assert!(msg.contains("[2019] bust"));
    }
}
