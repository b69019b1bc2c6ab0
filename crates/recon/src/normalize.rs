use tracing::warn;

use crate::model::{CanonicalRecord, Indicator, ReconWarning, SurveyYear};

/// Result of scaling one field of one cohort.
#[derive(Debug, Clone, PartialEq)]
pub struct Scaled {
    pub values: Vec<f64>,
    /// Every input was equal; all outputs are 0.
    pub degenerate: bool,
}

/// Min-max scale into [0, 1]: `(v - min) / (max - min)`.
///
/// A constant cohort has no range, so every value maps to 0 and the result is
/// flagged degenerate. Comparable only within the cohort it was computed on.
pub fn min_max(values: &[f64]) -> Scaled {
    if values.is_empty() {
        return Scaled { values: Vec::new(), degenerate: false };
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range == 0.0 {
        return Scaled {
            values: vec![0.0; values.len()],
            degenerate: true,
        };
    }

    Scaled {
        values: values.iter().map(|v| (v - min) / range).collect(),
        degenerate: false,
    }
}

/// Scale all seven indicators of a cohort in place, field by field.
pub fn normalize_cohort(year: SurveyYear, records: &mut [CanonicalRecord]) -> Vec<ReconWarning> {
    let mut warnings = Vec::new();

    for indicator in Indicator::ALL {
        let raw: Vec<f64> = records.iter().map(|r| r.indicator(indicator)).collect();
        let scaled = min_max(&raw);

        if scaled.degenerate {
            warn!(%year, field = %indicator, "constant field across cohort, scaling to 0");
            warnings.push(ReconWarning::DegenerateCohort { year, field: indicator });
        }

        for (record, value) in records.iter_mut().zip(scaled.values) {
            *record.indicator_mut(indicator) = value;
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(country: &str, gdp: f64, freedom: f64) -> CanonicalRecord {
        CanonicalRecord {
            region: None,
            country: country.into(),
            year: SurveyYear::Y2015,
            happiness_rank: 1,
            happiness_score: gdp * 2.0,
            gdp_per_capita: gdp,
            family: 1.0 + gdp,
            health_life_expectancy: gdp / 10.0,
            freedom,
            trust_government_corruption: gdp - 5.0,
            generosity: 100.0 - gdp,
        }
    }

    #[test]
    fn three_point_cohort() {
        let scaled = min_max(&[10.0, 20.0, 30.0]);
        assert_eq!(scaled.values, vec![0.0, 0.5, 1.0]);
        assert!(!scaled.degenerate);
    }

    #[test]
    fn order_is_preserved() {
        let scaled = min_max(&[30.0, 10.0, 20.0]);
        assert_eq!(scaled.values, vec![1.0, 0.0, 0.5]);
    }

    #[test]
    fn constant_cohort_maps_to_zero() {
        let scaled = min_max(&[4.2, 4.2, 4.2]);
        assert_eq!(scaled.values, vec![0.0, 0.0, 0.0]);
        assert!(scaled.degenerate);
    }

    #[test]
    fn single_record_is_degenerate() {
        let scaled = min_max(&[7.0]);
        assert_eq!(scaled.values, vec![0.0]);
        assert!(scaled.degenerate);
    }

    #[test]
    fn empty_cohort() {
        let scaled = min_max(&[]);
        assert!(scaled.values.is_empty());
        assert!(!scaled.degenerate);
    }

    #[test]
    fn negative_values_scale() {
        let scaled = min_max(&[-2.0, 0.0, 2.0]);
        assert_eq!(scaled.values, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn cohort_fields_scale_independently() {
        let mut records = vec![
            record("A", 10.0, 0.3),
            record("B", 20.0, 0.3),
            record("C", 30.0, 0.3),
        ];
        let warnings = normalize_cohort(SurveyYear::Y2015, &mut records);

        let gdp: Vec<f64> = records.iter().map(|r| r.gdp_per_capita).collect();
        assert_eq!(gdp, vec![0.0, 0.5, 1.0]);
        let generosity: Vec<f64> = records.iter().map(|r| r.generosity).collect();
        assert_eq!(generosity, vec![1.0, 0.5, 0.0]);

        // freedom is constant
        assert!(records.iter().all(|r| r.freedom == 0.0));
        assert_eq!(
            warnings,
            vec![ReconWarning::DegenerateCohort {
                year: SurveyYear::Y2015,
                field: Indicator::Freedom,
            }]
        );
    }
}
