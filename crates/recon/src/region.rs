use std::collections::HashMap;

use tracing::debug;

use crate::error::ReconError;
use crate::model::{SurveyYear, YearTable};

/// Country -> region lookup built from the reference year's reconciled table.
#[derive(Debug, Clone)]
pub struct RegionIndex {
    reference_year: SurveyYear,
    regions: HashMap<String, Option<String>>,
}

impl RegionIndex {
    pub fn from_table(table: &YearTable) -> Self {
        let regions = table
            .records
            .iter()
            .map(|r| (r.country.clone(), r.region.clone()))
            .collect();
        Self {
            reference_year: table.year,
            regions,
        }
    }

    /// Build directly from (country, region) pairs.
    pub fn from_pairs<I, C, R>(reference_year: SurveyYear, pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, R)>,
        C: Into<String>,
        R: Into<String>,
    {
        let regions = pairs
            .into_iter()
            .map(|(c, r)| (c.into(), Some(r.into())))
            .collect();
        Self { reference_year, regions }
    }

    pub fn reference_year(&self) -> SurveyYear {
        self.reference_year
    }

    /// `None` if the country is unknown; `Some(None)` if known without a region.
    pub fn lookup(&self, country: &str) -> Option<Option<&str>> {
        self.regions.get(country).map(|r| r.as_deref())
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[derive(Debug)]
pub struct JoinOutcome<T> {
    /// Matched rows, in input order, with the borrowed region.
    pub matched: Vec<(T, Option<String>)>,
    /// Country names with no counterpart in the reference year.
    pub dropped: Vec<String>,
}

/// Inner join on exact country-name equality.
///
/// Unmatched rows are dropped, never region-less. Zero matches, or a match
/// ratio under `min_match_ratio`, is a [`ReconError::JoinMismatch`]: that
/// almost always means the key column changed format.
pub fn inner_join<T>(
    year: SurveyYear,
    rows: Vec<T>,
    country: impl Fn(&T) -> &str,
    index: &RegionIndex,
    min_match_ratio: f64,
) -> Result<JoinOutcome<T>, ReconError> {
    let total = rows.len();
    let mut matched = Vec::with_capacity(total);
    let mut dropped = Vec::new();

    for row in rows {
        match index.lookup(country(&row)) {
            Some(region) => {
                let region = region.map(str::to_string);
                matched.push((row, region));
            }
            None => {
                debug!(%year, country = country(&row), reference = %index.reference_year(), "no reference match, dropping");
                dropped.push(country(&row).to_string());
            }
        }
    }

    let ratio = if total == 0 { 0.0 } else { matched.len() as f64 / total as f64 };
    if matched.is_empty() || ratio < min_match_ratio {
        return Err(ReconError::JoinMismatch {
            year,
            matched: matched.len(),
            unmatched: dropped.len(),
        });
    }

    Ok(JoinOutcome { matched, dropped })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> RegionIndex {
        RegionIndex::from_pairs(
            SurveyYear::Y2016,
            [("A", "region1"), ("B", "region2")],
        )
    }

    #[test]
    fn unmatched_rows_are_dropped() {
        let out = inner_join(SurveyYear::Y2017, vec!["A", "B", "C"], |c| *c, &index(), 0.5).unwrap();
        assert_eq!(
            out.matched,
            vec![("A", Some("region1".to_string())), ("B", Some("region2".to_string()))]
        );
        assert_eq!(out.dropped, vec!["C"]);
    }

    #[test]
    fn match_is_exact() {
        let out = inner_join(SurveyYear::Y2018, vec!["A", "a", "B "], |c| *c, &index(), 0.0).unwrap();
        assert_eq!(out.matched.len(), 1);
        assert_eq!(out.dropped, vec!["a", "B "]);
    }

    #[test]
    fn zero_matches_is_fatal() {
        let err = inner_join(SurveyYear::Y2019, vec!["X", "Y"], |c| *c, &index(), 0.0).unwrap_err();
        match err {
            ReconError::JoinMismatch { year, matched, unmatched } => {
                assert_eq!(year, SurveyYear::Y2019);
                assert_eq!(matched, 0);
                assert_eq!(unmatched, 2);
            }
            other => panic!("expected JoinMismatch, got {other:?}"),
        }
    }

    #[test]
    fn low_coverage_is_fatal() {
        let err = inner_join(SurveyYear::Y2017, vec!["A", "X", "Y", "Z"], |c| *c, &index(), 0.5)
            .unwrap_err();
        assert!(matches!(err, ReconError::JoinMismatch { matched: 1, unmatched: 3, .. }));
    }

    #[test]
    fn known_country_without_region_keeps_none() {
        let mut idx = index();
        idx.regions.insert("D".into(), None);
        let out = inner_join(SurveyYear::Y2017, vec!["D"], |c| *c, &idx, 1.0).unwrap();
        assert_eq!(out.matched, vec![("D", None)]);
    }
}
