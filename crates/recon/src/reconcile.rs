use std::collections::HashSet;

use tracing::{debug, info};

use crate::adapter::{adapter_for, AdapterSpec, RankSource, RegionSource};
use crate::error::ReconError;
use crate::model::{CanonicalRecord, Indicator, RawTable, SurveyYear, YearTable};
use crate::normalize::normalize_cohort;
use crate::rank;
use crate::region::{inner_join, RegionIndex};

#[derive(Debug, Clone, Copy)]
pub struct ReconcileOptions {
    /// Minimum matched/total ratio for the region join.
    pub min_match_ratio: f64,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self { min_match_ratio: 0.5 }
    }
}

/// Column positions resolved against one source's headers.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    country: usize,
    region: Option<usize>,
    rank: Option<usize>,
    indicators: [usize; 7],
}

/// A parsed row before region, rank and scaling are settled.
#[derive(Debug, Clone)]
struct StagedRow {
    country: String,
    region: Option<String>,
    source_rank: Option<u32>,
    values: [f64; 7],
}

/// Resolve every field the year's adapter requires, failing on the first gap.
pub fn check_schema(raw: &RawTable) -> Result<ColumnIndex, ReconError> {
    let spec = adapter_for(raw.year);

    let idx = |name: &str| -> Result<usize, ReconError> {
        raw.column_index(name).ok_or_else(|| ReconError::SchemaMismatch {
            year: raw.year,
            field: name.into(),
        })
    };

    let country = idx(spec.country)?;
    let region = match spec.region {
        RegionSource::Column(col) => Some(idx(col)?),
        RegionSource::JoinReference => None,
    };
    let rank = match spec.rank {
        RankSource::Column(col) => Some(idx(col)?),
        RankSource::SourceOrder => None,
    };

    let mut indicators = [0usize; 7];
    for (slot, (_, col)) in indicators.iter_mut().zip(spec.indicators.iter()) {
        *slot = idx(col)?;
    }

    Ok(ColumnIndex { country, region, rank, indicators })
}

fn stage_rows(raw: &RawTable, spec: &AdapterSpec, cols: &ColumnIndex) -> Result<Vec<StagedRow>, ReconError> {
    let year = raw.year;
    let mut seen: HashSet<String> = HashSet::new();
    let mut staged = Vec::with_capacity(raw.rows.len());

    for (i, cells) in raw.rows.iter().enumerate() {
        // 1-based data row, header excluded
        let row = i + 1;
        let cell = |idx: usize| cells.get(idx).map(|c| c.trim()).unwrap_or("");

        let country = cell(cols.country);
        if country.is_empty() {
            return Err(ReconError::MissingCountry { year, row });
        }
        if !seen.insert(country.to_string()) {
            return Err(ReconError::DuplicateCountry {
                year,
                country: country.into(),
            });
        }

        let region = cols
            .region
            .map(cell)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        let source_rank = match cols.rank {
            Some(idx) => {
                let text = cell(idx);
                let rank = parse_rank(text).ok_or_else(|| ReconError::InvalidRank {
                    year,
                    row,
                    value: text.into(),
                })?;
                Some(rank)
            }
            None => None,
        };

        let mut values = [0.0; 7];
        for (&(indicator, column), &idx) in spec.indicators.iter().zip(cols.indicators.iter()) {
            let text = cell(idx);
            values[indicator.slot()] = parse_number(text).ok_or_else(|| ReconError::InvalidNumber {
                year,
                row,
                field: column.into(),
                value: text.into(),
            })?;
        }

        staged.push(StagedRow {
            country: country.into(),
            region,
            source_rank,
            values,
        });
    }

    Ok(staged)
}

fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_rank(text: &str) -> Option<u32> {
    // some exports write integral ranks as "1.0"
    let rank = match text.parse::<u32>() {
        Ok(r) => r,
        Err(_) => {
            let f = text.parse::<f64>().ok()?;
            if f.fract() != 0.0 || f < 1.0 || f > u32::MAX as f64 {
                return None;
            }
            f as u32
        }
    };
    (rank > 0).then_some(rank)
}

/// Turn one raw year into its canonical cohort.
///
/// `reference` is only consulted by adapters that borrow regions; it must be
/// built from the reconciled reference year.
pub fn reconcile_year(
    raw: &RawTable,
    reference: Option<&RegionIndex>,
    options: &ReconcileOptions,
) -> Result<YearTable, ReconError> {
    let year = raw.year;
    let spec = adapter_for(year);
    let cols = check_schema(raw)?;

    if raw.rows.is_empty() {
        return Err(ReconError::EmptySource { year });
    }

    let mut staged = stage_rows(raw, spec, &cols)?;

    let mut dropped = Vec::new();
    if spec.joins_reference() {
        let index = reference.ok_or(ReconError::MissingReference { year })?;
        let outcome = inner_join(year, staged, |r: &StagedRow| r.country.as_str(), index, options.min_match_ratio)?;
        dropped = outcome.dropped;
        staged = outcome
            .matched
            .into_iter()
            .map(|(mut row, region)| {
                row.region = region;
                row
            })
            .collect();
    }

    let ranks = match spec.rank {
        RankSource::SourceOrder => rank::derive_from_order(staged.len()),
        RankSource::Column(_) => {
            let sourced: Vec<u32> = staged.iter().map(|r| r.source_rank.unwrap_or(u32::MAX)).collect();
            let compacted = rank::compact(&sourced);
            if compacted != sourced {
                debug!(%year, "sourced ranks renumbered to 1..{}", staged.len());
            }
            compacted
        }
    };

    let mut records: Vec<CanonicalRecord> = staged
        .into_iter()
        .zip(ranks)
        .map(|(row, happiness_rank)| to_record(year, row, happiness_rank))
        .collect();
    records.sort_by_key(|r| r.happiness_rank);

    let warnings = normalize_cohort(year, &mut records);

    info!(
        %year,
        records = records.len(),
        dropped = dropped.len(),
        warnings = warnings.len(),
        "reconciled year"
    );

    Ok(YearTable {
        year,
        records,
        dropped,
        warnings,
    })
}

fn to_record(year: SurveyYear, row: StagedRow, happiness_rank: u32) -> CanonicalRecord {
    let v = |ind: Indicator| row.values[ind.slot()];
    CanonicalRecord {
        happiness_score: v(Indicator::HappinessScore),
        gdp_per_capita: v(Indicator::GdpPerCapita),
        family: v(Indicator::Family),
        health_life_expectancy: v(Indicator::HealthLifeExpectancy),
        freedom: v(Indicator::Freedom),
        trust_government_corruption: v(Indicator::TrustGovernmentCorruption),
        generosity: v(Indicator::Generosity),
        region: row.region,
        country: row.country,
        year,
        happiness_rank,
    }
}
