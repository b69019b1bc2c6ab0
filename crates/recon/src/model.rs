use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Survey years
// ---------------------------------------------------------------------------

/// The closed set of report years the adapters know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum SurveyYear {
    Y2015,
    Y2016,
    Y2017,
    Y2018,
    Y2019,
    Y2020,
}

impl SurveyYear {
    pub const ALL: [SurveyYear; 6] = [
        SurveyYear::Y2015,
        SurveyYear::Y2016,
        SurveyYear::Y2017,
        SurveyYear::Y2018,
        SurveyYear::Y2019,
        SurveyYear::Y2020,
    ];

    /// The year whose regions are borrowed by sources that carry none.
    pub const REFERENCE: SurveyYear = SurveyYear::Y2016;

    pub fn as_u16(self) -> u16 {
        match self {
            Self::Y2015 => 2015,
            Self::Y2016 => 2016,
            Self::Y2017 => 2017,
            Self::Y2018 => 2018,
            Self::Y2019 => 2019,
            Self::Y2020 => 2020,
        }
    }

    pub(crate) fn index(self) -> usize {
        (self.as_u16() - 2015) as usize
    }
}

impl From<SurveyYear> for u16 {
    fn from(year: SurveyYear) -> Self {
        year.as_u16()
    }
}

impl TryFrom<u16> for SurveyYear {
    type Error = ReconError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        SurveyYear::ALL
            .into_iter()
            .find(|y| y.as_u16() == value)
            .ok_or(ReconError::UnknownYear(value as i64))
    }
}

impl FromStr for SurveyYear {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| ReconError::ConfigValidation(format!("not a year: '{s}'")))?;
        u16::try_from(value)
            .map_err(|_| ReconError::UnknownYear(value))
            .and_then(SurveyYear::try_from)
    }
}

impl fmt::Display for SurveyYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

// ---------------------------------------------------------------------------
// Indicators + metrics
// ---------------------------------------------------------------------------

/// The seven numeric fields that are min-max scaled within each year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    HappinessScore,
    GdpPerCapita,
    Family,
    HealthLifeExpectancy,
    Freedom,
    TrustGovernmentCorruption,
    Generosity,
}

impl Indicator {
    pub const ALL: [Indicator; 7] = [
        Indicator::HappinessScore,
        Indicator::GdpPerCapita,
        Indicator::Family,
        Indicator::HealthLifeExpectancy,
        Indicator::Freedom,
        Indicator::TrustGovernmentCorruption,
        Indicator::Generosity,
    ];

    /// Position in [`Indicator::ALL`].
    pub(crate) fn slot(self) -> usize {
        self as usize
    }

    /// Snake-case field name used in serialized output.
    pub fn key(self) -> &'static str {
        match self {
            Self::HappinessScore => "happiness_score",
            Self::GdpPerCapita => "gdp_per_capita",
            Self::Family => "family",
            Self::HealthLifeExpectancy => "health_life_expectancy",
            Self::Freedom => "freedom",
            Self::TrustGovernmentCorruption => "trust_government_corruption",
            Self::Generosity => "generosity",
        }
    }

    /// Human-facing column label, as printed in the published reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::HappinessScore => "Happiness Score",
            Self::GdpPerCapita => "Economy (GDP per Capita)",
            Self::Family => "Family",
            Self::HealthLifeExpectancy => "Health (Life Expectancy)",
            Self::Freedom => "Freedom",
            Self::TrustGovernmentCorruption => "Trust (Government Corruption)",
            Self::Generosity => "Generosity",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Any numeric column of the canonical table: the rank plus the indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    HappinessRank,
    Indicator(Indicator),
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::HappinessRank,
        Metric::Indicator(Indicator::HappinessScore),
        Metric::Indicator(Indicator::GdpPerCapita),
        Metric::Indicator(Indicator::Family),
        Metric::Indicator(Indicator::HealthLifeExpectancy),
        Metric::Indicator(Indicator::Freedom),
        Metric::Indicator(Indicator::TrustGovernmentCorruption),
        Metric::Indicator(Indicator::Generosity),
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::HappinessRank => "happiness_rank",
            Self::Indicator(ind) => ind.key(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::HappinessRank => "Happiness Rank",
            Self::Indicator(ind) => ind.label(),
        }
    }
}

impl FromStr for Metric {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Metric::ALL
            .into_iter()
            .find(|m| m.key() == wanted)
            .ok_or_else(|| ReconError::ConfigValidation(format!("unknown metric: '{s}'")))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One source file as read: headers plus string cells, nothing interpreted.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub year: SurveyYear,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Parse CSV text. Header cells are trimmed; data cells are kept verbatim.
    pub fn from_csv_str(year: SurveyYear, csv_data: &str) -> Result<Self, ReconError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(csv_data.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| ReconError::Csv(format!("{year}: {e}")))?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ReconError::Csv(format!("{year}: {e}")))?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        Ok(Self { year, headers, rows })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

// ---------------------------------------------------------------------------
// Canonical records
// ---------------------------------------------------------------------------

/// One (country, year) row of the reconciled dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub region: Option<String>,
    pub country: String,
    pub year: SurveyYear,
    pub happiness_rank: u32,
    pub happiness_score: f64,
    pub gdp_per_capita: f64,
    pub family: f64,
    pub health_life_expectancy: f64,
    pub freedom: f64,
    pub trust_government_corruption: f64,
    pub generosity: f64,
}

impl CanonicalRecord {
    pub fn indicator(&self, indicator: Indicator) -> f64 {
        match indicator {
            Indicator::HappinessScore => self.happiness_score,
            Indicator::GdpPerCapita => self.gdp_per_capita,
            Indicator::Family => self.family,
            Indicator::HealthLifeExpectancy => self.health_life_expectancy,
            Indicator::Freedom => self.freedom,
            Indicator::TrustGovernmentCorruption => self.trust_government_corruption,
            Indicator::Generosity => self.generosity,
        }
    }

    pub fn indicator_mut(&mut self, indicator: Indicator) -> &mut f64 {
        match indicator {
            Indicator::HappinessScore => &mut self.happiness_score,
            Indicator::GdpPerCapita => &mut self.gdp_per_capita,
            Indicator::Family => &mut self.family,
            Indicator::HealthLifeExpectancy => &mut self.health_life_expectancy,
            Indicator::Freedom => &mut self.freedom,
            Indicator::TrustGovernmentCorruption => &mut self.trust_government_corruption,
            Indicator::Generosity => &mut self.generosity,
        }
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::HappinessRank => self.happiness_rank as f64,
            Metric::Indicator(ind) => self.indicator(ind),
        }
    }
}

/// Non-fatal conditions raised while reconciling a year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconWarning {
    /// Field is constant across the cohort; every normalized value is 0.
    DegenerateCohort { year: SurveyYear, field: Indicator },
}

impl fmt::Display for ReconWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateCohort { year, field } => {
                write!(f, "{year}: '{field}' is constant across the cohort, scaled to 0")
            }
        }
    }
}

/// A reconciled cohort: records in rank order.
#[derive(Debug, Clone, Serialize)]
pub struct YearTable {
    pub year: SurveyYear,
    pub records: Vec<CanonicalRecord>,
    /// Countries removed by the inner join against the reference year.
    pub dropped: Vec<String>,
    pub warnings: Vec<ReconWarning>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// All reconciled years, concatenated in year order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CanonicalTable {
    pub records: Vec<CanonicalRecord>,
}

impl CanonicalTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn year(&self, year: SurveyYear) -> impl Iterator<Item = &CanonicalRecord> {
        self.records.iter().filter(move |r| r.year == year)
    }

    pub fn get(&self, country: &str, year: SurveyYear) -> Option<&CanonicalRecord> {
        self.records
            .iter()
            .find(|r| r.year == year && r.country == country)
    }

    pub fn years(&self) -> Vec<SurveyYear> {
        let mut years: Vec<SurveyYear> = self.records.iter().map(|r| r.year).collect();
        years.dedup();
        years
    }

    /// All values of one metric, in table order.
    pub fn column(&self, metric: Metric) -> Vec<f64> {
        self.records.iter().map(|r| r.metric(metric)).collect()
    }
}

/// Pairwise Pearson coefficients over the pooled table.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: Metric, col: Metric) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == row.key())?;
        let j = self.labels.iter().position(|l| l == col.key())?;
        Some(self.values[i][j])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationBasis {
    /// Correlate the display-rounded table (historical behavior).
    #[default]
    Rounded,
    Unrounded,
}

impl fmt::Display for CorrelationBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rounded => write!(f, "rounded"),
            Self::Unrounded => write!(f, "unrounded"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct YearSummary {
    pub year: SurveyYear,
    pub records: usize,
    pub dropped: usize,
    pub degenerate_fields: Vec<Indicator>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total_records: usize,
    pub years: Vec<YearSummary>,
    pub warnings: Vec<ReconWarning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub precision: u32,
    pub correlation_basis: CorrelationBasis,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub meta: PipelineMeta,
    pub summary: RunSummary,
    pub table: CanonicalTable,
    pub correlation: CorrelationMatrix,
    /// Full-precision table; ranking views read this one.
    #[serde(skip)]
    pub unrounded: CanonicalTable,
}

/// Per-year outcome handed to the aggregator.
pub type YearOutcomes = BTreeMap<SurveyYear, Result<YearTable, ReconError>>;
