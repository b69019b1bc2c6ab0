//! Render-ready slices of the canonical table.
//!
//! Nothing here draws. These are the shapes a map/chart collaborator consumes:
//! one choropleth frame per year behind a year slider, the top-N subset of a
//! year for comparison charts, and the per-year score series of the leaders.

use serde::Serialize;

use crate::model::{CanonicalRecord, CanonicalTable, Indicator, Metric, SurveyYear};

#[derive(Debug, Clone, Serialize)]
pub struct ChoroplethFrame {
    pub year: SurveyYear,
    /// Slider step label, e.g. "Year 2017".
    pub label: String,
    /// Country names; the renderer resolves them as map locations.
    pub locations: Vec<String>,
    pub z: Vec<f64>,
    /// Hover text, `<br>`-separated lines.
    pub text: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoroplethSeries {
    pub metric: String,
    pub title: String,
    pub colorbar_title: String,
    pub frames: Vec<ChoroplethFrame>,
}

pub fn map_title(metric: Metric) -> &'static str {
    match metric {
        Metric::HappinessRank => "Life satisfaction ranking",
        Metric::Indicator(Indicator::GdpPerCapita) => "Economy (Gross Domestic Product per 1 inhabitant)",
        Metric::Indicator(Indicator::HealthLifeExpectancy) => "Health (life expectancy)",
        Metric::Indicator(ind) => ind.label(),
    }
}

fn hover_text(record: &CanonicalRecord, metric: Metric) -> String {
    let region = record.region.as_deref().unwrap_or("");
    match metric {
        // the rank map carries the full indicator breakdown
        Metric::HappinessRank => {
            let mut lines = vec![format!("Region: {region}")];
            lines.extend(
                Indicator::ALL
                    .iter()
                    .map(|ind| format!("{}: {}", ind.label(), record.indicator(*ind))),
            );
            lines.join("<br>")
        }
        Metric::Indicator(_) => format!("Region: {region}"),
    }
}

/// One frame per year present in the table, in year order.
pub fn choropleth(table: &CanonicalTable, metric: Metric) -> ChoroplethSeries {
    let frames = table
        .years()
        .into_iter()
        .map(|year| {
            let records: Vec<&CanonicalRecord> = table.year(year).collect();
            ChoroplethFrame {
                year,
                label: format!("Year {year}"),
                locations: records.iter().map(|r| r.country.clone()).collect(),
                z: records.iter().map(|r| r.metric(metric)).collect(),
                text: records.iter().map(|r| hover_text(r, metric)).collect(),
            }
        })
        .collect();

    ChoroplethSeries {
        metric: metric.key().to_string(),
        title: map_title(metric).to_string(),
        colorbar_title: match metric {
            Metric::HappinessRank => "Place in the ranking".to_string(),
            Metric::Indicator(_) => "Indicator".to_string(),
        },
        frames,
    }
}

/// The first `n` countries of a year, best rank first.
///
/// Pass the unrounded table to chart full-precision scores.
pub fn top_n(table: &CanonicalTable, year: SurveyYear, n: usize) -> Vec<CanonicalRecord> {
    let mut records: Vec<CanonicalRecord> = table.year(year).cloned().collect();
    records.sort_by_key(|r| r.happiness_rank);
    records.truncate(n);
    records
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreSeries {
    pub year: SurveyYear,
    pub countries: Vec<String>,
    pub scores: Vec<f64>,
}

/// Happiness score of each year's top `n`, one series per year.
pub fn score_trend(table: &CanonicalTable, n: usize) -> Vec<ScoreSeries> {
    table
        .years()
        .into_iter()
        .map(|year| {
            let top = top_n(table, year, n);
            ScoreSeries {
                year,
                countries: top.iter().map(|r| r.country.clone()).collect(),
                scores: top.iter().map(|r| r.happiness_score).collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(country: &str, year: SurveyYear, rank: u32) -> CanonicalRecord {
        CanonicalRecord {
            region: Some("Western Europe".into()),
            country: country.into(),
            year,
            happiness_rank: rank,
            happiness_score: 1.0 / rank as f64,
            gdp_per_capita: 0.5,
            family: 0.25,
            health_life_expectancy: 0.75,
            freedom: 1.0,
            trust_government_corruption: 0.0,
            generosity: 0.1,
        }
    }

    fn table() -> CanonicalTable {
        CanonicalTable {
            records: vec![
                record("Denmark", SurveyYear::Y2015, 2),
                record("Switzerland", SurveyYear::Y2015, 1),
                record("Iceland", SurveyYear::Y2015, 3),
                record("Finland", SurveyYear::Y2020, 1),
                record("Denmark", SurveyYear::Y2020, 2),
            ],
        }
    }

    #[test]
    fn one_frame_per_year() {
        let series = choropleth(&table(), Metric::Indicator(Indicator::Freedom));
        assert_eq!(series.title, "Freedom");
        assert_eq!(series.colorbar_title, "Indicator");
        assert_eq!(series.frames.len(), 2);
        assert_eq!(series.frames[0].label, "Year 2015");
        assert_eq!(series.frames[1].label, "Year 2020");
        assert_eq!(series.frames[0].locations, vec!["Denmark", "Switzerland", "Iceland"]);
        assert_eq!(series.frames[0].z, vec![1.0, 1.0, 1.0]);
        assert_eq!(series.frames[0].text[0], "Region: Western Europe");
    }

    #[test]
    fn rank_map_hover_lists_indicators() {
        let series = choropleth(&table(), Metric::HappinessRank);
        assert_eq!(series.title, "Life satisfaction ranking");
        assert_eq!(series.frames[1].z, vec![1.0, 2.0]);
        let text = &series.frames[1].text[0];
        assert!(text.starts_with("Region: Western Europe<br>Happiness Score: 1"));
        assert!(text.contains("Freedom: 1"));
        assert_eq!(text.matches("<br>").count(), 7);
    }

    #[test]
    fn top_n_is_rank_ordered_and_truncated() {
        let top = top_n(&table(), SurveyYear::Y2015, 2);
        let names: Vec<&str> = top.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, vec!["Switzerland", "Denmark"]);
        assert!(top_n(&table(), SurveyYear::Y2018, 10).is_empty());
    }

    #[test]
    fn score_trend_per_year() {
        let trend = score_trend(&table(), 10);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[1].countries, vec!["Finland", "Denmark"]);
        assert_eq!(trend[1].scores, vec![1.0, 0.5]);
    }
}
