//! Per-year source adapters.
//!
//! Every report year exports a different column layout. Each year gets one
//! declarative [`AdapterSpec`] naming the columns it needs and where region and
//! rank come from; [`crate::reconcile::reconcile_year`] is the only consumer.

use crate::model::{Indicator, SurveyYear};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionSource {
    /// Region is a column of the source itself.
    Column(&'static str),
    /// Region is borrowed from the reference year by exact country name.
    JoinReference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankSource {
    Column(&'static str),
    /// Source is pre-sorted by score; rank is the 1-based row position.
    SourceOrder,
}

#[derive(Debug)]
pub struct AdapterSpec {
    pub year: SurveyYear,
    /// Country column; also the join key when regions are borrowed.
    pub country: &'static str,
    pub region: RegionSource,
    pub rank: RankSource,
    /// Rename map: canonical indicator -> source column.
    pub indicators: [(Indicator, &'static str); 7],
}

impl AdapterSpec {
    /// Every source column this adapter reads, in a stable order.
    pub fn required_fields(&self) -> Vec<&'static str> {
        let mut fields = vec![self.country];
        if let RegionSource::Column(col) = self.region {
            fields.push(col);
        }
        if let RankSource::Column(col) = self.rank {
            fields.push(col);
        }
        fields.extend(self.indicators.iter().map(|(_, col)| *col));
        fields
    }

    pub fn column_for(&self, indicator: Indicator) -> &'static str {
        self.indicators
            .iter()
            .find(|(ind, _)| *ind == indicator)
            .map(|(_, col)| *col)
            .unwrap_or_else(|| unreachable!("every adapter maps all seven indicators"))
    }

    pub fn joins_reference(&self) -> bool {
        self.region == RegionSource::JoinReference
    }
}

const REPORT_2015_2016: [(Indicator, &str); 7] = [
    (Indicator::HappinessScore, "Happiness Score"),
    (Indicator::GdpPerCapita, "Economy (GDP per Capita)"),
    (Indicator::Family, "Family"),
    (Indicator::HealthLifeExpectancy, "Health (Life Expectancy)"),
    (Indicator::Freedom, "Freedom"),
    (Indicator::TrustGovernmentCorruption, "Trust (Government Corruption)"),
    (Indicator::Generosity, "Generosity"),
];

const REPORT_2017: [(Indicator, &str); 7] = [
    (Indicator::HappinessScore, "Happiness.Score"),
    (Indicator::GdpPerCapita, "Economy..GDP.per.Capita."),
    (Indicator::Family, "Family"),
    (Indicator::HealthLifeExpectancy, "Health..Life.Expectancy."),
    (Indicator::Freedom, "Freedom"),
    (Indicator::TrustGovernmentCorruption, "Trust..Government.Corruption."),
    (Indicator::Generosity, "Generosity"),
];

const REPORT_2018_2019: [(Indicator, &str); 7] = [
    (Indicator::HappinessScore, "Score"),
    (Indicator::GdpPerCapita, "GDP per capita"),
    (Indicator::Family, "Social support"),
    (Indicator::HealthLifeExpectancy, "Healthy life expectancy"),
    (Indicator::Freedom, "Freedom to make life choices"),
    (Indicator::TrustGovernmentCorruption, "Perceptions of corruption"),
    (Indicator::Generosity, "Generosity"),
];

const REPORT_2020: [(Indicator, &str); 7] = [
    (Indicator::HappinessScore, "Ladder score"),
    (Indicator::GdpPerCapita, "Logged GDP per capita"),
    (Indicator::Family, "Social support"),
    (Indicator::HealthLifeExpectancy, "Healthy life expectancy"),
    (Indicator::Freedom, "Freedom to make life choices"),
    (Indicator::TrustGovernmentCorruption, "Perceptions of corruption"),
    (Indicator::Generosity, "Generosity"),
];

// Indexed by SurveyYear::index().
static ADAPTERS: [AdapterSpec; 6] = [
    AdapterSpec {
        year: SurveyYear::Y2015,
        country: "Country",
        region: RegionSource::Column("Region"),
        rank: RankSource::Column("Happiness Rank"),
        indicators: REPORT_2015_2016,
    },
    AdapterSpec {
        year: SurveyYear::Y2016,
        country: "Country",
        region: RegionSource::Column("Region"),
        rank: RankSource::Column("Happiness Rank"),
        indicators: REPORT_2015_2016,
    },
    AdapterSpec {
        year: SurveyYear::Y2017,
        country: "Country",
        region: RegionSource::JoinReference,
        rank: RankSource::Column("Happiness.Rank"),
        indicators: REPORT_2017,
    },
    AdapterSpec {
        year: SurveyYear::Y2018,
        country: "Country or region",
        region: RegionSource::JoinReference,
        rank: RankSource::Column("Overall rank"),
        indicators: REPORT_2018_2019,
    },
    AdapterSpec {
        year: SurveyYear::Y2019,
        country: "Country or region",
        region: RegionSource::JoinReference,
        rank: RankSource::Column("Overall rank"),
        indicators: REPORT_2018_2019,
    },
    AdapterSpec {
        year: SurveyYear::Y2020,
        country: "Country name",
        region: RegionSource::Column("Regional indicator"),
        rank: RankSource::SourceOrder,
        indicators: REPORT_2020,
    },
];

pub fn adapter_for(year: SurveyYear) -> &'static AdapterSpec {
    &ADAPTERS[year.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_year() {
        for year in SurveyYear::ALL {
            assert_eq!(adapter_for(year).year, year);
        }
    }

    #[test]
    fn only_2017_to_2019_join_the_reference() {
        let joined: Vec<SurveyYear> = SurveyYear::ALL
            .into_iter()
            .filter(|y| adapter_for(*y).joins_reference())
            .collect();
        assert_eq!(joined, vec![SurveyYear::Y2017, SurveyYear::Y2018, SurveyYear::Y2019]);
        assert!(!adapter_for(SurveyYear::REFERENCE).joins_reference());
    }

    #[test]
    fn only_2020_derives_rank() {
        for year in SurveyYear::ALL {
            let derived = adapter_for(year).rank == RankSource::SourceOrder;
            assert_eq!(derived, year == SurveyYear::Y2020, "{year}");
        }
    }

    #[test]
    fn required_fields_for_2018() {
        let fields = adapter_for(SurveyYear::Y2018).required_fields();
        assert_eq!(fields[0], "Country or region");
        assert_eq!(fields[1], "Overall rank");
        assert!(fields.contains(&"Perceptions of corruption"));
        assert!(!fields.contains(&"Region"));
        assert_eq!(fields.len(), 9);
    }

    #[test]
    fn required_fields_for_2020_have_no_rank_column() {
        let fields = adapter_for(SurveyYear::Y2020).required_fields();
        assert_eq!(fields.len(), 9);
        assert!(fields.contains(&"Regional indicator"));
        assert!(fields.contains(&"Ladder score"));
    }

    #[test]
    fn column_for_maps_renamed_fields() {
        let spec = adapter_for(SurveyYear::Y2017);
        assert_eq!(spec.column_for(Indicator::GdpPerCapita), "Economy..GDP.per.Capita.");
        assert_eq!(spec.column_for(Indicator::Family), "Family");
    }
}
