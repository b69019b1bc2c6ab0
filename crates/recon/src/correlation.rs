use crate::model::{CanonicalTable, CorrelationMatrix, Metric};

/// Pearson correlation coefficient of two equal-length samples.
///
/// NaN when either sample has zero variance or fewer than two points.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }

    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }

    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

/// Pairwise coefficients of the eight numeric fields, pooled across all years.
pub fn correlation_matrix(table: &CanonicalTable) -> CorrelationMatrix {
    let columns: Vec<Vec<f64>> = Metric::ALL.iter().map(|m| table.column(*m)).collect();
    let n = columns.len();

    let mut values = vec![vec![0.0; n]; n];
    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(&columns[i], &columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        labels: Metric::ALL.iter().map(|m| m.key().to_string()).collect(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CanonicalRecord, Indicator, SurveyYear};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn perfect_positive_and_negative() {
        assert!(approx(pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]), 1.0));
        assert!(approx(pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]), -1.0));
    }

    #[test]
    fn known_value() {
        // r = 0.8 for this textbook sample
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 1.0, 4.0, 3.0, 5.0];
        assert!(approx(pearson(&xs, &ys), 0.8));
    }

    #[test]
    fn zero_variance_is_nan() {
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
        assert!(pearson(&[1.0], &[1.0]).is_nan());
    }

    fn record(rank: u32, score: f64, gdp: f64, year: SurveyYear) -> CanonicalRecord {
        CanonicalRecord {
            region: None,
            country: format!("C{rank}"),
            year,
            happiness_rank: rank,
            happiness_score: score,
            gdp_per_capita: gdp,
            family: score * 0.5,
            health_life_expectancy: gdp * gdp,
            freedom: (rank % 2) as f64,
            trust_government_corruption: 1.0 - gdp,
            generosity: (rank as f64).sin(),
        }
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let table = CanonicalTable {
            records: vec![
                record(1, 1.0, 0.9, SurveyYear::Y2015),
                record(2, 0.6, 0.7, SurveyYear::Y2015),
                record(3, 0.0, 0.1, SurveyYear::Y2015),
                record(1, 1.0, 1.0, SurveyYear::Y2016),
                record(2, 0.3, 0.0, SurveyYear::Y2016),
            ],
        };
        let m = correlation_matrix(&table);
        assert_eq!(m.labels.len(), 8);
        assert_eq!(m.labels[0], "happiness_rank");
        for i in 0..8 {
            assert_eq!(m.values[i][i], 1.0);
            for j in 0..8 {
                let (a, b) = (m.values[i][j], m.values[j][i]);
                assert!(a == b || (a.is_nan() && b.is_nan()));
            }
        }

        let r = m
            .get(Metric::HappinessRank, Metric::Indicator(Indicator::HappinessScore))
            .unwrap();
        assert!(r < 0.0, "better rank (smaller number) goes with higher score");
        let gdp_trust = m
            .get(
                Metric::Indicator(Indicator::GdpPerCapita),
                Metric::Indicator(Indicator::TrustGovernmentCorruption),
            )
            .unwrap();
        assert!(approx(gdp_trust, -1.0));
    }
}
