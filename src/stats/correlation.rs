// src/stats/correlation.rs

use serde::Serialize;
use tracing::debug;

use super::error::{StatsError, StatsResult};
use crate::table::{Indicator, IndicatorTable};

/// Symmetric Pearson correlation matrix, rows and columns in `indicators` order.
///
/// Undefined entries (zero variance, fewer than two paired values) are NaN
/// and serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub year: i32,
    pub indicators: Vec<Indicator>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Indicator, b: Indicator) -> Option<f64> {
        let i = self.indicators.iter().position(|x| *x == a)?;
        let j = self.indicators.iter().position(|x| *x == b)?;
        Some(self.values[i][j])
    }
}

/// Pearson correlation of paired samples; `None` if undefined.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Pairwise correlations of `indicators` across countries in `year`, each
/// pair using only the rows where both values are present.
pub fn correlation_matrix(
    table: &IndicatorTable,
    indicators: &[Indicator],
    year: i32,
) -> StatsResult<CorrelationMatrix> {
    if indicators.is_empty() {
        return Err(StatsError::InvalidArgument(
            "at least one indicator is required".into(),
        ));
    }
    let rows = table.year_rows(year);
    debug!(year, rows = rows.len(), k = indicators.len(), "correlation matrix");

    let k = indicators.len();
    let mut values = vec![vec![f64::NAN; k]; k];
    for i in 0..k {
        for j in i..k {
            let pairs: Vec<(f64, f64)> = rows
                .iter()
                .filter_map(|&r| {
                    Some((
                        table.value(r, indicators[i])?,
                        table.value(r, indicators[j])?,
                    ))
                })
                .collect();
            let r = match pearson(&pairs) {
                Some(_) if i == j => 1.0,
                Some(r) => r,
                None => f64::NAN,
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        year,
        indicators: indicators.to_vec(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableBuilder;

    fn table() -> IndicatorTable {
        let inds = [
            Indicator::GdpPerCapita,
            Indicator::LifeExpectancy,
            Indicator::InfantMortality,
            Indicator::GiniIndex,
        ];
        let mut b = TableBuilder::new(&inds);
        let rows = [
            ("A", 1.0, 60.0, 40.0, 30.0),
            ("B", 2.0, 64.0, 31.0, 30.0),
            ("C", 3.0, 66.0, 29.0, 30.0),
            ("D", 4.0, 71.0, 12.0, 30.0),
        ];
        for (c, gdp, life, inf, gini) in rows {
            b.push_row(c, c, 2010, &[Some(gdp), Some(life), Some(inf), Some(gini)])
                .unwrap();
        }
        b.finish().unwrap()
    }

    #[test]
    fn symmetric_with_unit_diagonal() {
        let t = table();
        let inds = [
            Indicator::GdpPerCapita,
            Indicator::LifeExpectancy,
            Indicator::InfantMortality,
        ];
        let m = correlation_matrix(&t, &inds, 2010).unwrap();
        for i in 0..3 {
            assert_eq!(m.values[i][i], 1.0);
            for j in 0..3 {
                assert_eq!(m.values[i][j], m.values[j][i]);
                assert!(m.values[i][j].abs() <= 1.0);
            }
        }
        assert!(m.get(Indicator::GdpPerCapita, Indicator::LifeExpectancy).unwrap() > 0.9);
        assert!(m.get(Indicator::GdpPerCapita, Indicator::InfantMortality).unwrap() < -0.9);
    }

    #[test]
    fn zero_variance_is_nan() {
        let t = table();
        let m = correlation_matrix(&t, &[Indicator::GdpPerCapita, Indicator::GiniIndex], 2010)
            .unwrap();
        assert!(m.values[0][1].is_nan());
        assert!(m.values[1][1].is_nan());
        assert_eq!(m.values[0][0], 1.0);
    }

    #[test]
    fn perfect_linear_relation() {
        let pairs = [(1.0, 3.0), (2.0, 5.0), (3.0, 7.0)];
        assert!((pearson(&pairs).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(pearson(&[(1.0, 2.0)]), None);
    }

    #[test]
    fn empty_year_gives_nan_matrix() {
        let t = table();
        let m = correlation_matrix(&t, &[Indicator::GdpPerCapita], 1990).unwrap();
        assert!(m.values[0][0].is_nan());
        assert!(correlation_matrix(&t, &[], 2010).is_err());
    }
}
