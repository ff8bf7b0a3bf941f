//! Descriptive statistics and inequality measures over one cross-country slice.
//!
//! Standard deviations here are sample deviations (n − 1 denominator); a
//! single observation has a deviation of zero.

use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

use super::error::{StatsError, StatsResult};
use crate::table::{Indicator, IndicatorTable};

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted(values);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

/// Sample standard deviation; 0.0 for a single value.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if values.len() < 2 {
        return Some(0.0);
    }
    let var = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Population standard deviation (n denominator), as used for feature scaling.
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    v
}

/// Gini coefficient via the cumulative-sum formula
/// `(n + 1 − 2·Σcumsum / cumsum[last]) / n` over ascending values.
///
/// A single value yields 0. Negative inputs are accepted and can push the
/// result outside `[0, 1]`.
pub fn gini(values: &[f64]) -> StatsResult<f64> {
    if values.is_empty() {
        return Err(StatsError::NoData);
    }
    let sorted = sorted(values);
    let n = sorted.len() as f64;

    let mut running = 0.0;
    let mut cumsum_total = 0.0;
    for v in &sorted {
        running += v;
        cumsum_total += running;
    }
    if running == 0.0 {
        return Err(StatsError::DivisionByZero("sum of values"));
    }
    Ok((n + 1.0 - 2.0 * cumsum_total / running) / n)
}

/// Standardized deviations `(v − mean) / std` using the sample deviation.
pub fn z_scores(values: &[f64]) -> StatsResult<Vec<f64>> {
    let m = mean(values).ok_or(StatsError::NoData)?;
    if values.len() < 2 {
        return Err(StatsError::DivisionByZero("standard deviation"));
    }
    let sd = std_dev(values).unwrap_or(0.0);
    if sd == 0.0 {
        return Err(StatsError::DivisionByZero("standard deviation"));
    }
    Ok(values.iter().map(|v| (v - m) / sd).collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InequalityStats {
    pub indicator: Indicator,
    pub year: i32,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub gini: f64,
}

/// Summary and Gini coefficient of the cross-country slice for `year`.
pub fn inequality_stats(
    table: &IndicatorTable,
    indicator: Indicator,
    year: i32,
) -> StatsResult<InequalityStats> {
    let values: Vec<f64> = table
        .observations(indicator, year)
        .into_iter()
        .map(|o| o.value)
        .collect();
    if values.is_empty() {
        return Err(StatsError::NoDataForYear { indicator, year });
    }
    debug!(%indicator, year, n = values.len(), "inequality stats");

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(InequalityStats {
        indicator,
        year,
        count: values.len(),
        mean: mean(&values).unwrap_or(0.0),
        median: median(&values).unwrap_or(0.0),
        std: std_dev(&values).unwrap_or(0.0),
        min,
        max,
        gini: gini(&values)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::sample_table;
    use crate::table::TableBuilder;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn gini_of_equal_values_is_zero() {
        assert!(close(gini(&[5.0, 5.0, 5.0, 5.0]).unwrap(), 0.0));
        assert!(close(gini(&[7.0]).unwrap(), 0.0));
    }

    #[test]
    fn gini_is_scale_invariant() {
        let values = [1.0, 3.0, 8.0, 20.0, 2.5];
        let scaled: Vec<f64> = values.iter().map(|v| v * 37.5).collect();
        assert!(close(gini(&values).unwrap(), gini(&scaled).unwrap()));
    }

    #[test]
    fn gini_matches_known_value() {
        // n=4, cumsum = 0,0,0,1 → (5 − 2·1/1)/4 = 0.75
        assert!(close(gini(&[0.0, 0.0, 1.0, 0.0]).unwrap(), 0.75));
        // order of input doesn't matter
        assert!(close(
            gini(&[3.0, 1.0, 2.0]).unwrap(),
            gini(&[1.0, 2.0, 3.0]).unwrap()
        ));
    }

    #[test]
    fn gini_degenerate_inputs() {
        assert_eq!(gini(&[]), Err(StatsError::NoData));
        assert!(matches!(
            gini(&[0.0, 0.0]),
            Err(StatsError::DivisionByZero(_))
        ));
    }

    #[test]
    fn z_scores_center_and_scale() {
        let z = z_scores(&[2.0, 4.0, 6.0]).unwrap();
        assert!(close(z[0], -1.0));
        assert!(close(z[1], 0.0));
        assert!(close(z[2], 1.0));
    }

    #[test]
    fn z_scores_reject_zero_spread() {
        assert!(matches!(
            z_scores(&[3.0, 3.0, 3.0]),
            Err(StatsError::DivisionByZero(_))
        ));
        assert!(matches!(
            z_scores(&[3.0]),
            Err(StatsError::DivisionByZero(_))
        ));
        assert_eq!(z_scores(&[]), Err(StatsError::NoData));
    }

    #[test]
    fn median_handles_even_counts() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn inequality_stats_for_worked_example() {
        let t = sample_table();
        let s = inequality_stats(&t, Indicator::GdpPerCapita, 2020).unwrap();
        assert_eq!(s.count, 3);
        assert!(close(s.mean, 40.0));
        assert!(close(s.median, 20.0));
        assert!(close(s.min, 10.0));
        assert!(close(s.max, 90.0));
        // sample std of 10, 20, 90
        assert!(close(s.std, 1900.0_f64.sqrt()));
        assert!(s.gini > 0.0 && s.gini < 1.0);
    }

    #[test]
    fn inequality_stats_constant_series() {
        let mut b = TableBuilder::new(&[Indicator::LiteracyRate]);
        for c in ["A", "B", "C", "D"] {
            b.push_row(c, c, 2000, &[Some(88.0)]).unwrap();
        }
        let t = b.finish().unwrap();
        let s = inequality_stats(&t, Indicator::LiteracyRate, 2000).unwrap();
        assert_eq!(s.mean, 88.0);
        assert_eq!(s.median, 88.0);
        assert_eq!(s.std, 0.0);
        assert!(close(s.gini, 0.0));
    }

    #[test]
    fn inequality_stats_empty_year() {
        let t = sample_table();
        assert_eq!(
            inequality_stats(&t, Indicator::GdpPerCapita, 1999),
            Err(StatsError::NoDataForYear {
                indicator: Indicator::GdpPerCapita,
                year: 1999
            })
        );
    }
}
