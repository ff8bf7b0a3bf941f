// src/stats/trend.rs

use serde::Serialize;

use crate::table::{Indicator, IndicatorTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    /// Sign of the slope; only an exact zero is `Stable`.
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            TrendDirection::Increasing
        } else if slope < 0.0 {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trend {
    pub country: String,
    pub indicator: Indicator,
    pub direction: TrendDirection,
    pub slope: f64,
    pub start_year: i32,
    pub end_year: i32,
    pub start_value: f64,
    pub end_value: f64,
    pub total_change: f64,
    pub points: usize,
}

/// Least-squares slope of `y` against `x`.
///
/// Deviations of `y` are taken from its first element rather than its mean;
/// since the `x` deviations sum to zero the slope is the same, and a constant
/// `y` gives exactly 0.
pub fn linear_slope(points: &[(f64, f64)]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mx = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let y0 = points[0].1;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (x, y) in points {
        let dx = x - mx;
        sxy += dx * (y - y0);
        sxx += dx * dx;
    }
    if sxx == 0.0 {
        return None;
    }
    Some(sxy / sxx)
}

/// Linear trend of `indicator` for `country` over `[start_year, end_year]`.
///
/// Returns `None` (no trend) when fewer than two non-missing points fall in
/// the range.
pub fn trend_analysis(
    table: &IndicatorTable,
    indicator: Indicator,
    country: &str,
    start_year: i32,
    end_year: i32,
) -> Option<Trend> {
    let series = table.series(indicator, country, start_year, end_year);
    let points: Vec<(f64, f64)> = series.iter().map(|&(y, v)| (y as f64, v)).collect();
    let slope = linear_slope(&points)?;

    let (first_year, start_value) = *series.first()?;
    let (last_year, end_value) = *series.last()?;
    Some(Trend {
        country: country.to_string(),
        indicator,
        direction: TrendDirection::from_slope(slope),
        slope,
        start_year: first_year,
        end_year: last_year,
        start_value,
        end_value,
        total_change: end_value - start_value,
        points: series.len(),
    })
}
