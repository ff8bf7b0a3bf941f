// src/stats/outliers.rs

use serde::Serialize;
use tracing::debug;

use super::error::{StatsError, StatsResult};
use super::summary::z_scores;
use crate::table::{Indicator, IndicatorTable, Observation};

pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outlier {
    #[serde(flatten)]
    pub observation: Observation,
    pub z_score: f64,
}

/// Observations of `indicator` in `year` whose |z| strictly exceeds `threshold`.
///
/// Output keeps table order. Fewer than two values or a zero deviation is a
/// `DivisionByZero`, as for [`z_scores`].
pub fn identify_outliers(
    table: &IndicatorTable,
    indicator: Indicator,
    year: i32,
    threshold: f64,
) -> StatsResult<Vec<Outlier>> {
    if !(threshold.is_finite() && threshold >= 0.0) {
        return Err(StatsError::InvalidArgument(format!(
            "threshold must be a non-negative number, got {threshold}"
        )));
    }
    let obs = table.observations(indicator, year);
    if obs.is_empty() {
        return Err(StatsError::NoDataForYear { indicator, year });
    }
    let values: Vec<f64> = obs.iter().map(|o| o.value).collect();
    let z = z_scores(&values)?;

    let out: Vec<Outlier> = obs
        .into_iter()
        .zip(z)
        .filter(|(_, z)| z.abs() > threshold)
        .map(|(observation, z_score)| Outlier {
            observation,
            z_score,
        })
        .collect();
    debug!(%indicator, year, threshold, found = out.len(), "outliers");
    Ok(out)
}
