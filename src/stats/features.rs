// src/stats/features.rs

use tracing::debug;

use super::error::{StatsError, StatsResult};
use super::summary::{mean, population_std_dev};
use crate::table::{Indicator, IndicatorTable};

/// Standardized feature rows for one year, one column per indicator.
///
/// Only rows with every indicator present are kept. Each column is shifted to
/// mean 0 and scaled to unit population variance; a constant column is left
/// at all zeros.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    /// Table row of each feature row.
    pub rows: Vec<usize>,
    pub data: Vec<Vec<f64>>,
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

impl FeatureMatrix {
    pub fn standardized(
        table: &IndicatorTable,
        indicators: &[Indicator],
        year: i32,
        min_rows: usize,
    ) -> StatsResult<Self> {
        if indicators.len() < 2 {
            return Err(StatsError::InvalidArgument(format!(
                "need at least 2 indicators, got {}",
                indicators.len()
            )));
        }

        let mut rows = Vec::new();
        let mut data = Vec::new();
        let year_rows = table.year_rows(year);
        for &r in &year_rows {
            let row: Option<Vec<f64>> = indicators.iter().map(|&i| table.value(r, i)).collect();
            if let Some(row) = row {
                rows.push(r);
                data.push(row);
            }
        }
        debug!(
            year,
            kept = rows.len(),
            dropped = year_rows.len() - rows.len(),
            "feature rows"
        );
        if rows.len() < min_rows {
            return Err(StatsError::InsufficientData {
                needed: min_rows,
                found: rows.len(),
            });
        }

        let k = indicators.len();
        let mut means = Vec::with_capacity(k);
        let mut scales = Vec::with_capacity(k);
        for j in 0..k {
            let col: Vec<f64> = data.iter().map(|row| row[j]).collect();
            let m = mean(&col).unwrap_or(0.0);
            let sd = population_std_dev(&col).unwrap_or(0.0);
            means.push(m);
            scales.push(if sd == 0.0 { 1.0 } else { sd });
        }
        for row in &mut data {
            for j in 0..k {
                row[j] = (row[j] - means[j]) / scales[j];
            }
        }

        Ok(Self {
            rows,
            data,
            means,
            scales,
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn width(&self) -> usize {
        self.means.len()
    }
}
