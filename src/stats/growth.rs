// src/stats/growth.rs

use super::error::{StatsError, StatsResult};
use crate::table::{Indicator, IndicatorTable};

/// Percentage change from `start` to `end`.
pub fn percent_change(start: f64, end: f64) -> StatsResult<f64> {
    if start == 0.0 {
        return Err(StatsError::DivisionByZero("start value"));
    }
    Ok((end - start) / start * 100.0)
}

/// Growth of `indicator` for `country` between two years, in percent.
///
/// A missing row or a missing value at either end is `RecordNotFound`.
pub fn growth_rate(
    table: &IndicatorTable,
    indicator: Indicator,
    country: &str,
    start_year: i32,
    end_year: i32,
) -> StatsResult<f64> {
    let value_at = |year| {
        table
            .lookup(country, year)
            .and_then(|row| table.value(row, indicator))
            .ok_or_else(|| StatsError::RecordNotFound {
                country: country.to_string(),
                year,
                indicator,
            })
    };
    let start = value_at(start_year)?;
    let end = value_at(end_year)?;
    percent_change(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::sample_table;
    use crate::table::TableBuilder;

    #[test]
    fn percent_change_cases() {
        assert_eq!(percent_change(100.0, 150.0), Ok(50.0));
        assert_eq!(percent_change(100.0, 100.0), Ok(0.0));
        assert_eq!(percent_change(200.0, 100.0), Ok(-50.0));
        assert_eq!(
            percent_change(0.0, 5.0),
            Err(StatsError::DivisionByZero("start value"))
        );
    }

    #[test]
    fn growth_between_years() {
        let t = sample_table();
        let g = growth_rate(&t, Indicator::GdpPerCapita, "A", 2020, 2021).unwrap();
        assert!((g - 20.0).abs() < 1e-9);
    }

    #[test]
    fn missing_record_or_value_is_not_found() {
        let t = sample_table();
        assert_eq!(
            growth_rate(&t, Indicator::GdpPerCapita, "A", 2019, 2021),
            Err(StatsError::RecordNotFound {
                country: "A".into(),
                year: 2019,
                indicator: Indicator::GdpPerCapita
            })
        );
        // B has a row in 2021 but no GDP value
        assert!(matches!(
            growth_rate(&t, Indicator::GdpPerCapita, "B", 2020, 2021),
            Err(StatsError::RecordNotFound { year: 2021, .. })
        ));
    }

    #[test]
    fn zero_start_value_is_division_error() {
        let mut b = TableBuilder::new(&[Indicator::PovertyRate]);
        b.push_row("X", "XXX", 2000, &[Some(0.0)]).unwrap();
        b.push_row("X", "XXX", 2010, &[Some(4.0)]).unwrap();
        let t = b.finish().unwrap();
        assert!(matches!(
            growth_rate(&t, Indicator::PovertyRate, "X", 2000, 2010),
            Err(StatsError::DivisionByZero(_))
        ));
    }
}
