// src/stats/ranking.rs

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use super::error::{StatsError, StatsResult};
use crate::table::{region_of, Indicator, IndicatorTable, Observation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Largest values first.
    Top,
    /// Smallest values first.
    Bottom,
}

/// The `n` highest (or lowest) values of `indicator` in `year`.
///
/// Missing values are skipped; ties keep table order. Returns everything
/// available when fewer than `n` values exist.
pub fn top_n(
    table: &IndicatorTable,
    indicator: Indicator,
    year: i32,
    n: usize,
    direction: Direction,
) -> StatsResult<Vec<Observation>> {
    if n == 0 {
        return Err(StatsError::InvalidArgument("n must be at least 1".into()));
    }
    let mut obs = table.observations(indicator, year);
    obs.sort_by(|a, b| {
        let ord = a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal);
        match direction {
            Direction::Top => ord.reverse(),
            Direction::Bottom => ord,
        }
    });
    obs.truncate(n);
    Ok(obs)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupAverage {
    pub group: String,
    pub mean: f64,
    pub count: usize,
}

/// Mean of `indicator` per group for `year`, sorted by mean descending.
///
/// `key` maps an observation to its group; groups are reported by name with
/// ties broken alphabetically.
pub fn group_averages<F>(
    table: &IndicatorTable,
    indicator: Indicator,
    year: i32,
    key: F,
) -> Vec<GroupAverage>
where
    F: Fn(&Observation) -> String,
{
    let mut sums: HashMap<String, (f64, usize)> = HashMap::new();
    for obs in table.observations(indicator, year) {
        let e = sums.entry(key(&obs)).or_insert((0.0, 0));
        e.0 += obs.value;
        e.1 += 1;
    }

    let mut out: Vec<GroupAverage> = sums
        .into_iter()
        .map(|(group, (sum, count))| GroupAverage {
            group,
            mean: sum / count as f64,
            count,
        })
        .collect();
    out.sort_by(|a, b| {
        b.mean
            .partial_cmp(&a.mean)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.group.cmp(&b.group))
    });
    out
}

pub fn country_averages(
    table: &IndicatorTable,
    indicator: Indicator,
    year: i32,
) -> Vec<GroupAverage> {
    group_averages(table, indicator, year, |o| o.country.clone())
}

pub fn regional_averages(
    table: &IndicatorTable,
    indicator: Indicator,
    year: i32,
) -> Vec<GroupAverage> {
    group_averages(table, indicator, year, |o| {
        region_of(&o.country_code).to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::sample_table;
    use crate::table::TableBuilder;
    use std::collections::HashSet;

    #[test]
    fn top_one_of_worked_example() {
        let t = sample_table();
        let top = top_n(&t, Indicator::GdpPerCapita, 2020, 1, Direction::Top).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].country, "C");
        assert_eq!(top[0].value, 90.0);

        let bottom = top_n(&t, Indicator::GdpPerCapita, 2020, 2, Direction::Bottom).unwrap();
        let names: Vec<&str> = bottom.iter().map(|o| o.country.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn returns_all_when_fewer_than_n() {
        let t = sample_table();
        let top = top_n(&t, Indicator::LifeExpectancy, 2020, 10, Direction::Top).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].country, "C");
    }

    #[test]
    fn rejects_zero_n() {
        let t = sample_table();
        assert!(matches!(
            top_n(&t, Indicator::GdpPerCapita, 2020, 0, Direction::Top),
            Err(StatsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn top_and_bottom_five_are_disjoint() {
        let mut b = TableBuilder::new(&[Indicator::HealthSpending]);
        for i in 0..12 {
            let name = format!("C{i}");
            b.push_row(&name, &name, 2015, &[Some((i * 7 % 12) as f64)])
                .unwrap();
        }
        let t = b.finish().unwrap();
        let top: HashSet<String> = top_n(&t, Indicator::HealthSpending, 2015, 5, Direction::Top)
            .unwrap()
            .into_iter()
            .map(|o| o.country)
            .collect();
        let bottom: HashSet<String> =
            top_n(&t, Indicator::HealthSpending, 2015, 5, Direction::Bottom)
                .unwrap()
                .into_iter()
                .map(|o| o.country)
                .collect();
        assert_eq!(top.len(), 5);
        assert!(top.is_disjoint(&bottom));
    }

    #[test]
    fn country_averages_sorted_descending() {
        let t = sample_table();
        let avg = country_averages(&t, Indicator::GdpPerCapita, 2020);
        let groups: Vec<&str> = avg.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(groups, vec!["C", "B", "A"]);
        assert_eq!(avg[0].mean, 90.0);
    }

    #[test]
    fn regional_averages_pool_countries() {
        let mut b = TableBuilder::new(&[Indicator::GiniIndex]);
        b.push_row("USA", "USA", 2020, &[Some(40.0)]).unwrap();
        b.push_row("Canada", "CAN", 2020, &[Some(30.0)]).unwrap();
        b.push_row("Brazil", "BRA", 2020, &[Some(50.0)]).unwrap();
        b.push_row("World", "WLD", 2020, &[Some(38.0)]).unwrap();
        let t = b.finish().unwrap();
        let avg = regional_averages(&t, Indicator::GiniIndex, 2020);
        assert_eq!(avg[0].group, "Latin America & Caribbean");
        let na = avg.iter().find(|g| g.group == "North America").unwrap();
        assert_eq!(na.mean, 35.0);
        assert_eq!(na.count, 2);
        assert!(avg.iter().any(|g| g.group == "Other"));
    }
}
