// src/report.rs

//! The dashboard report: every analysis the binary prints, computed for the
//! configured year and country selection.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{Config, Source};
use crate::provider::LoadReport;
use crate::stats::{
    assign_clusters, correlation_matrix, growth_rate, identify_outliers, inequality_stats,
    pca_projection, regional_averages, top_n, trend_analysis, ClusterResult, CorrelationMatrix,
    Direction, GroupAverage, InequalityStats, KMeansConfig, Outlier, PcaResult, StatsResult,
    Trend,
};
use crate::table::{Category, Indicator, IndicatorTable, Observation};

/// Countries used for trends and timelines when none are configured.
pub const DEFAULT_FOCUS_COUNTRIES: usize = 5;

/// Result of one report section; a failure is kept as its message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section<T> {
    Ok(T),
    Error(String),
}

impl<T> Section<T> {
    pub fn ok(&self) -> Option<&T> {
        match self {
            Section::Ok(v) => Some(v),
            Section::Error(_) => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Section::Ok(_))
    }
}

impl<T> From<StatsResult<T>> for Section<T> {
    fn from(r: StatsResult<T>) -> Self {
        match r {
            Ok(v) => Section::Ok(v),
            Err(e) => Section::Error(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryGrowth {
    pub country: String,
    /// Percent change from `start_year` to the analysed year.
    pub growth: Section<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSection {
    pub indicator: Indicator,
    pub label: &'static str,
    pub category: Category,
    pub top: Section<Vec<Observation>>,
    pub bottom: Section<Vec<Observation>>,
    pub stats: Section<InequalityStats>,
    pub outliers: Section<Vec<Outlier>>,
    pub regional_averages: Vec<GroupAverage>,
    pub growth: Vec<CountryGrowth>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub country: String,
    pub indicator: Indicator,
    pub points: Vec<(i32, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub source: Source,
    pub loaded_at: Option<DateTime<Utc>>,
    /// Indicators that failed to load, as messages.
    pub load_failures: Vec<String>,
    pub year: i32,
    pub start_year: i32,
    pub end_year: i32,
    pub rows: usize,
    pub countries: Vec<String>,
    pub indicators: Vec<IndicatorSection>,
    pub correlation: Section<CorrelationMatrix>,
    pub pca: Section<PcaResult>,
    pub clusters: Section<ClusterResult>,
    pub trends: Vec<Trend>,
    pub timelines: Vec<Timeline>,
}

impl Report {
    /// Attach load metadata from the provider.
    pub fn with_load(mut self, load: &LoadReport) -> Self {
        self.loaded_at = Some(load.loaded_at);
        self.load_failures = load
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.indicator, f.error))
            .collect();
        self
    }
}

fn available(table: &IndicatorTable, wanted: &[Indicator]) -> Vec<Indicator> {
    wanted
        .iter()
        .copied()
        .filter(|&i| table.has_indicator(i))
        .collect()
}

fn focus_countries(table: &IndicatorTable, config: &Config) -> Vec<String> {
    if config.countries.is_empty() {
        table
            .countries()
            .into_iter()
            .take(DEFAULT_FOCUS_COUNTRIES)
            .collect()
    } else {
        config.countries.clone()
    }
}

fn indicator_section(
    table: &IndicatorTable,
    indicator: Indicator,
    countries: &[String],
    config: &Config,
) -> IndicatorSection {
    let year = config.analysis_year();
    let n = config.analysis.top_n;
    IndicatorSection {
        indicator,
        label: indicator.label(),
        category: indicator.category(),
        top: top_n(table, indicator, year, n, Direction::Top).into(),
        bottom: top_n(table, indicator, year, n, Direction::Bottom).into(),
        stats: inequality_stats(table, indicator, year).into(),
        outliers: identify_outliers(table, indicator, year, config.analysis.outlier_threshold)
            .into(),
        regional_averages: regional_averages(table, indicator, year),
        growth: countries
            .iter()
            .map(|c| CountryGrowth {
                country: c.clone(),
                growth: growth_rate(table, indicator, c, config.start_year, year).into(),
            })
            .collect(),
    }
}

/// Run every analysis over `table` for the year and countries in `config`.
pub fn build_report(table: &IndicatorTable, config: &Config) -> Report {
    let year = config.analysis_year();
    let countries = focus_countries(table, config);
    let analysis = &config.analysis;
    info!(year, rows = table.len(), countries = countries.len(), "building report");

    let indicators: Vec<IndicatorSection> = table
        .indicators()
        .iter()
        .map(|&ind| indicator_section(table, ind, &countries, config))
        .collect();

    let correlation = correlation_matrix(
        table,
        &available(table, &analysis.correlation_indicators),
        year,
    )
    .into();
    let pca = pca_projection(table, &available(table, &analysis.pca_indicators), year).into();
    let clusters = assign_clusters(
        table,
        &available(table, &analysis.cluster_indicators),
        year,
        &KMeansConfig::from(analysis),
    )
    .into();

    let mut trends = Vec::new();
    let mut timelines = Vec::new();
    for country in &countries {
        for &ind in table.indicators() {
            if let Some(t) = trend_analysis(table, ind, country, config.start_year, config.end_year)
            {
                trends.push(t);
            }
            let points = table.series(ind, country, config.start_year, config.end_year);
            if !points.is_empty() {
                timelines.push(Timeline {
                    country: country.clone(),
                    indicator: ind,
                    points,
                });
            }
        }
    }
    debug!(trends = trends.len(), timelines = timelines.len(), "report done");

    Report {
        generated_at: Utc::now(),
        source: config.source,
        loaded_at: None,
        load_failures: Vec::new(),
        year,
        start_year: config.start_year,
        end_year: config.end_year,
        rows: table.len(),
        countries,
        indicators,
        correlation,
        pca,
        clusters,
        trends,
        timelines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{DataProvider, SyntheticProvider};
    use crate::stats::StatsError;
    use crate::table::tests::sample_table;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,ineqdash::stats=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn synthetic_config() -> Config {
        Config {
            start_year: 2000,
            end_year: 2010,
            ..Config::default()
        }
    }

    #[test]
    fn full_report_over_synthetic_data() {
        init_test_logging();
        let cfg = synthetic_config();
        let load = SyntheticProvider::new(cfg.seed, cfg.start_year, cfg.end_year)
            .load()
            .unwrap();
        let report = build_report(&load.table, &cfg).with_load(&load);

        assert_eq!(report.year, 2010);
        assert_eq!(report.countries.len(), DEFAULT_FOCUS_COUNTRIES);
        assert_eq!(report.indicators.len(), Indicator::ALL.len());
        assert!(report.load_failures.is_empty());
        assert!(report.loaded_at.is_some());

        for section in &report.indicators {
            assert_eq!(section.top.ok().unwrap().len(), 5);
            assert!(section.stats.is_ok());
            assert_eq!(section.growth.len(), DEFAULT_FOCUS_COUNTRIES);
        }
        assert!(report.correlation.is_ok());
        assert_eq!(report.pca.ok().unwrap().points.len(), 10);
        assert_eq!(report.clusters.ok().unwrap().assignments.len(), 10);
        // one trend and one timeline per focus country and indicator
        assert_eq!(report.trends.len(), 5 * Indicator::ALL.len());
        assert_eq!(report.timelines.len(), 5 * Indicator::ALL.len());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["indicators"][0]["top"]["ok"].is_array());
    }

    #[test]
    fn failures_are_recorded_not_fatal() {
        init_test_logging();
        let t = sample_table();
        let cfg = Config {
            start_year: 2019,
            end_year: 2022,
            countries: vec!["A".into(), "Z".into()],
            ..Config::default()
        };
        let report = build_report(&t, &cfg);

        // no rows for 2022
        let gdp = &report.indicators[0];
        assert_eq!(
            gdp.stats,
            Section::Error(
                StatsError::NoDataForYear {
                    indicator: Indicator::GdpPerCapita,
                    year: 2022
                }
                .to_string()
            )
        );
        assert_eq!(gdp.top, Section::Ok(Vec::new()));
        assert!(matches!(report.pca, Section::Error(_)));
        assert!(matches!(report.clusters, Section::Error(_)));
        assert!(gdp.growth.iter().all(|g| !g.growth.is_ok()));

        // A has GDP in 2020 and 2021
        assert!(report
            .trends
            .iter()
            .any(|t| t.country == "A" && t.indicator == Indicator::GdpPerCapita));
        assert!(report.timelines.iter().all(|t| t.country == "A"));
    }

    #[test]
    fn focus_countries_come_from_config() {
        let t = sample_table();
        let mut cfg = Config {
            start_year: 2019,
            end_year: 2021,
            ..Config::default()
        };
        assert_eq!(focus_countries(&t, &cfg), vec!["A", "B", "C"]);
        cfg.countries = vec!["C".into()];
        assert_eq!(focus_countries(&t, &cfg), vec!["C"]);
    }
}
