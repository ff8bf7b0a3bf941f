// src/config.rs

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};
use tracing::{debug, info};

use crate::stats::cluster::LabelScheme;
use crate::table::Indicator;

pub const CONFIG_ENV: &str = "INEQDASH_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "ineqdash.yaml";

pub const DEFAULT_START_YEAR: i32 = 1980;
pub const DEFAULT_END_YEAR: i32 = 2022;

/// Where the indicator table comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    #[default]
    Synthetic,
    WorldBank,
}

impl Source {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "synthetic" | "sample" => Some(Source::Synthetic),
            "world_bank" | "worldbank" | "live" => Some(Source::WorldBank),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldBankConfig {
    pub base_url: String,
    pub per_page: u32,
    pub timeout_secs: u64,
    pub indicators: Vec<Indicator>,
}

impl Default for WorldBankConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.worldbank.org/v2/country/all/indicator".to_string(),
            per_page: 1000,
            timeout_secs: 30,
            indicators: Indicator::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub top_n: usize,
    pub outlier_threshold: f64,
    pub clusters: usize,
    pub cluster_seed: u64,
    pub cluster_restarts: usize,
    pub label_scheme: LabelScheme,
    pub cluster_indicators: Vec<Indicator>,
    pub pca_indicators: Vec<Indicator>,
    pub correlation_indicators: Vec<Indicator>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            outlier_threshold: 2.0,
            clusters: 3,
            cluster_seed: 42,
            cluster_restarts: 10,
            label_scheme: LabelScheme::default(),
            cluster_indicators: vec![
                Indicator::GdpPerCapita,
                Indicator::GiniIndex,
                Indicator::LifeExpectancy,
            ],
            pca_indicators: vec![
                Indicator::GdpPerCapita,
                Indicator::GiniIndex,
                Indicator::LifeExpectancy,
                Indicator::LiteracyRate,
                Indicator::EducationSpending,
            ],
            correlation_indicators: vec![
                Indicator::GdpPerCapita,
                Indicator::GiniIndex,
                Indicator::LifeExpectancy,
                Indicator::LiteracyRate,
                Indicator::EducationSpending,
            ],
        }
    }
}

/// Runtime configuration: YAML file plus `INEQDASH_*` env overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: Source,
    /// Seed for the synthetic table.
    pub seed: u64,
    pub start_year: i32,
    pub end_year: i32,
    /// Year analysed by the cross-country operations; defaults to `end_year`.
    pub year: Option<i32>,
    /// Countries for trends and timelines; empty means the first five in the table.
    pub countries: Vec<String>,
    pub world_bank: WorldBankConfig,
    pub analysis: AnalysisConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: Source::default(),
            seed: 42,
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            year: None,
            countries: Vec::new(),
            world_bank: WorldBankConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Config {
    /// Load from `$INEQDASH_CONFIG` (or `ineqdash.yaml` if present), then
    /// apply env overrides and validate.
    pub fn load() -> Result<Self> {
        let explicit = env::var(CONFIG_ENV).ok();
        let path = explicit.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

        let mut cfg = if Path::new(path).exists() {
            info!(path, "loading config");
            Self::from_path(path)?
        } else if explicit.is_some() {
            bail!("config file {} (from {}) does not exist", path, CONFIG_ENV);
        } else {
            debug!("no config file, using defaults");
            Self::default()
        };

        cfg.apply_overrides(|k| env::var(k).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        Self::from_yaml_str(&text).with_context(|| format!("parsing {:?}", path))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Apply `INEQDASH_SOURCE`, `INEQDASH_SEED` and `INEQDASH_YEAR` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("INEQDASH_SOURCE") {
            self.source = Source::parse(&v)
                .with_context(|| format!("INEQDASH_SOURCE: unknown source `{}`", v))?;
        }
        if let Some(v) = lookup("INEQDASH_SEED") {
            self.seed = v
                .trim()
                .parse()
                .with_context(|| format!("INEQDASH_SEED: `{}` is not an integer", v))?;
        }
        if let Some(v) = lookup("INEQDASH_YEAR") {
            self.year = Some(
                v.trim()
                    .parse()
                    .with_context(|| format!("INEQDASH_YEAR: `{}` is not a year", v))?,
            );
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_year > self.end_year {
            bail!(
                "start_year {} is after end_year {}",
                self.start_year,
                self.end_year
            );
        }
        let year = self.analysis_year();
        if !(self.start_year..=self.end_year).contains(&year) {
            bail!(
                "year {} is outside {}..={}",
                year,
                self.start_year,
                self.end_year
            );
        }
        if self.analysis.top_n == 0 {
            bail!("analysis.top_n must be at least 1");
        }
        if self.analysis.clusters == 0 {
            bail!("analysis.clusters must be at least 1");
        }
        if self.analysis.cluster_restarts == 0 {
            bail!("analysis.cluster_restarts must be at least 1");
        }
        if !(self.analysis.outlier_threshold.is_finite() && self.analysis.outlier_threshold >= 0.0)
        {
            bail!("analysis.outlier_threshold must be a non-negative number");
        }
        if self.world_bank.per_page == 0 {
            bail!("world_bank.per_page must be at least 1");
        }
        if self.world_bank.timeout_secs == 0 {
            bail!("world_bank.timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn analysis_year(&self) -> i32 {
        self.year.unwrap_or(self.end_year)
    }
}
