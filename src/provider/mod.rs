//! Data providers that build the indicator table, plus the process-wide
//! memoized copy of it.

pub mod shared;
pub mod synthetic;
pub mod world_bank;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::config::{Config, Source};
use crate::table::{Indicator, IndicatorTable};

pub use shared::{shared_table, TableCache};
pub use synthetic::SyntheticProvider;
pub use world_bank::{FetchError, WorldBankProvider};

/// Something that can produce an indicator table.
pub trait DataProvider {
    fn name(&self) -> &'static str;

    /// Build the table. Partial failures that still leave a usable (possibly
    /// empty) table are reported in [`LoadReport::failures`], not as `Err`.
    fn load(&self) -> Result<LoadReport>;
}

/// One indicator that could not be fetched.
#[derive(Debug)]
pub struct IndicatorFailure {
    pub indicator: Indicator,
    pub error: FetchError,
}

/// The loaded table together with what went wrong while loading it.
#[derive(Debug)]
pub struct LoadReport {
    pub table: IndicatorTable,
    pub failures: Vec<IndicatorFailure>,
    pub loaded_at: DateTime<Utc>,
}

impl LoadReport {
    pub fn new(table: IndicatorTable, failures: Vec<IndicatorFailure>) -> Self {
        Self {
            table,
            failures,
            loaded_at: Utc::now(),
        }
    }

    pub fn complete(table: IndicatorTable) -> Self {
        Self::new(table, Vec::new())
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Pick the provider named by `config.source`.
pub fn provider_for(config: &Config) -> Result<Box<dyn DataProvider + Send + Sync>> {
    Ok(match config.source {
        Source::Synthetic => Box::new(SyntheticProvider::new(
            config.seed,
            config.start_year,
            config.end_year,
        )),
        Source::WorldBank => Box::new(WorldBankProvider::new(
            &config.world_bank,
            config.start_year,
            config.end_year,
        )?),
    })
}
