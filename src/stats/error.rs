// src/stats/error.rs

use crate::table::Indicator;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatsError {
    #[error("record not found: {indicator} for {country} in {year}")]
    RecordNotFound {
        country: String,
        year: i32,
        indicator: Indicator,
    },

    #[error("division by zero: {0} is zero")]
    DivisionByZero(&'static str),

    #[error("no data for year {year} ({indicator})")]
    NoDataForYear { indicator: Indicator, year: i32 },

    #[error("no data")]
    NoData,

    #[error("insufficient data: need at least {needed} complete rows, found {found}")]
    InsufficientData { needed: usize, found: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type StatsResult<T> = Result<T, StatsError>;
