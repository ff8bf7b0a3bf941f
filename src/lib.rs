//! Global inequality indicators: load a country × year table of economic,
//! education and health indicators and run the dashboard analyses over it.

pub mod config;
pub mod provider;
pub mod report;
pub mod stats;
pub mod table;

pub use config::Config;
pub use provider::{provider_for, shared_table, DataProvider, LoadReport};
pub use report::{build_report, Report};
pub use table::{Indicator, IndicatorTable, TableBuilder};
