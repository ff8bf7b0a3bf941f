// src/table/arrow.rs

use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
use std::sync::Arc;

use super::Indicator;

pub const COUNTRY_COLUMN: &str = "country";
pub const CODE_COLUMN: &str = "countryiso3code";
pub const YEAR_COLUMN: &str = "date";

/// Number of key columns ahead of the indicator columns.
pub const KEY_COLUMNS: usize = 3;

/// Build the Arrow schema for a table holding `indicators`.
///
/// Layout:
/// - `country`          → Utf8, not null
/// - `countryiso3code`  → Utf8, not null
/// - `date`             → Int32, not null
/// - one Float64 column per indicator, nullable, named by its key
pub fn build_arrow_schema(indicators: &[Indicator]) -> Arc<ArrowSchema> {
    let mut fields = vec![
        ArrowField::new(COUNTRY_COLUMN, DataType::Utf8, false),
        ArrowField::new(CODE_COLUMN, DataType::Utf8, false),
        ArrowField::new(YEAR_COLUMN, DataType::Int32, false),
    ];
    fields.extend(
        indicators
            .iter()
            .map(|ind| ArrowField::new(ind.key(), DataType::Float64, /* nullable = */ true)),
    );

    Arc::new(ArrowSchema::new(fields))
}
