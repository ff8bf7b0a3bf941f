// src/table/builder.rs

use arrow::array::{ArrayRef, Float64Array, Int32Array, StringArray};
use arrow::record_batch::RecordBatch;
use std::{collections::HashSet, sync::Arc};

use super::arrow::build_arrow_schema;
use super::{Indicator, IndicatorTable, TableError};

/// Row-wise accumulator for an [`IndicatorTable`].
///
/// Enforces the (country, year) uniqueness invariant as rows are pushed.
pub struct TableBuilder {
    indicators: Vec<Indicator>,
    countries: Vec<String>,
    codes: Vec<String>,
    years: Vec<i32>,
    values: Vec<Vec<Option<f64>>>,
    seen: HashSet<(String, i32)>,
}

impl TableBuilder {
    pub fn new(indicators: &[Indicator]) -> Self {
        Self {
            indicators: indicators.to_vec(),
            countries: Vec::new(),
            codes: Vec::new(),
            years: Vec::new(),
            values: vec![Vec::new(); indicators.len()],
            seen: HashSet::new(),
        }
    }

    /// Rows pushed so far.
    pub fn row_count(&self) -> usize {
        self.years.len()
    }

    /// Append one row; `values` is aligned with the builder's indicators.
    pub fn push_row(
        &mut self,
        country: &str,
        country_code: &str,
        year: i32,
        values: &[Option<f64>],
    ) -> Result<(), TableError> {
        if values.len() != self.indicators.len() {
            return Err(TableError::RowWidth {
                expected: self.indicators.len(),
                found: values.len(),
            });
        }
        if !self.seen.insert((country.to_string(), year)) {
            return Err(TableError::DuplicateKey {
                country: country.to_string(),
                year,
            });
        }

        self.countries.push(country.to_string());
        self.codes.push(country_code.to_string());
        self.years.push(year);
        for (col, &v) in self.values.iter_mut().zip(values) {
            // NaN never enters a table; it is stored as missing.
            col.push(v.filter(|x| !x.is_nan()));
        }
        Ok(())
    }

    pub fn finish(self) -> Result<IndicatorTable, TableError> {
        let schema = build_arrow_schema(&self.indicators);

        let mut columns: Vec<ArrayRef> = Vec::with_capacity(3 + self.indicators.len());
        columns.push(Arc::new(StringArray::from(self.countries)));
        columns.push(Arc::new(StringArray::from(self.codes)));
        columns.push(Arc::new(Int32Array::from(self.years)));
        for col in self.values {
            columns.push(Arc::new(Float64Array::from(col)));
        }

        let batch = RecordBatch::try_new(schema, columns)?;
        IndicatorTable::from_batch(batch)
    }
}
