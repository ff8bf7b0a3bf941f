//! In-memory indicator table keyed by (country, year).
//!
//! The table wraps an Arrow [`RecordBatch`] with three key columns
//! (`country`, `countryiso3code`, `date`) followed by one nullable Float64
//! column per [`Indicator`]. It is immutable once built; every operation
//! either reads it or produces a new table.

pub mod arrow;
pub mod builder;
pub mod indicator;
pub mod region;

use ::arrow::array::{Array, BooleanArray, Float64Array, Int32Array, StringArray};
use ::arrow::compute::filter_record_batch;
use ::arrow::error::ArrowError;
use ::arrow::record_batch::RecordBatch;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

use self::arrow::{CODE_COLUMN, COUNTRY_COLUMN, KEY_COLUMNS, YEAR_COLUMN};
pub use builder::TableBuilder;
pub use indicator::{Category, Indicator};
pub use region::{region_of, OTHER_REGION};

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("duplicate record for {country} in {year}")]
    DuplicateKey { country: String, year: i32 },

    #[error("row has {found} values, table has {expected} indicator columns")]
    RowWidth { expected: usize, found: usize },

    #[error("column `{0}` is missing or has the wrong type")]
    BadColumn(String),

    #[error("unknown indicator `{0}`")]
    UnknownIndicator(String),

    #[error(transparent)]
    Arrow(#[from] ArrowError),
}

/// One raw observation as delivered by a data provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRecord {
    pub country: String,
    pub country_code: String,
    pub year: i32,
    pub value: Option<f64>,
}

/// A non-missing value read out of a table, with its key columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    #[serde(skip)]
    pub row: usize,
    pub country: String,
    pub country_code: String,
    pub year: i32,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct IndicatorTable {
    batch: RecordBatch,
    indicators: Vec<Indicator>,
    country: StringArray,
    code: StringArray,
    year: Int32Array,
    values: Vec<Float64Array>,
    index: HashMap<String, HashMap<i32, usize>>,
}

impl IndicatorTable {
    pub fn empty(indicators: &[Indicator]) -> Self {
        // An empty builder can't violate any invariant.
        match TableBuilder::new(indicators).finish() {
            Ok(t) => t,
            Err(e) => unreachable!("empty table construction failed: {e}"),
        }
    }

    /// Wrap an existing batch, validating the schema and key uniqueness.
    pub fn from_batch(batch: RecordBatch) -> Result<Self, TableError> {
        let country = string_column(&batch, COUNTRY_COLUMN)?;
        let code = string_column(&batch, CODE_COLUMN)?;
        let year = batch
            .column_by_name(YEAR_COLUMN)
            .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
            .cloned()
            .ok_or_else(|| TableError::BadColumn(YEAR_COLUMN.to_string()))?;

        let schema = batch.schema();
        let mut indicators = Vec::new();
        let mut values = Vec::new();
        for (i, field) in schema.fields().iter().enumerate().skip(KEY_COLUMNS) {
            let ind = field.name().parse::<Indicator>()?;
            let col = batch
                .column(i)
                .as_any()
                .downcast_ref::<Float64Array>()
                .cloned()
                .ok_or_else(|| TableError::BadColumn(field.name().to_string()))?;
            indicators.push(ind);
            values.push(col);
        }

        let mut index: HashMap<String, HashMap<i32, usize>> = HashMap::new();
        for row in 0..batch.num_rows() {
            let years = index.entry(country.value(row).to_string()).or_default();
            if years.insert(year.value(row), row).is_some() {
                return Err(TableError::DuplicateKey {
                    country: country.value(row).to_string(),
                    year: year.value(row),
                });
            }
        }

        Ok(Self {
            batch,
            indicators,
            country,
            code,
            year,
            values,
            index,
        })
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn len(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indicator columns present, in column order.
    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    pub fn has_indicator(&self, indicator: Indicator) -> bool {
        self.indicators.contains(&indicator)
    }

    pub fn country(&self, row: usize) -> &str {
        self.country.value(row)
    }

    pub fn country_code(&self, row: usize) -> &str {
        self.code.value(row)
    }

    pub fn year(&self, row: usize) -> i32 {
        self.year.value(row)
    }

    /// Value at `row`, or `None` if missing or the column is absent.
    pub fn value(&self, row: usize, indicator: Indicator) -> Option<f64> {
        let col = self.column(indicator)?;
        if col.is_null(row) {
            None
        } else {
            Some(col.value(row))
        }
    }

    fn column(&self, indicator: Indicator) -> Option<&Float64Array> {
        self.indicators
            .iter()
            .position(|i| *i == indicator)
            .map(|idx| &self.values[idx])
    }

    /// Sorted distinct years.
    pub fn years(&self) -> Vec<i32> {
        let set: BTreeSet<i32> = self.year.values().iter().copied().collect();
        set.into_iter().collect()
    }

    /// Distinct country names in first-seen order.
    pub fn countries(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        (0..self.len())
            .map(|r| self.country(r))
            .filter(|c| seen.insert(*c))
            .map(str::to_string)
            .collect()
    }

    /// Row index for a (country, year) key.
    pub fn lookup(&self, country: &str, year: i32) -> Option<usize> {
        self.index.get(country)?.get(&year).copied()
    }

    /// Row indices of the cross-country slice for `year`, in table order.
    pub fn year_rows(&self, year: i32) -> Vec<usize> {
        (0..self.len()).filter(|&r| self.year(r) == year).collect()
    }

    fn observation(&self, row: usize, value: f64) -> Observation {
        Observation {
            row,
            country: self.country(row).to_string(),
            country_code: self.country_code(row).to_string(),
            year: self.year(row),
            value,
        }
    }

    /// Non-missing values of `indicator` for `year`, in table order.
    pub fn observations(&self, indicator: Indicator, year: i32) -> Vec<Observation> {
        self.year_rows(year)
            .into_iter()
            .filter_map(|r| self.value(r, indicator).map(|v| self.observation(r, v)))
            .collect()
    }

    /// `(year, value)` pairs for one country within `[start, end]`, sorted by
    /// year with missing values dropped.
    pub fn series(
        &self,
        indicator: Indicator,
        country: &str,
        start: i32,
        end: i32,
    ) -> Vec<(i32, f64)> {
        let mut points: Vec<(i32, f64)> = (0..self.len())
            .filter(|&r| self.country(r) == country)
            .filter(|&r| (start..=end).contains(&self.year(r)))
            .filter_map(|r| self.value(r, indicator).map(|v| (self.year(r), v)))
            .collect();
        points.sort_by_key(|(y, _)| *y);
        points
    }

    /// Raw records for one indicator, missing values included.
    pub fn records(&self, indicator: Indicator) -> Vec<IndicatorRecord> {
        (0..self.len())
            .map(|r| IndicatorRecord {
                country: self.country(r).to_string(),
                country_code: self.country_code(r).to_string(),
                year: self.year(r),
                value: self.value(r, indicator),
            })
            .collect()
    }

    /// Sub-table with only the given indicator columns (in the given order).
    pub fn select(&self, indicators: &[Indicator]) -> Result<Self, TableError> {
        let mut projection: Vec<usize> = (0..KEY_COLUMNS).collect();
        for ind in indicators {
            let pos = self
                .indicators
                .iter()
                .position(|i| i == ind)
                .ok_or_else(|| TableError::UnknownIndicator(ind.key().to_string()))?;
            projection.push(KEY_COLUMNS + pos);
        }
        Self::from_batch(self.batch.project(&projection)?)
    }

    /// Sub-table holding the category's indicators that this table carries.
    pub fn project(&self, category: Category) -> Result<Self, TableError> {
        let wanted: Vec<Indicator> = category
            .indicators()
            .into_iter()
            .filter(|i| self.has_indicator(*i))
            .collect();
        self.select(&wanted)
    }

    /// Sub-table restricted to the named countries.
    pub fn filter_countries(&self, countries: &[String]) -> Result<Self, TableError> {
        let wanted: HashSet<&str> = countries.iter().map(String::as_str).collect();
        let mask = BooleanArray::from(
            (0..self.len())
                .map(|r| wanted.contains(self.country(r)))
                .collect::<Vec<bool>>(),
        );
        Self::from_batch(filter_record_batch(&self.batch, &mask)?)
    }

    /// Sub-table restricted to years in `[start, end]`.
    pub fn filter_years(&self, start: i32, end: i32) -> Result<Self, TableError> {
        let mask = BooleanArray::from(
            (0..self.len())
                .map(|r| (start..=end).contains(&self.year(r)))
                .collect::<Vec<bool>>(),
        );
        Self::from_batch(filter_record_batch(&self.batch, &mask)?)
    }
}

fn string_column(batch: &RecordBatch, name: &str) -> Result<StringArray, TableError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .cloned()
        .ok_or_else(|| TableError::BadColumn(name.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Small fixture: three countries, two years, two indicators with gaps.
    pub(crate) fn sample_table() -> IndicatorTable {
        let mut b = TableBuilder::new(&[Indicator::GdpPerCapita, Indicator::LifeExpectancy]);
        b.push_row("A", "AAA", 2020, &[Some(10.0), Some(70.0)]).unwrap();
        b.push_row("B", "BBB", 2020, &[Some(20.0), None]).unwrap();
        b.push_row("C", "CCC", 2020, &[Some(90.0), Some(80.0)]).unwrap();
        b.push_row("A", "AAA", 2021, &[Some(12.0), Some(71.0)]).unwrap();
        b.push_row("B", "BBB", 2021, &[None, Some(60.0)]).unwrap();
        b.push_row("C", "CCC", 2019, &[Some(85.0), Some(79.0)]).unwrap();
        b.finish().unwrap()
    }

    #[test]
    fn accessors_read_back_rows() {
        let t = sample_table();
        assert_eq!(t.len(), 6);
        assert_eq!(t.years(), vec![2019, 2020, 2021]);
        assert_eq!(t.countries(), vec!["A", "B", "C"]);
        let row = t.lookup("B", 2020).unwrap();
        assert_eq!(t.country_code(row), "BBB");
        assert_eq!(t.value(row, Indicator::GdpPerCapita), Some(20.0));
        assert_eq!(t.value(row, Indicator::LifeExpectancy), None);
        assert_eq!(t.value(row, Indicator::GiniIndex), None);
        assert!(t.lookup("B", 1999).is_none());
    }

    #[test]
    fn lookup_by_country_then_year() {
        let t = sample_table();
        assert_eq!(t.lookup("A", 2020), Some(0));
        assert_eq!(t.lookup("A", 2021), Some(3));
        assert_eq!(t.lookup("C", 2019), Some(5));
        assert!(t.lookup("Z", 2020).is_none());
        assert!(t.lookup("AAA", 2020).is_none());

        // a batch with a repeated key is rejected on wrap
        let doubled = ::arrow::compute::concat_batches(
            &t.batch().schema(),
            [t.batch(), t.batch()],
        )
        .unwrap();
        assert!(matches!(
            IndicatorTable::from_batch(doubled),
            Err(TableError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn observations_skip_missing_values() {
        let t = sample_table();
        let obs = t.observations(Indicator::LifeExpectancy, 2020);
        let names: Vec<&str> = obs.iter().map(|o| o.country.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert!(t.observations(Indicator::GdpPerCapita, 1990).is_empty());
    }

    #[test]
    fn series_is_sorted_and_bounded() {
        let t = sample_table();
        assert_eq!(
            t.series(Indicator::GdpPerCapita, "C", 2000, 2030),
            vec![(2019, 85.0), (2020, 90.0)]
        );
        assert_eq!(
            t.series(Indicator::GdpPerCapita, "A", 2021, 2021),
            vec![(2021, 12.0)]
        );
    }

    #[test]
    fn select_and_project_keep_keys() {
        let t = sample_table();
        let health = t.project(Category::Health).unwrap();
        assert_eq!(health.indicators(), &[Indicator::LifeExpectancy]);
        assert_eq!(health.len(), t.len());
        assert_eq!(health.value(0, Indicator::LifeExpectancy), Some(70.0));
        assert!(t.select(&[Indicator::HealthSpending]).is_err());
    }

    #[test]
    fn filters_restrict_rows() {
        let t = sample_table();
        let ac = t
            .filter_countries(&["A".to_string(), "C".to_string()])
            .unwrap();
        assert_eq!(ac.len(), 4);
        assert!(ac.lookup("B", 2020).is_none());

        let y = t.filter_years(2020, 2020).unwrap();
        assert_eq!(y.years(), vec![2020]);
        assert_eq!(y.len(), 3);
    }

    #[test]
    fn empty_table_has_schema_but_no_rows() {
        let t = IndicatorTable::empty(&Indicator::ALL);
        assert!(t.is_empty());
        assert_eq!(t.indicators().len(), 10);
        assert!(t.years().is_empty());
    }
}
