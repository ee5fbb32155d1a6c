use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use anyhow::Context as _;
use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::data::series::Series;
use crate::foundation::error::{YoyError, YoyResult};

/// Column selection for CSV input.
///
/// When a column name is `None` the first (date) or second (value) column is used.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DataOptions {
    pub date_column: Option<String>,
    pub value_column: Option<String>,
}

/// Daily observations grouped by calendar year.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    years: BTreeMap<i32, Series>,
    skipped_rows: usize,
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

impl Dataset {
    /// Group `(date, value)` records by calendar year, preserving record order within a year.
    pub fn from_records(records: impl IntoIterator<Item = (NaiveDate, f64)>) -> YoyResult<Self> {
        let mut columns: BTreeMap<i32, (Vec<NaiveDate>, Vec<f64>)> = BTreeMap::new();
        for (date, value) in records {
            let (x, y) = columns.entry(date.year()).or_default();
            x.push(date);
            y.push(value);
        }

        let mut years = BTreeMap::new();
        for (year, (x, y)) in columns {
            let series = Series::new(x, y)
                .map_err(|e| YoyError::data(format!("year {year}: {e}")))?;
            years.insert(year, series);
        }
        Ok(Self {
            years,
            skipped_rows: 0,
        })
    }

    /// Load a CSV file with a header row.
    #[tracing::instrument(skip(opts))]
    pub fn from_csv_path(path: &Path, opts: &DataOptions) -> YoyResult<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("open dataset '{}'", path.display()))?;
        let ds = Self::from_csv_reader(file, opts)?;
        tracing::info!(
            years = ds.years.len(),
            skipped_rows = ds.skipped_rows,
            "loaded dataset"
        );
        Ok(ds)
    }

    /// Load CSV data with a header row from any reader.
    pub fn from_csv_reader(reader: impl Read, opts: &DataOptions) -> YoyResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| YoyError::data(format!("read csv header: {e}")))?
            .clone();
        let date_idx = column_index(&headers, opts.date_column.as_deref(), 0)?;
        let value_idx = column_index(&headers, opts.value_column.as_deref(), 1)?;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (row, rec) in rdr.records().enumerate() {
            // Header is line 1.
            let line = row + 2;
            let rec = rec.map_err(|e| YoyError::data(format!("line {line}: {e}")))?;
            let date_raw = rec.get(date_idx).unwrap_or_default();
            let value_raw = rec.get(value_idx).unwrap_or_default();

            let parsed = parse_value(value_raw).ok_or_else(|| {
                YoyError::data(format!("line {line}: value '{value_raw}' is not a number"))
            })?;
            let Some(value) = parsed else {
                tracing::debug!(line, value = value_raw, "skipping row without a value");
                skipped += 1;
                continue;
            };
            let date = parse_date(date_raw).ok_or_else(|| {
                YoyError::data(format!("line {line}: unrecognized date '{date_raw}'"))
            })?;
            records.push((date, value));
        }

        let mut ds = Self::from_records(records)?;
        ds.skipped_rows = skipped;
        Ok(ds)
    }

    pub fn is_empty(&self) -> bool {
        self.years.values().all(Series::is_empty)
    }

    /// Earliest calendar year with data.
    pub fn first_year(&self) -> Option<i32> {
        self.years.keys().next().copied()
    }

    /// Latest calendar year with data.
    pub fn last_year(&self) -> Option<i32> {
        self.years.keys().next_back().copied()
    }

    /// Number of calendar years from the first to the last year, gaps included.
    pub fn year_span(&self) -> u32 {
        match (self.first_year(), self.last_year()) {
            (Some(a), Some(b)) => (b - a + 1) as u32,
            _ => 0,
        }
    }

    pub fn series(&self, year: i32) -> Option<&Series> {
        self.years.get(&year)
    }

    /// Rows dropped because their value was missing.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

fn column_index(
    headers: &csv::StringRecord,
    name: Option<&str>,
    default: usize,
) -> YoyResult<usize> {
    match name {
        Some(name) => headers.iter().position(|h| h == name).ok_or_else(|| {
            YoyError::data(format!(
                "column '{name}' not found (available: {})",
                headers.iter().collect::<Vec<_>>().join(", ")
            ))
        }),
        None if default < headers.len() => Ok(default),
        None => Err(YoyError::data(format!(
            "csv needs at least {} columns, found {}",
            default + 1,
            headers.len()
        ))),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// `Some(None)` for a missing value, `None` for text that is not a number.
fn parse_value(s: &str) -> Option<Option<f64>> {
    if s.is_empty() || s == "-" {
        return Some(None);
    }
    let v = s.parse::<f64>().ok()?;
    Some(v.is_finite().then_some(v))
}

#[cfg(test)]
#[path = "../../tests/unit/data/dataset.rs"]
mod tests;
