use chrono::{Datelike, NaiveDate};

use crate::foundation::error::{YoyError, YoyResult};

/// One calendar year of daily observations.
///
/// Timestamps are strictly increasing and every timestamp falls within [`Series::year`].
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    year: i32,
    x: Vec<NaiveDate>,
    y: Vec<f64>,
}

impl Series {
    /// Build a series from parallel date and value columns.
    pub fn new(x: Vec<NaiveDate>, y: Vec<f64>) -> YoyResult<Self> {
        if x.len() != y.len() {
            return Err(YoyError::validation(format!(
                "series x/y length mismatch: {} dates vs {} values",
                x.len(),
                y.len()
            )));
        }
        if let Some(w) = x.windows(2).find(|w| w[0] >= w[1]) {
            return Err(YoyError::validation(format!(
                "series timestamps must be strictly increasing ({} followed by {})",
                w[0], w[1]
            )));
        }
        let year = match (x.first(), x.last()) {
            (Some(first), Some(last)) if first.year() != last.year() => {
                return Err(YoyError::validation(format!(
                    "series spans more than one calendar year ({first} .. {last})"
                )));
            }
            (Some(first), _) => first.year(),
            (None, _) => 0,
        };
        Ok(Self { year, x, y })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.x
    }

    pub fn values(&self) -> &[f64] {
        &self.y
    }

    /// First `len` points, clamped to the series length.
    pub fn prefix(&self, len: usize) -> (&[NaiveDate], &[f64]) {
        let len = len.min(self.x.len());
        (&self.x[..len], &self.y[..len])
    }
}

/// 1-based day of the year: `[1, 365]`, or `[1, 366]` in leap years.
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// Number of days in `year`.
pub fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/series.rs"]
mod tests;
