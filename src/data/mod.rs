//! Input time series.

/// CSV loading and per-year grouping.
pub mod dataset;
/// One calendar year of daily observations.
pub mod series;
