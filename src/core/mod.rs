//! Core data structures for time series analysis.

mod forecast;
mod frequency;
mod time_series;

pub use forecast::ForecastResult;
pub use frequency::Frequency;
pub use time_series::TimeSeries;

pub(crate) use time_series::interpolate_series;
