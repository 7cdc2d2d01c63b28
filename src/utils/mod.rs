//! Numerical utilities shared by diagnostics and models.

pub mod ols;
pub mod optimization;
pub mod stats;

pub use ols::{ols_fit, OLSResult};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use stats::{normal_cdf, quantile_normal};
