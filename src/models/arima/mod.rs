//! ARIMA and SARIMA (Autoregressive Integrated Moving Average) models.
//!
//! This module provides:
//! - ARIMA models with (p, d, q) specifications
//! - SARIMA models with multiplicative seasonal components (P, D, Q)\[s\]
//! - Differencing helpers shared by both

mod css;
mod diff;
mod model;
mod sarima;

pub use diff::{difference, differencing_polynomial, integrate, seasonal_difference};
pub use model::ARIMA;
pub use sarima::SARIMA;
