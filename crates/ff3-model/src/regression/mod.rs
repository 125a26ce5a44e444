//! Three-factor regression
//!
//! No-intercept ordinary least squares of monthly excess returns on the market,
//! size and value factors, solved with a Householder QR decomposition.

pub mod ols;
mod qr;

pub use ols::{CoefficientEstimate, OlsConfig, OlsEstimator, RegressionResult};
