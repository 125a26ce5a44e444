#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ff3/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod align;
pub mod annualize;
pub mod config;
pub mod error;
pub mod excess;
pub mod expected;
pub mod factors;
pub mod period;
pub mod pipeline;
pub mod regression;
pub mod returns;

// Re-export main types
pub use align::{AlignedRow, align};
pub use annualize::{AnnualizedFactors, annualize};
pub use config::PipelineConfig;
pub use error::{ModelError, Result, Stage};
pub use excess::{RegressionDataset, stock_excess_return};
pub use expected::{ExpectedReturn, expected_return};
pub use factors::{
    Factor, FactorColumns, FactorLoadings, FactorObservation, REGRESSORS, normalize_factor_table,
};
pub use period::{ParsePeriodError, PeriodKey};
pub use pipeline::{FactorModelEstimate, SampleWindow, ThreeFactorModel};
pub use regression::{CoefficientEstimate, OlsConfig, OlsEstimator, RegressionResult};
pub use returns::{PricePoint, ReturnObservation, build_return_series};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
