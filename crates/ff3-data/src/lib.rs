#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ff3/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod files;
pub mod resample;
pub mod yahoo;

pub use error::{DataError, Result};
pub use files::{load_factor_csv, load_price_csv, price_frame};
pub use resample::{PriceField, monthly_closes, monthly_price_points, to_price_points};
pub use yahoo::YahooQuoteProvider;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
