#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ff3/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export main types from sub-crates
pub use ff3_data as data;
pub use ff3_model as model;
pub use ff3_output as output;

pub use ff3_model::{
    FactorModelEstimate, ModelError, PipelineConfig, PricePoint, Stage, ThreeFactorModel,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
