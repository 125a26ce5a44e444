#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ff3/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod attribution;
pub mod export;
pub mod report;
pub mod summary;

pub use attribution::{ExpectedReturnAttribution, FactorContribution};
pub use export::{
    AlignedDataset, CoefficientRecord, CoefficientTable, ExportError, ExportFormat, Exporter,
};
pub use report::{Report, ReportBuilder, ReportError};
pub use summary::{CoefficientRow, RegressionSummary};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
