//! Fama-French factor definitions and factor table normalization.

pub mod normalize;
pub mod registry;

pub use normalize::{FactorColumns, FactorObservation, normalize_factor_table};
pub use registry::{Factor, FactorLoadings, REGRESSORS};
