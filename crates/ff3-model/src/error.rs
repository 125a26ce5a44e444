//! Error types for the estimation pipeline.

use std::fmt;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Pipeline stage that detected a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Price series to monthly returns.
    ReturnSeries,
    /// Raw factor table to decimal factor observations.
    FactorTable,
    /// Inner join of returns and factors.
    Alignment,
    /// OLS fit of excess returns on the factors.
    Regression,
    /// Compounding factor series to annual rates.
    Annualization,
    /// Model configuration.
    Configuration,
}

impl Stage {
    /// Human readable stage name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ReturnSeries => "return series",
            Self::FactorTable => "factor table",
            Self::Alignment => "alignment",
            Self::Regression => "regression",
            Self::Annualization => "annualization",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised by the estimation pipeline.
///
/// Every variant is raised eagerly by the stage that detects it and is never
/// recovered from internally.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Too few observations for the requested computation.
    #[error("Insufficient data in {stage}: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Stage that raised the error
        stage: Stage,
        /// Minimum number of observations
        required: usize,
        /// Observations supplied
        actual: usize,
    },

    /// Factor table is missing a column or holds non-numeric data.
    #[error("Schema error in factor table: {0}")]
    Schema(String),

    /// A series violates the unique, ordered period key invariant.
    #[error("Data integrity error in {stage}: {reason}")]
    DataIntegrity {
        /// Stage that raised the error
        stage: Stage,
        /// What was violated
        reason: String,
    },

    /// Return series and factor table share no period.
    #[error(
        "No overlapping periods between {return_periods} return observations and {factor_periods} factor observations"
    )]
    InsufficientOverlap {
        /// Number of return observations
        return_periods: usize,
        /// Number of factor observations
        factor_periods: usize,
    },

    /// Design matrix does not have full column rank.
    #[error("Singular design matrix: rank {rank} of {columns} columns ({reason})")]
    SingularDesignMatrix {
        /// Numerical rank detected
        rank: usize,
        /// Number of regressors
        columns: usize,
        /// Offending column or condition
        reason: String,
    },

    /// Cumulative growth is non-positive so the fractional power is undefined.
    #[error("Cannot annualize {series}: cumulative growth factor {growth} is not positive")]
    AnnualizationDomain {
        /// Factor series being annualized
        series: String,
        /// Product of (1 + r_i)
        growth: f64,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Polars error while reading the factor table
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

impl ModelError {
    /// Stage that raised this error.
    pub const fn stage(&self) -> Stage {
        match self {
            Self::InsufficientData { stage, .. } | Self::DataIntegrity { stage, .. } => *stage,
            Self::Schema(_) | Self::Polars(_) => Stage::FactorTable,
            Self::InsufficientOverlap { .. } => Stage::Alignment,
            Self::SingularDesignMatrix { .. } => Stage::Regression,
            Self::AnnualizationDomain { .. } => Stage::Annualization,
            Self::InvalidConfig(_) => Stage::Configuration,
        }
    }

    pub(crate) fn integrity(stage: Stage, reason: impl Into<String>) -> Self {
        Self::DataIntegrity {
            stage,
            reason: reason.into(),
        }
    }
}
