//! Three-factor model pipeline.
//!
//! Runs the stages in order, each taking the previous stage's output by
//! reference and returning a new value:
//!
//! ```text
//! prices  -> build_return_series ----\
//!                                     align -> RegressionDataset -> OlsEstimator
//! factors -> normalize_factor_table -/      \-> AnnualizedFactors -> ExpectedReturn
//! ```

use crate::align::{AlignedRow, align};
use crate::annualize::AnnualizedFactors;
use crate::config::PipelineConfig;
use crate::error::{ModelError, Result, Stage};
use crate::excess::RegressionDataset;
use crate::expected::ExpectedReturn;
use crate::factors::normalize_factor_table;
use crate::period::PeriodKey;
use crate::regression::{OlsEstimator, RegressionResult};
use crate::returns::{PricePoint, build_return_series};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Months covered by the regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleWindow {
    /// First aligned month
    pub start: PeriodKey,
    /// Last aligned month
    pub end: PeriodKey,
    /// Number of aligned months
    pub n_obs: usize,
}

impl SampleWindow {
    /// Window spanned by aligned rows, `None` when empty.
    pub fn from_rows(rows: &[AlignedRow]) -> Option<Self> {
        Some(Self {
            start: rows.first()?.period,
            end: rows.last()?.period,
            n_obs: rows.len(),
        })
    }
}

/// Output of a full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorModelEstimate {
    /// Regression window
    pub window: SampleWindow,
    /// Fitted regression with diagnostics
    pub regression: RegressionResult,
    /// Annualized factor rates over the window
    pub annualized: AnnualizedFactors,
    /// Expected annual return and its breakdown
    pub expected_return: ExpectedReturn,
}

impl FactorModelEstimate {
    /// Annualized expected return.
    pub const fn expected_return(&self) -> f64 {
        self.expected_return.total
    }
}

/// Fama-French three-factor model for a single asset.
#[derive(Debug, Clone, Default)]
pub struct ThreeFactorModel {
    config: PipelineConfig,
}

impl ThreeFactorModel {
    /// Create a model with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a model with a validated configuration.
    ///
    /// # Errors
    /// [`ModelError::InvalidConfig`] if the configuration fails validation.
    pub fn with_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Model configuration.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the stages up to and including alignment.
    ///
    /// # Errors
    /// Propagates the first failing stage's error unchanged.
    pub fn aligned_rows(&self, prices: &[PricePoint], factors: &DataFrame) -> Result<Vec<AlignedRow>> {
        let returns = build_return_series(prices)?;
        let factors = normalize_factor_table(factors, &self.config.columns)?;
        align(&returns, &factors)
    }

    /// Run the full pipeline.
    ///
    /// # Errors
    /// Propagates the first failing stage's error unchanged.
    pub fn estimate(&self, prices: &[PricePoint], factors: &DataFrame) -> Result<FactorModelEstimate> {
        let rows = self.aligned_rows(prices, factors)?;
        self.estimate_aligned(&rows)
    }

    /// Fit and annualize over already aligned rows.
    ///
    /// # Errors
    /// Propagates the first failing stage's error unchanged.
    pub fn estimate_aligned(&self, rows: &[AlignedRow]) -> Result<FactorModelEstimate> {
        let dataset = RegressionDataset::from_rows(rows)?;
        let regression = OlsEstimator::with_config(self.config.ols()).fit(&dataset)?;
        let annualized = AnnualizedFactors::from_rows(rows, self.config.periods_per_year)?;
        let expected_return = ExpectedReturn::compose(&regression, &annualized);

        let window = SampleWindow::from_rows(rows).ok_or(ModelError::InsufficientData {
            stage: Stage::Alignment,
            required: 1,
            actual: 0,
        })?;
        debug!(start = %window.start, end = %window.end, n_obs = window.n_obs, "sample window");
        info!(
            expected_return = expected_return.total,
            r_squared = regression.r_squared,
            "three-factor estimate complete"
        );

        Ok(FactorModelEstimate {
            window,
            regression,
            annualized,
            expected_return,
        })
    }
}
