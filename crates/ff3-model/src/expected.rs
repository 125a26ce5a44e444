//! Expected return composition.
//!
//! ```text
//! expected_return = ann_rf + beta_mkt * ann_mkt_excess + beta_smb * ann_smb + beta_hml * ann_hml
//! ```
//!
//! The residual term is dropped: its expectation is zero under the model.

use crate::annualize::AnnualizedFactors;
use crate::factors::FactorLoadings;
use crate::regression::RegressionResult;
use serde::{Deserialize, Serialize};

/// Annualized expected return split into its additive terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedReturn {
    /// Annualized risk-free rate
    pub risk_free: f64,
    /// `beta * annualized premium` for each factor
    pub contributions: FactorLoadings<f64>,
    /// Sum of the risk-free rate and all contributions
    pub total: f64,
}

impl ExpectedReturn {
    /// Combine fitted betas with annualized factor rates.
    pub fn compose(regression: &RegressionResult, annualized: &AnnualizedFactors) -> Self {
        let betas = regression.betas();
        let premia = annualized.premia();
        let contributions = FactorLoadings::new(
            betas.market * premia.market,
            betas.smb * premia.smb,
            betas.hml * premia.hml,
        );
        let total = annualized.risk_free
            + contributions.market
            + contributions.smb
            + contributions.hml;

        Self {
            risk_free: annualized.risk_free,
            contributions,
            total,
        }
    }

    /// Portion of the expected return above the risk-free rate.
    pub const fn risk_premium(&self) -> f64 {
        self.total - self.risk_free
    }
}

/// Expected return as a single figure.
pub fn expected_return(regression: &RegressionResult, annualized: &AnnualizedFactors) -> f64 {
    ExpectedReturn::compose(regression, annualized).total
}
