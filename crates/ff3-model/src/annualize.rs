//! Annualizer
//!
//! Compounds per-period decimal rates over the regression window and converts
//! the result to an equivalent annual rate:
//!
//! ```text
//! annual = (prod(1 + r_i))^(periods_per_year / n) - 1
//! ```

use crate::align::AlignedRow;
use crate::error::{ModelError, Result, Stage};
use crate::factors::{Factor, FactorLoadings};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Annualize a series of per-period decimal rates.
///
/// # Errors
/// * [`ModelError::InsufficientData`] for an empty series.
/// * [`ModelError::AnnualizationDomain`] if the cumulative growth factor is not
///   strictly positive.
pub fn annualize(series: &str, rates: &[f64], periods_per_year: u32) -> Result<f64> {
    if rates.is_empty() {
        return Err(ModelError::InsufficientData {
            stage: Stage::Annualization,
            required: 1,
            actual: 0,
        });
    }

    let growth: f64 = rates.iter().map(|r| 1.0 + r).product();
    if !(growth > 0.0 && growth.is_finite()) {
        return Err(ModelError::AnnualizationDomain {
            series: series.to_string(),
            growth,
        });
    }

    let exponent = f64::from(periods_per_year) / rates.len() as f64;
    Ok(growth.powf(exponent) - 1.0)
}

/// Annualized factor rates over the aligned regression window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualizedFactors {
    /// Market excess return
    pub market_excess: f64,
    /// SMB premium
    pub smb: f64,
    /// HML premium
    pub hml: f64,
    /// Risk-free rate
    pub risk_free: f64,
}

impl AnnualizedFactors {
    /// Annualize each factor over exactly the rows used by the regression.
    ///
    /// # Errors
    /// See [`annualize`].
    pub fn from_rows(rows: &[AlignedRow], periods_per_year: u32) -> Result<Self> {
        let series = |factor: Factor, pick: fn(&AlignedRow) -> f64| {
            let rates: Vec<f64> = rows.iter().map(pick).collect();
            annualize(factor.name(), &rates, periods_per_year)
        };

        let annualized = Self {
            market_excess: series(Factor::MarketExcess, |row| row.mkt_excess)?,
            smb: series(Factor::Smb, |row| row.smb)?,
            hml: series(Factor::Hml, |row| row.hml)?,
            risk_free: series(Factor::RiskFree, |row| row.rf)?,
        };

        debug!(
            periods = rows.len(),
            market_excess = annualized.market_excess,
            smb = annualized.smb,
            hml = annualized.hml,
            risk_free = annualized.risk_free,
            "annualized factor series"
        );
        Ok(annualized)
    }

    /// Annualized premia of the three regressors.
    pub const fn premia(&self) -> FactorLoadings<f64> {
        FactorLoadings::new(self.market_excess, self.smb, self.hml)
    }
}
