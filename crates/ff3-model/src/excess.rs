//! Excess Return Calculator
//!
//! Derives the regression target and assembles the design matrix whose columns
//! are the three-factor regressors in [`REGRESSORS`] order.

use crate::align::AlignedRow;
use crate::error::{ModelError, Result, Stage};
use crate::factors::{Factor, REGRESSORS};
use crate::period::PeriodKey;
use ndarray::{Array1, Array2};

/// Asset return in excess of the risk-free rate.
pub const fn stock_excess_return(asset_return: f64, rf: f64) -> f64 {
    asset_return - rf
}

/// Regression inputs built from aligned rows.
#[derive(Debug, Clone)]
pub struct RegressionDataset {
    periods: Vec<PeriodKey>,
    target: Array1<f64>,
    design: Array2<f64>,
}

impl RegressionDataset {
    /// Build the target vector and `n x 3` design matrix.
    ///
    /// # Errors
    /// [`ModelError::DataIntegrity`] if any target or regressor is non-finite.
    pub fn from_rows(rows: &[AlignedRow]) -> Result<Self> {
        let n = rows.len();
        let mut design = Array2::<f64>::zeros((n, REGRESSORS.len()));
        let mut target = Array1::<f64>::zeros(n);

        for (i, row) in rows.iter().enumerate() {
            if !row.stock_excess_return.is_finite() {
                return Err(ModelError::integrity(
                    Stage::Regression,
                    format!("non-finite excess return in {}", row.period),
                ));
            }
            target[i] = row.stock_excess_return;

            for (j, factor) in REGRESSORS.iter().enumerate() {
                let value = regressor_value(row, *factor).ok_or_else(|| {
                    ModelError::integrity(
                        Stage::Regression,
                        format!("{} is not carried on aligned rows", factor.name()),
                    )
                })?;
                if !value.is_finite() {
                    return Err(ModelError::integrity(
                        Stage::Regression,
                        format!("non-finite {} in {}", factor.name(), row.period),
                    ));
                }
                design[[i, j]] = value;
            }
        }

        Ok(Self {
            periods: rows.iter().map(|row| row.period).collect(),
            target,
            design,
        })
    }

    /// Months in row order.
    pub fn periods(&self) -> &[PeriodKey] {
        &self.periods
    }

    /// Excess returns.
    pub const fn target(&self) -> &Array1<f64> {
        &self.target
    }

    /// Regressor matrix, one column per entry of [`REGRESSORS`].
    pub const fn design(&self) -> &Array2<f64> {
        &self.design
    }

    /// Number of observations.
    pub fn n_obs(&self) -> usize {
        self.target.len()
    }
}

/// Value of a factor on an aligned row; `None` for WML, which aligned rows
/// do not carry.
const fn regressor_value(row: &AlignedRow, factor: Factor) -> Option<f64> {
    match factor {
        Factor::MarketExcess => Some(row.mkt_excess),
        Factor::Smb => Some(row.smb),
        Factor::Hml => Some(row.hml),
        Factor::MarketReturn => Some(row.rm),
        Factor::RiskFree => Some(row.rf),
        Factor::Wml => None,
    }
}
