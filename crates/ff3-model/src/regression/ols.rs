//! OLS Estimator
//!
//! Fits `stock_excess_return ~ mkt_er + smb + hml` without an intercept. The
//! missing constant is part of the model: the excess-return identity has no
//! alpha term.
//!
//! Inference uses the classical homoskedastic covariance
//! `sigma^2 (X^T X)^-1` with `sigma^2 = SSR / (n - k)`, and R^2 is the
//! uncentered `1 - SSR / sum(y^2)` appropriate for a regression through the
//! origin.

use super::qr::QrDecomposition;
use crate::error::{ModelError, Result, Stage};
use crate::excess::RegressionDataset;
use crate::factors::{FactorLoadings, REGRESSORS};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::function::beta::checked_beta_reg;
use tracing::debug;

/// Configuration for the OLS estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OlsConfig {
    /// Coverage of the reported coefficient confidence intervals (default: 0.95)
    pub confidence_level: f64,
}

impl Default for OlsConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
        }
    }
}

/// Point estimate and inference for one coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoefficientEstimate {
    /// Fitted coefficient
    pub estimate: f64,
    /// Standard error
    pub std_error: f64,
    /// t-statistic against zero
    pub t_stat: f64,
    /// Two-sided p-value with `n - k` degrees of freedom
    pub p_value: f64,
    /// Lower confidence bound
    pub conf_lower: f64,
    /// Upper confidence bound
    pub conf_upper: f64,
}

/// Fitted three-factor regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Coefficients bound to their factors
    pub coefficients: FactorLoadings<CoefficientEstimate>,
    /// Uncentered R^2
    pub r_squared: f64,
    /// Uncentered adjusted R^2
    pub adj_r_squared: f64,
    /// F-statistic for joint significance of the three factors
    pub f_statistic: f64,
    /// Upper-tail p-value of the F-statistic
    pub f_p_value: f64,
    /// Sum of squared residuals
    pub ssr: f64,
    /// Residual standard error
    pub residual_std_error: f64,
    /// Residual degrees of freedom (`n - k`)
    pub df_resid: usize,
    /// Observations used in the fit
    pub n_obs: usize,
    /// Coverage of the confidence intervals
    pub confidence_level: f64,
    /// Fitted excess returns, in row order
    #[serde(default, skip_serializing)]
    pub fitted: Vec<f64>,
    /// Residuals, in row order
    #[serde(default, skip_serializing)]
    pub residuals: Vec<f64>,
}

impl RegressionResult {
    /// Market beta.
    pub const fn beta_mkt(&self) -> f64 {
        self.coefficients.market.estimate
    }

    /// SMB loading.
    pub const fn beta_smb(&self) -> f64 {
        self.coefficients.smb.estimate
    }

    /// HML loading.
    pub const fn beta_hml(&self) -> f64 {
        self.coefficients.hml.estimate
    }

    /// All point estimates.
    pub fn betas(&self) -> FactorLoadings<f64> {
        self.coefficients.map(|c| c.estimate)
    }

    /// Standard errors.
    pub fn standard_errors(&self) -> FactorLoadings<f64> {
        self.coefficients.map(|c| c.std_error)
    }

    /// t-statistics.
    pub fn t_stats(&self) -> FactorLoadings<f64> {
        self.coefficients.map(|c| c.t_stat)
    }

    /// Two-sided p-values.
    pub fn p_values(&self) -> FactorLoadings<f64> {
        self.coefficients.map(|c| c.p_value)
    }
}

/// No-intercept least squares estimator for the three-factor model.
#[derive(Debug, Clone, Default)]
pub struct OlsEstimator {
    config: OlsConfig,
}

impl OlsEstimator {
    /// Create an estimator with the given configuration.
    pub const fn with_config(config: OlsConfig) -> Self {
        Self { config }
    }

    /// Estimator configuration.
    pub const fn config(&self) -> &OlsConfig {
        &self.config
    }

    /// Fit the regression.
    ///
    /// # Errors
    /// * [`ModelError::InsufficientData`] unless there are more observations
    ///   than regressors.
    /// * [`ModelError::SingularDesignMatrix`] if the design matrix does not
    ///   have full column rank.
    pub fn fit(&self, dataset: &RegressionDataset) -> Result<RegressionResult> {
        let k = REGRESSORS.len();
        let n = dataset.n_obs();
        if n <= k {
            return Err(ModelError::InsufficientData {
                stage: Stage::Regression,
                required: k + 1,
                actual: n,
            });
        }

        let x = dataset.design();
        let y = dataset.target();
        let qr = QrDecomposition::new(x, y);

        let deficient = qr.deficient_columns();
        if !deficient.is_empty() {
            let names: Vec<_> = deficient.iter().map(|&j| REGRESSORS[j].name()).collect();
            return Err(ModelError::SingularDesignMatrix {
                rank: qr.rank(),
                columns: k,
                reason: format!(
                    "column(s) {} are zero or collinear with earlier columns",
                    names.join(", ")
                ),
            });
        }

        let beta = qr.solve();
        let fitted = x.dot(&beta);
        let residuals = y - &fitted;

        let ssr = residuals.dot(&residuals);
        let tss = y.dot(y);
        let df_resid = n - k;
        let sigma_sq = ssr / df_resid as f64;

        let r_squared = if tss > 0.0 { 1.0 - ssr / tss } else { 1.0 };
        let adj_r_squared = 1.0 - (n as f64 / df_resid as f64) * (1.0 - r_squared);

        let explained = tss - ssr;
        let f_statistic = if ssr > 0.0 {
            (explained / k as f64) / sigma_sq
        } else if explained > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let t_dist = StudentsT::new(0.0, 1.0, df_resid as f64).map_err(|e| {
            ModelError::InvalidConfig(format!("t distribution with {df_resid} df: {e}"))
        })?;
        let critical = t_dist.inverse_cdf(0.5 + 0.5 * self.config.confidence_level);

        let covariance = qr.unscaled_covariance() * sigma_sq;
        let coefficient = |j: usize| {
            let estimate = beta[j];
            let std_error = covariance[[j, j]].max(0.0).sqrt();
            let t_stat = t_statistic(estimate, std_error);
            CoefficientEstimate {
                estimate,
                std_error,
                t_stat,
                p_value: two_sided_p_value(df_resid as f64, t_stat),
                conf_lower: estimate - critical * std_error,
                conf_upper: estimate + critical * std_error,
            }
        };

        let result = RegressionResult {
            coefficients: FactorLoadings::new(coefficient(0), coefficient(1), coefficient(2)),
            r_squared,
            adj_r_squared,
            f_statistic,
            f_p_value: f_survival(k as f64, df_resid as f64, f_statistic),
            ssr,
            residual_std_error: sigma_sq.sqrt(),
            df_resid,
            n_obs: n,
            confidence_level: self.config.confidence_level,
            fitted: fitted.to_vec(),
            residuals: residuals.to_vec(),
        };

        debug!(
            n_obs = n,
            beta_mkt = result.beta_mkt(),
            beta_smb = result.beta_smb(),
            beta_hml = result.beta_hml(),
            r_squared,
            "fitted three-factor regression"
        );
        Ok(result)
    }
}

/// `P(|T| > |t|)` for `df` degrees of freedom, as `I_{df/(df+t^2)}(df/2, 1/2)`.
/// Evaluated directly so far tails do not cancel to zero.
fn two_sided_p_value(df: f64, t: f64) -> f64 {
    checked_beta_reg(0.5 * df, 0.5, df / (df + t * t)).unwrap_or(f64::NAN)
}

/// Upper tail `P(F > f)` of F(d1, d2), as `I_{d2/(d2+d1 f)}(d2/2, d1/2)`.
fn f_survival(d1: f64, d2: f64, f: f64) -> f64 {
    // Rounding can leave a perfect-zero explained sum slightly negative
    if f <= 0.0 {
        return 1.0;
    }
    checked_beta_reg(0.5 * d2, 0.5 * d1, d2 / (d2 + d1 * f)).unwrap_or(f64::NAN)
}

/// `estimate / std_error`, defined as 0 for an exactly zero estimate with zero
/// error and as a signed infinity for a non-zero estimate with zero error.
fn t_statistic(estimate: f64, std_error: f64) -> f64 {
    if std_error > 0.0 {
        estimate / std_error
    } else if estimate == 0.0 {
        0.0
    } else {
        f64::INFINITY.copysign(estimate)
    }
}
