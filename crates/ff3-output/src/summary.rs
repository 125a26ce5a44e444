//! Regression summary tables.
//!
//! Lays out the fitted three-factor regression the way statistical packages
//! print an OLS summary: one row per factor with its coefficient, standard
//! error, t-statistic, two-sided p-value and confidence interval, followed by
//! the fit statistics.

use ff3_model::{FactorModelEstimate, RegressionResult, SampleWindow};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One coefficient line of the summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoefficientRow {
    /// Factor label (e.g. `Mkt-RF`).
    pub factor: String,

    /// Fitted coefficient.
    pub coef: f64,

    /// Standard error.
    pub std_err: f64,

    /// t-statistic.
    pub t_stat: f64,

    /// Two-sided p-value.
    pub p_value: f64,

    /// Lower confidence bound.
    pub conf_lower: f64,

    /// Upper confidence bound.
    pub conf_upper: f64,
}

/// Printable summary of a fitted regression.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegressionSummary {
    /// Ticker of the asset.
    pub symbol: String,

    /// Regression window.
    pub window: SampleWindow,

    /// Coefficient rows in design matrix order.
    pub rows: Vec<CoefficientRow>,

    /// Uncentered R².
    pub r_squared: f64,

    /// Uncentered adjusted R².
    pub adj_r_squared: f64,

    /// F-statistic.
    pub f_statistic: f64,

    /// p-value of the F-statistic.
    pub f_p_value: f64,

    /// Residual standard error.
    pub residual_std_error: f64,

    /// Residual degrees of freedom.
    pub df_resid: usize,

    /// Confidence level of the intervals.
    pub confidence_level: f64,
}

impl RegressionSummary {
    /// Summarize a regression fitted over `window`.
    pub fn new(symbol: impl Into<String>, window: SampleWindow, regression: &RegressionResult) -> Self {
        let rows = regression
            .coefficients
            .iter()
            .map(|(factor, c)| CoefficientRow {
                factor: factor.label().to_string(),
                coef: c.estimate,
                std_err: c.std_error,
                t_stat: c.t_stat,
                p_value: c.p_value,
                conf_lower: c.conf_lower,
                conf_upper: c.conf_upper,
            })
            .collect();

        Self {
            symbol: symbol.into(),
            window,
            rows,
            r_squared: regression.r_squared,
            adj_r_squared: regression.adj_r_squared,
            f_statistic: regression.f_statistic,
            f_p_value: regression.f_p_value,
            residual_std_error: regression.residual_std_error,
            df_resid: regression.df_resid,
            confidence_level: regression.confidence_level,
        }
    }

    /// Summarize the regression of a full estimate.
    pub fn from_estimate(symbol: impl Into<String>, estimate: &FactorModelEstimate) -> Self {
        Self::new(symbol, estimate.window, &estimate.regression)
    }

    /// Column headers of the confidence bounds, e.g. `[0.025` and `0.975]`.
    fn interval_headers(&self) -> (String, String) {
        let tail = 0.5 * (1.0 - self.confidence_level);
        (format!("[{tail:.3}"), format!("{:.3}]", 1.0 - tail))
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();
        let (lower, upper) = self.interval_headers();

        output.push_str(&format!("\nOLS Regression Results: {}\n", self.symbol));
        output.push_str(&format!(
            "Period: {} to {} ({} observations)\n",
            self.window.start, self.window.end, self.window.n_obs
        ));
        output.push_str(&"=".repeat(80));
        output.push('\n');

        output.push_str(&format!(
            "{:<28} {:>10.4}    {:<24} {:>10.4}\n",
            "R-squared (uncentered):", self.r_squared, "F-statistic:", self.f_statistic
        ));
        output.push_str(&format!(
            "{:<28} {:>10.4}    {:<24} {:>10.4e}\n",
            "Adj. R-squared:", self.adj_r_squared, "Prob (F-statistic):", self.f_p_value
        ));
        output.push_str(&format!(
            "{:<28} {:>10.6}    {:<24} {:>10}\n",
            "Residual std. error:", self.residual_std_error, "Df residuals:", self.df_resid
        ));

        output.push_str(&"-".repeat(80));
        output.push('\n');
        output.push_str(&format!(
            "{:<12} {:>10} {:>10} {:>9} {:>9} {:>12} {:>12}\n",
            "Factor", "coef", "std err", "t", "P>|t|", lower, upper
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&format!(
                "{:<12} {:>10.4} {:>10.4} {:>9.3} {:>9.3} {:>12.4} {:>12.4}\n",
                row.factor,
                row.coef,
                row.std_err,
                row.t_stat,
                row.p_value,
                row.conf_lower,
                row.conf_upper
            ));
        }

        output.push_str(&"=".repeat(80));
        output.push('\n');
        output.push_str("No intercept: the model regresses excess returns through the origin.\n");

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        let (lower, upper) = self.interval_headers();

        output.push_str(&format!("# OLS Regression Results: {}\n\n", self.symbol));
        output.push_str(&format!(
            "**Period:** {} to {} ({} observations)\n\n",
            self.window.start, self.window.end, self.window.n_obs
        ));

        output.push_str("## Coefficients\n\n");
        output.push_str(&format!(
            "| Factor | coef | std err | t | P>\\|t\\| | {lower} | {upper} |\n"
        ));
        output.push_str("|--------|------|---------|---|--------|------|------|\n");
        for row in &self.rows {
            output.push_str(&format!(
                "| {} | {:.4} | {:.4} | {:.3} | {:.3} | {:.4} | {:.4} |\n",
                row.factor,
                row.coef,
                row.std_err,
                row.t_stat,
                row.p_value,
                row.conf_lower,
                row.conf_upper
            ));
        }

        output.push_str("\n## Fit\n\n");
        output.push_str(&format!("- **R² (uncentered):** {:.4}\n", self.r_squared));
        output.push_str(&format!("- **Adj. R²:** {:.4}\n", self.adj_r_squared));
        output.push_str(&format!(
            "- **F-statistic:** {:.4} (p = {:.4e})\n",
            self.f_statistic, self.f_p_value
        ));
        output.push_str(&format!(
            "- **Residual std. error:** {:.6} on {} degrees of freedom\n",
            self.residual_std_error, self.df_resid
        ));

        output
    }
}

impl fmt::Display for RegressionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "OLS: {} ({} to {}, n = {})",
            self.symbol, self.window.start, self.window.end, self.window.n_obs
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "  {}: {:.4} (se {:.4}, p {:.3})",
                row.factor, row.coef, row.std_err, row.p_value
            )?;
        }
        writeln!(f, "  R²: {:.4}", self.r_squared)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use ff3_model::{
        AnnualizedFactors, CoefficientEstimate, ExpectedReturn, FactorLoadings,
        FactorModelEstimate, PeriodKey, RegressionResult, SampleWindow,
    };

    fn coefficient(estimate: f64, std_error: f64) -> CoefficientEstimate {
        CoefficientEstimate {
            estimate,
            std_error,
            t_stat: estimate / std_error,
            p_value: 0.01,
            conf_lower: estimate - 2.0 * std_error,
            conf_upper: estimate + 2.0 * std_error,
        }
    }

    pub(crate) fn estimate() -> FactorModelEstimate {
        let regression = RegressionResult {
            coefficients: FactorLoadings::new(
                coefficient(1.1117, 0.15),
                coefficient(-0.5883, 0.2),
                coefficient(-0.5434, 0.18),
            ),
            r_squared: 0.42,
            adj_r_squared: 0.389,
            f_statistic: 13.5,
            f_p_value: 1e-6,
            ssr: 0.12,
            residual_std_error: 0.0463,
            df_resid: 56,
            n_obs: 59,
            confidence_level: 0.95,
            fitted: Vec::new(),
            residuals: Vec::new(),
        };
        let annualized = AnnualizedFactors {
            market_excess: 0.08,
            smb: -0.02,
            hml: 0.01,
            risk_free: 0.05,
        };
        let expected_return = ExpectedReturn::compose(&regression, &annualized);
        FactorModelEstimate {
            window: SampleWindow {
                start: PeriodKey::new(2019, 2).unwrap(),
                end: PeriodKey::new(2023, 12).unwrap(),
                n_obs: 59,
            },
            regression,
            annualized,
            expected_return,
        }
    }
}
